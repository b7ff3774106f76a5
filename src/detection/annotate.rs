use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::models::{Detection, Severity, StageTable};

const BOX_THICKNESS: i32 = 3;

/// Color a box by the severity its stage alone would earn
pub fn box_color(table: &StageTable, detection: &Detection) -> Rgba<u8> {
    let severity = table.severity_for_class(detection.class_index);
    let [r, g, b] = Severity::from_score(f64::from(severity)).rgb();
    Rgba([r, g, b, 255])
}

/// Draw every detection box onto a copy of the image
pub fn draw_detections(img: &DynamicImage, table: &StageTable, detections: &[Detection]) -> RgbaImage {
    let mut canvas = img.to_rgba8();
    let (width, height) = canvas.dimensions();

    for detection in detections {
        let bbox = detection.bbox.clamp_to(width, height);
        let x1 = bbox.x1 as i32;
        let y1 = bbox.y1 as i32;
        let w = bbox.width() as u32;
        let h = bbox.height() as u32;
        if w == 0 || h == 0 {
            continue;
        }

        let color = box_color(table, detection);
        for offset in 0..BOX_THICKNESS {
            let rect = Rect::at(x1 - offset, y1 - offset)
                .of_size(w + (offset * 2) as u32, h + (offset * 2) as u32);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }
    }

    canvas
}

/// Write an annotated copy of `img` to `output_path`
pub fn save_annotated(
    img: &DynamicImage,
    table: &StageTable,
    detections: &[Detection],
    output_path: &Path,
) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let annotated = draw_detections(img, table, detections);
    // JPEG has no alpha channel
    DynamicImage::ImageRgba8(annotated)
        .to_rgb8()
        .save(output_path)
        .with_context(|| format!("Failed to save annotated image {}", output_path.display()))?;
    log::info!("Saved annotated image to {}", output_path.display());
    Ok(())
}
