use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

/// Padding value YOLO models are trained with
pub const LETTERBOX_FILL: u8 = 114;

/// Image resized onto a square canvas, with the transform needed to map
/// model coordinates back to the original image
#[derive(Debug, Clone)]
pub struct Letterboxed {
    pub image: RgbImage,
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Letterboxed {
    /// Map a point in model input space back to original image space
    pub fn unmap(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Aspect-preserving resize to fit `size`x`size`, centered on a gray canvas
pub fn letterbox(img: &DynamicImage, size: u32) -> Letterboxed {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
    let scaled_w = ((width as f32 * scale).round() as u32).clamp(1, size);
    let scaled_h = ((height as f32 * scale).round() as u32).clamp(1, size);

    let resized = imageops::resize(&rgb, scaled_w, scaled_h, FilterType::Triangle);

    let mut canvas = RgbImage::from_pixel(size, size, Rgb([LETTERBOX_FILL; 3]));
    let offset_x = (size - scaled_w) / 2;
    let offset_y = (size - scaled_h) / 2;
    imageops::overlay(&mut canvas, &resized, offset_x.into(), offset_y.into());

    Letterboxed {
        image: canvas,
        scale,
        pad_x: offset_x as f32,
        pad_y: offset_y as f32,
    }
}

/// Resize the short side to `size`, then crop the central `size`x`size` square
pub fn center_crop(img: &DynamicImage, size: u32) -> RgbImage {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let scale = size as f32 / width.min(height) as f32;
    let scaled_w = ((width as f32 * scale).round() as u32).max(size);
    let scaled_h = ((height as f32 * scale).round() as u32).max(size);
    let resized = imageops::resize(&rgb, scaled_w, scaled_h, FilterType::Triangle);

    let x = (scaled_w - size) / 2;
    let y = (scaled_h - size) / 2;
    imageops::crop_imm(&resized, x, y, size, size).to_image()
}

/// Planar CHW floats in [0, 1], the layout the models expect
pub fn to_chw(img: &RgbImage) -> Vec<f32> {
    let (width, height) = img.dimensions();
    let plane = (width * height) as usize;
    let mut data = vec![0.0f32; 3 * plane];

    for (x, y, pixel) in img.enumerate_pixels() {
        let offset = (y * width + x) as usize;
        for channel in 0..3 {
            data[channel * plane + offset] = pixel[channel] as f32 / 255.0;
        }
    }
    data
}
