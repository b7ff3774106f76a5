use std::path::Path;

use image::{ImageBuffer, Rgb};
use tempfile::TempDir;

/// Writes a small solid-red image at `dir/name`; format follows the extension.
pub fn write_test_image(dir: &Path, name: &str) {
    let img = ImageBuffer::from_fn(16, 12, |_, _| Rgb([255u8, 0u8, 0u8]));
    img.save(dir.join(name)).expect("Failed to save test image");
}

/// Creates a temp folder holding the given image files plus any extra plain files.
/// The folder is removed when the returned TempDir is dropped.
pub fn create_folder(images: &[&str], others: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    for name in images {
        write_test_image(dir.path(), name);
    }
    for name in others {
        std::fs::write(dir.path().join(name), b"not an image").expect("Failed to write file");
    }
    dir
}
