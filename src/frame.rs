use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::SimError;
use crate::palette::FrameField;

pub fn frame_path(dir: &Path, field: FrameField, tick: u64) -> PathBuf {
    dir.join(format!("{}_{tick:06}.png", field.name()))
}

/// Grid rows run bottom-up, image rows top-down.
pub fn flip_rows(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let stride = width * 4;
    assert_eq!(rgba.len(), stride * height, "rgba buffer size mismatch");
    rgba.chunks_exact(stride)
        .rev()
        .flat_map(|row| row.iter().copied())
        .collect()
}

/// Writes a bottom-up RGBA8 grid image as a PNG.
pub fn write_png(path: &Path, rgba: &[u8], width: usize, height: usize) -> Result<(), SimError> {
    let pixels = flip_rows(rgba, width, height);
    let file = File::create(path).map_err(|err| SimError::io(path, err))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width as u32, height as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&pixels)?;
    writer.finish()?;
    Ok(())
}
