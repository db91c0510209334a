use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::Context;

use crate::foundation::{
    core::Shape,
    error::{LabelError, LabelResult},
};

/// RGB palette entry.
pub type Rgb = [u8; 3];

#[derive(Clone, Debug, PartialEq, Eq)]
/// Single-channel image holding raw per-pixel indices in row-major order.
pub struct IndexImage {
    /// Image dimensions.
    pub shape: Shape,
    /// One index per pixel.
    pub data: Vec<u8>,
}

/// Decode a palette-indexed or grayscale PNG into raw indices, without palette expansion.
pub fn read_index_png(path: &Path) -> LabelResult<IndexImage> {
    let file = File::open(path)
        .map_err(|e| LabelError::format(format!("open '{}': {e}", path.display())))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder
        .read_info()
        .map_err(|e| LabelError::format(format!("decode '{}': {e}", path.display())))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| LabelError::format(format!("decode '{}': {e}", path.display())))?;

    match info.color_type {
        png::ColorType::Indexed | png::ColorType::Grayscale => {}
        other => {
            return Err(LabelError::format(format!(
                "'{}' is {other:?}, expected a single-channel indexed image",
                path.display()
            )));
        }
    }
    let bits = match info.bit_depth {
        png::BitDepth::One => 1,
        png::BitDepth::Two => 2,
        png::BitDepth::Four => 4,
        png::BitDepth::Eight => 8,
        png::BitDepth::Sixteen => {
            return Err(LabelError::format(format!(
                "'{}' has 16-bit samples, expected at most 8",
                path.display()
            )));
        }
    };

    let shape = Shape::new(info.height, info.width);
    let data = unpack_rows(&buf, info.line_size, shape, bits);
    Ok(IndexImage { shape, data })
}

/// Expand packed sub-byte samples (MSB first) into one byte per pixel.
fn unpack_rows(buf: &[u8], line_size: usize, shape: Shape, bits: u8) -> Vec<u8> {
    let width = shape.width as usize;
    let mut out = Vec::with_capacity(shape.area() as usize);
    if bits == 8 {
        for row in buf.chunks(line_size).take(shape.height as usize) {
            out.extend_from_slice(&row[..width]);
        }
        return out;
    }

    let per_byte = (8 / bits) as usize;
    let mask = (1u8 << bits) - 1;
    for row in buf.chunks(line_size).take(shape.height as usize) {
        for x in 0..width {
            let byte = row[x / per_byte];
            let shift = 8 - bits as usize * (x % per_byte + 1);
            out.push((byte >> shift) & mask);
        }
    }
    out
}

/// Write an 8-bit palette PNG. Every index in `image` must address an entry of `palette`.
pub fn write_index_png(path: &Path, image: &IndexImage, palette: &[Rgb]) -> LabelResult<()> {
    if palette.is_empty() || palette.len() > 256 {
        return Err(LabelError::validation(
            "palette must have between 1 and 256 entries",
        ));
    }
    if image.data.len() as u64 != image.shape.area() {
        return Err(LabelError::validation(
            "index image data length must equal height * width",
        ));
    }
    if let Some(&max) = image.data.iter().max()
        && max as usize >= palette.len()
    {
        return Err(LabelError::validation(format!(
            "index {max} has no palette entry ({} entries)",
            palette.len()
        )));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("create png '{}'", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), image.shape.width, image.shape.height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette.iter().flatten().copied().collect::<Vec<u8>>());

    let mut writer = encoder
        .write_header()
        .with_context(|| format!("write png header '{}'", path.display()))?;
    writer
        .write_image_data(&image.data)
        .with_context(|| format!("write png data '{}'", path.display()))?;
    writer
        .finish()
        .with_context(|| format!("finish png '{}'", path.display()))?;
    Ok(())
}

/// 256-entry label colormap: bits of the index are interleaved into the high bits of R, G and B.
pub fn label_colormap() -> Vec<Rgb> {
    (0u32..256)
        .map(|i| {
            let mut rgb = [0u8; 3];
            let mut c = i;
            for j in 0..8 {
                for (ch, slot) in rgb.iter_mut().enumerate() {
                    *slot |= (((c >> ch) & 1) as u8) << (7 - j);
                }
                c >>= 3;
            }
            rgb
        })
        .collect()
}

/// Paint an index image through `colormap`; indices past the end of the map become black.
pub fn colorize(image: &IndexImage, colormap: &[Rgb]) -> LabelResult<image::RgbImage> {
    let pixels = image
        .data
        .iter()
        .flat_map(|&i| colormap.get(i as usize).copied().unwrap_or([0, 0, 0]))
        .collect::<Vec<u8>>();
    image::RgbImage::from_raw(image.shape.width, image.shape.height, pixels).ok_or_else(|| {
        LabelError::validation("index image data length must equal height * width")
    })
}

/// Save an RGB visualization of `image` as PNG.
pub fn save_colorized(path: &Path, image: &IndexImage, colormap: &[Rgb]) -> LabelResult<()> {
    colorize(image, colormap)?
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/codec/indexed.rs"]
mod tests;
