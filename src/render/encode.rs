use std::io::Cursor;

use crate::foundation::{
    core::FrameRGBA,
    error::{CanvasError, CanvasResult},
};

/// Encode a rendered frame as PNG with straight alpha.
pub fn encode_png(frame: &FrameRGBA) -> CanvasResult<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(CanvasError::encode(format!(
            "frame buffer holds {} bytes, expected {expected} for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let data = if frame.premultiplied {
        let mut straight = frame.clone();
        straight.unpremultiply();
        straight.data
    } else {
        frame.data.clone()
    };

    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| CanvasError::encode("frame dimensions do not match buffer"))?;
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| CanvasError::encode(format!("png encode failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/encode.rs"]
mod tests;
