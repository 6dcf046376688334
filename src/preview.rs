use image::RgbImage;
use minifb::{Key, Window, WindowOptions};
use std::time::Duration;

use crate::errors::{ParticleError, Result};

/// Pack an RGB image into minifb's 0RGB u32 framebuffer layout
pub fn to_framebuffer(image: &RgbImage) -> Vec<u32> {
    image
        .pixels()
        .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
        .collect()
}

/// Show an image in a window until it is closed or Escape is pressed
pub fn show_preview(title: &str, image: &RgbImage) -> Result<()> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    if width == 0 || height == 0 {
        return Err(ParticleError::Preview("cannot preview an empty image".to_string()));
    }

    let buffer = to_framebuffer(image);

    let mut window = Window::new(
        title,
        width,
        height,
        WindowOptions {
            resize: true,
            scale: minifb::Scale::FitScreen,
            ..WindowOptions::default()
        },
    )
    .map_err(|e| ParticleError::Preview(format!("Failed to create window: {}", e)))?;

    window.limit_update_rate(Some(Duration::from_millis(50))); // 20 FPS

    log::info!("Showing preview of {} (press Esc to close)", title);
    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&buffer, width, height)
            .map_err(|e| ParticleError::Preview(format!("Failed to update window: {}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn framebuffer_packs_channels() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(1, 0, Rgb([0x12, 0x34, 0x56]));
        assert_eq!(to_framebuffer(&img), vec![0, 0x123456]);
    }
}
