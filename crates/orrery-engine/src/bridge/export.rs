//! PNG snapshot of the current frame.

use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

use crate::api::config::ViewConfig;
use crate::core::scene::Scene;
use crate::error::ExportError;
use crate::renderer::camera::{Camera, Viewport};
use crate::renderer::raster::RasterSurface;
use crate::systems::render::render_frame;

/// Render one frame at the viewport's physical resolution.
pub fn render_snapshot(
    scene: &Scene,
    camera: &Camera,
    time: f64,
    viewport: &Viewport,
    config: &ViewConfig,
) -> Result<RgbaImage, ExportError> {
    if viewport.is_empty() {
        return Err(ExportError::EmptyViewport);
    }
    let mut surface = RasterSurface::for_viewport(viewport);
    render_frame(scene, camera, time, viewport, config, &mut surface);
    Ok(surface.into_image())
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::EmptyViewport);
    }
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn snapshot_matches_physical_size() {
        let vp = Viewport::new(80.0, 60.0, 2.0, 60.0);
        let img = render_snapshot(&Scene::new(), &Camera::default(), 0.0, &vp, &ViewConfig::default()).unwrap();
        assert_eq!(img.dimensions(), (160, 120));
        // Background fills the corner; the star covers the center.
        let bg = ViewConfig::default().background().to_rgba8();
        assert_eq!(img.get_pixel(0, 0).0, bg);
        assert_ne!(img.get_pixel(80, 60).0, bg);
    }

    #[test]
    fn empty_viewport_is_an_error() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 60.0);
        let err = render_snapshot(&Scene::new(), &Camera::default(), 0.0, &vp, &ViewConfig::default());
        assert!(matches!(err, Err(ExportError::EmptyViewport)));
        assert!(matches!(encode_png(&RgbaImage::new(0, 0)), Err(ExportError::EmptyViewport)));
    }

    #[test]
    fn png_bytes_have_signature() {
        let bytes = encode_png(&RgbaImage::new(4, 4)).unwrap();
        assert_eq!(&bytes[..8], &PNG_MAGIC);
    }
}
