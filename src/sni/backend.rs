//! ksni-backed [`TrayBackend`] implementation.
//!
//! Spawns one StatusNotifierItem per tray on the session bus.  ksni runs the
//! D-Bus service on its own thread; [`SniWidget`] pushes state changes
//! through the item's blocking handle.

use crate::sni::item::SniItem;
use crate::traits::{TrayBackend, TrayWidget};
use ksni::blocking::TrayMethods;
use log::debug;
use std::path::Path;

/// Errors produced by the ksni backend.
#[derive(Debug, thiserror::Error)]
pub enum SniError {
    /// Registering the item on the session bus failed.
    #[error("failed to spawn status notifier item: {0}")]
    Spawn(String),
    /// The icon file could not be read or decoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode the image file at `path` into the ARGB32 pixmap ksni expects.
fn load_pixmap(path: &Path) -> Result<ksni::Icon, SniError> {
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();
    let mut data = image.into_raw();
    // image hands out RGBA8; SNI wants network-order ARGB32.
    for pixel in data.chunks_exact_mut(4) {
        pixel.rotate_right(1);
    }
    Ok(ksni::Icon {
        width: width as i32,
        height: height as i32,
        data,
    })
}

/// A [`TrayBackend`] that registers one StatusNotifierItem per tray.
#[derive(Debug, Default)]
pub struct SniBackend;

impl SniBackend {
    /// Create a new backend.
    pub fn new() -> Self {
        Self
    }
}

impl TrayBackend for SniBackend {
    type Widget = SniWidget;
    type Error = SniError;

    fn create(&mut self, name: &str) -> Result<SniWidget, SniError> {
        let handle = SniItem::new(name)
            .spawn()
            .map_err(|e| SniError::Spawn(e.to_string()))?;
        debug!("registered status notifier item {}", name);
        Ok(SniWidget { handle })
    }
}

/// One live StatusNotifierItem.
pub struct SniWidget {
    handle: ksni::blocking::Handle<SniItem>,
}

impl TrayWidget for SniWidget {
    type Error = SniError;

    fn set_icon(&mut self, path: &Path) -> Result<(), SniError> {
        // Decode before touching the item so a bad file leaves the current
        // icon in place.
        let pixmap = load_pixmap(path)?;
        let _ = self.handle.update(move |item| {
            item.pixmap = vec![pixmap.clone()];
            item.icon_hidden = false;
        });
        Ok(())
    }

    fn clear_icon(&mut self) {
        let _ = self.handle.update(|item| item.icon_hidden = true);
    }

    fn restore_icon(&mut self) {
        let _ = self.handle.update(|item| item.icon_hidden = false);
    }

    fn set_tooltip(&mut self, text: &str) {
        let tooltip = text.to_string();
        let _ = self.handle.update(move |item| item.tooltip = tooltip.clone());
    }

    fn set_visible(&mut self, visible: bool) {
        let _ = self.handle.update(move |item| item.visible = visible);
    }

    fn destroy(self) {
        let _ = self.handle.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixmap_is_argb_from_rgba_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("multitray-pixmap-test-{}.png", std::process::id()));
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 40]));
        img.save(&path).unwrap();

        let icon = load_pixmap(&path).unwrap();
        assert_eq!(icon.width, 2);
        assert_eq!(icon.height, 2);
        assert_eq!(icon.data.len(), 2 * 2 * 4);
        // RGBA (10, 20, 30, 40) becomes ARGB (40, 10, 20, 30).
        assert_eq!(&icon.data[..4], &[40, 10, 20, 30]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_icon_file_is_an_image_error() {
        let err = load_pixmap(Path::new("/nonexistent/none.png"));
        assert!(matches!(err, Err(SniError::Image(_))));
    }
}
