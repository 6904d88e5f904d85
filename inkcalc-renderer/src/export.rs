//! Surface export to PNG bytes and data URLs.
//!
//! The snapshot sent for recognition and the "download" export share this
//! path. An optional background is composited under the strokes at encode time
//! only, so erased pixels stay transparent on the live surface.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use inkcalc_core::Rgba;
use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};

use crate::error::{RenderError, RenderResult};

/// Prefix of a PNG data URL.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encode a pixmap as PNG, optionally over an opaque background.
///
/// # Errors
///
/// Returns an error if the background surface cannot be allocated or PNG
/// encoding fails.
pub fn encode_png(pixmap: &Pixmap, background: Option<Rgba>) -> RenderResult<Vec<u8>> {
    let encoded = match background {
        None => pixmap.encode_png(),
        Some(bg) => {
            let mut flattened = Pixmap::new(pixmap.width(), pixmap.height())
                .ok_or_else(|| RenderError::Surface("Failed to create export pixmap".into()))?;
            flattened.fill(Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
            flattened.draw_pixmap(
                0,
                0,
                pixmap.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
            flattened.encode_png()
        }
    };
    encoded.map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))
}

/// Wrap PNG bytes in a `data:image/png;base64,` URL.
#[must_use]
pub fn png_data_url(png: &[u8]) -> String {
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len() * 4 / 3 + 4);
    url.push_str(PNG_DATA_URL_PREFIX);
    STANDARD.encode_string(png, &mut url);
    url
}
