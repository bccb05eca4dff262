//! PNG rendering of result drawings via resvg.

use resvg::usvg;
use tiny_skia::Pixmap;

use super::error::CliError;

/// Rasterize `svg_content` at `scale`x and write it to `png_path`.
///
/// Returns the pixel size of the written image.
pub fn render_png(svg_content: &str, png_path: &str, scale: f64) -> Result<(u32, u32), CliError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(CliError::Render(format!("scale must be positive, got {}", scale)));
    }

    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options).map_err(|e| CliError::Render(e.to_string()))?;

    let size = tree.size();
    let pixmap_width = (size.width() as f64 * scale).ceil().max(1.0) as u32;
    let pixmap_height = (size.height() as f64 * scale).ceil().max(1.0) as u32;

    let mut pixmap = Pixmap::new(pixmap_width, pixmap_height).ok_or_else(|| {
        CliError::Render(format!("could not create {}x{} pixmap", pixmap_width, pixmap_height))
    })?;

    pixmap.fill(tiny_skia::Color::WHITE);

    let transform = tiny_skia::Transform::from_scale(scale as f32, scale as f32);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap.save_png(png_path).map_err(|e| CliError::Render(format!("{}: {}", png_path, e)))?;

    Ok((pixmap_width, pixmap_height))
}
