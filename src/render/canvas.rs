use std::io::Cursor;
use std::path::Path;

use ab_glyph::{point, Font, FontRef, GlyphId, PxScale, ScaleFont};
use image::{imageops, ImageFormat, Rgba, RgbaImage};

use crate::color::BACKGROUND;
use crate::error::RenderError;

/// Horizontal placement of a text run relative to its anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Raster surface with a proportional font for labels.
pub struct Canvas {
    image: RgbaImage,
    font: FontRef<'static>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let font = FontRef::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT)?;
        Ok(Canvas {
            image: RgbaImage::from_pixel(width, height, BACKGROUND),
            font,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Alpha-blend `color` into one pixel; off-canvas coordinates are ignored.
    fn blend(&mut self, x: i64, y: i64, color: Rgba<u8>, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            let mixed = dst.0[c] as f32 * (1.0 - alpha) + color.0[c] as f32 * alpha;
            dst.0[c] = mixed.round() as u8;
        }
        dst.0[3] = 255;
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba<u8>) {
        let (x0, y0) = (x.floor() as i64, y.floor() as i64);
        let (x1, y1) = ((x + w).ceil() as i64, (y + h).ceil() as i64);
        for py in y0.max(0)..y1.min(self.height() as i64) {
            for px in x0.max(0)..x1.min(self.width() as i64) {
                self.image.put_pixel(px as u32, py as u32, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba<u8>) {
        self.fill_rect(x, y, w, 1.0, color);
        self.fill_rect(x, y + h - 1.0, w, 1.0, color);
        self.fill_rect(x, y, 1.0, h, color);
        self.fill_rect(x + w - 1.0, y, 1.0, h, color);
    }

    /// Advance width of `text` at `size` px.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut width = 0.0;
        let mut last: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = last {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            last = Some(id);
        }
        width
    }

    /// Height of one line of text at `size` px.
    pub fn line_height(&self, size: f32) -> f32 {
        self.font.as_scaled(PxScale::from(size)).height()
    }

    /// Draw `text` with its vertical centre at `cy`.
    pub fn draw_text(&mut self, x: f32, cy: f32, text: &str, size: f32, color: Rgba<u8>, align: HAlign) {
        let left = match align {
            HAlign::Left => x,
            HAlign::Center => x - self.text_width(text, size) / 2.0,
            HAlign::Right => x - self.text_width(text, size),
        };
        let top = cy - self.line_height(size) / 2.0;
        let mut coverage = Vec::new();
        rasterize(&self.font, text, size, left, top, &mut coverage);
        for (px, py, alpha) in coverage {
            self.blend(px, py, color, alpha);
        }
    }

    /// Draw `text` rotated a quarter turn counter-clockwise so it reads
    /// bottom-to-top. The rotated run is centred on `cx` and its top edge is
    /// at `top`; the end of the text sits closest to `top`.
    pub fn draw_text_vertical(&mut self, cx: f32, top: f32, text: &str, size: f32, color: Rgba<u8>) {
        let w = self.text_width(text, size).ceil().max(1.0) as u32;
        let h = self.line_height(size).ceil().max(1.0) as u32;
        let mut run = image::GrayImage::new(w, h);
        let mut coverage = Vec::new();
        rasterize(&self.font, text, size, 0.0, 0.0, &mut coverage);
        for (px, py, alpha) in coverage {
            if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                let p = run.get_pixel_mut(px as u32, py as u32);
                p.0[0] = p.0[0].max((alpha.clamp(0.0, 1.0) * 255.0) as u8);
            }
        }
        let rotated = imageops::rotate270(&run);
        let left = (cx - rotated.width() as f32 / 2.0).round() as i64;
        let top = top.round() as i64;
        for (x, y, p) in rotated.enumerate_pixels() {
            if p.0[0] > 0 {
                self.blend(left + x as i64, top + y as i64, color, p.0[0] as f32 / 255.0);
            }
        }
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Encode as PNG, write to `path`, and hand back the encoded bytes.
    pub fn save_png(&self, path: &Path) -> Result<Vec<u8>, RenderError> {
        let bytes = self.encode_png()?;
        std::fs::write(path, &bytes).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Figure saved to: {}", path.display());
        Ok(bytes)
    }
}

/// Collect `(x, y, coverage)` for every covered pixel of a text run whose
/// top-left corner is at `(left, top)`.
fn rasterize(
    font: &FontRef<'static>,
    text: &str,
    size: f32,
    left: f32,
    top: f32,
    out: &mut Vec<(i64, i64, f32)>,
) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);
    let baseline = top + scaled.ascent();
    let mut caret = left;
    let mut last: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = last {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        last = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, cov| {
                out.push((
                    bounds.min.x as i64 + gx as i64,
                    bounds.min.y as i64 + gy as i64,
                    cov,
                ));
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_leaves_ink() {
        let mut canvas = Canvas::new(120, 40).unwrap();
        canvas.draw_text(60.0, 20.0, "0.87", 16.0, Rgba([0, 0, 0, 255]), HAlign::Center);
        let inked = canvas.image().pixels().filter(|p| p.0[0] < 128).count();
        assert!(inked > 0);
        assert!(canvas.text_width("0.87", 16.0) > canvas.text_width("0", 16.0));
    }

    #[test]
    fn vertical_text_is_taller_than_wide() {
        let mut canvas = Canvas::new(60, 200).unwrap();
        canvas.draw_text_vertical(30.0, 10.0, "e_inc_100k", 14.0, Rgba([0, 0, 0, 255]));
        let inked: Vec<(u32, u32)> = canvas
            .image()
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] < 128)
            .map(|(x, y, _)| (x, y))
            .collect();
        let (min_x, max_x) = (inked.iter().map(|p| p.0).min().unwrap(), inked.iter().map(|p| p.0).max().unwrap());
        let (min_y, max_y) = (inked.iter().map(|p| p.1).min().unwrap(), inked.iter().map(|p| p.1).max().unwrap());
        assert!(max_y - min_y > max_x - min_x);
    }

    #[test]
    fn rects_are_clipped() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.fill_rect(-5.0, -5.0, 30.0, 30.0, Rgba([1, 2, 3, 255]));
        assert_eq!(*canvas.image().get_pixel(9, 9), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn png_bytes_have_signature() {
        let canvas = Canvas::new(4, 4).unwrap();
        let bytes = canvas.encode_png().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
