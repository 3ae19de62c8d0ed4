use ab_glyph::{point, Font, FontVec, Glyph, GlyphId, PxScale, ScaleFont};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};
use tracing::debug;

/// Fonts tried in order when no explicit font is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Loads the UI font from `explicit`, or from the first installed candidate.
pub fn load_font(explicit: Option<&Path>) -> Result<FontVec> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
            .context("no usable font found; set NBACK_FONT to a .ttf file")?,
    };
    let bytes = std::fs::read(&path)
        .with_context(|| format!("failed to read font {}", path.display()))?;
    let font = FontVec::try_from_vec(bytes)
        .with_context(|| format!("invalid font file {}", path.display()))?;
    debug!(path = %path.display(), "font loaded");
    Ok(font)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone)]
struct CachedGlyph {
    bitmap: Vec<u8>,
    width: u32,
    height: u32,
    bearing_x: i32,
    bearing_y: i32,
}

#[derive(Hash, Eq, PartialEq, Clone, Copy)]
struct GlyphCacheKey {
    glyph_id: u16,
    scale_bits: u32, // f32 bits for exact scale matching
}

/// Rasterizes text into a pixmap, caching coverage bitmaps per glyph and size
pub struct TextPainter {
    font: FontVec,
    glyph_cache: HashMap<GlyphCacheKey, CachedGlyph>,
}

impl TextPainter {
    pub fn new(font: FontVec) -> Self {
        Self {
            font,
            glyph_cache: HashMap::with_capacity(256),
        }
    }

    /// Horizontal advance of `text` at `size` pixels, kerning included.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let gid = self.font.glyph_id(ch);
            if let Some(prev_gid) = prev {
                width += scaled.kern(prev_gid, gid);
            }
            width += scaled.h_advance(gid);
            prev = Some(gid);
        }
        width
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        pixmap: &mut Pixmap,
        text: &str,
        x: f32,
        baseline_y: f32,
        size: f32,
        color: Color,
        align: TextAlign,
    ) {
        let scale = PxScale::from(size);
        let start_x = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - self.measure(text, size) / 2.0,
            TextAlign::Right => x - self.measure(text, size),
        };

        // Layout first, then fill cache misses.
        let glyphs: Vec<(Glyph, GlyphCacheKey)> = {
            let scaled = self.font.as_scaled(scale);
            let mut pen_x = start_x;
            let mut prev: Option<GlyphId> = None;
            let mut out = Vec::with_capacity(text.len());
            for ch in text.chars() {
                let gid = self.font.glyph_id(ch);
                if let Some(prev_gid) = prev {
                    pen_x += scaled.kern(prev_gid, gid);
                }
                out.push((
                    Glyph {
                        id: gid,
                        scale,
                        position: point(pen_x, baseline_y),
                    },
                    GlyphCacheKey {
                        glyph_id: gid.0,
                        scale_bits: size.to_bits(),
                    },
                ));
                pen_x += scaled.h_advance(gid);
                prev = Some(gid);
            }
            out
        };

        for (glyph, key) in &glyphs {
            if !self.glyph_cache.contains_key(key) {
                let origin = Glyph {
                    id: glyph.id,
                    scale,
                    position: point(0.0, 0.0),
                };
                if let Some(cached) = self.rasterize(origin) {
                    self.glyph_cache.insert(*key, cached);
                }
            }
        }

        let (w, h) = (pixmap.width(), pixmap.height());
        let pixels = pixmap.pixels_mut();
        for (glyph, key) in &glyphs {
            if let Some(cached) = self.glyph_cache.get(key) {
                blit_glyph(pixels, w, h, glyph, cached, color);
            }
        }
    }

    fn rasterize(&self, glyph: Glyph) -> Option<CachedGlyph> {
        let outlined = self.font.outline_glyph(glyph)?;
        let bounds = outlined.px_bounds();
        let width = bounds.width().ceil() as u32;
        let height = bounds.height().ceil() as u32;
        if width == 0 || height == 0 {
            return None;
        }
        let mut bitmap = vec![0u8; (width * height) as usize];
        outlined.draw(|x, y, cov| {
            if let Some(px) = bitmap.get_mut((y * width + x) as usize) {
                *px = (cov.clamp(0.0, 1.0) * 255.0) as u8;
            }
        });
        Some(CachedGlyph {
            bitmap,
            width,
            height,
            bearing_x: bounds.min.x.floor() as i32,
            bearing_y: bounds.min.y.floor() as i32,
        })
    }

    pub fn cached_glyphs(&self) -> usize {
        self.glyph_cache.len()
    }
}

fn blit_glyph(
    pixels: &mut [PremultipliedColorU8],
    w: u32,
    h: u32,
    glyph: &Glyph,
    cached: &CachedGlyph,
    color: Color,
) {
    let glyph_x = glyph.position.x as i32 + cached.bearing_x;
    let glyph_y = glyph.position.y as i32 + cached.bearing_y;
    let (wi, hi) = (w as i32, h as i32);

    for gy in 0..cached.height as i32 {
        let py = glyph_y + gy;
        if py < 0 || py >= hi {
            continue;
        }
        let src_row = (gy as u32 * cached.width) as usize;
        let dst_row = (py as u32 * w) as usize;

        for gx in 0..cached.width as i32 {
            let px = glyph_x + gx;
            if px < 0 || px >= wi {
                continue;
            }
            let coverage = cached.bitmap[src_row + gx as usize];
            if coverage == 0 {
                continue;
            }
            let idx = dst_row + px as usize;
            let alpha = color.alpha() * (coverage as f32 / 255.0);
            let inv = 1.0 - alpha;
            let dst = pixels[idx];

            let out_a = alpha * 255.0 + dst.alpha() as f32 * inv;
            let blend = |src: f32, dst: u8| (src * alpha * 255.0 + dst as f32 * inv).min(out_a);
            let out = PremultipliedColorU8::from_rgba(
                blend(color.red(), dst.red()) as u8,
                blend(color.green(), dst.green()) as u8,
                blend(color.blue(), dst.blue()) as u8,
                out_a as u8,
            );
            if let Some(out) = out {
                pixels[idx] = out;
            }
        }
    }
}
