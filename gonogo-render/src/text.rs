use std::collections::HashMap;
use std::sync::Arc;

use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};
use gonogo_cache::Atom;
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};

/// Rasterize a single line of text into a tightly-bounded, premultiplied
/// pixmap. Layout is baseline-at-ascent with kerning applied.
pub fn render_text_pixmap(text: &str, font_size: f32, font: &FontArc, color: Color) -> Pixmap {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    // Union pixel bounds across the outlined glyphs.
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for g in &glyphs {
        if let Some(out) = font.outline_glyph(g.clone()) {
            let b = out.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
        }
    }

    // Whitespace-only input has no outlines.
    if min_x == f32::INFINITY {
        return Pixmap::new(1, 1).expect("pixmap");
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h).expect("pixmap");

    let stride = pm.width() as usize;
    let dst = pm.pixels_mut();
    let (cr, cg, cb, ca) = (color.red(), color.green(), color.blue(), color.alpha());

    for g in &glyphs {
        if let Some(out) = font.outline_glyph(g.clone()) {
            let b = out.px_bounds();
            out.draw(|x, y, cov| {
                let a = (cov * ca).clamp(0.0, 1.0);
                if a <= f32::EPSILON {
                    return;
                }
                let ix = (x as f32 + b.min.x - min_x).floor() as i32;
                let iy = (y as f32 + b.min.y - min_y).floor() as i32;
                if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                    return;
                }
                let i = iy as usize * stride + ix as usize;
                let px = PremultipliedColorU8::from_rgba(
                    (cr * a * 255.0) as u8,
                    (cg * a * 255.0) as u8,
                    (cb * a * 255.0) as u8,
                    (a * 255.0) as u8,
                );
                // Neighboring glyph boxes can overlap after kerning; keep
                // the denser coverage.
                if let Some(px) = px {
                    if px.alpha() > dst[i].alpha() {
                        dst[i] = px;
                    }
                }
            });
        }
    }

    pm
}

/// Cache of rendered text pixmaps keyed by interned label.
pub struct TextCache {
    font: FontArc,
    size_px: f32,
    map: HashMap<Atom, Arc<Pixmap>>,
}

impl TextCache {
    pub fn new(font: FontArc, size_px: f32) -> Self {
        Self {
            font,
            size_px,
            map: HashMap::new(),
        }
    }

    pub fn get_or_render(&mut self, atom: Atom) -> Arc<Pixmap> {
        if let Some(p) = self.map.get(&atom) {
            return Arc::clone(p);
        }
        let pm = Arc::new(render_text_pixmap(
            atom.as_ref(),
            self.size_px,
            &self.font,
            Color::from_rgba8(255, 255, 255, 255),
        ));
        self.map.insert(atom, Arc::clone(&pm));
        pm
    }
}
