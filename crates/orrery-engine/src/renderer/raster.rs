//! CPU surface over an `image::RgbaImage`.
//!
//! Paths are tessellated with lyon (as the GPU vector pass does) and every
//! draw call is rasterized into a coverage mask first, then blended once with
//! source-over. Overlapping triangles of one stroke never double-blend.

use glam::Vec2;
use image::{Rgba as Pixel, RgbaImage};
use lyon::math::{point, vector, Angle};
use lyon::path::{Path, Winding};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};

use crate::api::types::Rgba;
use crate::renderer::camera::Viewport;
use crate::renderer::traits::{Ellipse, RadialGradient, Surface};

/// Tessellation tolerance in physical pixels.
const TOLERANCE: f32 = 0.5;
/// Ellipse radii at or below this (logical pixels) are treated as collapsed.
const DEGENERATE_RADIUS: f32 = 1e-3;

/// Emits physical-pixel positions.
struct PositionCtor;

impl FillVertexConstructor<Vec2> for PositionCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> Vec2 {
        Vec2::new(vertex.position().x, vertex.position().y)
    }
}

impl StrokeVertexConstructor<Vec2> for PositionCtor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> Vec2 {
        Vec2::new(vertex.position().x, vertex.position().y)
    }
}

pub struct RasterSurface {
    image: RgbaImage,
    /// Physical pixels per logical pixel.
    scale: f32,
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<Vec2, u32>,
}

impl RasterSurface {
    /// A transparent surface of `width × height` physical pixels.
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            scale: if scale.is_finite() && scale > 0.0 { scale } else { 1.0 },
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
        }
    }

    /// Sized to the viewport's physical resolution.
    pub fn for_viewport(viewport: &Viewport) -> Self {
        let (w, h) = viewport.pixel_size();
        Self::new(w, h, viewport.device_pixel_ratio())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn px(&self, p: Vec2) -> lyon::math::Point {
        point(p.x * self.scale, p.y * self.scale)
    }

    fn add_ellipse(&self, builder: &mut lyon::path::path::Builder, e: &Ellipse) {
        builder.add_ellipse(
            self.px(e.center),
            vector(e.radii.x * self.scale, e.radii.y * self.scale),
            Angle::radians(e.rotation),
            Winding::Positive,
        );
    }

    fn fill_path(&mut self, path: &Path, rule: FillRule, color: Rgba) {
        let result = self.fill_tess.tessellate_path(
            path,
            &FillOptions::tolerance(TOLERANCE).with_fill_rule(rule),
            &mut BuffersBuilder::new(&mut self.geometry, PositionCtor),
        );
        match result {
            Ok(()) => self.flush(color),
            Err(e) => {
                log::debug!("fill tessellation failed: {:?}", e);
                self.discard();
            }
        }
    }

    fn stroke_path(&mut self, path: &Path, width: f32, color: Rgba) {
        let result = self.stroke_tess.tessellate_path(
            path,
            &StrokeOptions::tolerance(TOLERANCE).with_line_width(width * self.scale),
            &mut BuffersBuilder::new(&mut self.geometry, PositionCtor),
        );
        match result {
            Ok(()) => self.flush(color),
            Err(e) => {
                log::debug!("stroke tessellation failed: {:?}", e);
                self.discard();
            }
        }
    }

    /// Rasterize the pending triangles and blend them as one shape.
    fn flush(&mut self, color: Rgba) {
        let coverage = Coverage::from_triangles(
            &self.geometry.vertices,
            &self.geometry.indices,
            self.image.width(),
            self.image.height(),
        );
        self.discard();
        if let Some(coverage) = coverage {
            coverage.blend_into(&mut self.image, color);
        }
    }

    fn discard(&mut self) {
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
    }
}

impl Surface for RasterSurface {
    fn is_ready(&self) -> bool {
        self.image.width() > 0 && self.image.height() > 0
    }

    fn clear(&mut self, color: Rgba) {
        let px = Pixel(color.to_rgba8());
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, color: Rgba) {
        if points.len() < 2 || width <= 0.0 {
            return;
        }
        let mut builder = Path::builder();
        builder.begin(self.px(points[0]));
        for p in &points[1..] {
            builder.line_to(self.px(*p));
        }
        builder.end(closed);
        let path = builder.build();
        self.stroke_path(&path, width, color);
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, gradient: &RadialGradient) {
        if !(radius > 0.0) {
            return;
        }
        let c = center * self.scale;
        let r = radius * self.scale;
        let Some(bounds) = PixelRect::covering(c - Vec2::splat(r), c + Vec2::splat(r), &self.image)
        else {
            return;
        };
        let r2 = r * r;
        for y in bounds.y0..bounds.y1 {
            for x in bounds.x0..bounds.x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if p.distance_squared(c) > r2 {
                    continue;
                }
                let color = gradient.sample(gradient.t_at(p / self.scale));
                blend(self.image.get_pixel_mut(x, y), color);
            }
        }
    }

    fn fill_annulus(&mut self, outer: &Ellipse, inner: &Ellipse, color: Rgba) {
        // Edge-on rings have no area.
        if !(outer.minor() > DEGENERATE_RADIUS) {
            return;
        }
        let mut builder = Path::builder();
        self.add_ellipse(&mut builder, outer);
        if inner.minor() > DEGENERATE_RADIUS {
            self.add_ellipse(&mut builder, inner);
        }
        let path = builder.build();
        self.fill_path(&path, FillRule::EvenOdd, color);
    }

    fn stroke_ellipse(&mut self, ellipse: &Ellipse, width: f32, color: Rgba) {
        if !(ellipse.major() > 0.0) || width <= 0.0 {
            return;
        }
        if ellipse.minor() <= DEGENERATE_RADIUS {
            // Collapsed to its major axis.
            let ends = ellipse.points(2);
            self.stroke_polyline(&ends, false, width, color);
            return;
        }
        let mut builder = Path::builder();
        self.add_ellipse(&mut builder, ellipse);
        let path = builder.build();
        self.stroke_path(&path, width, color);
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, size: f32, color: Rgba) {
        if text.is_empty() || !(size > 0.0) {
            return;
        }
        // Glyph rows span the font size; one dot per row.
        let dot = size * self.scale / GLYPH_ROWS as f32;
        let origin = pos * self.scale;
        let advance = dot * (GLYPH_COLS + 1) as f32;
        let width = advance * text.chars().count() as f32;
        let Some(bounds) =
            PixelRect::covering(origin, origin + Vec2::new(width, size * self.scale), &self.image)
        else {
            return;
        };
        let mut coverage = Coverage::new(bounds);
        for (i, ch) in text.chars().enumerate() {
            let cell = origin + Vec2::new(advance * i as f32, 0.0);
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_COLS {
                    if bits & (1 << (GLYPH_COLS - 1 - col)) != 0 {
                        let min = cell + Vec2::new(col as f32, row as f32) * dot;
                        coverage.fill_rect(min, min + Vec2::splat(dot));
                    }
                }
            }
        }
        coverage.blend_into(&mut self.image, color);
    }
}

// ── Coverage ─────────────────────────────────────────────────────────

/// Half-open pixel rectangle inside an image.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PixelRect {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl PixelRect {
    /// Pixels touched by the float rectangle `[min, max]`, clipped to `image`.
    fn covering(min: Vec2, max: Vec2, image: &RgbaImage) -> Option<Self> {
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(image.width());
        let y1 = (max.y.ceil().max(0.0) as u32).min(image.height());
        (x0 < x1 && y0 < y1).then_some(Self { x0, y0, x1, y1 })
    }

    fn width(&self) -> u32 {
        self.x1 - self.x0
    }
}

/// Per-pixel coverage of one shape over a rectangle.
struct Coverage {
    rect: PixelRect,
    bits: Vec<bool>,
}

impl Coverage {
    fn new(rect: PixelRect) -> Self {
        let len = (rect.width() * (rect.y1 - rect.y0)) as usize;
        Self {
            rect,
            bits: vec![false; len],
        }
    }

    fn from_triangles(
        vertices: &[Vec2],
        indices: &[u32],
        width: u32,
        height: u32,
    ) -> Option<Self> {
        if vertices.is_empty() || indices.len() < 3 {
            return None;
        }
        let (min, max) = vertices.iter().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(lo, hi), v| (lo.min(*v), hi.max(*v)),
        );
        let x1 = (max.x.ceil().max(0.0) as u32).min(width);
        let y1 = (max.y.ceil().max(0.0) as u32).min(height);
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        let mut coverage = Self::new(PixelRect { x0, y0, x1, y1 });
        for tri in indices.chunks_exact(3) {
            let v = |i: u32| vertices.get(i as usize).copied();
            if let (Some(a), Some(b), Some(c)) = (v(tri[0]), v(tri[1]), v(tri[2])) {
                coverage.fill_triangle(a, b, c);
            }
        }
        Some(coverage)
    }

    fn mark(&mut self, x: u32, y: u32) {
        let i = ((y - self.rect.y0) * self.rect.width() + (x - self.rect.x0)) as usize;
        self.bits[i] = true;
    }

    /// Pixel range `[lo, hi)` whose centers may fall inside `[min, max]`,
    /// clipped to `[clip_lo, clip_hi)`.
    fn span(min: f32, max: f32, clip_lo: u32, clip_hi: u32) -> (u32, u32) {
        let lo = (min - 0.5).ceil().max(clip_lo as f32) as u32;
        let hi = ((max - 0.5).floor() + 1.0).max(0.0) as u32;
        (lo, hi.min(clip_hi))
    }

    /// Marks pixels whose centers lie inside the triangle.
    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) {
        let area = edge(a, b, c);
        if area.abs() < 1e-6 {
            return;
        }
        let (b, c) = if area < 0.0 { (c, b) } else { (b, c) };

        let min = a.min(b).min(c);
        let max = a.max(b).max(c);
        let (xs, xe) = Self::span(min.x, max.x, self.rect.x0, self.rect.x1);
        let (ys, ye) = Self::span(min.y, max.y, self.rect.y0, self.rect.y1);
        for y in ys..ye {
            for x in xs..xe {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if edge(a, b, p) >= 0.0 && edge(b, c, p) >= 0.0 && edge(c, a, p) >= 0.0 {
                    self.mark(x, y);
                }
            }
        }
    }

    /// Marks pixels whose centers lie inside the axis-aligned rectangle.
    fn fill_rect(&mut self, min: Vec2, max: Vec2) {
        let (xs, xe) = Self::span(min.x, max.x, self.rect.x0, self.rect.x1);
        let (ys, ye) = Self::span(min.y, max.y, self.rect.y0, self.rect.y1);
        for y in ys..ye {
            for x in xs..xe {
                self.mark(x, y);
            }
        }
    }

    fn blend_into(&self, image: &mut RgbaImage, color: Rgba) {
        let w = self.rect.width();
        for (i, covered) in self.bits.iter().enumerate() {
            if *covered {
                let x = self.rect.x0 + i as u32 % w;
                let y = self.rect.y0 + i as u32 / w;
                blend(image.get_pixel_mut(x, y), color);
            }
        }
    }
}

/// Twice the signed area of (a, b, p); positive when p is left of a→b in
/// y-down screen space.
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Source-over with straight (non-premultiplied) alpha.
fn blend(dst: &mut Pixel<u8>, src: Rgba) {
    let sa = src.a.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let [dr, dg, db, da] = dst.0.map(|c| c as f32 / 255.0);
    let out_a = sa + da * (1.0 - sa);
    let channel = |s: f32, d: f32| (s.clamp(0.0, 1.0) * sa + d * da * (1.0 - sa)) / out_a;
    *dst = Pixel(
        Rgba::new(
            channel(src.r, dr),
            channel(src.g, dg),
            channel(src.b, db),
            out_a,
        )
        .to_rgba8(),
    );
}

// ── Bitmap font ──────────────────────────────────────────────────────

const GLYPH_COLS: usize = 5;
const GLYPH_ROWS: usize = 7;

/// 5×7 glyph rows, most significant of the low five bits is the left column.
/// Lowercase renders as uppercase; unknown characters render as a box.
fn glyph(ch: char) -> [u8; GLYPH_ROWS] {
    match ch.to_ascii_uppercase() {
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '/' => [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        _ => [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F],
    }
}
