// Software drawing: filled/stroked shapes and a tiny bitmap font.
// Everything draws through `Canvas`, so the same primitives paint the
// transparent glasses overlay (RGBA), the capture composite (RGB) and the
// window frame (0x00RRGGBB).

use image::{Rgb, RgbImage, Rgba, RgbaImage};

use crate::geometry::{AxisAlignedBox, Point};
use crate::types::{mix_over, pack_rgb, unpack_rgb, FrameBuffer};

pub trait Canvas {
    fn dimensions(&self) -> (i32, i32);

    /// Write one pixel; anything outside the canvas is ignored.
    fn put(&mut self, x: i32, y: i32, color: Rgba<u8>);
}

/// The overlay raster stores colours as-is (alpha included) so the compositor
/// can blend the whole layer later. Later shapes replace earlier ones.
impl Canvas for RgbaImage {
    fn dimensions(&self) -> (i32, i32) {
        (self.width() as i32, self.height() as i32)
    }

    fn put(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        self.put_pixel(x as u32, y as u32, color);
    }
}

/// Opaque targets blend each pixel with the colour's alpha.
impl Canvas for RgbImage {
    fn dimensions(&self) -> (i32, i32) {
        (self.width() as i32, self.height() as i32)
    }

    fn put(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let px = self.get_pixel_mut(x as u32, y as u32);
        *px = Rgb(mix_over(px.0, color));
    }
}

impl Canvas for FrameBuffer {
    fn dimensions(&self) -> (i32, i32) {
        (self.width as i32, self.height as i32)
    }

    fn put(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        let [r, g, b] = mix_over(unpack_rgb(self.pixels[idx]), color);
        self.pixels[idx] = pack_rgb(r, g, b);
    }
}

/// How a closed shape is painted: optional fill, optional stroke of `width`
/// pixels laid inside the shape's edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Paint {
    pub fill: Option<Rgba<u8>>,
    pub outline: Option<Rgba<u8>>,
    pub width: i32,
}

impl Paint {
    pub fn fill(color: Rgba<u8>) -> Self {
        Self {
            fill: Some(color),
            outline: None,
            width: 0,
        }
    }

    pub fn stroke(color: Rgba<u8>, width: i32) -> Self {
        Self {
            fill: None,
            outline: Some(color),
            width,
        }
    }

    pub fn with_outline(self, color: Rgba<u8>, width: i32) -> Self {
        Self {
            outline: Some(color),
            width,
            ..self
        }
    }
}

/* ---------- Shape coverage tests ---------- */

/// Inside test for the ellipse inscribed in `b`, shrunk by `inset` pixels.
fn ellipse_test(b: &AxisAlignedBox, inset: i32) -> impl Fn(i32, i32) -> bool {
    let cx = (b.x1 + b.x2) as f32 / 2.0;
    let cy = (b.y1 + b.y2) as f32 / 2.0;
    // +0.5 so the inclusive end pixels of the box are covered
    let rx = (b.x2 - b.x1) as f32 / 2.0 + 0.5 - inset as f32;
    let ry = (b.y2 - b.y1) as f32 / 2.0 + 0.5 - inset as f32;
    move |x, y| {
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let dx = (x as f32 - cx) / rx;
        let dy = (y as f32 - cy) / ry;
        dx * dx + dy * dy <= 1.0
    }
}

/// Inside test for a rounded rectangle, shrunk by `inset` pixels.
fn rounded_rect_test(b: &AxisAlignedBox, radius: i32, inset: i32) -> impl Fn(i32, i32) -> bool {
    let (x1, y1, x2, y2) = (b.x1 + inset, b.y1 + inset, b.x2 - inset, b.y2 - inset);
    let r = (radius - inset).min((x2 - x1) / 2).min((y2 - y1) / 2).max(0);
    move |x, y| {
        if x < x1 || x > x2 || y < y1 || y > y2 {
            return false;
        }
        let ccx = if x < x1 + r {
            x1 + r
        } else if x > x2 - r {
            x2 - r
        } else {
            return true;
        };
        let ccy = if y < y1 + r {
            y1 + r
        } else if y > y2 - r {
            y2 - r
        } else {
            return true;
        };
        let (dx, dy) = (x - ccx, y - ccy);
        dx * dx + dy * dy <= r * r
    }
}

/// Scan `b` (clipped to the canvas) and paint stroke/fill per pixel.
fn paint_shape<C, O, I>(c: &mut C, b: &AxisAlignedBox, outer: O, inner: I, paint: Paint)
where
    C: Canvas + ?Sized,
    O: Fn(i32, i32) -> bool,
    I: Fn(i32, i32) -> bool,
{
    let (w, h) = c.dimensions();
    let (xs, xe) = (b.x1.max(0), b.x2.min(w - 1));
    let (ys, ye) = (b.y1.max(0), b.y2.min(h - 1));
    for y in ys..=ye {
        for x in xs..=xe {
            if !outer(x, y) {
                continue;
            }
            let in_body = paint.outline.is_none() || inner(x, y);
            let color = if in_body { paint.fill } else { paint.outline };
            if let Some(color) = color {
                c.put(x, y, color);
            }
        }
    }
}

/* ---------- Public primitives ---------- */

/// Ellipse inscribed in `b`.
/// Visual: lens glass, rims, shadows and the crown are all drawn with this.
pub fn draw_ellipse<C: Canvas + ?Sized>(c: &mut C, b: &AxisAlignedBox, paint: Paint) {
    paint_shape(c, b, ellipse_test(b, 0), ellipse_test(b, paint.width), paint);
}

pub fn draw_circle<C: Canvas + ?Sized>(c: &mut C, center: Point, radius: i32, paint: Paint) {
    draw_ellipse(c, &AxisAlignedBox::around(center, radius, radius), paint);
}

/// Rectangle with quarter-circle corners of `radius` (0 = square corners).
pub fn draw_rounded_rect<C: Canvas + ?Sized>(c: &mut C, b: &AxisAlignedBox, radius: i32, paint: Paint) {
    paint_shape(
        c,
        b,
        rounded_rect_test(b, radius, 0),
        rounded_rect_test(b, radius, paint.width),
        paint,
    );
}

pub fn fill_rect<C: Canvas + ?Sized>(c: &mut C, b: &AxisAlignedBox, color: Rgba<u8>) {
    draw_rounded_rect(c, b, 0, Paint::fill(color));
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham, calling
/// `plot` for every pixel on the way.
fn bresenham(from: Point, to: Point, mut plot: impl FnMut(i32, i32)) {
    let (mut x0, mut y0, x1, y1) = (from.x, from.y, to.x, to.y);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        plot(x0, y0);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Line `width` pixels thick: a square stamp dragged along the Bresenham path.
pub fn draw_line<C: Canvas + ?Sized>(c: &mut C, from: Point, to: Point, width: i32, color: Rgba<u8>) {
    let width = width.max(1);
    let lo = -(width / 2);
    let hi = lo + width - 1;
    // Collect first so overlapping stamps do not blend twice on RGB targets.
    let mut pts = Vec::new();
    bresenham(from, to, |x, y| {
        for oy in lo..=hi {
            for ox in lo..=hi {
                pts.push((x + ox, y + oy));
            }
        }
    });
    pts.sort_unstable();
    pts.dedup();
    for (x, y) in pts {
        c.put(x, y, color);
    }
}

/// Solid triangle (edge-function fill over the bounding box).
pub fn fill_triangle<C: Canvas + ?Sized>(c: &mut C, pts: [Point; 3], color: Rgba<u8>) {
    let edge = |a: Point, b: Point, x: i32, y: i32| (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
    let [a, b, d] = pts;
    let area = edge(a, b, d.x, d.y);
    if area == 0 {
        return;
    }
    let (w, h) = c.dimensions();
    let xs = a.x.min(b.x).min(d.x).max(0);
    let xe = a.x.max(b.x).max(d.x).min(w - 1);
    let ys = a.y.min(b.y).min(d.y).max(0);
    let ye = a.y.max(b.y).max(d.y).min(h - 1);
    for y in ys..=ye {
        for x in xs..=xe {
            let (e0, e1, e2) = (edge(a, b, x, y), edge(b, d, x, y), edge(d, a, x, y));
            let inside = if area > 0 {
                e0 >= 0 && e1 >= 0 && e2 >= 0
            } else {
                e0 <= 0 && e1 <= 0 && e2 <= 0
            };
            if inside {
                c.put(x, y, color);
            }
        }
    }
}

/* ---------- 5x7 bitmap font ---------- */

pub const GLYPH_W: i32 = 5;
pub const GLYPH_H: i32 = 7;
const ADVANCE: i32 = GLYPH_W + 1;

/// Return a 5x7 glyph bitmap. Lowercase is drawn as uppercase.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b00110,0b00100,0b01000),
        '%' => g!(0b11000,0b11001,0b00010,0b00100,0b01000,0b10011,0b00011),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),
        '/' => g!(0b00000,0b00001,0b00010,0b00100,0b01000,0b10000,0b00000),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),
        '!' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00000,0b00100),
        '>' => g!(0b01000,0b00100,0b00010,0b00001,0b00010,0b00100,0b01000),
        '<' => g!(0b00010,0b00100,0b01000,0b10000,0b01000,0b00100,0b00010),

        // Arrows for the navigation card and hint
        '→' => g!(0b00000,0b00100,0b00010,0b11111,0b00010,0b00100,0b00000),
        '←' => g!(0b00000,0b00100,0b01000,0b11111,0b01000,0b00100,0b00000),
        '↑' => g!(0b00100,0b01110,0b10101,0b00100,0b00100,0b00100,0b00100),

        _ => None,
    }
}

/// Pixel width of `text` at `scale` (no trailing spacing).
pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 { 0 } else { (n * ADVANCE - 1) * scale }
}

/// Draw one glyph with each font pixel blown up to `scale`×`scale`.
fn draw_char<C: Canvas + ?Sized>(c: &mut C, x: i32, y: i32, ch: char, scale: i32, color: Rgba<u8>) {
    let Some(rows) = glyph5x7(ch) else { return };
    let shadow = Rgba([0, 0, 0, color[3]]);

    // Shadow pass first (offset by one font pixel), then the glyph itself.
    for (dx, col) in [(scale, shadow), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..GLYPH_W {
                if rowbits & (1 << (4 - rx)) == 0 {
                    continue;
                }
                let px = x + rx * scale + dx;
                let py = y + ry as i32 * scale + dx;
                for sy in 0..scale {
                    for sx in 0..scale {
                        c.put(px + sx, py + sy, col);
                    }
                }
            }
        }
    }
}

/// Draw a text string with its top-left corner at (x,y).
pub fn draw_text<C: Canvas + ?Sized>(c: &mut C, mut x: i32, y: i32, text: &str, scale: i32, color: Rgba<u8>) {
    let scale = scale.max(1);
    for ch in text.chars() {
        draw_char(c, x, y, ch, scale, color);
        x += ADVANCE * scale;
    }
}

/// Draw text centred on `anchor` (how the HUD labels are placed).
pub fn draw_text_centered<C: Canvas + ?Sized>(c: &mut C, anchor: Point, text: &str, scale: i32, color: Rgba<u8>) {
    let scale = scale.max(1);
    let x = anchor.x - text_width(text, scale) / 2;
    let y = anchor.y - GLYPH_H * scale / 2;
    draw_text(c, x, y, text, scale, color);
}
