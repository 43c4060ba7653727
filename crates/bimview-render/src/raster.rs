#![forbid(unsafe_code)]

//! Rasterization primitives.
//!
//! - [`line_cells`]: integer Bresenham, single-cell-wide and gap-free.
//! - [`fill_zone`]: circular fill bucketed into three concentric bands.
//! - [`Octant`] / [`flow_glyph`]: direction + intensity to an animated glyph.
//!
//! # Invariants
//!
//! 1. `line_cells(a, b)` and `line_cells(b, a)` visit the same cell set.
//!    The walk always starts from the lexicographically smaller endpoint
//!    and is reversed afterwards when needed, so tie-breaking never depends
//!    on direction.
//! 2. Consecutive cells of a line differ by at most one in each axis.
//! 3. Animation frames are a pure function of `(octant, intensity, frame)`.

use smallvec::SmallVec;

use crate::buffer::CharBuffer;

/// Cells visited by a line, in draw order.
pub type LineCells = SmallVec<[(i32, i32); 64]>;

/// Bresenham line from `(x0, y0)` to `(x1, y1)`, both endpoints included.
pub fn line_cells(x0: i32, y0: i32, x1: i32, y1: i32) -> LineCells {
    let reversed = (x1, y1) < (x0, y0);
    let (ax, ay, bx, by) = if reversed {
        (x1, y1, x0, y0)
    } else {
        (x0, y0, x1, y1)
    };

    let dx = (i64::from(bx) - i64::from(ax)).abs();
    let dy = -(i64::from(by) - i64::from(ay)).abs();
    let sx = if ax < bx { 1 } else { -1 };
    let sy = if ay < by { 1 } else { -1 };
    let mut err = dx + dy;

    let mut cells = LineCells::new();
    let (mut x, mut y) = (ax, ay);
    loop {
        cells.push((x, y));
        if x == bx && y == by {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    if reversed {
        cells.reverse();
    }
    cells
}

/// Draw a line with one glyph, clipping to the buffer.
///
/// Returns the number of cells actually written.
pub fn draw_line(buf: &mut CharBuffer, from: (i32, i32), to: (i32, i32), ch: char) -> usize {
    draw_line_with(buf, from, to, |_, _, _| Some(ch))
}

/// Draw a line choosing the glyph per cell.
///
/// `glyph(index, x, y)` receives the cell's position along the line; returning
/// `None` skips the cell.
pub fn draw_line_with<F>(buf: &mut CharBuffer, from: (i32, i32), to: (i32, i32), mut glyph: F) -> usize
where
    F: FnMut(usize, i32, i32) -> Option<char>,
{
    let Some((from, to)) = clip_segment(from, to, buf.width(), buf.height()) else {
        return 0;
    };
    let mut written = 0;
    for (i, (x, y)) in line_cells(from.0, from.1, to.0, to.1).into_iter().enumerate() {
        if let Some(ch) = glyph(i, x, y)
            && buf.set_signed(x, y, ch)
        {
            written += 1;
        }
    }
    written
}

/// Prepare a segment for rasterizing into a `width x height` grid.
///
/// Returns `None` when the segment lies entirely off one side. Segments
/// longer than [`MAX_LINE_SPAN`] are clipped to the grid plus a guard band;
/// shorter ones are returned unchanged so their cell sequence is exact.
pub fn clip_segment(
    from: (i32, i32),
    to: (i32, i32),
    width: u16,
    height: u16,
) -> Option<((i32, i32), (i32, i32))> {
    let (w, h) = (i32::from(width), i32::from(height));
    if (from.0 < 0 && to.0 < 0)
        || (from.1 < 0 && to.1 < 0)
        || (from.0 >= w && to.0 >= w)
        || (from.1 >= h && to.1 >= h)
    {
        return None;
    }

    let span = (i64::from(to.0) - i64::from(from.0))
        .abs()
        .max((i64::from(to.1) - i64::from(from.1)).abs());
    if span > MAX_LINE_SPAN {
        clip_to_box(from, to, -SPAN_GUARD, -SPAN_GUARD, w + SPAN_GUARD, h + SPAN_GUARD)
    } else {
        Some((from, to))
    }
}

/// Lines longer than this are clipped before rasterizing.
pub const MAX_LINE_SPAN: i64 = 1 << 14;
/// Cells kept around the buffer when clipping long lines.
const SPAN_GUARD: i32 = 64;

/// Liang-Barsky clip of a segment to `[x0, x1] x [y0, y1]`.
fn clip_to_box(
    from: (i32, i32),
    to: (i32, i32),
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
) -> Option<((i32, i32), (i32, i32))> {
    let (fx, fy) = (f64::from(from.0), f64::from(from.1));
    let dx = f64::from(to.0) - fx;
    let dy = f64::from(to.1) - fy;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let checks = [
        (-dx, fx - f64::from(x0)),
        (dx, f64::from(x1) - fx),
        (-dy, fy - f64::from(y0)),
        (dy, f64::from(y1) - fy),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| ((fx + t * dx).round() as i32, (fy + t * dy).round() as i32);
    Some((at(t0), at(t1)))
}

// ---------------------------------------------------------------------------
// Zone fill
// ---------------------------------------------------------------------------

/// Concentric distance band of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    Core,
    Mid,
    Edge,
}

impl Band {
    /// Band for a distance from the center, or `None` outside the radius.
    pub fn classify(distance: f64, radius: f64) -> Option<Self> {
        if radius.is_nan() || radius <= 0.0 || !distance.is_finite() || distance > radius {
            return None;
        }
        let t = distance / radius;
        Some(if t <= 1.0 / 3.0 {
            Self::Core
        } else if t <= 2.0 / 3.0 {
            Self::Mid
        } else {
            Self::Edge
        })
    }
}

/// Glyph per band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandGlyphs {
    pub core: char,
    pub mid: char,
    pub edge: char,
}

impl BandGlyphs {
    /// Shaded falloff (▓ ▒ ░).
    pub const SHADE: Self = Self {
        core: '▓',
        mid: '▒',
        edge: '░',
    };

    #[inline]
    pub const fn glyph(&self, band: Band) -> char {
        match band {
            Band::Core => self.core,
            Band::Mid => self.mid,
            Band::Edge => self.edge,
        }
    }
}

/// Fill a circle of `radius` cells centered on `(cx, cy)`.
///
/// Returns the number of cells written.
pub fn fill_zone(buf: &mut CharBuffer, cx: i32, cy: i32, radius: f64, glyphs: &BandGlyphs) -> usize {
    fill_zone_where(buf, cx, cy, radius, glyphs, |_| true)
}

/// Like [`fill_zone`], but only writes cells whose current content passes
/// `writable`.
pub fn fill_zone_where<F>(
    buf: &mut CharBuffer,
    cx: i32,
    cy: i32,
    radius: f64,
    glyphs: &BandGlyphs,
    mut writable: F,
) -> usize
where
    F: FnMut(char) -> bool,
{
    if !radius.is_finite() || radius <= 0.0 {
        return 0;
    }
    let r = radius.ceil() as i32;
    let lo_x = cx.saturating_sub(r).max(0);
    let hi_x = cx.saturating_add(r).min(i32::from(buf.width()) - 1);
    let lo_y = cy.saturating_sub(r).max(0);
    let hi_y = cy.saturating_add(r).min(i32::from(buf.height()) - 1);

    let mut written = 0;
    for y in lo_y..=hi_y {
        for x in lo_x..=hi_x {
            let dx = f64::from(x) - f64::from(cx);
            let dy = f64::from(y) - f64::from(cy);
            let Some(band) = Band::classify((dx * dx + dy * dy).sqrt(), radius) else {
                continue;
            };
            if buf.get(x as u16, y as u16).is_some_and(&mut writable)
                && buf.set_signed(x, y, glyphs.glyph(band))
            {
                written += 1;
            }
        }
    }
    written
}

// ---------------------------------------------------------------------------
// Direction and animation
// ---------------------------------------------------------------------------

/// One of eight compass directions in screen space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Octant {
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    North,
    NorthEast,
}

impl Octant {
    const ORDER: [Octant; 8] = [
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
        Self::North,
        Self::NorthEast,
    ];

    /// Octant of the vector `(dx, dy)`. A zero vector maps to `East`.
    pub fn from_vector(dx: f64, dy: f64) -> Self {
        if (dx == 0.0 && dy == 0.0) || !dx.is_finite() || !dy.is_finite() {
            return Self::East;
        }
        Self::from_angle(dy.atan2(dx))
    }

    /// Octant of an angle in radians (0 = east, positive = clockwise on screen).
    pub fn from_angle(radians: f64) -> Self {
        let sector = std::f64::consts::FRAC_PI_4;
        let idx = (radians / sector).round().rem_euclid(8.0) as usize;
        Self::ORDER[idx % 8]
    }

    /// Arrow glyph pointing in this direction.
    pub const fn arrow(self) -> char {
        match self {
            Self::East => '→',
            Self::SouthEast => '↘',
            Self::South => '↓',
            Self::SouthWest => '↙',
            Self::West => '←',
            Self::NorthWest => '↖',
            Self::North => '↑',
            Self::NorthEast => '↗',
        }
    }
}

/// Trailing particle glyph used between arrow frames.
pub const PARTICLE_GLYPH: char = '∙';

/// Number of frames in the animation cycle for an intensity in `[0, 1]`.
///
/// Higher intensity gets a longer cycle with more arrow frames, so strong
/// flow reads as denser movement.
pub fn cycle_len(intensity: f64) -> usize {
    if intensity >= 0.66 {
        4
    } else if intensity >= 0.33 {
        3
    } else {
        2
    }
}

/// Animated flow glyph: `frame` is a monotonically increasing counter.
pub fn flow_glyph(octant: Octant, intensity: f64, frame: u64) -> char {
    let len = cycle_len(intensity);
    let phase = (frame % len as u64) as usize;
    // Trailing frame is always the particle; the rest are arrows.
    if phase + 1 == len {
        PARTICLE_GLYPH
    } else {
        octant.arrow()
    }
}

/// Block glyph for a level in `[0, 1]` (node energy, impact).
pub fn intensity_glyph(level: f64) -> char {
    if !level.is_finite() || level <= 0.0 {
        ' '
    } else if level < 0.25 {
        '░'
    } else if level < 0.5 {
        '▒'
    } else if level < 0.75 {
        '▓'
    } else {
        '█'
    }
}
