#![forbid(unsafe_code)]

//! Character buffer: the shared 2-D grid every layer writes into.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height`, row-major.
//! 2. Writes outside `[0, width) x [0, height)` are dropped silently.
//! 3. A double-width glyph occupies its cell plus a [`CONTINUATION`] cell to
//!    the right. Overwriting either half clears the other half, so output
//!    lines keep their column alignment.

use std::fmt;

use bimview_core::geometry::Region;
use unicode_width::UnicodeWidthChar;

/// Empty cell content.
pub const BLANK: char = ' ';

/// Marker stored in the trailing cell of a double-width glyph.
pub const CONTINUATION: char = '\0';

/// A fixed-size grid of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharBuffer {
    width: u16,
    height: u16,
    cells: Vec<char>,
}

impl CharBuffer {
    /// Create a blank buffer.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![BLANK; width as usize * height as usize],
        }
    }

    /// Buffer width.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Region covering the whole buffer.
    #[inline]
    pub const fn region(&self) -> Region {
        Region::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    #[inline]
    fn signed_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x > i32::from(u16::MAX) || y > i32::from(u16::MAX) {
            return None;
        }
        self.index(x as u16, y as u16)
    }

    /// Character at `(x, y)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<char> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Whether `(x, y)` is in bounds and blank.
    #[inline]
    pub fn is_blank(&self, x: u16, y: u16) -> bool {
        self.get(x, y) == Some(BLANK)
    }

    /// Write a character. Returns `false` when the cell was clipped.
    pub fn set(&mut self, x: u16, y: u16, ch: char) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        self.clear_overlap(x, y, idx);
        match ch.width() {
            Some(0) => true,
            Some(2) => {
                if let Some(tail) = self.index(x.saturating_add(1), y)
                    && tail != idx
                {
                    self.clear_overlap(x + 1, y, tail);
                    self.cells[idx] = ch;
                    self.cells[tail] = CONTINUATION;
                } else {
                    // No room for the second half at the right edge.
                    self.cells[idx] = BLANK;
                }
                true
            }
            _ => {
                self.cells[idx] = ch;
                true
            }
        }
    }

    /// Write a character at a signed position (clipped when negative).
    #[inline]
    pub fn set_signed(&mut self, x: i32, y: i32, ch: char) -> bool {
        if self.signed_index(x, y).is_none() {
            return false;
        }
        self.set(x as u16, y as u16, ch)
    }

    /// Clear the other half of any wide glyph touching `(x, y)`.
    fn clear_overlap(&mut self, x: u16, y: u16, idx: usize) {
        if self.cells[idx] == CONTINUATION && x > 0 {
            self.cells[idx - 1] = BLANK;
        }
        if let Some(next) = self.index(x.saturating_add(1), y)
            && next != idx
            && self.cells[next] == CONTINUATION
        {
            self.cells[next] = BLANK;
        }
        self.cells[idx] = BLANK;
    }

    /// Print a string starting at a signed position, clipping per character.
    ///
    /// Returns the number of columns advanced.
    pub fn print_text(&mut self, x: i32, y: i32, text: &str) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as i32;
            if w == 0 {
                continue;
            }
            self.set_signed(col, y, ch);
            col = col.saturating_add(w);
        }
        (i64::from(col) - i64::from(x)).clamp(0, i64::from(u16::MAX)) as u16
    }

    /// Fill a region (clipped) with one character.
    pub fn fill(&mut self, region: Region, ch: char) {
        let Some(clip) = region.intersection_opt(&self.region()) else {
            return;
        };
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                self.set(x, y, ch);
            }
        }
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// Resize, discarding content when the dimensions change.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }

    /// Copy the cells of `region` from `src` (same-size buffers only).
    pub fn copy_region_from(&mut self, src: &CharBuffer, region: Region) {
        if src.width != self.width || src.height != self.height {
            return;
        }
        let Some(clip) = region.intersection_opt(&self.region()) else {
            return;
        };
        for y in clip.y..clip.bottom() {
            let start = y as usize * self.width as usize + clip.x as usize;
            let end = start + clip.width as usize;
            self.cells[start..end].copy_from_slice(&src.cells[start..end]);
        }
    }

    /// Row `y` as raw cells.
    pub fn row(&self, y: u16) -> Option<&[char]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        Some(&self.cells[start..start + self.width as usize])
    }

    /// Row `y` as text, continuation cells removed and trailing blanks trimmed.
    pub fn line(&self, y: u16) -> String {
        let Some(row) = self.row(y) else {
            return String::new();
        };
        let text: String = row.iter().filter(|&&c| c != CONTINUATION).collect();
        text.trim_end().to_string()
    }

    /// All rows as text.
    pub fn lines(&self) -> Vec<String> {
        (0..self.height).map(|y| self.line(y)).collect()
    }

    /// Count cells holding `ch`.
    pub fn count(&self, ch: char) -> usize {
        self.cells.iter().filter(|&&c| c == ch).count()
    }
}

impl fmt::Display for CharBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            if y > 0 {
                f.write_str("\n")?;
            }
            f.write_str(&self.line(y))?;
        }
        Ok(())
    }
}
