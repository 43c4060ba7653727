#![forbid(unsafe_code)]

//! Dirty-region tracking for incremental redraw.
//!
//! Layers report the screen regions they changed; the tracker accumulates
//! them between frames and hands back a merged, clipped, non-overlapping
//! set on [`DirtyTracker::take`].

use bimview_core::geometry::Region;

use crate::compositor::merge_regions;

/// Accumulates dirty regions between frames.
///
/// A fresh tracker starts fully dirty so the first frame is complete.
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    regions: Vec<Region>,
    full: bool,
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            full: true,
        }
    }

    /// Mark a region as needing redraw. Empty regions are ignored.
    pub fn mark(&mut self, region: Region) {
        if !self.full && !region.is_empty() {
            self.regions.push(region);
        }
    }

    /// Mark the whole screen as needing redraw.
    pub fn mark_all(&mut self) {
        self.full = true;
        self.regions.clear();
    }

    /// Whether anything is pending.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.full || !self.regions.is_empty()
    }

    /// Whether the next `take` covers the full screen.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Drain pending regions, clipped to `screen` and merged so none overlap.
    pub fn take(&mut self, screen: Region) -> Vec<Region> {
        if std::mem::take(&mut self.full) {
            self.regions.clear();
            return if screen.is_empty() { Vec::new() } else { vec![screen] };
        }
        let clipped: Vec<Region> = self
            .regions
            .drain(..)
            .filter_map(|r| r.intersection_opt(&screen))
            .collect();
        merge_regions(&clipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Region = Region::from_size(40, 10);

    #[test]
    fn first_take_is_full_screen() {
        let mut t = DirtyTracker::new();
        assert_eq!(t.take(SCREEN), vec![SCREEN]);
        assert!(!t.is_dirty());
        assert!(t.take(SCREEN).is_empty());
    }

    #[test]
    fn regions_are_clipped_and_merged() {
        let mut t = DirtyTracker::new();
        t.take(SCREEN);
        t.mark(Region::new(0, 0, 3, 3));
        t.mark(Region::new(2, 2, 3, 3));
        t.mark(Region::new(38, 8, 10, 10));
        t.mark(Region::new(100, 100, 1, 1));
        let mut got = t.take(SCREEN);
        got.sort_by_key(|r| (r.x, r.y));
        assert_eq!(got, vec![Region::new(0, 0, 5, 5), Region::new(38, 8, 2, 2)]);
    }

    #[test]
    fn mark_all_supersedes_regions() {
        let mut t = DirtyTracker::new();
        t.take(SCREEN);
        t.mark(Region::new(1, 1, 1, 1));
        t.mark_all();
        assert!(t.is_full());
        assert_eq!(t.take(SCREEN), vec![SCREEN]);
    }
}
