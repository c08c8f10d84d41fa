//! Row virtualization.
//!
//! Only the rows intersecting the viewport, plus an overscan margin on each
//! side, are ever materialized. Everything else is represented by the total
//! content height and the offset of the first materialized row.

use std::collections::HashMap;

/// Default number of extra rows rendered beyond each viewport edge
pub const DEFAULT_OVERSCAN: usize = 10;

/// The contiguous range of rows to materialize
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    /// First materialized row, overscan included
    pub start: usize,
    /// Last materialized row (inclusive), overscan included
    pub end: usize,
    /// First row intersecting the viewport
    pub first_visible: usize,
    /// Last row intersecting the viewport
    pub last_visible: usize,
    /// Height of all rows together
    pub total_height: u64,
    /// Vertical position of row `start`
    #[allow(dead_code)]
    pub offset_of_start: u64,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_visible(&self, index: usize) -> bool {
        (self.first_visible..=self.last_visible).contains(&index)
    }
}

/// Window over rows of the given heights, or `None` when there are no rows
#[allow(dead_code)]
pub fn compute_window(
    scroll_offset: u64,
    viewport_height: u64,
    row_heights: &[u32],
    overscan: usize,
) -> Option<Window> {
    let offsets = prefix_offsets(row_heights.len(), |i| row_heights[i]);
    window_from_offsets(&offsets, scroll_offset, viewport_height, overscan)
}

/// `offsets[i]` is where row `i` starts; the final entry is the total height
fn prefix_offsets(count: usize, height: impl Fn(usize) -> u32) -> Vec<u64> {
    let mut offsets = Vec::with_capacity(count + 1);
    let mut acc = 0u64;
    offsets.push(acc);
    for i in 0..count {
        acc += height(i) as u64;
        offsets.push(acc);
    }
    offsets
}

fn window_from_offsets(
    offsets: &[u64],
    scroll_offset: u64,
    viewport_height: u64,
    overscan: usize,
) -> Option<Window> {
    let count = offsets.len().checked_sub(1).filter(|&n| n > 0)?;
    let total_height = offsets[count];
    let row_starts = &offsets[..count];

    let first_visible = row_starts
        .partition_point(|&o| o <= scroll_offset)
        .saturating_sub(1)
        .min(count - 1);
    let viewport_end = scroll_offset.saturating_add(viewport_height);
    let last_visible = row_starts
        .partition_point(|&o| o < viewport_end)
        .saturating_sub(1)
        .clamp(first_visible, count - 1);

    let start = first_visible.saturating_sub(overscan);
    let end = (last_visible + overscan).min(count - 1);

    Some(Window {
        start,
        end,
        first_visible,
        last_visible,
        total_height,
        offset_of_start: offsets[start],
    })
}

/// Tracks row heights for a list of `count` rows.
///
/// Unmeasured rows use the estimated height. Measured heights are cached
/// and refine subsequent windows.
#[derive(Debug)]
pub struct Virtualizer {
    count: usize,
    estimate: u32,
    overscan: usize,
    measured: HashMap<usize, u32>,
    offsets: Vec<u64>,
    dirty: bool,
}

impl Virtualizer {
    pub fn new(estimate: u32, overscan: usize) -> Self {
        Self {
            count: 0,
            estimate: estimate.max(1),
            overscan,
            measured: HashMap::new(),
            offsets: vec![0],
            dirty: false,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn set_count(&mut self, count: usize) {
        if self.count != count {
            self.count = count;
            self.measured.retain(|&i, _| i < count);
            self.dirty = true;
        }
    }

    /// Record the rendered height of row `index`
    pub fn measure(&mut self, index: usize, height: u32) {
        if index >= self.count {
            return;
        }
        if self.row_height(index) != height {
            self.measured.insert(index, height);
            self.dirty = true;
        }
    }

    /// Forget all measurements, e.g. after the rows were reordered
    pub fn reset_measurements(&mut self) {
        if !self.measured.is_empty() {
            self.measured.clear();
            self.dirty = true;
        }
    }

    pub fn row_height(&self, index: usize) -> u32 {
        self.measured.get(&index).copied().unwrap_or(self.estimate)
    }

    fn offsets(&mut self) -> &[u64] {
        if self.dirty {
            let estimate = self.estimate;
            let measured = &self.measured;
            self.offsets = prefix_offsets(self.count, |i| {
                measured.get(&i).copied().unwrap_or(estimate)
            });
            self.dirty = false;
        }
        &self.offsets
    }

    pub fn total_height(&mut self) -> u64 {
        self.offsets().last().copied().unwrap_or(0)
    }

    /// Where row `index` starts
    pub fn row_offset(&mut self, index: usize) -> u64 {
        let offsets = self.offsets();
        offsets[index.min(offsets.len() - 1)]
    }

    /// Largest scroll offset that still fills the viewport
    pub fn max_scroll(&mut self, viewport_height: u64) -> u64 {
        self.total_height().saturating_sub(viewport_height)
    }

    pub fn window(&mut self, scroll_offset: u64, viewport_height: u64) -> Option<Window> {
        let overscan = self.overscan;
        window_from_offsets(self.offsets(), scroll_offset, viewport_height, overscan)
    }

    /// Smallest scroll change from `scroll_offset` that brings row `index`
    /// fully into view
    pub fn scroll_to_index(&mut self, index: usize, scroll_offset: u64, viewport_height: u64) -> u64 {
        if index >= self.count {
            return scroll_offset;
        }
        let start = self.row_offset(index);
        let end = start + self.row_height(index) as u64;
        if start < scroll_offset {
            start
        } else if end > scroll_offset + viewport_height {
            end.saturating_sub(viewport_height).min(start)
        } else {
            scroll_offset
        }
    }

    /// Row containing the vertical position `offset`
    pub fn index_at(&mut self, offset: u64) -> Option<usize> {
        let count = self.count;
        if count == 0 {
            return None;
        }
        let offsets = self.offsets();
        if offset >= offsets[count] {
            return None;
        }
        Some(offsets[..count].partition_point(|&o| o <= offset) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_has_no_window() {
        assert_eq!(compute_window(0, 500, &[], DEFAULT_OVERSCAN), None);
        let mut v = Virtualizer::new(1, 10);
        assert_eq!(v.window(0, 20), None);
        assert_eq!(v.total_height(), 0);
    }

    #[test]
    fn test_window_at_top() {
        let heights = vec![35; 1000];
        let w = compute_window(0, 350, &heights, 10).unwrap();
        assert_eq!(w.first_visible, 0);
        assert_eq!(w.last_visible, 9);
        assert_eq!(w.start, 0);
        assert_eq!(w.end, 19);
        assert_eq!(w.total_height, 35_000);
        assert_eq!(w.offset_of_start, 0);
    }

    #[test]
    fn test_window_mid_scroll() {
        let heights = vec![35; 1000];
        // Scrolled half way into row 100
        let w = compute_window(100 * 35 + 17, 350, &heights, 10).unwrap();
        assert_eq!(w.first_visible, 100);
        assert_eq!(w.last_visible, 110);
        assert_eq!(w.start, 90);
        assert_eq!(w.end, 120);
        assert_eq!(w.offset_of_start, 90 * 35);
    }

    #[test]
    fn test_window_clamped_at_bottom() {
        let heights = vec![35; 50];
        let w = compute_window(45 * 35, 350, &heights, 10).unwrap();
        assert_eq!(w.last_visible, 49);
        assert_eq!(w.end, 49);
        assert_eq!(w.start, 35);
    }

    #[test]
    fn test_window_scrolled_past_end() {
        let heights = vec![1; 5];
        let w = compute_window(100, 10, &heights, 2).unwrap();
        assert_eq!(w.first_visible, 4);
        assert_eq!(w.last_visible, 4);
        assert_eq!(w.start, 2);
        assert_eq!(w.end, 4);
    }

    #[test]
    fn test_window_size_bounded_for_any_offset() {
        let heights = vec![35; 10_000];
        let viewport = 700;
        let visible_rows = (viewport / 35) as usize + 1;
        let overscan = 10;
        for scroll in (0..10_000u64 * 35).step_by(997) {
            let w = compute_window(scroll, viewport, &heights, overscan).unwrap();
            assert!(w.len() <= visible_rows + 2 * overscan);
            assert!(w.offset_of_start <= scroll);
            assert!(w.start <= w.first_visible && w.last_visible <= w.end);
            let first_row_end = (w.first_visible as u64 + 1) * 35;
            assert!(first_row_end > scroll || w.first_visible == 9_999);
        }
    }

    #[test]
    fn test_variable_heights() {
        let heights = [1, 3, 1, 1, 2];
        let w = compute_window(2, 2, &heights, 0).unwrap();
        assert_eq!((w.first_visible, w.last_visible), (1, 1));
        let w = compute_window(3, 3, &heights, 1).unwrap();
        assert_eq!((w.first_visible, w.last_visible), (1, 3));
        assert_eq!((w.start, w.end), (0, 4));
        assert_eq!(w.total_height, 8);
    }

    #[test]
    fn test_measurements_refine_window() {
        let mut v = Virtualizer::new(1, 0);
        v.set_count(100);
        assert_eq!(v.total_height(), 100);
        let w = v.window(0, 10).unwrap();
        assert_eq!(w.last_visible, 9);

        for i in 0..5 {
            v.measure(i, 2);
        }
        assert_eq!(v.total_height(), 105);
        let w = v.window(0, 10).unwrap();
        assert_eq!(w.last_visible, 4);
        assert_eq!(v.row_offset(6), 11);

        v.reset_measurements();
        assert_eq!(v.total_height(), 100);
    }

    #[test]
    fn test_set_count_drops_stale_measurements() {
        let mut v = Virtualizer::new(1, 0);
        v.set_count(10);
        v.measure(8, 4);
        v.set_count(5);
        v.set_count(10);
        assert_eq!(v.row_height(8), 1);
        assert_eq!(v.total_height(), 10);
    }

    #[test]
    fn test_scroll_to_index() {
        let mut v = Virtualizer::new(1, 0);
        v.set_count(100);
        assert_eq!(v.scroll_to_index(5, 0, 10), 0);
        assert_eq!(v.scroll_to_index(15, 0, 10), 6);
        assert_eq!(v.scroll_to_index(3, 20, 10), 3);
        v.measure(15, 3);
        assert_eq!(v.scroll_to_index(15, 0, 10), 8);
        // Taller than the viewport: align the top
        v.measure(40, 30);
        assert_eq!(v.scroll_to_index(40, 0, 10), v.row_offset(40));
    }

    #[test]
    fn test_index_at() {
        let mut v = Virtualizer::new(1, 0);
        v.set_count(3);
        v.measure(1, 2);
        assert_eq!(v.index_at(0), Some(0));
        assert_eq!(v.index_at(1), Some(1));
        assert_eq!(v.index_at(2), Some(1));
        assert_eq!(v.index_at(3), Some(2));
        assert_eq!(v.index_at(4), None);
    }

    #[test]
    fn test_max_scroll() {
        let mut v = Virtualizer::new(1, 10);
        v.set_count(30);
        assert_eq!(v.max_scroll(10), 20);
        assert_eq!(v.max_scroll(50), 0);
    }
}
