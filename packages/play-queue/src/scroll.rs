//! Scroll geometry rules for the queue list

/// Rows held before scroll-to-current is attempted
const MIN_ROWS_FOR_SCROLL: usize = 5;

/// Rows shown above the current track after scrolling to it
const CURRENT_ROW_LEAD: usize = 3;

/// Pointer band at the top of the viewport that scrolls up while dragging
pub const DRAG_TOP_BAND: f64 = 110.0;

/// Pointer band at the bottom of the viewport that scrolls down while dragging
pub const DRAG_BOTTOM_BAND: f64 = 70.0;

/// Pixels moved per drag auto-scroll tick
pub const DRAG_STEP: f64 = 5.0;

/// Scroll geometry reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl ScrollMetrics {
    /// Whether the visible region reaches within `threshold` px of the end
    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.scroll_top + self.viewport_height >= self.content_height - threshold
    }
}

/// Scroll step for a pointer at `pointer_y` while dragging, if any
pub fn drag_scroll_step(pointer_y: f64, viewport_height: f64) -> Option<f64> {
    if pointer_y < DRAG_TOP_BAND {
        Some(-DRAG_STEP)
    } else if pointer_y > viewport_height - DRAG_BOTTOM_BAND {
        Some(DRAG_STEP)
    } else {
        None
    }
}

/// Row to bring into view so the current track sits a few rows down
pub fn current_row_target(current_index: usize, held: usize) -> Option<usize> {
    if held > MIN_ROWS_FOR_SCROLL && current_index <= held {
        Some(current_index.saturating_sub(CURRENT_ROW_LEAD))
    } else {
        None
    }
}

/// Per-instance scroll bookkeeping
#[derive(Debug, Clone)]
pub struct ScrollState {
    /// Offset remembered when leaving the queue route
    pub previous_pos: Option<f64>,
    pub is_visible: bool,
    /// A scroll-to-current was requested while hidden
    pub auto_scroll_required: bool,
    /// Last offset reported by the host
    pub last_top: f64,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            previous_pos: None,
            is_visible: true,
            auto_scroll_required: false,
            last_top: 0.0,
        }
    }
}

impl ScrollState {
    /// Resolve a scroll-to-current request; remembers it when hidden
    pub fn scroll_to_current(&mut self, current_index: Option<usize>, held: usize) -> Option<usize> {
        self.auto_scroll_required = false;
        let target = current_index.and_then(|index| current_row_target(index, held))?;
        if self.is_visible {
            Some(target)
        } else {
            self.auto_scroll_required = true;
            None
        }
    }
}
