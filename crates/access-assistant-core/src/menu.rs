//! Visibility state for the hamburger menu and the header dropdowns.
//!
//! Nothing here does more than flip visibility; rendering reads the state.

/// Slide-out menu panel. The scroll lock is derived from visibility so the
/// two always change together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuPanel {
    open: bool,
}

impl MenuPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Background (transcript) scrolling is locked while the panel is open.
    pub fn is_scroll_locked(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Escape closes an open panel. Returns whether the key was consumed.
    pub fn escape(&mut self) -> bool {
        if self.open {
            self.close();
            true
        } else {
            false
        }
    }

    /// A click on the overlay. Only a click on the backdrop itself closes it;
    /// clicks on the panel contents are left alone.
    pub fn click_overlay(&mut self, on_backdrop: bool) {
        if self.open && on_backdrop {
            self.close();
        }
    }
}

/// A row of dropdowns where at most one is open at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownGroup {
    open: Vec<bool>,
}

impl DropdownGroup {
    pub fn new(count: usize) -> Self {
        Self {
            open: vec![false; count],
        }
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open.get(index).copied().unwrap_or(false)
    }

    /// Index of the open dropdown, if any.
    pub fn open_index(&self) -> Option<usize> {
        self.open.iter().position(|open| *open)
    }

    /// Close everything, then reopen `index` only if it was closed before.
    pub fn click_trigger(&mut self, index: usize) {
        let was_open = self.is_open(index);
        self.close_all();
        if !was_open {
            if let Some(slot) = self.open.get_mut(index) {
                *slot = true;
            }
        }
    }

    /// A click anywhere outside every dropdown.
    pub fn click_outside(&mut self) {
        self.close_all();
    }

    pub fn close_all(&mut self) {
        self.open.iter_mut().for_each(|open| *open = false);
    }
}
