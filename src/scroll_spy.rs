//! Scroll-spy navigation.
//!
//! Navigation entries reference page sections by id (`href="#about"`). The
//! section that most recently started intersecting the viewport is current,
//! and exactly the entries pointing at it carry the active marker. Clicking an
//! entry scrolls smoothly to its section, offset by the fixed header, and makes
//! that section current straight away.

use tracing::{debug, warn};

/// Scroll-spy state over an ordered list of sections.
#[derive(Debug, Clone)]
pub struct ScrollSpy {
    sections: Vec<String>,
    /// Target section id of each navigation entry.
    nav_targets: Vec<String>,
    current: Option<usize>,
    header_height: f64,
}

impl ScrollSpy {
    pub fn new(header_height: f64) -> Self {
        Self {
            sections: Vec::new(),
            nav_targets: Vec::new(),
            current: None,
            header_height,
        }
    }

    /// Observe a section with the given id.
    pub fn add_section(&mut self, id: impl Into<String>) {
        self.sections.push(id.into());
    }

    /// Register a navigation entry by its `href`. Returns its index.
    ///
    /// Only in-page links (`#id`) are tracked.
    pub fn add_nav_entry(&mut self, href: &str) -> Option<usize> {
        let target = href.strip_prefix('#').filter(|t| !t.is_empty())?;
        self.nav_targets.push(target.to_string());
        Some(self.nav_targets.len() - 1)
    }

    /// Intersection report for section `id`.
    pub fn on_intersect(&mut self, id: &str, intersecting: bool) {
        if !intersecting {
            return;
        }
        match self.sections.iter().position(|s| s == id) {
            Some(index) => {
                if self.current != Some(index) {
                    debug!(section = id, "section became current");
                }
                self.current = Some(index);
            }
            None => warn!(section = id, "intersection for unknown section"),
        }
    }

    /// Handle a click on navigation entry `nav_index` whose section starts at
    /// `section_top` in document coordinates. Returns the scroll position.
    pub fn click(&mut self, nav_index: usize, section_top: f64) -> Option<f64> {
        let target = self.nav_targets.get(nav_index)?;
        let index = self.sections.iter().position(|s| s == target)?;
        self.current = Some(index);
        Some(self.scroll_target(section_top))
    }

    /// Scroll position that puts `section_top` just below the header.
    pub fn scroll_target(&self, section_top: f64) -> f64 {
        (section_top - self.header_height).max(0.0)
    }

    /// Id of the current section.
    pub fn current(&self) -> Option<&str> {
        self.current.map(|i| self.sections[i].as_str())
    }

    /// Whether navigation entry `nav_index` carries the active marker.
    pub fn is_active(&self, nav_index: usize) -> bool {
        match (self.current(), self.nav_targets.get(nav_index)) {
            (Some(current), Some(target)) => current == target,
            _ => false,
        }
    }

    /// Active flag for every navigation entry, in registration order.
    pub fn active_flags(&self) -> Vec<bool> {
        (0..self.nav_targets.len()).map(|i| self.is_active(i)).collect()
    }

    pub fn nav_target(&self, nav_index: usize) -> Option<&str> {
        self.nav_targets.get(nav_index).map(String::as_str)
    }
}
