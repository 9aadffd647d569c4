//! Theme state.

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Value of the document's `data-theme` attribute.
    pub fn as_attr(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// Current page theme. Starts dark.
#[derive(Debug, Clone, Default)]
pub struct ThemeManager {
    current: Theme,
}

impl ThemeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// Flip between dark and light. Returns the new theme.
    pub fn toggle(&mut self) -> Theme {
        self.current = match self.current {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
        self.current
    }

    /// The operating system's preferred scheme changed.
    pub fn system_scheme_changed(&self, prefers_light: bool) {
        info!(
            scheme = if prefers_light { "light" } else { "dark" },
            "system theme changed"
        );
    }
}
