//! Composition root.
//!
//! [`Portfolio`] owns exactly one instance of every component. Mounting first
//! checks, per component, that the page provides the elements it needs; a
//! component whose check or construction fails is logged and left disabled
//! while the others mount normally.

use tracing::{info, warn};

use crate::backdrop::Backdrop;
use crate::config::FolioConfig;
use crate::counter::CounterBoard;
use crate::debounce::Throttle;
use crate::error::FolioError;
use crate::responder::{AssistantWidget, KeywordResponder, ResponseTable};
use crate::scroll_spy::ScrollSpy;
use crate::theme::ThemeManager;
use crate::viewport::Viewport;

/// Element ids the components look up.
pub mod ids {
    pub const CANVAS: &str = "particle-canvas";
    pub const QUESTION_INPUT: &str = "user-question";
    pub const ASK_BUTTON: &str = "ask-button";
    pub const RESPONSE_CONTAINER: &str = "assistant-response";
    pub const RESPONSE_TEXT: &str = "response-text";
    pub const LOADING: &str = "loading";

    pub const BACKDROP: &[&str] = &[CANVAS];
    pub const ASSISTANT: &[&str] = &[
        QUESTION_INPUT,
        ASK_BUTTON,
        RESPONSE_CONTAINER,
        RESPONSE_TEXT,
        LOADING,
    ];
}

/// Read-only view of the page used for capability checks.
pub trait Page {
    fn has_element(&self, id: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Page for F {
    fn has_element(&self, id: &str) -> bool {
        self(id)
    }
}

/// Check that every id in `required` exists on `page`.
pub fn require<P: Page + ?Sized>(
    page: &P,
    component: &'static str,
    required: &[&str],
) -> Result<(), FolioError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|id| !page.has_element(id))
        .map(|id| id.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(FolioError::MissingElements {
            component,
            ids: missing,
        })
    }
}

/// Every component of the page, owned in one place.
pub struct Portfolio {
    pub backdrop: Option<Backdrop>,
    pub counters: CounterBoard<String>,
    pub assistant: Option<AssistantWidget>,
    pub navigation: ScrollSpy,
    pub theme: ThemeManager,
    /// Rate limit for scroll-driven surface height checks.
    pub scroll: Throttle,
}

impl Portfolio {
    /// Mount every component whose page elements are present.
    pub fn mount<P: Page + ?Sized>(page: &P, config: &FolioConfig, viewport: Viewport) -> Self {
        info!("initializing portfolio");

        let backdrop = enable("backdrop", mount_backdrop(page, config, viewport));
        let assistant = enable("assistant", mount_assistant(page, config));

        let portfolio = Self {
            backdrop,
            counters: CounterBoard::new(&config.counter),
            assistant,
            navigation: ScrollSpy::new(config.navigation.header_height),
            theme: ThemeManager::new(),
            scroll: Throttle::new(config.scroll_throttle_ms),
        };
        info!(enabled = ?portfolio.enabled(), "portfolio initialized");
        portfolio
    }

    /// Names of the optional components that mounted.
    pub fn enabled(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.backdrop.is_some() {
            names.push("backdrop");
        }
        if self.assistant.is_some() {
            names.push("assistant");
        }
        names
    }
}

fn enable<T>(component: &'static str, result: Result<T, FolioError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(component, %err, "component disabled");
            None
        }
    }
}

fn mount_backdrop<P: Page + ?Sized>(
    page: &P,
    config: &FolioConfig,
    viewport: Viewport,
) -> Result<Backdrop, FolioError> {
    require(page, "backdrop", ids::BACKDROP)?;
    Ok(Backdrop::new(config, viewport))
}

fn mount_assistant<P: Page + ?Sized>(
    page: &P,
    config: &FolioConfig,
) -> Result<AssistantWidget, FolioError> {
    require(page, "assistant", ids::ASSISTANT)?;
    let table = config
        .assistant
        .table
        .clone()
        .unwrap_or_else(ResponseTable::builtin);
    let responder = KeywordResponder::new(table)?;
    Ok(AssistantWidget::new(responder, config.assistant.latency_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_page(_: &str) -> bool {
        true
    }

    #[test]
    fn test_mount_all() {
        let portfolio =
            Portfolio::mount(&full_page, &FolioConfig::default(), Viewport::new(800.0, 600.0));
        assert_eq!(portfolio.enabled(), vec!["backdrop", "assistant"]);
    }

    #[test]
    fn test_missing_canvas_disables_only_backdrop() {
        let page = |id: &str| id != ids::CANVAS;
        let portfolio =
            Portfolio::mount(&page, &FolioConfig::default(), Viewport::new(800.0, 600.0));
        assert!(portfolio.backdrop.is_none());
        assert!(portfolio.assistant.is_some());
    }

    #[test]
    fn test_missing_button_disables_only_assistant() {
        let page = |id: &str| id != ids::ASK_BUTTON;
        let portfolio =
            Portfolio::mount(&page, &FolioConfig::default(), Viewport::new(800.0, 600.0));
        assert!(portfolio.backdrop.is_some());
        assert!(portfolio.assistant.is_none());
    }

    #[test]
    fn test_require_lists_every_missing_id() {
        let page = |_: &str| false;
        match require(&page, "assistant", ids::ASSISTANT) {
            Err(FolioError::MissingElements { component, ids }) => {
                assert_eq!(component, "assistant");
                assert_eq!(ids.len(), 5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
