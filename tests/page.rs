//! Page-level behavior: mounting, counters, the assistant and navigation.

use std::collections::HashSet;

use folio::app::ids;
use folio::prelude::*;
use folio::responder::Submission;
use folio::{FolioError, ResponseTable, Theme};

struct FakePage {
    missing: HashSet<&'static str>,
}

impl FakePage {
    fn complete() -> Self {
        Self {
            missing: HashSet::new(),
        }
    }

    fn without(ids: &[&'static str]) -> Self {
        Self {
            missing: ids.iter().copied().collect(),
        }
    }
}

impl Page for FakePage {
    fn has_element(&self, id: &str) -> bool {
        !self.missing.contains(id)
    }
}

#[derive(Debug, Default)]
struct Panel {
    loading: bool,
    enabled: bool,
    text: String,
}

impl AssistantView for Panel {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
    fn set_control_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
    fn show_text(&mut self, text: &str) {
        self.text = text.to_string();
    }
}

fn mount(page: &FakePage) -> Portfolio {
    Portfolio::mount(page, &FolioConfig::default(), Viewport::new(1280.0, 720.0))
}

#[test]
fn test_missing_assistant_leaves_rest_running() {
    let mut portfolio = mount(&FakePage::without(&[ids::LOADING, ids::RESPONSE_TEXT]));
    assert!(portfolio.assistant.is_none());

    let backdrop = portfolio.backdrop.as_mut().expect("backdrop mounted");
    let mut frames = ManualScheduler::default();
    backdrop.start(&mut frames);
    assert!(backdrop.is_running());

    portfolio.counters.register("years".to_string(), "8").unwrap();
    assert!(portfolio.counters.on_visible(&"years".to_string(), 1.0, 0.0));
}

#[test]
fn test_mount_with_nothing_present() {
    let all: Vec<&'static str> = ids::BACKDROP.iter().chain(ids::ASSISTANT).copied().collect();
    let portfolio = mount(&FakePage::without(&all));
    assert!(portfolio.enabled().is_empty());
}

#[test]
fn test_assistant_round_trip_with_latency() {
    let mut portfolio = mount(&FakePage::complete());
    let assistant = portfolio.assistant.as_mut().unwrap();
    let mut panel = Panel {
        enabled: true,
        ..Panel::default()
    };

    let question = "What is your experience and background?";
    let ready_at = match assistant.submit(question, 1000.0, &mut panel) {
        Submission::Pending { ready_at } => ready_at,
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(ready_at, 2800.0);
    assert!(panel.loading);
    assert!(!panel.enabled);

    assert_eq!(
        assistant.submit("Tell me about your team", 1500.0, &mut panel),
        Submission::Ignored
    );
    assert!(!assistant.poll(2799.0, &mut panel));
    assert!(assistant.poll(2800.0, &mut panel));

    assert!(!panel.loading);
    assert!(panel.enabled);
    let expected = assistant.responder().respond(question).to_string();
    assert_eq!(panel.text, expected);
    assert_ne!(panel.text, assistant.responder().table().default_text);
}

#[test]
fn test_assistant_blank_and_unmatched_questions() {
    let responder = KeywordResponder::new(ResponseTable::builtin()).unwrap();
    let table = responder.table();
    assert_eq!(responder.respond("   "), table.empty_prompt);
    assert_eq!(responder.respond("Do you like turnips?"), table.default_text);

    let mut widget = AssistantWidget::new(responder.clone(), 1800.0);
    let mut panel = Panel::default();
    assert_eq!(widget.submit("\n\t", 0.0, &mut panel), Submission::Prompted);
    assert!(!widget.is_busy());
    assert!(!panel.loading);
    assert_eq!(panel.text, table.empty_prompt);
}

#[test]
fn test_assistant_error_still_clears_indicator() {
    let mut widget = AssistantWidget::new(KeywordResponder::builtin(), 100.0);
    let mut panel = Panel::default();
    widget.submit("skills?", 0.0, &mut panel);
    assert!(panel.loading);

    let ran = widget.poll_with(100.0, &mut panel, |_, _| {
        Err(FolioError::Responder("generator failed".into()))
    });
    assert!(ran);
    assert!(!panel.loading);
    assert!(panel.enabled);
    assert_eq!(panel.text, widget.responder().table().error_text);
    assert!(!widget.is_busy());
}

#[test]
fn test_counters_animate_to_goal_once() {
    let mut portfolio = mount(&FakePage::complete());
    let counters = &mut portfolio.counters;
    counters.register("projects".to_string(), "42").unwrap();
    assert!(counters.register("broken".to_string(), "lots").is_err());

    let key = "projects".to_string();
    assert!(!counters.on_visible(&key, 0.49, 0.0));
    assert!(counters.on_visible(&key, 0.5, 100.0));

    let mut shown: Vec<(String, u64)> = Vec::new();
    let mut t = 100.0;
    while counters.is_animating() {
        t += 16.0;
        counters.tick(t, &mut shown);
    }
    let values: Vec<u64> = shown.iter().map(|(_, v)| *v).collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(values.last(), Some(&42));

    assert!(!counters.on_visible(&key, 1.0, t + 5000.0));
    assert!(!counters.is_animating());
}

#[test]
fn test_navigation_follows_sections() {
    let mut portfolio = mount(&FakePage::complete());
    let nav = &mut portfolio.navigation;
    for id in ["hero", "about", "projects", "contact"] {
        nav.add_section(id);
    }
    let entries: Vec<usize> = ["#hero", "#about", "#projects", "#contact"]
        .iter()
        .filter_map(|href| nav.add_nav_entry(href))
        .collect();
    assert_eq!(entries, vec![0, 1, 2, 3]);

    nav.on_intersect("projects", true);
    assert_eq!(nav.active_flags(), vec![false, false, true, false]);

    assert_eq!(nav.click(3, 2400.0), Some(2320.0));
    assert_eq!(nav.current(), Some("contact"));
    assert_eq!(nav.active_flags().iter().filter(|a| **a).count(), 1);
}

#[test]
fn test_scroll_throttle_and_theme() {
    let mut portfolio = mount(&FakePage::complete());
    assert!(portfolio.scroll.ready(0.0));
    assert!(!portfolio.scroll.ready(50.0));
    assert!(portfolio.scroll.ready(100.0));

    assert_eq!(portfolio.theme.current(), Theme::Dark);
    assert_eq!(portfolio.theme.toggle(), Theme::Light);
}
