//! Keyword responder and the assistant widget.
//!
//! [`KeywordResponder`] maps a free-text question to one canned paragraph. Each
//! category of an ordered [`ResponseTable`] scores the number of whole-word
//! keyword occurrences in the question (multi-word keywords match consecutive
//! words); the strictly highest score wins, ties go to the category declared
//! first, and a question matching nothing gets the default paragraph.
//!
//! [`AssistantWidget`] wraps the responder in the page flow: a loading
//! indicator, a disabled button and a simulated processing delay.

use serde::Deserialize;
use tracing::{debug, error, info};

use crate::error::FolioError;

/// One category of canned text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CannedResponse {
    pub category: String,
    pub keywords: Vec<String>,
    pub text: String,
}

/// The ordered response table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseTable {
    pub entries: Vec<CannedResponse>,
    /// Reply when no keyword matches.
    pub default_text: String,
    /// Reply to a blank question.
    #[serde(default = "default_empty_prompt")]
    pub empty_prompt: String,
    /// Shown when generating a reply fails.
    #[serde(default = "default_error_text")]
    pub error_text: String,
}

fn default_empty_prompt() -> String {
    "Please enter a question first!".to_string()
}

fn default_error_text() -> String {
    "An error occurred while getting the response. Please try again.".to_string()
}

const BUILTIN: &[(&str, &[&str], &str)] = &[
    (
        "company",
        &["cossmicrings", "company", "business", "firm"],
        "Cossmicrings Solutions is my company: a fifteen-person team building products \
         in AI, blockchain, IoT and NFC, with a brand-strategy division (Upbrando) and an \
         artificial-intelligence division (Jeff AI).",
    ),
    (
        "experience",
        &["experience", "background", "career", "worked"],
        "I started with Offer Zone 360 in 2015, then spent 2019 to 2023 freelancing, moving \
         from UI/UX design to full-stack development, digital marketing and business analysis.",
    ),
    (
        "research",
        &["research", "country", "countries", "international", "china", "travel"],
        "I have researched technology markets across nine countries, including Dubai, \
         Singapore, Malaysia, Thailand, Sri Lanka and three visits to China's Canton Fair.",
    ),
    (
        "mission",
        &["mission", "goal", "goals", "gap", "bridge", "vision"],
        "My mission is to close the technology gap I found between markets in China and \
         India through practical, well-built products.",
    ),
    (
        "skills",
        &["skill", "skills", "technical", "programming", "stack", "sap"],
        "My toolkit spans SAP FICO and HCM, Microsoft BI, Java, C/C++ and SQL, plus digital \
         marketing with Meta Business, Google Ads, WordPress, SEO and SEM.",
    ),
    (
        "team",
        &["team", "member", "members", "staff", "employee", "employees"],
        "Fifteen people work across our divisions on AI, blockchain, IoT and NFC projects.",
    ),
    (
        "contact",
        &["contact", "email", "phone", "linkedin", "reach"],
        "The contact section at the bottom of this page lists email, phone and LinkedIn.",
    ),
    (
        "journey",
        &["journey", "start", "started", "began", "offer zone"],
        "The journey began with Offer Zone 360, ran through years of freelance work and \
         research trips, and led to founding Cossmicrings Solutions.",
    ),
    (
        "hydroponics",
        &["hydroponic", "hydroponics", "agriculture", "farming"],
        "In 2022 I trained in hydroponic cultivation, with a focus on sustainable and \
         sensor-driven farming.",
    ),
    (
        "upbrando",
        &["upbrando", "brand strategy", "branding"],
        "Upbrando is our brand-strategy division, handling digital marketing end to end.",
    ),
    (
        "jeff ai",
        &["jeff ai", "artificial intelligence", "chatbot", "chatbots"],
        "Jeff AI is our artificial-intelligence division, focused on support automation \
         and conversational assistants.",
    ),
];

const BUILTIN_DEFAULT: &str = "I'm a technology entrepreneur working to bridge technology gaps \
     between markets. Ask me about my experience, company, skills or research!";

impl ResponseTable {
    /// The canonical table.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(category, keywords, text)| CannedResponse {
                    category: category.to_string(),
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                    text: text.to_string(),
                })
                .collect(),
            default_text: BUILTIN_DEFAULT.to_string(),
            empty_prompt: default_empty_prompt(),
            error_text: default_error_text(),
        }
    }

    pub fn validate(&self) -> Result<(), FolioError> {
        if self.default_text.trim().is_empty() {
            return Err(FolioError::Responder("default text is empty".into()));
        }
        for entry in &self.entries {
            if entry.keywords.iter().all(|k| tokenize(k).is_empty()) {
                return Err(FolioError::Responder(format!(
                    "category {:?} has no usable keywords",
                    entry.category
                )));
            }
        }
        Ok(())
    }
}

impl Default for ResponseTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lower-cased alphanumeric words of `text`.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Occurrences of `needle` as consecutive words of `haystack`.
fn count_phrase(haystack: &[String], needle: &[String]) -> usize {
    if needle.is_empty() || needle.len() > haystack.len() {
        return 0;
    }
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

/// Scores questions against a [`ResponseTable`].
#[derive(Debug, Clone)]
pub struct KeywordResponder {
    table: ResponseTable,
    /// Tokenized keywords, parallel to `table.entries`.
    keywords: Vec<Vec<Vec<String>>>,
}

impl KeywordResponder {
    pub fn new(table: ResponseTable) -> Result<Self, FolioError> {
        table.validate()?;
        Ok(Self::compile(table))
    }

    /// Responder over the built-in table, which always validates.
    pub fn builtin() -> Self {
        Self::compile(ResponseTable::builtin())
    }

    fn compile(table: ResponseTable) -> Self {
        let keywords = table
            .entries
            .iter()
            .map(|e| e.keywords.iter().map(|k| tokenize(k)).collect())
            .collect();
        Self { table, keywords }
    }

    /// Per-category scores for `question`, in table order.
    pub fn scores(&self, question: &str) -> Vec<usize> {
        let words = tokenize(question);
        self.keywords
            .iter()
            .map(|phrases| phrases.iter().map(|p| count_phrase(&words, p)).sum())
            .collect()
    }

    /// The best-scoring entry, or `None` when nothing matches.
    pub fn select(&self, question: &str) -> Option<&CannedResponse> {
        let mut best: Option<(usize, usize)> = None;
        for (index, score) in self.scores(question).into_iter().enumerate() {
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| &self.table.entries[index])
    }

    /// Reply text for `question`.
    pub fn respond(&self, question: &str) -> &str {
        if question.trim().is_empty() {
            return &self.table.empty_prompt;
        }
        match self.select(question) {
            Some(entry) => &entry.text,
            None => &self.table.default_text,
        }
    }

    pub fn table(&self) -> &ResponseTable {
        &self.table
    }
}

/// The widget's page elements.
pub trait AssistantView {
    fn set_loading(&mut self, loading: bool);
    fn set_control_enabled(&mut self, enabled: bool);
    fn show_text(&mut self, text: &str);
}

/// Result of [`AssistantWidget::submit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Submission {
    /// Blank question; the prompt was shown in place.
    Prompted,
    /// A request is already pending; this one was dropped.
    Ignored,
    /// Accepted; call [`AssistantWidget::poll`] at or after `ready_at`.
    Pending { ready_at: f64 },
}

#[derive(Debug, Clone)]
struct PendingRequest {
    question: String,
    ready_at: f64,
}

/// Restores the idle UI state when dropped.
struct BusyGuard<'a, V: AssistantView + ?Sized> {
    view: &'a mut V,
}

impl<V: AssistantView + ?Sized> Drop for BusyGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_loading(false);
        self.view.set_control_enabled(true);
    }
}

/// The assistant: question in, canned reply out after a simulated delay.
#[derive(Debug, Clone)]
pub struct AssistantWidget {
    responder: KeywordResponder,
    latency_ms: f64,
    pending: Option<PendingRequest>,
}

impl AssistantWidget {
    pub fn new(responder: KeywordResponder, latency_ms: f64) -> Self {
        Self {
            responder,
            latency_ms,
            pending: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn responder(&self) -> &KeywordResponder {
        &self.responder
    }

    /// Start handling `question`.
    pub fn submit<V: AssistantView + ?Sized>(
        &mut self,
        question: &str,
        now: f64,
        view: &mut V,
    ) -> Submission {
        if self.is_busy() {
            debug!("assistant busy, ignoring request");
            return Submission::Ignored;
        }
        let question = question.trim();
        if question.is_empty() {
            view.show_text(&self.responder.table().empty_prompt);
            return Submission::Prompted;
        }

        info!(question, "processing assistant request");
        view.show_text("");
        view.set_loading(true);
        view.set_control_enabled(false);

        let ready_at = now + self.latency_ms;
        self.pending = Some(PendingRequest {
            question: question.to_string(),
            ready_at,
        });
        Submission::Pending { ready_at }
    }

    /// Deliver the pending reply if its delay has elapsed. Returns whether it did.
    pub fn poll<V: AssistantView + ?Sized>(&mut self, now: f64, view: &mut V) -> bool {
        self.poll_with(now, view, |responder, question| {
            Ok(responder.respond(question).to_string())
        })
    }

    /// Like [`poll`](Self::poll) with a caller-supplied reply generator.
    ///
    /// The loading indicator is cleared and the control re-enabled whether the
    /// generator succeeds or fails.
    pub fn poll_with<V, G>(&mut self, now: f64, view: &mut V, generate: G) -> bool
    where
        V: AssistantView + ?Sized,
        G: FnOnce(&KeywordResponder, &str) -> Result<String, FolioError>,
    {
        match &self.pending {
            Some(p) if now >= p.ready_at => {}
            _ => return false,
        }
        let Some(request) = self.pending.take() else {
            return false;
        };

        let mut guard = BusyGuard { view };
        match generate(&self.responder, &request.question) {
            Ok(reply) => guard.view.show_text(&reply),
            Err(err) => {
                error!(%err, "error generating response");
                guard.view.show_text(&self.responder.table().error_text);
            }
        }
        true
    }
}
