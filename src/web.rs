//! Browser front end.
//!
//! Binds the components to the DOM: the backdrop draws into
//! `#particle-canvas` through a 2D context, frames come from
//! `requestAnimationFrame`, delays from `setTimeout`, and visibility from
//! intersection observers. All state lives in one [`Shared`] cell that every
//! callback borrows for the duration of a single event.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use glam::Vec2;
use js_sys::Function;
use tracing::{debug, info, warn, Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, EventTarget, HtmlButtonElement,
    HtmlCanvasElement, HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, MediaQueryListEvent, MouseEvent, ScrollBehavior,
    ScrollToOptions, Window,
};

use crate::app::{ids, Page, Portfolio};
use crate::config::FolioConfig;
use crate::counter::CounterDisplay;
use crate::driver::{FrameHandle, FrameScheduler};
use crate::raster::BACKGROUND;
use crate::responder::{AssistantView, Submission};
use crate::surface::{Rgb, Surface};
use crate::time::{Clock, SystemClock};
use crate::viewport::Viewport;

const CONFIG_ELEMENT: &str = "folio-config";
const THEME_TOGGLE: &str = "theme-toggle";
const COUNTER_KEY_ATTR: &str = "data-folio-counter";
const HIDDEN: &str = "hidden";
const ACTIVE: &str = "active";
/// Shortest re-arm delay when a timer fires marginally early.
const TIMER_RETRY_MS: f64 = 10.0;

type Shared = Rc<RefCell<WebApp>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    init_console_logging();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let config = page_config(&document);
    let viewport = page_viewport(&window, &document);
    let portfolio = Portfolio::mount(&DocumentPage(&document), &config, viewport);

    let app: Shared = Rc::new(RefCell::new(WebApp::new(
        window.clone(),
        document.clone(),
        config,
        portfolio,
    )));
    install_callbacks(&app);

    // Each piece wires independently; one failing leaves the rest running.
    for (component, result) in [
        ("backdrop", wire_backdrop(&app)),
        ("counters", wire_counters(&app)),
        ("assistant", wire_assistant(&app)),
        ("navigation", wire_navigation(&app)),
        ("theme", wire_theme(&app)),
    ] {
        if let Err(err) = result {
            warn!(component, ?err, "failed to wire component");
        }
    }
    info!("all systems initialized");
    Ok(())
}

// ---------------------------------------------------------------------------
// Logging

/// Routes formatted `tracing` events to the browser console.
struct ConsoleMakeWriter;

struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = JsValue::from_str(line.trim_end());
        match self.level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            Level::INFO => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

fn init_console_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .with_ansi(false)
        .without_time()
        .try_init();
}

// ---------------------------------------------------------------------------
// Page adapters

struct DocumentPage<'a>(&'a Document);

impl Page for DocumentPage<'_> {
    fn has_element(&self, id: &str) -> bool {
        self.0.get_element_by_id(id).is_some()
    }
}

/// Configuration from an inline `<script id="folio-config" type="application/json">`.
fn page_config(document: &Document) -> FolioConfig {
    let Some(json) = document
        .get_element_by_id(CONFIG_ELEMENT)
        .and_then(|el| el.text_content())
    else {
        return FolioConfig::default();
    };
    FolioConfig::from_json_str(&json).unwrap_or_else(|err| {
        warn!(%err, "ignoring page configuration");
        FolioConfig::default()
    })
}

/// Full document size: viewport width by `max(document height, viewport height)`.
fn page_viewport(window: &Window, document: &Document) -> Viewport {
    let width = js_number(window.inner_width());
    let height = js_number(window.inner_height());
    let doc_height = document
        .document_element()
        .map(|el| el.scroll_height() as f64)
        .unwrap_or(0.0);
    Viewport::new(width as f32, height.max(doc_height) as f32)
}

fn js_number(value: Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{id} has the wrong element type")))
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn set_class(element: &Element, class: &str, on: bool) {
    if let Err(err) = element.class_list().toggle_with_force(class, on) {
        warn!(?err, class, "failed to toggle class");
    }
}

// ---------------------------------------------------------------------------
// Surface and scheduler

struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("not a 2d context"))?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn fade(&mut self, alpha: f32) {
        let (w, h) = self.size();
        self.ctx.set_global_alpha(alpha as f64);
        self.ctx.set_fill_style_str(&BACKGROUND.css());
        self.ctx.fill_rect(0.0, 0.0, w as f64, h as f64);
        self.ctx.set_global_alpha(1.0);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(
                center.x as f64,
                center.y as f64,
                radius as f64,
                0.0,
                std::f64::consts::TAU,
            )
            .is_err()
        {
            return;
        }
        self.ctx.set_global_alpha(alpha as f64);
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
        self.ctx.set_global_alpha(1.0);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgb, alpha: f32) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.set_line_width(width as f64);
        self.ctx.set_global_alpha(alpha as f64);
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.stroke();
        self.ctx.set_global_alpha(1.0);
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.ctx.set_image_smoothing_enabled(enabled);
    }
}

/// `requestAnimationFrame` behind [`FrameScheduler`].
///
/// The browser runs at most one callback chain here, so the handle of a firing
/// frame is the one most recently requested.
struct RafScheduler {
    window: Window,
    callback: Option<Function>,
    pending: Option<FrameHandle>,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let id = match &self.callback {
            Some(callback) => self
                .window
                .request_animation_frame(callback)
                .unwrap_or_else(|err| {
                    warn!(?err, "requestAnimationFrame failed");
                    0
                }),
            None => 0,
        };
        let handle = FrameHandle(id as u64);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0 as i32) {
            warn!(?err, "cancelAnimationFrame failed");
        }
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Component views

struct AssistantElements {
    input: HtmlTextAreaElement,
    button: HtmlButtonElement,
    container: Element,
    loading: Element,
    text: Element,
}

impl AssistantElements {
    fn find(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            input: element(document, ids::QUESTION_INPUT)?,
            button: element(document, ids::ASK_BUTTON)?,
            container: element(document, ids::RESPONSE_CONTAINER)?,
            loading: element(document, ids::LOADING)?,
            text: element(document, ids::RESPONSE_TEXT)?,
        })
    }
}

impl AssistantView for AssistantElements {
    fn set_loading(&mut self, loading: bool) {
        if loading {
            set_class(&self.container, HIDDEN, false);
        }
        set_class(&self.loading, HIDDEN, !loading);
        set_class(&self.text, HIDDEN, loading);
    }

    fn set_control_enabled(&mut self, enabled: bool) {
        self.button.set_disabled(!enabled);
    }

    fn show_text(&mut self, text: &str) {
        self.text.set_text_content(Some(text));
        set_class(&self.container, HIDDEN, false);
    }
}

struct CounterElements<'a>(&'a [(String, Element)]);

impl CounterDisplay<String> for CounterElements<'_> {
    fn show(&mut self, key: &String, value: u64) {
        if let Some((_, el)) = self.0.iter().find(|(k, _)| k == key) {
            el.set_text_content(Some(&value.to_string()));
        }
    }
}

/// An in-page link registered with the scroll-spy.
struct Anchor {
    element: Element,
    /// Only links inside `<nav>` carry the active marker.
    in_nav: bool,
}

// ---------------------------------------------------------------------------
// Application state

#[derive(Default)]
struct Callbacks {
    counter_frame: Option<Function>,
    resize: Option<Function>,
    assistant: Option<Function>,
}

struct WebApp {
    window: Window,
    document: Document,
    config: FolioConfig,
    portfolio: Portfolio,
    clock: SystemClock,
    frames: RafScheduler,
    callbacks: Callbacks,
    canvas: Option<CanvasSurface>,
    counters: Vec<(String, Element)>,
    counter_frame: Option<i32>,
    assistant_view: Option<AssistantElements>,
    anchors: Vec<Anchor>,
    resize_timer: Option<i32>,
}

impl WebApp {
    fn new(window: Window, document: Document, config: FolioConfig, portfolio: Portfolio) -> Self {
        Self {
            frames: RafScheduler {
                window: window.clone(),
                callback: None,
                pending: None,
            },
            window,
            document,
            config,
            portfolio,
            clock: SystemClock::new(),
            callbacks: Callbacks::default(),
            canvas: None,
            counters: Vec::new(),
            counter_frame: None,
            assistant_view: None,
            anchors: Vec::new(),
            resize_timer: None,
        }
    }

    fn set_timeout(&self, callback: Option<&Function>, delay_ms: f64) -> Option<i32> {
        let callback = callback?;
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback,
                delay_ms.max(0.0).ceil() as i32,
            )
            .map_err(|err| warn!(?err, "setTimeout failed"))
            .ok()
    }

    /// Forward a viewport change to the backdrop and (re)arm the debounce timer.
    fn schedule_resize(&mut self, now: f64, viewport: Viewport) {
        let Some(backdrop) = self.portfolio.backdrop.as_mut() else {
            return;
        };
        backdrop.resize_signal(now, viewport);
        if let Some(timer) = self.resize_timer.take() {
            self.window.clear_timeout_with_handle(timer);
        }
        self.resize_timer = self.set_timeout(
            self.callbacks.resize.as_ref(),
            self.config.resize_debounce_ms,
        );
    }

    fn ensure_counter_frame(&mut self) {
        if self.counter_frame.is_some() || !self.portfolio.counters.is_animating() {
            return;
        }
        if let Some(callback) = &self.callbacks.counter_frame {
            self.counter_frame = self
                .window
                .request_animation_frame(callback)
                .map_err(|err| warn!(?err, "requestAnimationFrame failed"))
                .ok();
        }
    }

    fn apply_active_flags(&self) {
        for (index, anchor) in self.anchors.iter().enumerate() {
            if anchor.in_nav {
                set_class(
                    &anchor.element,
                    ACTIVE,
                    self.portfolio.navigation.is_active(index),
                );
            }
        }
    }

    fn apply_theme(&self) {
        if let Some(root) = self.document.document_element() {
            let theme = self.portfolio.theme.current().as_attr();
            if let Err(err) = root.set_attribute("data-theme", theme) {
                warn!(?err, "failed to set theme attribute");
            }
        }
    }
}

/// Wrap `f` in a JS function that lives for the rest of the page.
fn persistent(app: &Shared, f: fn(&Shared)) -> Function {
    let app = app.clone();
    let closure = Closure::<dyn FnMut()>::new(move || f(&app));
    let function = closure.as_ref().unchecked_ref::<Function>().clone();
    closure.forget();
    function
}

fn listen<E, F>(target: &EventTarget, kind: &str, mut handler: F) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    });
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn install_callbacks(app: &Shared) {
    let backdrop_frame = persistent(app, on_backdrop_frame);
    let counter_frame = persistent(app, on_counter_frame);
    let resize = persistent(app, on_resize_due);
    let assistant = persistent(app, on_reply_due);

    let mut state = app.borrow_mut();
    state.frames.callback = Some(backdrop_frame);
    state.callbacks = Callbacks {
        counter_frame: Some(counter_frame),
        resize: Some(resize),
        assistant: Some(assistant),
    };
}

// ---------------------------------------------------------------------------
// Backdrop

fn wire_backdrop(app: &Shared) -> Result<(), JsValue> {
    let (window, document) = {
        let mut state = app.borrow_mut();
        if state.portfolio.backdrop.is_none() {
            return Ok(());
        }
        let canvas = element::<HtmlCanvasElement>(&state.document, ids::CANVAS)
            .and_then(CanvasSurface::new);
        let mut canvas = match canvas {
            Ok(canvas) => canvas,
            Err(err) => {
                warn!(?err, "backdrop disabled");
                state.portfolio.backdrop = None;
                return Ok(());
            }
        };

        let state = &mut *state;
        if let Some(backdrop) = state.portfolio.backdrop.as_mut() {
            backdrop.attach(&mut canvas);
            backdrop.start(&mut state.frames);
        }
        state.canvas = Some(canvas);
        (state.window.clone(), state.document.clone())
    };

    {
        let app = app.clone();
        listen(&window, "resize", move |_: web_sys::Event| {
            let mut state = app.borrow_mut();
            let now = state.clock.now_ms();
            let viewport = page_viewport(&state.window, &state.document);
            debug!(width = viewport.width, height = viewport.height, "window resized");
            state.schedule_resize(now, viewport);
        })?;
    }
    {
        let app = app.clone();
        listen(&window, "scroll", move |_: web_sys::Event| on_scroll(&app))?;
    }
    {
        let app = app.clone();
        listen(&window, "mousemove", move |event: MouseEvent| {
            let mut state = app.borrow_mut();
            let now = state.clock.now_ms();
            if let Some(backdrop) = state.portfolio.backdrop.as_mut() {
                let position = Vec2::new(event.page_x() as f32, event.page_y() as f32);
                backdrop.pointer_moved(position, now);
            }
        })?;
    }
    {
        let app = app.clone();
        listen(&document, "mouseleave", move |_: web_sys::Event| {
            if let Some(backdrop) = app.borrow_mut().portfolio.backdrop.as_mut() {
                backdrop.pointer_left();
            }
        })?;
    }
    {
        let app = app.clone();
        listen(&document, "visibilitychange", move |_: web_sys::Event| {
            let mut guard = app.borrow_mut();
            let state = &mut *guard;
            let now = state.clock.now_ms();
            let visible = !state.document.hidden();
            if let Some(backdrop) = state.portfolio.backdrop.as_mut() {
                backdrop.set_visible(visible, now, &mut state.frames);
                debug!(visible, "page visibility changed");
            }
        })?;
    }
    Ok(())
}

fn on_backdrop_frame(app: &Shared) {
    let mut guard = app.borrow_mut();
    let state = &mut *guard;
    let now = state.clock.now_ms();
    let Some(handle) = state.frames.pending.take() else {
        return;
    };
    if let (Some(backdrop), Some(canvas)) =
        (state.portfolio.backdrop.as_mut(), state.canvas.as_mut())
    {
        backdrop.on_frame(handle, now, &mut state.frames, canvas);
    }
}

fn on_resize_due(app: &Shared) {
    let mut guard = app.borrow_mut();
    let state = &mut *guard;
    state.resize_timer = None;
    let now = state.clock.now_ms();
    let retry = match (state.portfolio.backdrop.as_mut(), state.canvas.as_mut()) {
        (Some(backdrop), Some(canvas)) => {
            if backdrop.poll_resize(now, canvas) {
                None
            } else {
                backdrop.resize_remaining(now)
            }
        }
        _ => None,
    };
    if let Some(remaining) = retry {
        state.resize_timer = state.set_timeout(
            state.callbacks.resize.as_ref(),
            remaining.max(TIMER_RETRY_MS),
        );
    }
}

/// Throttled: grow or shrink the surface when the document height changed.
fn on_scroll(app: &Shared) {
    let mut state = app.borrow_mut();
    let now = state.clock.now_ms();
    if !state.portfolio.scroll.ready(now) {
        return;
    }
    let Some(canvas) = &state.canvas else {
        return;
    };
    let target = page_viewport(&state.window, &state.document);
    let (_, height) = target.pixel_size();
    if canvas.size().1 != height {
        state.schedule_resize(now, target);
    }
}

// ---------------------------------------------------------------------------
// Counters

fn wire_counters(app: &Shared) -> Result<(), JsValue> {
    let (elements, threshold) = {
        let mut guard = app.borrow_mut();
        let state = &mut *guard;
        for (index, el) in query_all(&state.document, "[data-target]")?
            .into_iter()
            .enumerate()
        {
            let key = format!("counter-{index}");
            let raw = el.get_attribute("data-target").unwrap_or_default();
            if state.portfolio.counters.register(key.clone(), &raw).is_ok() {
                el.set_attribute(COUNTER_KEY_ATTR, &key)?;
                state.counters.push((key, el));
            }
        }
        let elements: Vec<Element> = state.counters.iter().map(|(_, el)| el.clone()).collect();
        (elements, state.config.counter.visibility_threshold)
    };
    if elements.is_empty() {
        return Ok(());
    }

    let callback = {
        let app = app.clone();
        Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            let mut state = app.borrow_mut();
            let now = state.clock.now_ms();
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                if let Some(key) = entry.target().get_attribute(COUNTER_KEY_ATTR) {
                    state
                        .portfolio
                        .counters
                        .on_visible(&key, entry.intersection_ratio(), now);
                }
            }
            state.ensure_counter_frame();
        })
    };
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(threshold));
    init.set_root_margin("0px 0px -50px 0px");
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    callback.forget();
    for el in &elements {
        observer.observe(el);
    }
    info!(count = elements.len(), "counters observed");
    Ok(())
}

fn on_counter_frame(app: &Shared) {
    let mut guard = app.borrow_mut();
    let state = &mut *guard;
    state.counter_frame = None;
    let now = state.clock.now_ms();
    let mut display = CounterElements(&state.counters);
    state.portfolio.counters.tick(now, &mut display);
    state.ensure_counter_frame();
}

// ---------------------------------------------------------------------------
// Assistant

fn wire_assistant(app: &Shared) -> Result<(), JsValue> {
    let (button, input) = {
        let mut state = app.borrow_mut();
        if state.portfolio.assistant.is_none() {
            return Ok(());
        }
        let view = AssistantElements::find(&state.document)?;
        let handles = (view.button.clone(), view.input.clone());
        state.assistant_view = Some(view);
        handles
    };

    {
        let app = app.clone();
        listen(&button, "click", move |_: web_sys::Event| on_question(&app))?;
    }
    {
        let app = app.clone();
        listen(&input, "keydown", move |event: KeyboardEvent| {
            if event.key() == "Enter" && (event.ctrl_key() || event.meta_key()) {
                event.prevent_default();
                on_question(&app);
            }
        })?;
    }
    Ok(())
}

fn on_question(app: &Shared) {
    let mut guard = app.borrow_mut();
    let state = &mut *guard;
    let now = state.clock.now_ms();
    let (Some(assistant), Some(view)) = (
        state.portfolio.assistant.as_mut(),
        state.assistant_view.as_mut(),
    ) else {
        return;
    };
    let question = view.input.value();
    if let Submission::Pending { ready_at } = assistant.submit(&question, now, view) {
        state.set_timeout(state.callbacks.assistant.as_ref(), ready_at - now);
    }
}

fn on_reply_due(app: &Shared) {
    let mut guard = app.borrow_mut();
    let state = &mut *guard;
    let now = state.clock.now_ms();
    let (Some(assistant), Some(view)) = (
        state.portfolio.assistant.as_mut(),
        state.assistant_view.as_mut(),
    ) else {
        return;
    };
    if !assistant.poll(now, view) && assistant.is_busy() {
        state.set_timeout(state.callbacks.assistant.as_ref(), TIMER_RETRY_MS);
    }
}

// ---------------------------------------------------------------------------
// Navigation

fn wire_navigation(app: &Shared) -> Result<(), JsValue> {
    let (sections, anchors, threshold) = {
        let mut guard = app.borrow_mut();
        let state = &mut *guard;
        let sections = query_all(&state.document, "section[id]")?;
        for section in &sections {
            state.portfolio.navigation.add_section(section.id());
        }
        for el in query_all(&state.document, "a[href^=\"#\"]")? {
            let href = el.get_attribute("href").unwrap_or_default();
            if state.portfolio.navigation.add_nav_entry(&href).is_some() {
                let in_nav = matches!(el.closest("nav"), Ok(Some(_)));
                state.anchors.push(Anchor {
                    element: el,
                    in_nav,
                });
            }
        }
        let anchors: Vec<Element> = state.anchors.iter().map(|a| a.element.clone()).collect();
        (sections, anchors, state.config.navigation.section_threshold)
    };

    for (index, anchor) in anchors.iter().enumerate() {
        let app = app.clone();
        listen(anchor, "click", move |event: MouseEvent| {
            event.prevent_default();
            on_anchor_click(&app, index);
        })?;
    }

    if sections.is_empty() {
        return Ok(());
    }
    let callback = {
        let app = app.clone();
        Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            let mut state = app.borrow_mut();
            for entry in entries.iter() {
                if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                    let id = entry.target().id();
                    state
                        .portfolio
                        .navigation
                        .on_intersect(&id, entry.is_intersecting());
                }
            }
            state.apply_active_flags();
        })
    };
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(threshold));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    callback.forget();
    for section in &sections {
        observer.observe(section);
    }
    Ok(())
}

fn on_anchor_click(app: &Shared, index: usize) {
    let mut state = app.borrow_mut();
    let Some(target) = state.portfolio.navigation.nav_target(index).map(str::to_string) else {
        return;
    };
    let Some(section) = state.document.get_element_by_id(&target) else {
        return;
    };
    let scroll_y = state.window.scroll_y().unwrap_or(0.0);
    let top = section.get_bounding_client_rect().top() + scroll_y;
    let Some(y) = state.portfolio.navigation.click(index, top) else {
        return;
    };

    let options = ScrollToOptions::new();
    options.set_top(y);
    options.set_behavior(ScrollBehavior::Smooth);
    state.window.scroll_to_with_scroll_to_options(&options);
    state.apply_active_flags();
}

// ---------------------------------------------------------------------------
// Theme

fn wire_theme(app: &Shared) -> Result<(), JsValue> {
    let (window, toggle) = {
        let state = app.borrow();
        state.apply_theme();
        (
            state.window.clone(),
            state.document.get_element_by_id(THEME_TOGGLE),
        )
    };

    if let Some(toggle) = toggle {
        let app = app.clone();
        listen(&toggle, "click", move |_: web_sys::Event| {
            let mut state = app.borrow_mut();
            let theme = state.portfolio.theme.toggle();
            state.apply_theme();
            info!(theme = theme.as_attr(), "theme toggled");
        })?;
    }

    if let Some(query) = window.match_media("(prefers-color-scheme: light)")? {
        let app = app.clone();
        listen(&query, "change", move |event: MediaQueryListEvent| {
            app.borrow().portfolio.theme.system_scheme_changed(event.matches());
        })?;
    }
    Ok(())
}
