//! The preview surface.
//!
//! [`PreviewRuntime`] owns the preview page: it answers the `INIT`
//! handshake, repaints content on `RENDER`, swaps styles, runs user and
//! external scripts in the page's realm, outlines hovered elements and
//! reports clicks back to the editor as `SELECT`.
//!
//! Only messages from the configured parent origin are acted on; anything
//! else is dropped before it is looked at.

use vellum_common::channel::{FrameEndpoint, FramePort};
use vellum_common::protocol::{Envelope, PreviewMessage, PreviewSettings};
use vellum_dom::NodeId;
use vellum_js::{JsRuntime, ScriptError};

use crate::config::RuntimeConfig;
use crate::document::PreviewDocument;
use crate::layout::{LayoutProvider, Point, Rect, hit_test};
use crate::overlay::{Highlight, Overlay, nearest_identified};
use crate::scripts::{LoadedScript, NetworkFetcher, ScriptFetcher};

/// The runtime inside the preview frame.
pub struct PreviewRuntime<P: FramePort> {
    config: RuntimeConfig,
    port: P,
    settings: PreviewSettings,
    /// Set once `INIT` has been answered.
    session_id: Option<String>,
    document: PreviewDocument,
    shadow_mode: bool,
    highlight: bool,
    /// Markup of the last `RENDER`, repainted when a mode changes.
    rendered_html: Option<String>,
    overlay: Overlay,
    /// Created on first use and replaced when scripts are disabled.
    js: Option<JsRuntime>,
    external_scripts: Vec<LoadedScript>,
    user_script: Option<String>,
    fetcher: Box<dyn ScriptFetcher>,
    layout: Option<Box<dyn LayoutProvider>>,
}

impl<P: FramePort> PreviewRuntime<P> {
    /// Create a runtime posting to `port`, with an empty page.
    #[must_use]
    pub fn new(config: RuntimeConfig, port: P) -> Self {
        let document = PreviewDocument::new(&config);
        let settings = PreviewSettings::default();
        Self {
            config,
            port,
            shadow_mode: settings.shadow_mode,
            highlight: settings.highlight,
            settings,
            session_id: None,
            document,
            rendered_html: None,
            overlay: Overlay::default(),
            js: None,
            external_scripts: Vec::new(),
            user_script: None,
            fetcher: Box::new(NetworkFetcher),
            layout: None,
        }
    }

    /// Fetch external scripts with `fetcher`.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: impl ScriptFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Take element boxes from `layout`. Without one, outlines carry no
    /// rectangle and point-based events find nothing.
    #[must_use]
    pub fn with_layout(mut self, layout: impl LayoutProvider + 'static) -> Self {
        self.layout = Some(Box::new(layout));
        self
    }

    /// The runtime's configuration.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The outgoing port.
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// Mutable access to the outgoing port.
    pub const fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Settings received in `INIT`, or the defaults before it.
    #[must_use]
    pub const fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    /// The session this runtime acknowledged.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The preview page.
    #[must_use]
    pub const fn document(&self) -> &PreviewDocument {
        &self.document
    }

    /// Current hover and selection outlines.
    #[must_use]
    pub const fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Whether content is attached under a shadow root.
    #[must_use]
    pub const fn is_shadow_mode(&self) -> bool {
        self.shadow_mode
    }

    /// Whether hovered elements are outlined.
    #[must_use]
    pub const fn is_highlighting(&self) -> bool {
        self.highlight
    }

    /// Markup of the last render.
    #[must_use]
    pub fn rendered_html(&self) -> Option<&str> {
        self.rendered_html.as_deref()
    }

    /// External scripts from the last `EXTERNAL_SCRIPTS`, in load order.
    #[must_use]
    pub fn external_scripts(&self) -> &[LoadedScript] {
        &self.external_scripts
    }

    /// The user script currently injected.
    #[must_use]
    pub fn user_script(&self) -> Option<&str> {
        self.user_script.as_deref()
    }

    /// The whole preview page as HTML.
    #[must_use]
    pub fn document_html(&self) -> String {
        self.document.document_html()
    }

    /// The page's script realm, created on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Setup`] if the realm cannot be created.
    pub fn script_runtime(&mut self) -> Result<&mut JsRuntime, ScriptError> {
        if self.js.is_none() {
            self.js = Some(JsRuntime::new()?);
        }
        self.js
            .as_mut()
            .ok_or_else(|| ScriptError::Setup("script realm unavailable".to_string()))
    }

    // ===== Messages =====

    /// Act on a message from the editor.
    pub fn handle_message(&mut self, envelope: Envelope) {
        if !envelope.is_from(&self.config.parent_origin) {
            log::trace!(
                "dropping {} from untrusted origin {}",
                envelope.message.kind(),
                envelope.origin
            );
            return;
        }

        match envelope.message {
            PreviewMessage::Init {
                session_id,
                settings,
            } => self.on_init(session_id, settings),
            PreviewMessage::Render {
                canonical_html,
                css_text,
                shadow_mode,
                highlight,
            } => {
                self.shadow_mode = shadow_mode;
                self.set_highlight_flag(highlight);
                self.document.set_style_text(&css_text);
                self.render(canonical_html);
            }
            PreviewMessage::SetCss { css_text } => self.document.set_style_text(&css_text),
            PreviewMessage::SetHighlight { highlight } => self.set_highlight(highlight),
            PreviewMessage::RunJs { script_text } => self.run_user_script(script_text),
            PreviewMessage::DisableJs => self.disable_scripts(),
            PreviewMessage::ExternalScripts { urls } => self.load_external_scripts(urls),
            other => log::debug!("preview ignores {}", other.kind()),
        }
    }

    fn on_init(&mut self, session_id: String, settings: PreviewSettings) {
        log::debug!("preview acknowledging session {session_id}");
        self.shadow_mode = settings.shadow_mode;
        self.highlight = settings.highlight;
        self.settings = settings;
        self.session_id = Some(session_id.clone());
        self.port.post(PreviewMessage::Ready { session_id });
    }

    fn render(&mut self, canonical_html: String) {
        self.document.render(&canonical_html, self.shadow_mode);
        self.rendered_html = Some(canonical_html);
        self.resolve_outlines();
    }

    fn rerender(&mut self) {
        if let Some(html) = self.rendered_html.take() {
            self.render(html);
        }
    }

    /// Switch shadow mode and repaint.
    pub fn set_shadow_mode(&mut self, shadow_mode: bool) {
        self.shadow_mode = shadow_mode;
        self.rerender();
    }

    /// Switch hover outlining and repaint.
    pub fn set_highlight(&mut self, highlight: bool) {
        self.set_highlight_flag(highlight);
        self.rerender();
    }

    fn set_highlight_flag(&mut self, highlight: bool) {
        self.highlight = highlight;
        if !highlight {
            self.overlay.clear_hover();
        }
    }

    /// Rendering replaced every content node: drop the hover and find the
    /// selected element again by its token.
    fn resolve_outlines(&mut self) {
        self.overlay.clear_hover();
        let Some(token) = self.overlay.selection().map(|h| h.token.clone()) else {
            return;
        };
        match self
            .document
            .find_token(&self.settings.identity_attribute, &token)
        {
            Some(node) => {
                let rect = self.rect_of(node);
                self.overlay.set_selection(Highlight { node, token, rect });
            }
            None => self.overlay.clear_selection(),
        }
    }

    // ===== Scripts =====

    fn run_user_script(&mut self, script_text: String) {
        let _ = self.document.insert_user_script(&script_text);
        let outcome = self
            .script_runtime()
            .and_then(|js| js.execute_injected(&script_text));
        if let Err(err) = outcome {
            log::warn!("user script failed: {err}");
        }
        self.user_script = Some(script_text);
    }

    /// Remove the user script and start a fresh realm. Successfully loaded
    /// external scripts are run again in the new realm.
    fn disable_scripts(&mut self) {
        let _ = self.document.remove_user_script();
        self.user_script = None;
        let Some(js) = self.js.as_mut() else {
            return;
        };
        if let Err(err) = js.reset() {
            log::warn!("could not reset script realm: {err}");
            self.js = None;
            return;
        }
        for script in &self.external_scripts {
            if let Some(source) = &script.source
                && let Err(err) = js.execute(source)
            {
                log::warn!("external script {} failed: {err}", script.url);
            }
        }
    }

    /// Load `urls` strictly in order. A script that fails to load or run is
    /// logged and skipped; the rest still load. The same list again is a
    /// no-op.
    fn load_external_scripts(&mut self, urls: Vec<String>) {
        let unchanged = urls.len() == self.external_scripts.len()
            && urls
                .iter()
                .zip(&self.external_scripts)
                .all(|(url, loaded)| *url == loaded.url);
        if unchanged {
            log::debug!("external script list unchanged");
            return;
        }

        self.document.clear_external_scripts();
        let mut loaded = Vec::with_capacity(urls.len());
        for url in urls {
            let source = match self.fetcher.fetch(&url) {
                Ok(source) => source,
                Err(err) => {
                    log::warn!("external script {url} failed to load: {err}");
                    loaded.push(LoadedScript { url, source: None });
                    continue;
                }
            };
            self.document.append_external_script(&url);
            let outcome = self.script_runtime().and_then(|js| js.execute(&source));
            if let Err(err) = outcome {
                log::warn!("external script {url} failed: {err}");
            }
            loaded.push(LoadedScript {
                url,
                source: Some(source),
            });
        }
        self.external_scripts = loaded;
    }

    // ===== Pointer =====

    fn rect_of(&self, node: NodeId) -> Option<Rect> {
        self.layout
            .as_deref()
            .and_then(|layout| layout.bounding_rect(self.document.tree(), node))
    }

    fn identified(&self, target: NodeId) -> Option<Highlight> {
        if !self.document.contains(target) {
            return None;
        }
        let (node, token) = nearest_identified(
            self.document.tree(),
            target,
            &self.settings.identity_attribute,
        )?;
        if !self.document.contains(node) {
            return None;
        }
        Some(Highlight {
            node,
            token: token.to_string(),
            rect: self.rect_of(node),
        })
    }

    /// The pointer entered `target`: outline its nearest identified
    /// ancestor, if highlighting is on.
    pub fn pointer_over(&mut self, target: NodeId) {
        match self.identified(target).filter(|_| self.highlight) {
            Some(highlight) => self.overlay.set_hover(highlight),
            None => self.overlay.clear_hover(),
        }
    }

    /// The pointer left the content.
    pub fn pointer_out(&mut self) {
        self.overlay.clear_hover();
    }

    /// `target` was clicked. Selects its nearest identified ancestor and
    /// reports it to the editor.
    ///
    /// Returns whether the click's default action is suppressed, which it is
    /// for every click inside the content.
    pub fn click(&mut self, target: NodeId) -> bool {
        if !self.document.contains(target) {
            return false;
        }
        if let Some(highlight) = self.identified(target) {
            log::debug!("preview selected {}", highlight.token);
            self.port.post(PreviewMessage::Select {
                token: highlight.token.clone(),
            });
            self.overlay.set_selection(highlight);
        }
        true
    }

    /// The topmost element at `point`, if a layout is attached.
    #[must_use]
    pub fn element_at(&self, point: Point) -> Option<NodeId> {
        let layout = self.layout.as_deref()?;
        hit_test(self.document.tree(), NodeId::ROOT, point, layout)
    }

    /// [`Self::pointer_over`] the element at `point`.
    pub fn hover_at(&mut self, point: Point) {
        match self.element_at(point) {
            Some(target) => self.pointer_over(target),
            None => self.pointer_out(),
        }
    }

    /// [`Self::click`] the element at `point`.
    pub fn click_at(&mut self, point: Point) -> bool {
        self.element_at(point)
            .is_some_and(|target| self.click(target))
    }

    /// Recompute outline boxes after the layout changed.
    pub fn refresh_layout(&mut self) {
        let hover = self.overlay.hover().map(|h| h.node);
        let selection = self.overlay.selection().map(|h| h.node);
        let hover_rect = hover.and_then(|node| self.rect_of(node));
        let selection_rect = selection.and_then(|node| self.rect_of(node));
        if let Some(h) = self.overlay.hover_mut() {
            h.rect = hover_rect;
        }
        if let Some(h) = self.overlay.selection_mut() {
            h.rect = selection_rect;
        }
    }
}

impl PreviewRuntime<FrameEndpoint> {
    /// Handle everything delivered to the frame endpoint. Returns how many
    /// messages were handled.
    pub fn pump(&mut self) -> usize {
        let received = self.port.drain();
        let count = received.len();
        for envelope in received {
            self.handle_message(envelope);
        }
        count
    }
}
