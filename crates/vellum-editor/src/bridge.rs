//! The editor side of the preview protocol.
//!
//! [`PreviewBridge`] owns everything the editor knows about one preview
//! surface: the readiness handshake, messages waiting for it, the offset map
//! of the latest canonicalization pass and the current selection.
//!
//! ```text
//!  Initializing --(preview loaded: INIT)--> AwaitingReady --(READY)--> Ready
//!        ^                                        |                      |
//!        +--------------- preview navigated ------+----------------------+
//! ```

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use vellum_common::channel::{FrameEndpoint, FramePort};
use vellum_common::protocol::{Envelope, PreviewMessage};
use vellum_css::CssRuleIndex;
use vellum_dom::{DomTree, ElementData, NodeId};
use vellum_html::{parse_fragment, serialize_children};

use crate::canonicalize::Canonicalizer;
use crate::collaborators::{
    CompileError, CompileRequest, EditorSurface, ShortcodeExpander, ShortcodeRequest,
    UtilityCssCompiler,
};
use crate::config::BridgeConfig;
use crate::debounce::Debouncer;
use crate::line_index::{EditorRange, LineIndex};
use crate::shortcode::{Shortcode, find_shortcodes};

/// Where the handshake with the preview surface stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BridgeState {
    /// No preview document has loaded yet.
    Initializing,
    /// `INIT` was sent; waiting for `READY` with the same session id.
    AwaitingReady,
    /// The preview is listening; messages are delivered immediately.
    Ready,
}

/// The element the user last selected in the preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    /// Its identity token.
    pub selected_token: Option<String>,
}

/// A script request; the latest one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptAction {
    Run,
    Disable,
}

/// Messages held back until the preview is ready. Each is rebuilt from the
/// bridge's state when flushed.
#[derive(Debug, Default)]
struct Pending {
    render: bool,
    external_scripts: bool,
    script: Option<ScriptAction>,
}

impl Pending {
    const fn is_empty(&self) -> bool {
        !self.render && !self.external_scripts && self.script.is_none()
    }
}

/// A parsed copy of the markup the preview is showing, wrapped in
/// `<html><body>` so document-level selectors match as they do there.
#[derive(Debug)]
struct RenderClone {
    html: String,
    tree: DomTree,
}

impl RenderClone {
    fn build(html: &str) -> Option<Self> {
        let fragment = match parse_fragment(html) {
            Ok(fragment) => fragment,
            Err(err) => {
                log::warn!("cannot build render clone for rule matching: {err}");
                return None;
            }
        };

        let mut tree = DomTree::new();
        let root = tree.create_element(ElementData::new("html"));
        tree.append_child(NodeId::ROOT, root);
        let body = tree.create_element(ElementData::new("body"));
        tree.append_child(root, body);
        for &child in fragment.children(NodeId::ROOT) {
            if let Some(copy) = tree.import_subtree(&fragment, child) {
                tree.append_child(body, copy);
            }
        }

        Some(Self {
            html: html.to_string(),
            tree,
        })
    }

    fn find(&self, attribute: &str, token: &str) -> Option<NodeId> {
        self.tree.descendants(NodeId::ROOT).find(|&id| {
            self.tree
                .as_element(id)
                .and_then(|element| element.get_attribute(attribute))
                == Some(token)
        })
    }
}

/// Elements whose text is never treated as markup.
const OPAQUE_TEXT_PARENTS: &[&str] = &["script", "style", "textarea", "title"];

fn in_opaque_text(tree: &DomTree, node: NodeId) -> bool {
    tree.parent(node)
        .and_then(|parent| tree.as_element(parent))
        .is_some_and(|parent| OPAQUE_TEXT_PARENTS.contains(&parent.tag_name.as_str()))
}

/// Replace text node `node` with its text, each shortcode in it swapped for
/// the cached rendering.
fn splice_shortcodes(
    tree: &mut DomTree,
    node: NodeId,
    shortcodes: &[Shortcode],
    cache: &HashMap<String, String>,
) {
    let (Some(parent), Some(text)) = (tree.parent(node), tree.as_text(node)) else {
        return;
    };
    let text = text.to_string();

    let mut cursor = 0;
    for shortcode in shortcodes {
        let Some(output) = cache.get(&shortcode.fragment) else {
            continue;
        };
        if shortcode.range.start > cursor {
            let before = tree.create_text(&text[cursor..shortcode.range.start]);
            tree.insert_before(parent, before, Some(node));
        }
        match parse_fragment(output) {
            Ok(rendered) => {
                for &child in rendered.children(NodeId::ROOT) {
                    if let Some(copy) = tree.import_subtree(&rendered, child) {
                        tree.insert_before(parent, copy, Some(node));
                    }
                }
            }
            Err(err) => log::warn!("dropping unparseable shortcode output: {err}"),
        }
        cursor = shortcode.range.end;
    }
    if cursor < text.len() {
        let after = tree.create_text(&text[cursor..]);
        tree.insert_before(parent, after, Some(node));
    }
    tree.remove_child(parent, node);
}

/// State of the utility-CSS compile cycle.
#[derive(Debug)]
struct CompileState {
    debouncer: Debouncer,
    next_id: u64,
    /// The request whose response will be applied.
    awaited: Option<u64>,
    /// The last stylesheet the compiler produced.
    last_good_css: String,
    status: Option<String>,
}

/// Editor-side endpoint of one preview surface.
///
/// `P` carries messages to the preview; `E` is the text editor the bridge
/// decorates when the user selects something in the preview.
pub struct PreviewBridge<P: FramePort, E: EditorSurface> {
    config: BridgeConfig,
    port: P,
    editor: E,
    compiler: Option<Box<dyn UtilityCssCompiler>>,
    expander: Option<Box<dyn ShortcodeExpander>>,

    state: BridgeState,
    session_id: Option<String>,
    loads: u64,
    pending: Pending,

    source_text: String,
    css_text: String,
    script_text: String,
    external_scripts: Vec<String>,
    script_action: Option<ScriptAction>,
    rendered: bool,

    canonicalizer: Canonicalizer,
    canonical_html: String,
    render_clone: Option<RenderClone>,
    selection: SelectionState,

    compile: CompileState,

    /// Rendered HTML by shortcode fragment.
    shortcode_cache: HashMap<String, String>,
    next_shortcode_id: u64,
}

impl<P: FramePort, E: EditorSurface> PreviewBridge<P, E> {
    /// Create a bridge that talks through `port` and decorates `editor`.
    #[must_use]
    pub fn new(config: BridgeConfig, port: P, editor: E) -> Self {
        let canonicalizer = Canonicalizer::new(config.identity.clone());
        let debouncer = Debouncer::new(config.compile_debounce());
        Self {
            config,
            port,
            editor,
            compiler: None,
            expander: None,
            state: BridgeState::Initializing,
            session_id: None,
            loads: 0,
            pending: Pending::default(),
            source_text: String::new(),
            css_text: String::new(),
            script_text: String::new(),
            external_scripts: Vec::new(),
            script_action: None,
            rendered: false,
            canonicalizer,
            canonical_html: String::new(),
            render_clone: None,
            selection: SelectionState::default(),
            compile: CompileState {
                debouncer,
                next_id: 0,
                awaited: None,
                last_good_css: String::new(),
                status: None,
            },
            shortcode_cache: HashMap::new(),
            next_shortcode_id: 0,
        }
    }

    /// Attach the utility-CSS compiler.
    #[must_use]
    pub fn with_compiler(mut self, compiler: Box<dyn UtilityCssCompiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Attach the shortcode expander.
    #[must_use]
    pub fn with_expander(mut self, expander: Box<dyn ShortcodeExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    // ===== Accessors =====

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Handshake state.
    #[must_use]
    pub const fn state(&self) -> BridgeState {
        self.state
    }

    /// Session id of the current handshake.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The current selection.
    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// The port messages go out through.
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// Mutable access to the port.
    pub const fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// The editor surface.
    #[must_use]
    pub const fn editor(&self) -> &E {
        &self.editor
    }

    /// Markup of the latest render, shortcodes expanded.
    #[must_use]
    pub fn canonical_html(&self) -> &str {
        &self.canonical_html
    }

    /// Status message from the last failed compile.
    #[must_use]
    pub fn compile_status(&self) -> Option<&str> {
        self.compile.status.as_deref()
    }

    /// The stylesheet the preview receives: the hand-written one, or the
    /// last successful compile in utility-CSS mode.
    #[must_use]
    pub fn effective_css(&self) -> &str {
        if self.config.utility_css {
            &self.compile.last_good_css
        } else {
            &self.css_text
        }
    }

    // ===== Handshake =====

    /// The preview surface (re)loaded a document: start a new handshake.
    ///
    /// Whatever the old document showed is gone, so the current render,
    /// external scripts and a running script are queued again for the new
    /// one.
    pub fn on_preview_loaded(&mut self) {
        self.loads += 1;
        let session_id = format!("{}:{}", self.config.post_id, self.loads);
        self.session_id = Some(session_id.clone());
        self.state = BridgeState::AwaitingReady;

        self.pending.render |= self.rendered;
        self.pending.external_scripts |= !self.external_scripts.is_empty();
        if self.pending.script.is_none() && self.script_action == Some(ScriptAction::Run) {
            self.pending.script = Some(ScriptAction::Run);
        }

        log::debug!("sending INIT for session {session_id}");
        self.port.post(PreviewMessage::Init {
            session_id,
            settings: self.config.preview_settings(),
        });
    }

    /// Handle one message received from the preview window.
    ///
    /// Messages from any origin other than the configured preview origin are
    /// dropped without a trace in the bridge's state.
    pub fn handle_message(&mut self, envelope: Envelope) {
        if !envelope.is_from(&self.config.preview_origin) {
            log::trace!(
                "dropping {} from untrusted origin {}",
                envelope.message.kind(),
                envelope.origin
            );
            return;
        }
        match envelope.message {
            PreviewMessage::Ready { session_id } => self.on_ready(&session_id),
            PreviewMessage::Select { token } => self.handle_selection(&token),
            other => log::debug!("ignoring {} from the preview", other.kind()),
        }
    }

    fn on_ready(&mut self, session_id: &str) {
        if self.state != BridgeState::AwaitingReady {
            log::debug!("ignoring READY while {}", self.state);
            return;
        }
        if self.session_id.as_deref() != Some(session_id) {
            log::debug!("ignoring READY for stale session {session_id}");
            return;
        }
        self.state = BridgeState::Ready;
        self.flush();
    }

    /// Deliver everything queued while the preview was not ready: the
    /// render first, then external scripts, then the script request.
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        log::debug!("preview ready, flushing queued messages");
        if pending.render {
            self.post(self.render_message());
        }
        if pending.external_scripts {
            self.post(PreviewMessage::ExternalScripts {
                urls: self.external_scripts.clone(),
            });
        }
        match pending.script {
            Some(ScriptAction::Run) => self.post(self.run_js_message()),
            Some(ScriptAction::Disable) => self.post(PreviewMessage::DisableJs),
            None => {}
        }
    }

    fn post(&mut self, message: PreviewMessage) {
        log::debug!("posting {} to the preview", message.kind());
        self.port.post(message);
    }

    const fn is_ready(&self) -> bool {
        matches!(self.state, BridgeState::Ready)
    }

    // ===== Source text =====

    /// The source text changed: drop the selection, re-render, and in
    /// utility-CSS mode schedule a recompile.
    pub fn on_source_text_changed(&mut self, source_text: impl Into<String>, now: Instant) {
        self.source_text = source_text.into();
        self.canonicalizer.invalidate();
        self.clear_selection();
        self.send_render();
        if self.config.utility_css {
            self.request_compile(now);
        }
    }

    /// Canonicalize the current source text and send it to the preview, or
    /// queue it until the preview is ready. A queued render is replaced by
    /// later ones.
    pub fn send_render(&mut self) {
        self.rendered = true;
        self.refresh_canonical();
        if self.is_ready() {
            self.post(self.render_message());
        } else {
            log::debug!("preview not ready, render queued");
            self.pending.render = true;
        }
    }

    fn render_message(&self) -> PreviewMessage {
        PreviewMessage::Render {
            canonical_html: self.canonical_html.clone(),
            css_text: self.effective_css().to_string(),
            shadow_mode: self.config.shadow_mode,
            highlight: self.config.highlight,
        }
    }

    /// Bring the canonical markup and the render clone up to date with the
    /// source text.
    fn refresh_canonical(&mut self) {
        let html = self
            .canonicalizer
            .canonicalize(&self.source_text)
            .canonical_html
            .clone();
        let html = self.expand_shortcodes(html);

        if self
            .render_clone
            .as_ref()
            .is_none_or(|clone| clone.html != html)
        {
            self.render_clone = RenderClone::build(&html);
        }
        self.canonical_html = html;
    }

    /// Replace shortcode placeholders in `html` with their rendered markup.
    ///
    /// Only placeholders standing in text content are replaced; attribute
    /// values and raw-text elements keep them literally. Each distinct
    /// placeholder is sent to the expander once; what comes back is cached
    /// for the bridge's lifetime. Placeholders the expander does not answer
    /// render as nothing.
    fn expand_shortcodes(&mut self, html: String) -> String {
        let Some(expander) = self.expander.as_mut() else {
            return html;
        };
        let in_source: Vec<String> = find_shortcodes(&self.source_text)
            .into_iter()
            .map(|shortcode| shortcode.fragment)
            .collect();
        if in_source.is_empty() {
            return html;
        }
        let mut tree = match parse_fragment(&html) {
            Ok(tree) => tree,
            Err(err) => {
                log::warn!("leaving shortcodes unexpanded: {err}");
                return html;
            }
        };

        let placements: Vec<(NodeId, Vec<Shortcode>)> = tree
            .descendants(NodeId::ROOT)
            .filter(|&node| !in_opaque_text(&tree, node))
            .filter_map(|node| {
                let found: Vec<Shortcode> = find_shortcodes(tree.as_text(node)?)
                    .into_iter()
                    .filter(|shortcode| in_source.contains(&shortcode.fragment))
                    .collect();
                (!found.is_empty()).then_some((node, found))
            })
            .collect();
        if placements.is_empty() {
            return html;
        }

        let mut requests: Vec<ShortcodeRequest> = Vec::new();
        for shortcode in placements.iter().flat_map(|(_, found)| found) {
            let known = self.shortcode_cache.contains_key(&shortcode.fragment)
                || requests
                    .iter()
                    .any(|request| request.source_fragment == shortcode.fragment);
            if !known {
                self.next_shortcode_id += 1;
                requests.push(ShortcodeRequest {
                    id: format!("shortcode-{}", self.next_shortcode_id),
                    source_fragment: shortcode.fragment.clone(),
                });
            }
        }
        if !requests.is_empty() {
            let mut rendered = expander.expand(&requests);
            for request in requests {
                let output = rendered.remove(&request.id).unwrap_or_default();
                let _ = self.shortcode_cache.insert(request.source_fragment, output);
            }
        }

        for (node, shortcodes) in &placements {
            splice_shortcodes(&mut tree, *node, shortcodes, &self.shortcode_cache);
        }
        serialize_children(&tree, NodeId::ROOT)
    }

    // ===== Stylesheet =====

    /// The stylesheet text changed.
    ///
    /// Hand-written CSS goes to the preview straight away and the selected
    /// element's rule highlights are recomputed. In utility-CSS mode the
    /// text is compiler input and schedules a recompile instead.
    pub fn on_css_text_changed(&mut self, css_text: impl Into<String>, now: Instant) {
        self.css_text = css_text.into();
        if self.config.utility_css {
            self.request_compile(now);
            return;
        }
        self.send_css_update();
        if let Some(token) = self.selection.selected_token.clone() {
            self.highlight_matching_rules(&token);
        }
    }

    /// Send the current stylesheet alone. Dropped when the preview is not
    /// ready, since the next render carries the stylesheet anyway.
    pub fn send_css_update(&mut self) {
        if self.is_ready() {
            self.post(PreviewMessage::SetCss {
                css_text: self.effective_css().to_string(),
            });
        } else {
            log::trace!("preview not ready, stylesheet update dropped");
        }
    }

    // ===== Modes =====

    /// Toggle shadow mode; the preview re-renders into the new attachment
    /// point.
    pub fn set_shadow_mode(&mut self, shadow_mode: bool) {
        self.config.shadow_mode = shadow_mode;
        self.send_render();
    }

    /// Toggle hover highlighting in the preview.
    pub fn set_highlight(&mut self, highlight: bool) {
        self.config.highlight = highlight;
        if self.is_ready() {
            self.post(PreviewMessage::SetHighlight { highlight });
        }
    }

    /// Switch between hand-written and compiled stylesheets.
    pub fn set_utility_css(&mut self, utility_css: bool, now: Instant) {
        self.config.utility_css = utility_css;
        if utility_css {
            self.request_compile(now);
        } else {
            self.compile.debouncer.cancel();
            self.compile.awaited = None;
        }
        self.send_css_update();
    }

    // ===== Scripts =====

    /// Replace the user script text. It runs on the next
    /// [`Self::request_run_js`].
    pub fn set_script_text(&mut self, script_text: impl Into<String>) {
        self.script_text = script_text.into();
    }

    /// Load `urls` in the preview, in order.
    pub fn send_external_scripts(&mut self, urls: Vec<String>) {
        self.external_scripts = urls;
        if self.is_ready() {
            self.post(PreviewMessage::ExternalScripts {
                urls: self.external_scripts.clone(),
            });
        } else {
            log::debug!("preview not ready, external scripts queued");
            self.pending.external_scripts = true;
        }
    }

    /// Run the user script in the preview, replacing any earlier run.
    pub fn request_run_js(&mut self) {
        self.request_script(ScriptAction::Run);
    }

    /// Remove the user script from the preview.
    pub fn request_disable_js(&mut self) {
        self.request_script(ScriptAction::Disable);
    }

    fn request_script(&mut self, action: ScriptAction) {
        self.script_action = Some(action);
        if self.is_ready() {
            let message = match action {
                ScriptAction::Run => self.run_js_message(),
                ScriptAction::Disable => PreviewMessage::DisableJs,
            };
            self.post(message);
        } else {
            log::debug!("preview not ready, script request queued");
            self.pending.script = Some(action);
        }
    }

    fn run_js_message(&self) -> PreviewMessage {
        PreviewMessage::RunJs {
            script_text: self.script_text.clone(),
        }
    }

    // ===== Selection =====

    /// The user selected the element `token` names in the preview.
    ///
    /// A token missing from the latest offset map is stale: it is logged and
    /// nothing changes. Otherwise the element's source range is highlighted
    /// and scrolled into view, along with the stylesheet rules that apply to
    /// it unless the stylesheet is compiled.
    pub fn handle_selection(&mut self, token: &str) {
        let Some(range) = self
            .canonicalizer
            .cached()
            .and_then(|result| result.range_of(token))
        else {
            log::debug!("ignoring selection of unknown token {token}");
            return;
        };

        self.selection.selected_token = Some(token.to_string());
        let editor_range = LineIndex::new(&self.source_text).range(range);
        self.editor.highlight_source(editor_range);
        self.editor.reveal_source(editor_range);

        if !self.config.utility_css {
            self.highlight_matching_rules(token);
        }
    }

    /// Highlight the stylesheet rules that apply to the element `token`
    /// names in the render clone.
    fn highlight_matching_rules(&mut self, token: &str) {
        let Some(clone) = &self.render_clone else {
            return;
        };
        let Some(node) = clone.find(&self.config.identity.attribute, token) else {
            log::debug!("token {token} not present in the rendered markup");
            return;
        };

        let lines = LineIndex::new(&self.css_text);
        let ranges: Vec<EditorRange> = CssRuleIndex::parse(&self.css_text)
            .matching(&clone.tree, node, &self.config.media)
            .iter()
            .filter_map(|rule| rule.range())
            .map(|range| lines.range(range))
            .collect();
        self.editor.highlight_css_rules(&ranges);
    }

    /// Forget the selection and remove its decorations.
    pub fn clear_selection(&mut self) {
        self.selection.selected_token = None;
        self.editor.clear_highlights();
    }

    // ===== Utility CSS =====

    /// Ask for a recompile once the source has been quiet for the
    /// configured interval. Call [`Self::poll`] to send it.
    pub fn request_compile(&mut self, now: Instant) {
        self.compile.debouncer.schedule(now);
    }

    /// Send a due compile request. Returns the request id if one was sent.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        if !self.compile.debouncer.fire(now) {
            return None;
        }
        let Some(compiler) = self.compiler.as_mut() else {
            log::debug!("no stylesheet compiler attached, compile skipped");
            return None;
        };

        self.compile.next_id += 1;
        let id = self.compile.next_id;
        self.compile.awaited = Some(id);
        compiler.request(CompileRequest {
            id,
            html_text: self.source_text.clone(),
            css_directives: self.css_text.clone(),
        });
        Some(id)
    }

    /// When the pending compile request becomes due.
    #[must_use]
    pub const fn compile_deadline(&self) -> Option<Instant> {
        self.compile.debouncer.deadline()
    }

    /// Apply the compiler's answer to request `id`.
    ///
    /// Answers to superseded requests are discarded. A failure keeps the
    /// last good stylesheet and shows the error as a status message.
    pub fn on_compile_result(&mut self, id: u64, result: Result<String, CompileError>) {
        if self.compile.awaited != Some(id) {
            log::debug!("discarding late compile result {id}");
            return;
        }
        self.compile.awaited = None;

        match result {
            Ok(css) => {
                self.compile.last_good_css = css;
                self.compile.status = None;
                self.editor.show_status(None);
                self.send_css_update();
            }
            Err(err) => {
                log::warn!("{err}");
                let status = err.to_string();
                self.editor.show_status(Some(&status));
                self.compile.status = Some(status);
            }
        }
    }
}

impl<E: EditorSurface> PreviewBridge<FrameEndpoint, E> {
    /// Handle every message waiting on the endpoint. Returns how many were
    /// delivered.
    pub fn pump(&mut self) -> usize {
        let received = self.port.drain();
        let count = received.len();
        for envelope in received {
            self.handle_message(envelope);
        }
        count
    }
}
