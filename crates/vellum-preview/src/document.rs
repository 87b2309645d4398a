//! The preview page's own document.
//!
//! ```text
//! <html>
//!   <head><style id="vellum-style">…</style> <script src=…>…</head>
//!   <body>
//!     <div id="vellum-content">          light mode: content here
//!       #shadow-root                     shadow mode: <style> + content here
//!     </div>
//!     <script id="vellum-user-script">
//!   </body>
//! </html>
//! ```

use vellum_dom::{DomTree, ElementData, NodeId};
use vellum_html::{parse_fragment, serialize_children};

use crate::config::RuntimeConfig;

/// Make `css` safe to place inside a `<style>` element: every `</style`,
/// in any case, becomes `<\/style`, so user CSS cannot close the element
/// early.
#[must_use]
pub fn escape_style_text(css: &str) -> String {
    const NEEDLE: &[u8] = b"</style";
    let bytes = css.as_bytes();
    let mut out = String::with_capacity(css.len());
    let mut copied = 0;
    let mut pos = 0;
    while pos + NEEDLE.len() <= bytes.len() {
        if bytes[pos..pos + NEEDLE.len()].eq_ignore_ascii_case(NEEDLE) {
            out.push_str(&css[copied..pos]);
            out.push_str("<\\/");
            copied = pos + 2;
            pos += NEEDLE.len();
        } else {
            pos += 1;
        }
    }
    out.push_str(&css[copied..]);
    out
}

/// The preview page: a fixed skeleton plus whatever the editor rendered.
#[derive(Debug, Clone)]
pub struct PreviewDocument {
    tree: DomTree,
    head: NodeId,
    body: NodeId,
    style: NodeId,
    content: NodeId,
    content_id: String,
    /// The `<style>` element inside the shadow root, in shadow mode.
    shadow_style: Option<NodeId>,
    shadow_mode: bool,
    style_text: String,
    script_id: String,
    external_scripts: Vec<NodeId>,
}

impl PreviewDocument {
    /// Build the empty page skeleton.
    #[must_use]
    pub fn new(config: &RuntimeConfig) -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element(ElementData::new("html"));
        tree.append_child(NodeId::ROOT, html);
        let head = tree.create_element(ElementData::new("head"));
        tree.append_child(html, head);
        let body = tree.create_element(ElementData::new("body"));
        tree.append_child(html, body);

        let style = tree.create_element(element_with_id("style", &config.style_id));
        tree.append_child(head, style);
        let content = tree.create_element(element_with_id("div", &config.content_region_id));
        tree.append_child(body, content);

        Self {
            tree,
            head,
            body,
            style,
            content,
            content_id: config.content_region_id.clone(),
            shadow_style: None,
            shadow_mode: false,
            style_text: String::new(),
            script_id: config.script_id.clone(),
            external_scripts: Vec::new(),
        }
    }

    /// The document tree.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// The content region element.
    #[must_use]
    pub const fn content_region(&self) -> NodeId {
        self.content
    }

    /// Where rendered content lives: the content region's shadow root in
    /// shadow mode, the region itself otherwise.
    #[must_use]
    pub fn content_root(&self) -> NodeId {
        if self.shadow_mode {
            self.tree.shadow_root(self.content).unwrap_or(self.content)
        } else {
            self.content
        }
    }

    /// Whether the last render went into the shadow root.
    #[must_use]
    pub const fn is_shadow_mode(&self) -> bool {
        self.shadow_mode
    }

    /// The current stylesheet text, unescaped.
    #[must_use]
    pub fn style_text(&self) -> &str {
        &self.style_text
    }

    /// Replace the rendered content with `canonical_html`, attached under
    /// the shadow root when `shadow_mode` is set.
    ///
    /// Markup that cannot be parsed is shown as text.
    pub fn render(&mut self, canonical_html: &str, shadow_mode: bool) {
        self.tree.clear_children(self.content);
        if let Some(root) = self.tree.shadow_root(self.content) {
            self.tree.clear_children(root);
        }
        self.shadow_style = None;
        self.shadow_mode = shadow_mode;

        let root = if shadow_mode {
            let root = self
                .tree
                .attach_shadow(self.content)
                .unwrap_or(self.content);
            let style = self.tree.create_element(ElementData::new("style"));
            self.tree.append_child(root, style);
            self.shadow_style = Some(style);
            root
        } else {
            if let Some(element) = self.tree.as_element_mut(self.content) {
                element.shadow_root = None;
            }
            self.content
        };

        match parse_fragment(canonical_html) {
            Ok(fragment) => {
                for &child in fragment.children(NodeId::ROOT) {
                    if let Some(copy) = self.tree.import_subtree(&fragment, child) {
                        self.tree.append_child(root, copy);
                    }
                }
            }
            Err(err) => {
                log::warn!("rendering preview content as text: {err}");
                let text = self.tree.create_text(canonical_html);
                self.tree.append_child(root, text);
            }
        }
        self.apply_style();
    }

    /// Replace the stylesheet.
    pub fn set_style_text(&mut self, css: &str) {
        css.clone_into(&mut self.style_text);
        self.apply_style();
    }

    /// Write the stylesheet into the active `<style>` element and empty the
    /// other one.
    fn apply_style(&mut self) {
        let escaped = escape_style_text(&self.style_text);
        let (active, inactive) = match self.shadow_style {
            Some(shadow_style) => (shadow_style, self.style),
            None => (self.style, self.style),
        };
        self.tree.clear_children(inactive);
        self.tree.clear_children(active);
        if !escaped.is_empty() {
            let text = self.tree.create_text(escaped);
            self.tree.append_child(active, text);
        }
    }

    /// The rendered element carrying `attribute="token"`.
    #[must_use]
    pub fn find_token(&self, attribute: &str, token: &str) -> Option<NodeId> {
        self.tree.descendants(self.content_root()).find(|&id| {
            self.tree
                .as_element(id)
                .and_then(|element| element.get_attribute(attribute))
                == Some(token)
        })
    }

    /// Whether `node` belongs to the rendered content, looking through the
    /// shadow boundary.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        node != self.content && self.tree.composed_path(node).any(|id| id == self.content)
    }

    /// The injected user script element, if there is one.
    #[must_use]
    pub fn user_script(&self) -> Option<NodeId> {
        self.tree.get_element_by_id(self.body, &self.script_id)
    }

    /// Remove the user script element. Returns whether there was one.
    pub fn remove_user_script(&mut self) -> bool {
        let Some(script) = self.user_script() else {
            return false;
        };
        self.tree.detach(script);
        true
    }

    /// Replace the user script element with a fresh one holding `text`.
    pub fn insert_user_script(&mut self, text: &str) -> NodeId {
        let _ = self.remove_user_script();
        let script = self
            .tree
            .create_element(element_with_id("script", &self.script_id));
        let body = self.tree.create_text(text);
        self.tree.append_child(script, body);
        self.tree.append_child(self.body, script);
        script
    }

    /// Append a `<script src>` element for a loaded external script.
    pub fn append_external_script(&mut self, url: &str) {
        let mut data = ElementData::new("script");
        data.set_attribute("src", url);
        let script = self.tree.create_element(data);
        self.tree.append_child(self.head, script);
        self.external_scripts.push(script);
    }

    /// Remove every external script element.
    pub fn clear_external_scripts(&mut self) {
        for script in std::mem::take(&mut self.external_scripts) {
            self.tree.detach(script);
        }
    }

    /// Serialize the whole page.
    ///
    /// In shadow mode the shadow root is written as a declarative
    /// `<template shadowrootmode="open">` inside the content region.
    #[must_use]
    pub fn document_html(&self) -> String {
        let mut export = DomTree::new();
        for &child in self.tree.children(NodeId::ROOT) {
            if let Some(copy) = export.import_subtree(&self.tree, child) {
                export.append_child(NodeId::ROOT, copy);
            }
        }

        if let Some(shadow) = self.tree.shadow_root(self.content)
            && let Some(host) = export.get_element_by_id(NodeId::ROOT, &self.content_id)
        {
            let contents = export.create_fragment(None);
            for &child in self.tree.children(shadow) {
                if let Some(copy) = export.import_subtree(&self.tree, child) {
                    export.append_child(contents, copy);
                }
            }
            let mut data = ElementData::new("template");
            data.set_attribute("shadowrootmode", "open");
            data.template_contents = Some(contents);
            let template = export.create_element(data);
            let first = export.first_child(host);
            export.insert_before(host, template, first);
        }

        format!("<!DOCTYPE html>{}", serialize_children(&export, NodeId::ROOT))
    }
}

fn element_with_id(tag_name: &str, id: &str) -> ElementData {
    let mut data = ElementData::new(tag_name);
    data.set_attribute("id", id);
    data
}
