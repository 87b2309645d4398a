use vellum_dom::{
    Attribute, DomTree, ElementData, ElementLocation, Namespace, NodeId, NodeType, SourceRange,
    is_void_element,
};

use super::foreign_content::{
    adjust_attributes, adjust_tag_name, is_breakout_tag, is_integration_point,
};
use crate::ParseError;
use crate::tokenizer::{self, Token};

/// Deepest stack of open elements a fragment may build before parsing is
/// abandoned with [`ParseError::TooDeep`].
pub const MAX_OPEN_ELEMENTS: usize = 512;

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// Scope markers: applet, caption, html, table, td, th, marquee, object, template.
const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];

/// "has an element in button scope": default scope markers plus button.
const BUTTON_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "button",
];

/// "has an element in list item scope": default scope markers plus ol and ul.
const LIST_ITEM_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "ol",
    "ul",
];

/// "has an element in table scope": html, table, template.
const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// A recoverable problem found while building the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Description of the problem.
    pub message: String,
    /// Index into the token stream where this error was encountered.
    pub token_index: usize,
    /// Byte offset of the offending token in the source.
    pub offset: usize,
}

/// A start tag as the tree builder sees it.
struct StartTag {
    name: String,
    self_closing: bool,
    attributes: Vec<Attribute>,
    span: SourceRange,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Forgiving fragment tree builder.
///
/// Builds the children of an implied `<body>` context from a token stream,
/// recording where every element came from in the source. It follows the
/// "in body" and table insertion mode rules for implied end tags and scope,
/// but never relocates content: there is no adoption agency algorithm and no
/// foster parenting, so every node lands under the element that was open
/// when its token was read.
pub struct FragmentParser {
    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// The fragment container (`NodeId::ROOT`) is never on the stack.
    stack_of_open_elements: Vec<NodeId>,

    /// The tree under construction; top-level nodes are children of `NodeId::ROOT`.
    tree: DomTree,

    /// Input tokens from the tokenizer.
    tokens: Vec<Token>,

    /// Current position in token stream.
    token_index: usize,

    /// Byte offset where the current token starts.
    token_start: usize,

    /// Parse issues encountered during parsing.
    issues: Vec<ParseIssue>,

    /// Limit on the depth of the stack of open elements.
    max_depth: usize,
}

impl FragmentParser {
    /// Create a new parser from a token stream.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            stack_of_open_elements: Vec::new(),
            tree: DomTree::new(),
            tokens,
            token_index: 0,
            token_start: 0,
            issues: Vec::new(),
            max_depth: MAX_OPEN_ELEMENTS,
        }
    }

    /// Override the nesting limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Run the parser and return the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TooDeep`] when elements nest deeper than the
    /// configured limit.
    pub fn run(self) -> Result<DomTree, ParseError> {
        self.run_with_issues().map(|(tree, _)| tree)
    }

    /// Run the parser and return both the tree and any parse issues.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TooDeep`] when elements nest deeper than the
    /// configured limit.
    pub fn run_with_issues(mut self) -> Result<(DomTree, Vec<ParseIssue>), ParseError> {
        let tokens = std::mem::take(&mut self.tokens);
        for (index, token) in tokens.into_iter().enumerate() {
            self.token_index = index;
            if let Some(span) = token.span() {
                self.token_start = span.start;
            }
            self.process_token(token)?;
        }
        Ok((self.tree, self.issues))
    }

    /// Record a recoverable parse problem.
    fn parse_warning(&mut self, message: String) {
        log::debug!(target: "vellum::html", "{message} (byte {})", self.token_start);
        self.issues.push(ParseIssue {
            message,
            token_index: self.token_index,
            offset: self.token_start,
        });
    }

    fn process_token(&mut self, token: Token) -> Result<(), ParseError> {
        match token {
            Token::Character { data } => {
                self.insert_character(data);
                Ok(())
            }
            Token::Comment { data, .. } => {
                self.insert_comment(data);
                Ok(())
            }
            Token::Doctype { .. } => {
                self.parse_warning("DOCTYPE ignored in fragment".to_string());
                Ok(())
            }
            Token::StartTag {
                name,
                self_closing,
                attributes,
                span,
            } => self.handle_start_tag(StartTag {
                name,
                self_closing,
                attributes: attributes.into_iter().map(Self::dom_attribute).collect(),
                span,
            }),
            Token::EndTag { name, span } => self.handle_end_tag(&name, span),
            Token::EndOfFile { offset } => {
                self.handle_eof(offset);
                Ok(())
            }
        }
    }

    fn dom_attribute(attribute: tokenizer::Attribute) -> Attribute {
        Attribute::new(attribute.name, attribute.value)
    }

    // ===== stack of open elements =====

    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    /// Whether `id` is an HTML element named `tag_name`.
    fn is_html_element(&self, id: NodeId, tag_name: &str) -> bool {
        self.tree
            .as_element(id)
            .is_some_and(|e| e.namespace == Namespace::Html && e.tag_name == tag_name)
    }

    fn current_node_is_one_of(&self, tag_names: &[&str]) -> bool {
        self.current_node()
            .is_some_and(|id| tag_names.iter().any(|name| self.is_html_element(id, name)))
    }

    /// [§ 13.2.6.1 Appropriate place for inserting a node](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// "If the adjusted insertion location is inside a template element, let
    /// it instead be inside the template element's template contents"
    fn insertion_parent(&self) -> NodeId {
        let Some(current) = self.current_node() else {
            return NodeId::ROOT;
        };
        self.tree.template_contents(current).unwrap_or(current)
    }

    /// Whether `id` is a foreign element whose children follow the rules
    /// for foreign content.
    fn is_foreign_content_node(&self, id: NodeId) -> bool {
        self.tree.as_element(id).is_some_and(|e| {
            e.namespace != Namespace::Html && !is_integration_point(&e.tag_name, e.namespace)
        })
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    fn in_foreign_content(&self) -> bool {
        self.current_node()
            .is_some_and(|id| self.is_foreign_content_node(id))
    }

    /// The namespace new foreign elements inherit.
    fn current_namespace(&self) -> Namespace {
        self.current_node()
            .and_then(|id| self.tree.as_element(id))
            .map_or(Namespace::Html, |e| e.namespace)
    }

    /// Record that `id` was closed implicitly at byte `closed_at`.
    fn close_element_at(&mut self, id: NodeId, closed_at: usize) {
        if let Some(location) = self
            .tree
            .as_element_mut(id)
            .and_then(|e| e.location.as_mut())
        {
            location.span.end = closed_at.max(location.start_tag.end);
        }
    }

    /// Record that `id` was closed by the end tag spanning `end_tag`.
    fn close_element_with_end_tag(&mut self, id: NodeId, end_tag: SourceRange) {
        if let Some(location) = self
            .tree
            .as_element_mut(id)
            .and_then(|e| e.location.as_mut())
        {
            location.end_tag = Some(end_tag);
            location.span.end = end_tag.end;
        }
    }

    /// Pop the current node, closing it where the current token starts.
    fn pop_current_node(&mut self) -> Option<NodeId> {
        let id = self.stack_of_open_elements.pop()?;
        self.close_element_at(id, self.token_start);
        Some(id)
    }

    /// Pop elements until an HTML element named one of `tag_names` has been
    /// popped. Everything is closed where the current token starts.
    fn pop_until_one_of(&mut self, tag_names: &[&str]) {
        while let Some(id) = self.pop_current_node() {
            if tag_names.iter().any(|name| self.is_html_element(id, name)) {
                break;
            }
        }
    }

    /// Pop every element above `index`, then the element at `index`, which
    /// is closed by `end_tag` when there is one.
    fn close_through(&mut self, index: usize, end_tag: Option<SourceRange>) {
        while self.stack_of_open_elements.len() > index + 1 {
            let _ = self.pop_current_node();
        }
        let Some(id) = self.stack_of_open_elements.pop() else {
            return;
        };
        match end_tag {
            Some(end_tag) => self.close_element_with_end_tag(id, end_tag),
            None => self.close_element_at(id, self.token_start),
        }
    }

    /// Pop elements until an HTML element named one of `tag_names` has been
    /// popped; that element is closed by `end_tag`.
    fn close_with_end_tag(&mut self, tag_names: &[&str], end_tag: SourceRange) {
        let target = self.stack_of_open_elements.iter().rposition(|&id| {
            tag_names.iter().any(|name| self.is_html_element(id, name))
        });
        if let Some(index) = target {
            self.close_through(index, Some(end_tag));
        }
    }

    /// [§ 13.2.4.2 Has an element in the specific scope](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// STEP 1: "Initialize node to be the current node."
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to step 2."
    fn has_element_in_specific_scope(
        &self,
        tag_name: &str,
        scope_markers: &[&str],
        foreign_markers: bool,
    ) -> bool {
        for &node_id in self.stack_of_open_elements.iter().rev() {
            let Some(element) = self.tree.as_element(node_id) else {
                continue;
            };
            if element.namespace == Namespace::Html {
                if element.tag_name == tag_name {
                    return true;
                }
                if scope_markers.contains(&element.tag_name.as_str()) {
                    return false;
                }
            } else if foreign_markers
                && (is_integration_point(&element.tag_name, element.namespace)
                    || element.tag_name == "annotation-xml")
            {
                return false;
            }
        }
        false
    }

    fn has_element_in_scope(&self, tag_name: &str) -> bool {
        self.has_element_in_specific_scope(tag_name, DEFAULT_SCOPE, true)
    }

    fn has_element_in_button_scope(&self, tag_name: &str) -> bool {
        self.has_element_in_specific_scope(tag_name, BUTTON_SCOPE, true)
    }

    fn has_element_in_list_item_scope(&self, tag_name: &str) -> bool {
        self.has_element_in_specific_scope(tag_name, LIST_ITEM_SCOPE, true)
    }

    fn has_element_in_table_scope(&self, tag_name: &str) -> bool {
        self.has_element_in_specific_scope(tag_name, TABLE_SCOPE, false)
    }

    /// [§ 13.2.6.3 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element, an
    /// rp element, an rt element, or an rtc element, the user agent must pop
    /// the current node off the stack of open elements."
    fn generate_implied_end_tags(&mut self, exclude: Option<&str>) {
        const IMPLIED_END_TAG_ELEMENTS: &[&str] = &[
            "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
        ];

        while let Some(current) = self.current_node() {
            let implied = IMPLIED_END_TAG_ELEMENTS
                .iter()
                .any(|&name| exclude != Some(name) && self.is_html_element(current, name));
            if !implied {
                break;
            }
            let _ = self.pop_current_node();
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    fn close_p_element_if_in_button_scope(&mut self) {
        if self.has_element_in_button_scope("p") {
            self.generate_implied_end_tags(Some("p"));
            self.pop_until_one_of(&["p"]);
        }
    }

    /// [§ 13.1.1 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
    fn is_special_node(&self, id: NodeId) -> bool {
        self.tree.as_element(id).is_some_and(|e| match e.namespace {
            Namespace::Html => is_special_element(&e.tag_name),
            Namespace::MathMl => {
                matches!(e.tag_name.as_str(), "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml")
            }
            Namespace::Svg => matches!(e.tag_name.as_str(), "foreignObject" | "desc" | "title"),
        })
    }

    // ===== node insertion =====

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// Elements that are not pushed onto the stack are closed immediately.
    fn insert_element(&mut self, data: ElementData, push: bool) -> Result<(), ParseError> {
        if push && self.stack_of_open_elements.len() >= self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
                offset: self.token_start,
            });
        }

        let is_template = data.namespace == Namespace::Html && data.tag_name == "template";
        let parent = self.insertion_parent();
        let id = self.tree.create_element(data);
        if is_template {
            // "Each template element has an associated DocumentFragment object
            // that is its template contents."
            let contents = self.tree.create_fragment(None);
            if let Some(element) = self.tree.as_element_mut(id) {
                element.template_contents = Some(contents);
            }
        }
        self.tree.append_child(parent, id);
        if push {
            self.stack_of_open_elements.push(id);
        }
        Ok(())
    }

    fn element_for_token(tag: StartTag, namespace: Namespace) -> ElementData {
        let mut attributes = tag.attributes;
        let tag_name = if namespace == Namespace::Html {
            tag.name
        } else {
            adjust_attributes(&mut attributes, namespace);
            adjust_tag_name(&tag.name, namespace)
        };
        ElementData {
            tag_name,
            attrs: attributes,
            namespace,
            location: Some(ElementLocation::opened(tag.span, tag.self_closing)),
            ..ElementData::default()
        }
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// Void elements are inserted but never pushed. A self-closing flag on a
    /// non-void HTML element is ignored.
    fn insert_html_element(&mut self, tag: StartTag) -> Result<(), ParseError> {
        let push = !is_void_element(&tag.name);
        self.insert_element(Self::element_for_token(tag, Namespace::Html), push)
    }

    /// "Insert a foreign element for the token, with adjusted current node's
    /// namespace." A self-closing foreign element is popped immediately.
    fn insert_foreign_element(
        &mut self,
        tag: StartTag,
        namespace: Namespace,
    ) -> Result<(), ParseError> {
        let push = !tag.self_closing;
        self.insert_element(Self::element_for_token(tag, namespace), push)
    }

    /// Insert an element the markup implies but never wrote, such as a
    /// `tbody` between `table` and `tr`. It has no source location.
    fn insert_implied_element(&mut self, tag_name: &str) -> Result<(), ParseError> {
        self.parse_warning(format!("implied <{tag_name}> inserted"));
        self.insert_element(ElementData::new(tag_name), true)
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "If there is a Text node immediately before the adjusted insertion
    /// location, then append data to that Text node's data."
    fn insert_character(&mut self, c: char) {
        let parent = self.insertion_parent();
        if let Some(last) = self.tree.last_child(parent)
            && let Some(node) = self.tree.get_mut(last)
            && let NodeType::Text(text) = &mut node.node_type
        {
            text.push(c);
            return;
        }
        let text = self.tree.create_text(c.to_string());
        self.tree.append_child(parent, text);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    fn insert_comment(&mut self, data: String) {
        let parent = self.insertion_parent();
        let comment = self.tree.alloc(NodeType::Comment(data));
        self.tree.append_child(parent, comment);
    }

    // ===== start tags =====

    fn handle_start_tag(&mut self, tag: StartTag) -> Result<(), ParseError> {
        // [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
        if self.in_foreign_content() {
            if !is_breakout_tag(&tag.name, &tag.attributes) {
                // "Any other start tag"
                let namespace = self.current_namespace();
                return self.insert_foreign_element(tag, namespace);
            }
            // "Parse error. While the current node is not a MathML text
            // integration point, an HTML integration point, or an element in
            // the HTML namespace, pop elements from the stack of open
            // elements. Reprocess the token according to the rules given in
            // the section corresponding to the current insertion mode in HTML
            // content."
            self.parse_warning(format!("<{}> breaks out of foreign content", tag.name));
            while self.in_foreign_content() {
                let _ = self.pop_current_node();
            }
        }
        self.handle_in_body_start_tag(tag)
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    fn handle_in_body_start_tag(&mut self, mut tag: StartTag) -> Result<(), ParseError> {
        match tag.name.as_str() {
            // The fragment context is an implied body; document-level
            // elements have nowhere to go.
            "html" | "head" | "body" | "frameset" | "frame" => {
                self.parse_warning(format!("<{}> ignored in fragment", tag.name));
                Ok(())
            }

            // "A start tag whose tag name is "svg""
            // "Insert a foreign element for the token, with SVG namespace."
            "svg" => self.insert_foreign_element(tag, Namespace::Svg),
            "math" => self.insert_foreign_element(tag, Namespace::MathMl),

            // "If the stack of open elements has a p element in button scope,
            // then close a p element. Insert an HTML element for the token."
            "address" | "article" | "aside" | "blockquote" | "center" | "details" | "dialog"
            | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure" | "footer"
            | "header" | "hgroup" | "main" | "menu" | "nav" | "ol" | "p" | "search"
            | "section" | "summary" | "ul" | "pre" | "listing" | "form" | "table" | "xmp"
            | "plaintext" | "hr" => {
                self.close_p_element_if_in_button_scope();
                self.insert_html_element(tag)
            }

            // "If the current node is an HTML element whose tag name is one of
            // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
            // error; pop the current node off the stack of open elements."
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.close_p_element_if_in_button_scope();
                if self.current_node_is_one_of(HEADINGS) {
                    self.parse_warning(format!("<{}> inside a heading", tag.name));
                    let _ = self.pop_current_node();
                }
                self.insert_html_element(tag)
            }

            "li" => {
                self.close_list_item(&["li"]);
                self.close_p_element_if_in_button_scope();
                self.insert_html_element(tag)
            }
            "dd" | "dt" => {
                self.close_list_item(&["dd", "dt"]);
                self.close_p_element_if_in_button_scope();
                self.insert_html_element(tag)
            }

            // "If the stack of open elements has a button element in scope,
            // then ... generate implied end tags, then pop elements from the
            // stack of open elements until a button element has been popped."
            "button" => {
                if self.has_element_in_scope("button") {
                    self.parse_warning("nested <button>".to_string());
                    self.generate_implied_end_tags(None);
                    self.pop_until_one_of(&["button"]);
                }
                self.insert_html_element(tag)
            }

            // Nested anchors close the open one. Browsers do this through the
            // adoption agency algorithm; here the open `a` is simply closed.
            "a" => {
                if self.has_element_in_scope("a") {
                    self.parse_warning("nested <a>".to_string());
                    self.pop_until_one_of(&["a"]);
                }
                self.insert_html_element(tag)
            }

            // "If the current node is an option element, then pop the current
            // node off the stack of open elements."
            "option" | "optgroup" => {
                if self.current_node_is_one_of(&["option"]) {
                    let _ = self.pop_current_node();
                }
                self.insert_html_element(tag)
            }

            // "If the stack of open elements has a ruby element in scope, then
            // generate implied end tags."
            "rb" | "rtc" => {
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(None);
                }
                self.insert_html_element(tag)
            }
            "rp" | "rt" => {
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(Some("rtc"));
                }
                self.insert_html_element(tag)
            }

            // "Parse error. Change the token's tag name to "img" and
            // reprocess it. (Don't ask.)"
            "image" => {
                self.parse_warning("<image> treated as <img>".to_string());
                tag.name = "img".to_string();
                self.insert_html_element(tag)
            }

            "caption" | "colgroup" | "col" | "tbody" | "thead" | "tfoot" | "tr" | "td" | "th" => {
                self.handle_table_part_start_tag(tag)
            }

            // "Any other start tag"
            _ => self.insert_html_element(tag),
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    /// "A start tag whose tag name is "li"" and "one of: "dd", "dt""
    ///
    /// STEP 1: "Initialize node to be the current node."
    /// STEP 2: "Loop: If node is an li element, then ... generate implied
    ///          end tags, except for li elements ... pop elements from the
    ///          stack of open elements until an li element has been popped."
    /// STEP 3: "If node is in the special category, but is not an address,
    ///          div, or p element, then jump to the step labeled done."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to the step labeled loop."
    fn close_list_item(&mut self, item_names: &[&str]) {
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            if let Some(&name) = item_names
                .iter()
                .find(|name| self.is_html_element(node, name))
            {
                self.generate_implied_end_tags(Some(name));
                if let Some(index) = self.stack_of_open_elements.iter().rposition(|&id| id == node) {
                    self.close_through(index, None);
                }
                return;
            }
            if self.is_special_node(node)
                && !["address", "div", "p"]
                    .iter()
                    .any(|name| self.is_html_element(node, name))
            {
                return;
            }
        }
    }

    /// Table structure start tags, following the "in table", "in table
    /// body", "in row", "in cell" and "in caption" insertion modes.
    ///
    /// Outside a table these tags are ignored, as in the "in body" mode.
    fn handle_table_part_start_tag(&mut self, tag: StartTag) -> Result<(), ParseError> {
        if !self.has_element_in_table_scope("table") {
            self.parse_warning(format!("<{}> outside of a table ignored", tag.name));
            return Ok(());
        }

        // [§ 13.2.6.4.15 "in cell"](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
        // "If the stack of open elements does not have a td or th element in
        // table scope, then this is a parse error; ignore the token.
        // Otherwise, close the cell and reprocess the token."
        if self.has_element_in_table_scope("td") || self.has_element_in_table_scope("th") {
            self.generate_implied_end_tags(None);
            self.pop_until_one_of(&["td", "th"]);
        }
        // [§ 13.2.6.4.11 "in caption"](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
        if self.has_element_in_table_scope("caption") {
            self.generate_implied_end_tags(None);
            self.pop_until_one_of(&["caption"]);
        }

        match tag.name.as_str() {
            "caption" | "colgroup" | "tbody" | "thead" | "tfoot" => {
                self.clear_stack_back_to(&["table", "template"]);
                self.insert_html_element(tag)
            }
            // "A start tag whose tag name is "col"": "Clear the stack back to
            // a table context. Insert an HTML element for a "colgroup" start
            // tag token with no attributes, then switch the insertion mode to
            // "in column group". Reprocess the current token."
            "col" => {
                if !self.current_node_is_one_of(&["colgroup"]) {
                    self.clear_stack_back_to(&["table", "template"]);
                    self.insert_implied_element("colgroup")?;
                }
                self.insert_html_element(tag)
            }
            // [§ 13.2.6.4.13 "in table body"](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
            "tr" => {
                self.clear_stack_back_to(&["tbody", "thead", "tfoot", "table", "template"]);
                if self.current_node_is_one_of(&["table"]) {
                    self.insert_implied_element("tbody")?;
                }
                self.insert_html_element(tag)
            }
            // [§ 13.2.6.4.14 "in row"](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
            _ => {
                self.clear_stack_back_to(&["tr", "tbody", "thead", "tfoot", "table", "template"]);
                if self.current_node_is_one_of(&["table"]) {
                    self.insert_implied_element("tbody")?;
                }
                if self.current_node_is_one_of(&["tbody", "thead", "tfoot"]) {
                    self.insert_implied_element("tr")?;
                }
                self.insert_html_element(tag)
            }
        }
    }

    /// [§ 13.2.6.4.9](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-context)
    ///
    /// "while the current node is not a table, template, or html element,
    /// pop elements from the stack of open elements."
    fn clear_stack_back_to(&mut self, tag_names: &[&str]) {
        while self.current_node().is_some() && !self.current_node_is_one_of(tag_names) {
            let _ = self.pop_current_node();
        }
    }

    // ===== end tags =====

    fn handle_end_tag(&mut self, name: &str, span: SourceRange) -> Result<(), ParseError> {
        // End tags follow the foreign content rules whenever the current node
        // is not an HTML element, integration points included.
        if self.current_namespace() != Namespace::Html && self.handle_foreign_end_tag(name, span)
        {
            return Ok(());
        }

        match name {
            "html" | "head" | "body" => {
                self.parse_warning(format!("</{name}> ignored in fragment"));
            }

            // "An end tag whose tag name is "br"": "Parse error. Drop the
            // attributes from the token, and act as described in the next
            // entry; i.e. act as if this was a "br" start tag token with no
            // attributes, rather than the end tag token that it actually is."
            "br" => {
                self.parse_warning("</br> treated as <br>".to_string());
                return self.handle_start_tag(StartTag {
                    name: "br".to_string(),
                    self_closing: false,
                    attributes: Vec::new(),
                    span,
                });
            }

            // "If the stack of open elements does not have a p element in
            // button scope, then this is a parse error; insert an HTML element
            // for a "p" start tag token with no attributes."
            //
            // A stray `</p>` is dropped instead: it would create an element
            // that does not exist in the source.
            "p" => {
                if self.has_element_in_button_scope("p") {
                    self.generate_implied_end_tags(Some("p"));
                    self.close_with_end_tag(&["p"], span);
                } else {
                    self.parse_warning("stray </p> ignored".to_string());
                }
            }

            "li" => {
                if self.has_element_in_list_item_scope("li") {
                    self.generate_implied_end_tags(Some("li"));
                    self.close_with_end_tag(&["li"], span);
                } else {
                    self.parse_warning("stray </li> ignored".to_string());
                }
            }

            "dd" | "dt" => {
                if self.has_element_in_scope(name) {
                    self.generate_implied_end_tags(Some(name));
                    self.close_with_end_tag(&[name], span);
                } else {
                    self.parse_warning(format!("stray </{name}> ignored"));
                }
            }

            // "If the stack of open elements does not have an element in scope
            // that is an HTML element and whose tag name is one of "h1", "h2",
            // "h3", "h4", "h5", or "h6", then this is a parse error; ignore
            // the token."
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if HEADINGS.iter().any(|h| self.has_element_in_scope(h)) {
                    self.generate_implied_end_tags(None);
                    self.close_with_end_tag(HEADINGS, span);
                } else {
                    self.parse_warning(format!("stray </{name}> ignored"));
                }
            }

            "template" => {
                let open = self
                    .stack_of_open_elements
                    .iter()
                    .any(|&id| self.is_html_element(id, "template"));
                if open {
                    self.generate_implied_end_tags(None);
                    self.close_with_end_tag(&["template"], span);
                } else {
                    self.parse_warning("stray </template> ignored".to_string());
                }
            }

            "table" | "tbody" | "thead" | "tfoot" | "tr" | "td" | "th" | "caption"
            | "colgroup" => {
                if self.has_element_in_table_scope(name) {
                    self.generate_implied_end_tags(None);
                    self.close_with_end_tag(&[name], span);
                } else {
                    self.parse_warning(format!("stray </{name}> ignored"));
                }
            }

            "col" => self.parse_warning("</col> ignored".to_string()),

            // "If the stack of open elements does not have an element in scope
            // that is an HTML element with the same tag name as that of the
            // token, then this is a parse error; ignore the token. Otherwise:
            // generate implied end tags ... pop elements from the stack of
            // open elements until an HTML element with the same tag name as
            // the token has been popped from the stack."
            "address" | "article" | "aside" | "blockquote" | "button" | "center" | "details"
            | "dialog" | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure"
            | "footer" | "form" | "header" | "hgroup" | "listing" | "main" | "menu" | "nav"
            | "ol" | "pre" | "search" | "section" | "select" | "summary" | "ul" => {
                if self.has_element_in_scope(name) {
                    self.generate_implied_end_tags(None);
                    self.close_with_end_tag(&[name], span);
                } else {
                    self.parse_warning(format!("stray </{name}> ignored"));
                }
            }

            _ => self.any_other_end_tag(name, span),
        }
        Ok(())
    }

    /// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    /// "Any other end tag"
    ///
    /// STEP 1: "Initialize node to be the current node."
    /// STEP 2: "If node's tag name, converted to ASCII lowercase, is not the
    ///          same as the tag name of the token, then this is a parse error."
    /// STEP 3: "Loop: If node is the topmost element in the stack of open
    ///          elements, then return."
    /// STEP 4: "If node's tag name, converted to ASCII lowercase, is the same
    ///          as the tag name of the token, pop elements from the stack of
    ///          open elements until node has been popped from the stack, and
    ///          then return."
    /// STEP 5: "Set node to the previous entry in the stack of open elements."
    /// STEP 6: "If node is not an element in the HTML namespace, return to
    ///          the step labeled loop."
    /// STEP 7: "Otherwise, process the token according to the rules given in
    ///          the section corresponding to the current insertion mode in
    ///          HTML content."
    ///
    /// Returns false when the token must be processed by the HTML rules.
    fn handle_foreign_end_tag(&mut self, name: &str, span: SourceRange) -> bool {
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            let Some(element) = self.tree.as_element(node) else {
                continue;
            };
            if element.namespace == Namespace::Html {
                return false;
            }
            if element.tag_name.eq_ignore_ascii_case(name) {
                self.close_through(index, Some(span));
                return true;
            }
        }
        self.parse_warning(format!("stray </{name}> in foreign content ignored"));
        true
    }

    /// [§ 13.2.6.4.7 "in body" - Any other end tag](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// 1. "Initialize node to be the current node (the bottommost node of the stack)."
    /// 2. "Loop: If node is an HTML element with the same tag name as the token, then:"
    ///    a. "Generate implied end tags, except for HTML elements with the same tag name
    ///    as the token."
    ///    b. "If node is not the current node, then this is a parse error."
    ///    c. "Pop all the nodes from the current node up to node, including node, then stop
    ///    these steps."
    /// 3. "Otherwise, if node is in the special category, then this is a parse error;
    ///    ignore the token, and return."
    /// 4. "Set node to the previous entry in the stack of open elements and return to
    ///    the step labeled loop."
    fn any_other_end_tag(&mut self, tag_name: &str, span: SourceRange) {
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            if self.is_html_element(node, tag_name) {
                self.generate_implied_end_tags(Some(tag_name));
                if let Some(index) = self.stack_of_open_elements.iter().rposition(|&id| id == node) {
                    self.close_through(index, Some(span));
                }
                return;
            }
            if self.is_special_node(node) {
                break;
            }
        }
        self.parse_warning(format!("stray </{tag_name}> ignored"));
    }

    // ===== end of file =====

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    /// "An end-of-file token": "Stop parsing."
    ///
    /// Elements still open run to the end of input.
    fn handle_eof(&mut self, offset: usize) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            self.close_element_at(id, offset);
        }
    }
}

/// [§ 13.1.1 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules:
/// ... they are collectively known as special elements."
#[must_use]
pub fn is_special_element(tag_name: &str) -> bool {
    matches!(
        tag_name,
        "address"
            | "applet"
            | "area"
            | "article"
            | "aside"
            | "base"
            | "basefont"
            | "bgsound"
            | "blockquote"
            | "body"
            | "br"
            | "button"
            | "caption"
            | "center"
            | "col"
            | "colgroup"
            | "dd"
            | "details"
            | "dir"
            | "div"
            | "dl"
            | "dt"
            | "embed"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "frame"
            | "frameset"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "head"
            | "header"
            | "hgroup"
            | "hr"
            | "html"
            | "iframe"
            | "img"
            | "input"
            | "keygen"
            | "li"
            | "link"
            | "listing"
            | "main"
            | "marquee"
            | "menu"
            | "meta"
            | "nav"
            | "noembed"
            | "noframes"
            | "noscript"
            | "object"
            | "ol"
            | "p"
            | "param"
            | "plaintext"
            | "pre"
            | "script"
            | "search"
            | "section"
            | "select"
            | "source"
            | "style"
            | "summary"
            | "table"
            | "tbody"
            | "td"
            | "template"
            | "textarea"
            | "tfoot"
            | "th"
            | "thead"
            | "title"
            | "tr"
            | "track"
            | "ul"
            | "wbr"
            | "xmp"
    )
}
