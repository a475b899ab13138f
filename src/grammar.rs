//! The grammar pipeline: classifying an externally-parsed EBNF/BNF tree into a display tree.
//!
//! The grammar engine itself is an external collaborator (see [`GrammarEngine`]) - this module
//! never tokenizes or parses grammar text.  It consumes the engine's [`ParseNode`] output and maps
//! each node, by grammar-construct kind, onto the [`DisplayNode`] shape that the rendering
//! collaborator should show: choices become choice groups, sequences become sequence groups,
//! terminal constructs become literal leaves, and anything unrecognised becomes a titled group.

use crate::tree::{DisplayNode, Group, GroupStyle, TreeList};

use serde::Deserialize;

/// One node of a parse tree produced by the grammar engine collaborator.
///
/// `ParseNode`s are read-only inputs: the classifier walks them but never stores references to
/// them in its output.  The `Deserialize` impl accepts the JSON dump format that grammar engines
/// commonly emit (`type`/`text`/`children`), which is also the demo binary's input format.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct ParseNode {
    /// The grammar-construct kind of this node, as named by the engine (e.g. `"Choice"`)
    #[serde(alias = "type")]
    pub kind: String,
    /// The slice of input text that this node matched
    #[serde(default)]
    pub text: String,
    /// This node's sub-matches, in source order
    #[serde(default)]
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    /// Creates a new `ParseNode`
    pub fn new(kind: impl Into<String>, text: impl Into<String>, children: Vec<ParseNode>) -> Self {
        ParseNode {
            kind: kind.into(),
            text: text.into(),
            children,
        }
    }
}

/// The grammar notation variant that the engine should parse the grammar text as
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Dialect {
    /// The W3C EBNF notation
    W3c,
    /// Plain BNF notation
    Bnf,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::W3c
    }
}

/// The external grammar engine collaborator.
///
/// Implementations tokenize/parse `input` according to `grammar` and return the root of the
/// resulting parse tree.  The core does not configure the engine or validate grammar correctness;
/// whatever error the engine raises is propagated untranslated by
/// [`GrammarView::render`] - no partial tree is ever built from a failed parse.
pub trait GrammarEngine {
    /// The error produced when the grammar or input text is malformed
    type Error: std::error::Error;

    /// Parses `input` according to `grammar` (interpreted as the given [`Dialect`]), returning
    /// the root [`ParseNode`] of the parse tree.
    fn parse(&self, grammar: &str, input: &str, dialect: Dialect) -> Result<ParseNode, Self::Error>;
}

/// The closed set of grammar-construct kinds with dedicated display rules.
///
/// Engine kinds arrive as strings; converting them onto this enum up-front keeps the
/// string-keyed dispatch in one place and lets the classifier match exhaustively, with
/// [`Unknown`](NodeKind::Unknown) as the explicit default arm.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// A set of alternatives, displayed as a choice group
    Choice,
    /// A sequence (possibly with an exclusion), displayed as a sequence group
    SequenceOrDifference,
    /// A whole production rule, displayed as a sequence group
    Production,
    /// A character class, displayed as a sequence group
    CharClass,
    /// A range within a character class, displayed as a sequence group
    CharRange,
    /// One item of a sequence, displayed as a sequence group
    Item,
    /// One item of a character class, displayed as a sequence group
    SubItem,
    /// A repetition/optionality marker (`*`, `+`, `?`), displayed as a literal leaf
    PrimaryDecoration,
    /// A quoted string literal, displayed as a literal leaf
    StringLiteral,
    /// A `#xN-#xN` code-point range, displayed as a literal leaf
    CharCodeRange,
    /// A single `#xN` code point, displayed as a literal leaf
    CharCode,
    /// A raw terminal character, displayed as a literal leaf
    Char,
    /// A qualified rule name, displayed as a literal leaf
    NCName,
    /// Any kind without a dedicated rule, displayed as a titled group
    Unknown,
}

impl NodeKind {
    /// Maps an engine-supplied kind string onto a `NodeKind`
    pub fn from_kind(kind: &str) -> Self {
        match kind {
            "Choice" => NodeKind::Choice,
            "SequenceOrDifference" => NodeKind::SequenceOrDifference,
            "Production" => NodeKind::Production,
            "CharClass" => NodeKind::CharClass,
            "CharRange" => NodeKind::CharRange,
            "Item" => NodeKind::Item,
            "SubItem" => NodeKind::SubItem,
            "PrimaryDecoration" => NodeKind::PrimaryDecoration,
            "StringLiteral" => NodeKind::StringLiteral,
            "CharCodeRange" => NodeKind::CharCodeRange,
            "CharCode" => NodeKind::CharCode,
            "Char" => NodeKind::Char,
            "NCName" => NodeKind::NCName,
            _ => NodeKind::Unknown,
        }
    }
}

/// Maps one [`ParseNode`] (recursively, its whole subtree) onto one [`DisplayNode`].
///
/// The walk is depth-first and order-preserving: children are classified and appended in source
/// order, and are never reordered, deduplicated or dropped.  Classification of a node depends
/// only on its own kind/text and its children's classifications - there is no lookahead across
/// siblings and no backtracking.
pub fn classify(node: &ParseNode) -> DisplayNode {
    log::trace!(
        "classifying {:?} node with {} children",
        node.kind,
        node.children.len()
    );
    // Childless nodes are always literal leaves, whatever their kind.  An empty `text` is fine -
    // it displays as an empty literal.
    if node.children.is_empty() {
        return DisplayNode::leaf(node.text.as_str());
    }
    match NodeKind::from_kind(&node.kind) {
        NodeKind::Choice => {
            let mut group = Group::new(GroupStyle::Choice);
            classify_into(&mut group, &node.children);
            DisplayNode::Group(group)
        }
        NodeKind::SequenceOrDifference
        | NodeKind::Production
        | NodeKind::CharClass
        | NodeKind::CharRange
        | NodeKind::Item
        | NodeKind::SubItem => {
            let mut group = Group::new(GroupStyle::Sequence);
            classify_into(&mut group, &node.children);
            DisplayNode::Group(group)
        }
        // These kinds are terminal in practice, but the rule is stronger: display their matched
        // text and ignore any children they might have.
        NodeKind::PrimaryDecoration
        | NodeKind::StringLiteral
        | NodeKind::CharCodeRange
        | NodeKind::CharCode
        | NodeKind::Char
        | NodeKind::NCName => DisplayNode::leaf(node.text.as_str()),
        NodeKind::Unknown => {
            let title = DisplayNode::leaf(format!("{} {}", node.kind, node.text));
            let mut group = Group::with_title(GroupStyle::Titled, title);
            classify_into(&mut group, &node.children);
            DisplayNode::Group(group)
        }
    }
}

/// Classifies each node of `children` in order, appending the results to `group`
fn classify_into(group: &mut Group, children: &[ParseNode]) {
    for child in children {
        group.push(classify(child));
    }
}

/// The grammar pipeline driver: holds the current grammar/input text, and rebuilds its display
/// tree from them on every [`render`](Self::render).
///
/// Setters only store text and mark the view dirty - parsing happens lazily when the rendering
/// collaborator next pulls a render.  Each render fully discards the previous tree (via
/// [`TreeList::clear`]) before rebuilding; there is no incremental patching.
#[derive(Debug)]
pub struct GrammarView<E> {
    engine: E,
    grammar: String,
    content: String,
    dialect: Dialect,
    tree: TreeList,
    dirty: bool,
}

impl<E: GrammarEngine> GrammarView<E> {
    /// Creates a `GrammarView` with no grammar or input text.  Rendering it yields an empty
    /// top-level group.
    pub fn new(engine: E) -> Self {
        GrammarView {
            engine,
            grammar: String::new(),
            content: String::new(),
            dialect: Dialect::default(),
            tree: TreeList::with_title(GroupStyle::Sequence, DisplayNode::leaf("EBNF")),
            dirty: false,
        }
    }

    /// Replaces the grammar source text.  Doesn't parse; the next render will.
    pub fn set_grammar(&mut self, grammar: impl Into<String>) {
        self.grammar = grammar.into();
        self.dirty = true;
    }

    /// Replaces the input text to be parsed against the grammar.  Doesn't parse; the next render
    /// will.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.dirty = true;
    }

    /// Selects the grammar notation variant passed to the engine
    pub fn set_dialect(&mut self, dialect: Dialect) {
        self.dialect = dialect;
        self.dirty = true;
    }

    /// `true` if the source text or tree has changed since the last render
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.tree.is_dirty()
    }

    /// Consumes the change notification: returns whether anything has changed since the last
    /// call, resetting the flag.  The rendering collaborator polls this to schedule repaints.
    pub fn take_dirty(&mut self) -> bool {
        let tree_dirty = self.tree.take_dirty();
        let was_dirty = self.dirty || tree_dirty;
        self.dirty = false;
        was_dirty
    }

    /// The [`TreeList`] this view builds into
    pub fn tree(&self) -> &TreeList {
        &self.tree
    }

    /// Discards the previous display tree and rebuilds it from the current grammar/input text,
    /// returning the new root.
    ///
    /// Empty grammar or input text renders as an empty top-level group, never an error.  An
    /// engine failure is propagated untranslated and leaves the tree empty - no partial tree is
    /// built.
    pub fn render(&mut self) -> Result<DisplayNode, E::Error> {
        self.tree.clear();
        if self.grammar.is_empty() || self.content.is_empty() {
            log::debug!("no grammar or content text; rendering an empty tree");
        } else {
            let root = self
                .engine
                .parse(&self.grammar, &self.content, self.dialect)?;
            log::debug!("classifying {} top-level parse nodes", root.children.len());
            for child in &root.children {
                self.tree.append_child(classify(child));
            }
        }
        // The driver just rebuilt the tree and is about to hand the root over, so there is no
        // unseen change left to report.
        self.dirty = false;
        self.tree.take_dirty();
        Ok(self.tree.root())
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, Dialect, GrammarEngine, GrammarView, ParseNode};

    /// An error that stub engines can (but don't) return
    #[derive(Debug, Clone, Eq, PartialEq)]
    struct StubError;

    impl std::fmt::Display for StubError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "stub engine failed to parse")
        }
    }

    impl std::error::Error for StubError {}

    /// An engine that ignores its inputs and returns a clone of a pre-baked tree
    struct FixedEngine(ParseNode);

    impl GrammarEngine for FixedEngine {
        type Error = StubError;

        fn parse(&self, _: &str, _: &str, _: Dialect) -> Result<ParseNode, StubError> {
            Ok(self.0.clone())
        }
    }

    /// An engine that always fails
    struct FailingEngine;

    impl GrammarEngine for FailingEngine {
        type Error = StubError;

        fn parse(&self, _: &str, _: &str, _: Dialect) -> Result<ParseNode, StubError> {
            Err(StubError)
        }
    }

    /// An engine whose output names the dialect it was asked to use
    struct DialectEcho;

    impl GrammarEngine for DialectEcho {
        type Error = StubError;

        fn parse(&self, _: &str, _: &str, dialect: Dialect) -> Result<ParseNode, StubError> {
            let name = match dialect {
                Dialect::W3c => "w3c",
                Dialect::Bnf => "bnf",
            };
            Ok(ParseNode::new(
                "Grammar",
                "",
                vec![ParseNode::new("NCName", name, vec![])],
            ))
        }
    }

    fn node(kind: &str, text: &str, children: Vec<ParseNode>) -> ParseNode {
        ParseNode::new(kind, text, children)
    }

    #[test]
    fn classify_shapes() {
        for (parse_node, expected_tree_view) in &[
            // Childless nodes are leaves regardless of kind
            (node("Choice", "a | b", vec![]), "a | b"),
            (node("Anything", "x", vec![]), "x"),
            // ... including leaves with empty text
            (node("NCName", "", vec![]), ""),
            (
                node(
                    "Choice",
                    "",
                    vec![node("NCName", "a", vec![]), node("NCName", "b", vec![])],
                ),
                "choice\n  a\n  b",
            ),
            (
                node(
                    "Production",
                    "",
                    vec![
                        node("NCName", "value", vec![]),
                        node(
                            "Choice",
                            "",
                            vec![node("NCName", "true", vec![]), node("NCName", "false", vec![])],
                        ),
                    ],
                ),
                "sequence\n  value\n  choice\n    true\n    false",
            ),
            (
                node(
                    "CharClass",
                    "",
                    vec![node(
                        "CharRange",
                        "",
                        vec![node("Char", "a", vec![]), node("Char", "z", vec![])],
                    )],
                ),
                "sequence\n  sequence\n    a\n    z",
            ),
            // Terminal kinds use their text even when children exist
            (
                node("StringLiteral", "\"true\"", vec![node("Char", "t", vec![])]),
                "\"true\"",
            ),
            (
                node("CharCode", "#x5B", vec![node("Char", "[", vec![])]),
                "#x5B",
            ),
            // Unrecognised kinds wrap their children in a group titled "<kind> <text>"
            (
                node("Foo", "bar", vec![node("NCName", "baz", vec![])]),
                "Foo bar\n  baz",
            ),
        ] {
            assert_eq!(classify(parse_node).tree_view(), *expected_tree_view);
        }
    }

    #[test]
    fn classify_preserves_child_order() {
        let parse_node = node(
            "Item",
            "",
            vec![
                node("NCName", "first", vec![]),
                node("NCName", "second", vec![]),
                node("NCName", "third", vec![]),
            ],
        );
        assert_eq!(
            classify(&parse_node).tree_view(),
            "sequence\n  first\n  second\n  third"
        );
    }

    #[test]
    fn unknown_kind_wraps_exactly_once() {
        // One unrecognised node adds exactly one extra wrapping group with a leaf title
        let parse_node = node("Mystery", "??", vec![node("NCName", "inner", vec![])]);
        let display = classify(&parse_node);
        assert_eq!(display.children().len(), 1);
        assert_eq!(display.display_name(), "Mystery ??");
    }

    #[test]
    fn render_with_empty_sources() {
        let mut view = GrammarView::new(FixedEngine(node("Grammar", "", vec![])));
        // No grammar, no content
        assert_eq!(view.render().unwrap().tree_view(), "EBNF");
        // Grammar but no content
        view.set_grammar("a ::= \"a\"");
        assert_eq!(view.render().unwrap().tree_view(), "EBNF");
    }

    #[test]
    fn render_is_idempotent() {
        let parse_tree = node(
            "Grammar",
            "",
            vec![node(
                "Production",
                "",
                vec![node("NCName", "a", vec![]), node("StringLiteral", "\"a\"", vec![])],
            )],
        );
        let mut view = GrammarView::new(FixedEngine(parse_tree));
        view.set_grammar("a ::= \"a\"");
        view.set_content("a");
        let first = view.render().unwrap();
        let second = view.render().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.tree_view(), "EBNF\n  sequence\n    a\n    \"a\"");
    }

    #[test]
    fn render_clears_before_rebuilding() {
        let mut view = GrammarView::new(DialectEcho);
        view.set_grammar("g");
        view.set_content("c");
        assert_eq!(view.render().unwrap().tree_view(), "EBNF\n  w3c");
        // Re-rendering with different settings replaces the tree instead of appending to it
        view.set_dialect(Dialect::Bnf);
        assert_eq!(view.render().unwrap().tree_view(), "EBNF\n  bnf");
        // Emptying a source empties the tree
        view.set_content("");
        assert_eq!(view.render().unwrap().tree_view(), "EBNF");
    }

    #[test]
    fn engine_errors_propagate() {
        let mut view = GrammarView::new(FailingEngine);
        view.set_grammar("g");
        view.set_content("c");
        assert_eq!(view.render(), Err(StubError));
        // The failed render left no partial tree behind
        assert!(view.tree().is_empty());
    }

    #[test]
    fn setters_notify_without_parsing() {
        let mut view = GrammarView::new(FailingEngine);
        assert!(!view.is_dirty());
        // `FailingEngine` would error if this parsed eagerly
        view.set_grammar("g");
        assert!(view.is_dirty());
        assert!(view.take_dirty());
        assert!(!view.take_dirty());
    }

    #[test]
    fn render_consumes_dirtiness() {
        let mut view = GrammarView::new(DialectEcho);
        view.set_grammar("g");
        view.set_content("c");
        view.render().unwrap();
        assert!(!view.is_dirty());
    }

    #[test]
    fn parse_node_from_json_dump() {
        let dump = r#"{
            "type": "Choice",
            "text": "a | b",
            "children": [{ "type": "NCName", "text": "a" }, { "type": "NCName", "text": "b" }]
        }"#;
        let parse_node: ParseNode = serde_json::from_str(dump).unwrap();
        assert_eq!(
            parse_node,
            node(
                "Choice",
                "a | b",
                vec![node("NCName", "a", vec![]), node("NCName", "b", vec![])]
            )
        );
        assert_eq!(classify(&parse_node).tree_view(), "choice\n  a\n  b");
    }
}
