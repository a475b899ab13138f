//! The JSON pipeline: a deliberately minimal hand-rolled scanner for JSON-like text, plus the
//! build step that turns its output into a display tree.
//!
//! This is *not* a JSON parser.  It recognises a relaxed subset - strings, lists, commas,
//! whitespace and newlines - in a single left-to-right pass, and it never fails: malformed or
//! unsupported input degrades to a best-effort tree instead of an error.  The leniency rules are
//! deliberate compatibility behaviour, named and kept on purpose:
//!
//! - *unterminated-string*: a `"` with no closing quote takes the rest of the input as its value
//! - *ignore-extra-close*: a `]` beyond the outermost open list is a no-op
//! - *drop-orphan-tokens*: tokens with no open list frame to receive them are silently dropped
//! - unrecognised characters are skipped one at a time

use crate::tree::{DisplayNode, Group, GroupStyle, TreeList};

/// One node of the tree built by [`tokenize`].
///
/// Newlines in the input are kept as explicit [`Newline`](JsonNode::Newline) markers so that the
/// rendering collaborator's layout can honour the source's line structure; they carry no value
/// and produce no display node of their own.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum JsonNode {
    /// A string literal (the text between two quotes, no escape processing)
    Str(String),
    /// A `[...]` list and its contents, in source order
    List(Vec<JsonNode>),
    /// A structural marker for a newline that appeared inside a list
    Newline,
}

/// Scans JSON-like text into a [`JsonNode`] tree in a single pass.
///
/// Leading/trailing whitespace is trimmed first.  Returns `None` when the input contains no
/// string or list at all (e.g. whitespace-only text) - callers must treat this as "no tree", not
/// an error.
pub fn tokenize(text: &str) -> Option<JsonNode> {
    Scanner::new(text.trim()).run()
}

/// The state of one scanning pass: a stack of open list frames, plus the slot for a bare
/// top-level string.
///
/// **Invariant**: `root_str` and `open_lists` are never both populated.  A bare string can only
/// become the root while nothing is open, and once it has, every later token is an orphan and is
/// dropped.
struct Scanner<'s> {
    text: &'s str,
    /// Byte index of the next character to consume
    idx: usize,
    /// The children collected so far for each list that has been opened but not yet closed,
    /// innermost last
    open_lists: Vec<Vec<JsonNode>>,
    /// Set when the input's first token is a string outside any list; that string is the whole
    /// tree
    root_str: Option<JsonNode>,
}

impl<'s> Scanner<'s> {
    fn new(text: &'s str) -> Self {
        Scanner {
            text,
            idx: 0,
            open_lists: Vec::new(),
            root_str: None,
        }
    }

    /// Consumes the whole input, then returns the root of the resulting tree (if any)
    fn run(mut self) -> Option<JsonNode> {
        while self.idx < self.text.len() {
            let chr = match self.text[self.idx..].chars().next() {
                Some(c) => c,
                None => break,
            };
            match chr {
                '"' => self.scan_string(),
                '[' => {
                    self.open_list();
                    self.idx += 1;
                }
                ']' => {
                    self.close_list();
                    self.idx += 1;
                }
                '\n' => {
                    self.newline();
                    self.idx += 1;
                }
                // Separators have no structural effect
                ',' | ' ' | '\t' => self.idx += 1,
                // Anything else is unsupported and dropped character-by-character
                _ => {
                    log::trace!("skipping unsupported character {:?}", chr);
                    self.idx += chr.len_utf8();
                }
            }
        }
        self.finish()
    }

    /// Consumes a string literal starting at the `"` at `self.idx`.  No escape processing is
    /// performed; if there is no closing quote, the value runs to the end of the input
    /// (unterminated-string leniency).
    fn scan_string(&mut self) {
        let start = self.idx + 1;
        let value = match self.text[start..].find('"') {
            Some(end) => {
                self.idx = start + end + 1;
                &self.text[start..start + end]
            }
            None => {
                self.idx = self.text.len();
                &self.text[start..]
            }
        };
        let node = JsonNode::Str(value.to_string());
        match self.open_lists.last_mut() {
            Some(top) => top.push(node),
            // The very first bare string becomes the root itself
            None if self.root_str.is_none() => self.root_str = Some(node),
            // Drop-orphan-tokens: the root is already taken
            None => log::trace!("dropping orphan string {:?}", value),
        }
    }

    /// Opens a new list frame at the `[` under the cursor
    fn open_list(&mut self) {
        if self.root_str.is_some() {
            // Drop-orphan-tokens: a bare string already claimed the root
            log::trace!("dropping orphan list");
            return;
        }
        self.open_lists.push(Vec::new());
    }

    /// Closes the innermost open list frame, attaching it to its parent
    fn close_list(&mut self) {
        let finished = match self.open_lists.pop() {
            Some(frame) => frame,
            // `]` with nothing open at all: dropped
            None => return,
        };
        match self.open_lists.last_mut() {
            Some(parent) => parent.push(JsonNode::List(finished)),
            // Ignore-extra-close: the outermost frame is never popped by `]`
            None => self.open_lists.push(finished),
        }
    }

    /// Records a newline marker in the innermost open list.  Newlines outside any list have
    /// nothing to attach to and are dropped.
    fn newline(&mut self) {
        if let Some(top) = self.open_lists.last_mut() {
            top.push(JsonNode::Newline);
        }
    }

    /// Folds any lists left open at end-of-input into their parents and returns the root
    fn finish(mut self) -> Option<JsonNode> {
        while self.open_lists.len() > 1 {
            self.close_list();
        }
        if let Some(root) = self.root_str {
            return Some(root);
        }
        self.open_lists.pop().map(JsonNode::List)
    }
}

/// Recursively builds the display form of a [`JsonNode`] tree: strings become leaves, lists
/// become plain untitled groups, and newline markers contribute nothing (they are layout hints
/// for the rendering collaborator, not display nodes).
pub fn build(node: &JsonNode) -> Option<DisplayNode> {
    match node {
        JsonNode::Str(value) => Some(DisplayNode::leaf(value.as_str())),
        JsonNode::List(children) => {
            let mut group = Group::new(GroupStyle::List);
            for child in children {
                if let Some(built) = build(child) {
                    group.push(built);
                }
            }
            Some(DisplayNode::Group(group))
        }
        JsonNode::Newline => None,
    }
}

/// The JSON pipeline driver: holds the current source text and rebuilds its display tree from it
/// on every [`render`](Self::render).
///
/// Unlike the grammar pipeline, rendering can never fail - the scanner's leniency rules guarantee
/// a (possibly empty) tree for any input.
#[derive(Debug)]
pub struct JsonView {
    text: String,
    tree: TreeList,
    dirty: bool,
}

impl JsonView {
    /// Creates a `JsonView` with no source text.  Rendering it yields an empty top-level group.
    pub fn new() -> Self {
        JsonView {
            text: String::new(),
            tree: TreeList::with_title(GroupStyle::List, DisplayNode::leaf("JSON")),
            dirty: false,
        }
    }

    /// Replaces the source text.  Doesn't scan; the next render will.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.dirty = true;
    }

    /// `true` if the source text or tree has changed since the last render
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.tree.is_dirty()
    }

    /// Consumes the change notification: returns whether anything has changed since the last
    /// call, resetting the flag
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

    /// Discards the previous display tree and rebuilds it from the current source text,
    /// returning the new root
    pub fn render(&mut self) -> DisplayNode {
        self.tree.clear();
        match tokenize(&self.text) {
            Some(root) => {
                if let Some(node) = build(&root) {
                    self.tree.append_child(node);
                }
            }
            // Whitespace-only input never produced a root
            None => log::debug!("no JSON root to build; rendering an empty tree"),
        }
        self.dirty = false;
        self.tree.take_dirty();
        self.tree.root()
    }
}

impl Default for JsonView {
    fn default() -> Self {
        Self::new()
    }
}
