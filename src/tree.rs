//! The display-tree abstraction shared by both pipelines.
//!
//! Both the grammar classifier and the JSON builder emit [`DisplayNode`]s, which form an ordered
//! tree that is handed wholesale to the rendering collaborator.  This module knows nothing about
//! how a node is eventually painted - it only stores the shape of the tree (which nodes exist, in
//! what order, under which group) and reports changes upwards through a dirty flag.

/// The grouping styles a [`Group`] can be tagged with.  The rendering collaborator is free to lay
/// these out however it likes; the core only guarantees that the tag matches the grammar-construct
/// semantics of the node that produced the group.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GroupStyle {
    /// A set of alternatives (e.g. an EBNF `Choice` node).  Order is still preserved - choices are
    /// displayed in source order.
    Choice,
    /// An ordered run of items (e.g. an EBNF `SequenceOrDifference` or `Production`).
    Sequence,
    /// A generic group labelled by a title node, used for construct kinds that have no dedicated
    /// display rule.
    Titled,
    /// A plain nested list with no title, used by the JSON pipeline.
    List,
}

impl GroupStyle {
    /// The name used for groups of this style in [tree views](DisplayNode::tree_view)
    fn label(self) -> &'static str {
        match self {
            GroupStyle::Choice => "choice",
            GroupStyle::Sequence => "sequence",
            GroupStyle::Titled => "titled",
            GroupStyle::List => "list",
        }
    }
}

/// A single node of the output tree: either a literal leaf or an ordered group of child nodes.
///
/// `DisplayNode`s are built fresh on every re-render and owned by the pipeline driver until they
/// are handed to the rendering collaborator; the input trees they were built from are never
/// aliased into them.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DisplayNode {
    /// A literal piece of display text.  Empty text is valid and renders as an empty literal.
    Leaf(String),
    /// An ordered group of child nodes
    Group(Group),
}

impl DisplayNode {
    /// Creates a new [`Leaf`](DisplayNode::Leaf) from anything string-like
    pub fn leaf(text: impl Into<String>) -> Self {
        DisplayNode::Leaf(text.into())
    }

    /// The direct children of this node.  Leaves always return an empty slice.
    pub fn children(&self) -> &[DisplayNode] {
        match self {
            DisplayNode::Leaf(_) => &[],
            DisplayNode::Group(group) => group.children(),
        }
    }

    /// The one-line name of this node used in [tree views](Self::tree_view): a leaf's text, a
    /// titled group's title, or the style tag of an untitled group.
    pub fn display_name(&self) -> String {
        match self {
            DisplayNode::Leaf(text) => text.clone(),
            DisplayNode::Group(group) => match group.title() {
                Some(title) => title.display_name(),
                None => group.style().label().to_string(),
            },
        }
    }

    /// Append a debug-style tree view of this node to a [`String`], similar to the output of the
    /// Unix command 'tree'
    pub fn write_tree_view(&self, string: &mut String) {
        let mut indentation_string = String::new();
        write_tree_view_recursive(self, string, &mut indentation_string);
        // Pop the unnecessary newline at the end
        let popped_char = string.pop();
        debug_assert_eq!(Some('\n'), popped_char);
    }

    /// Build a string of the tree view of this node.  This is the same as
    /// [`write_tree_view`](Self::write_tree_view), except that it returns a new [`String`] rather
    /// than appending to an existing one.
    pub fn tree_view(&self) -> String {
        let mut s = String::new();
        self.write_tree_view(&mut s);
        s
    }
}

/// A function that recursively writes the tree view of a node and all its children to a given
/// [`String`].  To avoid allocations, this function modifies a [`String`] buffer
/// `indentation_string`, which will be appended to the front of every line, and will cause the
/// indentation levels to increase.
fn write_tree_view_recursive(
    node: &DisplayNode,
    string: &mut String,
    indentation_string: &mut String,
) {
    // Push the node's display name with indentation and a newline
    string.push_str(indentation_string);
    string.push_str(&node.display_name());
    string.push('\n');
    // Indent by two spaces
    indentation_string.push_str("  ");
    // Write all the children
    for child in node.children() {
        write_tree_view_recursive(child, string, indentation_string);
    }
    // Reset indentation
    for _ in 0..2 {
        indentation_string.pop();
    }
}

/// An ordered group of [`DisplayNode`]s, optionally labelled by a title node
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Group {
    style: GroupStyle,
    title: Option<Box<DisplayNode>>,
    children: Vec<DisplayNode>,
}

impl Group {
    /// Creates an empty, untitled `Group` of a given style
    pub fn new(style: GroupStyle) -> Self {
        Group {
            style,
            title: None,
            children: Vec::new(),
        }
    }

    /// Creates an empty `Group` labelled by a given title node
    pub fn with_title(style: GroupStyle, title: DisplayNode) -> Self {
        Group {
            style,
            title: Some(Box::new(title)),
            children: Vec::new(),
        }
    }

    /// Appends a child to the end of this `Group`.  Children are displayed in append order -
    /// grammar constructs are order-sensitive, so this order is load-bearing.
    pub fn push(&mut self, child: DisplayNode) {
        self.children.push(child);
    }

    /// This `Group`'s style tag
    pub fn style(&self) -> GroupStyle {
        self.style
    }

    /// This `Group`'s title node, if it has one
    pub fn title(&self) -> Option<&DisplayNode> {
        self.title.as_deref()
    }

    /// The children of this `Group`, in append order
    pub fn children(&self) -> &[DisplayNode] {
        &self.children
    }
}

/// The top-level container that a pipeline driver builds its [`DisplayNode`]s into.
///
/// A `TreeList` is the only mutable surface of the display tree: the driver `clear`s it, appends
/// freshly classified/built nodes, then hands the materialized [`root`](Self::root) to the
/// rendering collaborator.  Every mutation sets a dirty flag, which the collaborator consumes
/// through [`take_dirty`](Self::take_dirty) - the core never calls into rendering itself.
#[derive(Debug, Clone)]
pub struct TreeList {
    style: GroupStyle,
    title: Option<DisplayNode>,
    children: Vec<DisplayNode>,
    dirty: bool,
}

impl TreeList {
    /// Creates an empty, untitled `TreeList`
    pub fn new(style: GroupStyle) -> Self {
        TreeList {
            style,
            title: None,
            children: Vec::new(),
            dirty: false,
        }
    }

    /// Creates an empty `TreeList` labelled by a given title node
    pub fn with_title(style: GroupStyle, title: DisplayNode) -> Self {
        TreeList {
            style,
            title: Some(title),
            children: Vec::new(),
            dirty: false,
        }
    }

    /// Appends a node to the end of the top-level group
    pub fn append_child(&mut self, node: DisplayNode) {
        self.children.push(node);
        self.dirty = true;
    }

    /// Removes all children from the top-level group.  Drivers call this before every rebuild -
    /// the previous tree is fully discarded, never patched.
    pub fn clear(&mut self) {
        self.children.clear();
        self.dirty = true;
    }

    /// Replaces the title of the top-level group
    pub fn set_title(&mut self, title: DisplayNode) {
        self.title = Some(title);
        self.dirty = true;
    }

    /// The number of children currently in the top-level group
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// `true` if the top-level group currently has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Materializes the current top-level group as a [`DisplayNode`], ready to be handed to the
    /// rendering collaborator.  The returned tree is a snapshot - later mutations of this
    /// `TreeList` don't affect it.
    pub fn root(&self) -> DisplayNode {
        let mut group = match &self.title {
            Some(title) => Group::with_title(self.style, title.clone()),
            None => Group::new(self.style),
        };
        for child in &self.children {
            group.push(child.clone());
        }
        DisplayNode::Group(group)
    }

    /// `true` if this tree has changed since the last call to [`take_dirty`](Self::take_dirty)
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Resets the dirty flag, returning its previous value.  The rendering collaborator polls
    /// this to decide whether a repaint is needed.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
