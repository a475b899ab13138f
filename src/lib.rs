//! # Espalier
//!
//! Espalier turns parse trees into display trees: ordered, labelled trees-of-lists that a
//! graph-rendering collaborator can lay out and paint.  Two pipelines share the same shape
//! (parse, classify, build):
//!
//! - The [`grammar`] pipeline consumes the output of an external EBNF/BNF engine (see
//!   [`grammar::GrammarEngine`]) and classifies each parse node by grammar-construct kind into
//!   choice groups, sequence groups, literal leaves or titled groups.
//! - The [`json`] pipeline scans relaxed JSON-like text with a deliberately minimal hand-rolled
//!   tokenizer and builds plain nested list groups from it.
//!
//! Both emit into the [`tree`] module's [`tree::DisplayNode`]/[`tree::TreeList`] abstraction,
//! which reports changes upwards through a dirty flag.  Rendering, layout and interaction are
//! entirely the collaborator's business - this crate never calls out.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(rustdoc::private_intra_doc_links)]

pub mod grammar;
pub mod json;
pub mod tree;

pub use grammar::{classify, Dialect, GrammarEngine, GrammarView, NodeKind, ParseNode};
pub use json::{build, tokenize, JsonNode, JsonView};
pub use tree::{DisplayNode, Group, GroupStyle, TreeList};
