//! Demo driver for espalier: prints the display tree of a file as a text tree view.
//!
//! The file is interpreted one of two ways: if it deserializes as a parse-tree dump (the
//! `type`/`text`/`children` JSON format that grammar engines emit), it is run through the grammar
//! pipeline; otherwise its raw text is fed to the minimal JSON scanner.

use std::env;
use std::error::Error;
use std::fs;

use espalier::{Dialect, DisplayNode, GrammarEngine, GrammarView, JsonView, ParseNode};

/// A [`GrammarEngine`] backed by a pre-parsed tree dump: "parsing" just deserializes the input
/// text as a [`ParseNode`], ignoring the grammar text and dialect entirely.
struct DumpEngine;

impl GrammarEngine for DumpEngine {
    type Error = serde_json::Error;

    fn parse(
        &self,
        _grammar: &str,
        input: &str,
        _dialect: Dialect,
    ) -> Result<ParseNode, Self::Error> {
        serde_json::from_str(input)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialise the logging and startup
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let path = env::args().nth(1).ok_or("usage: espalier <file>")?;
    let text = fs::read_to_string(&path)?;

    let root: DisplayNode = if serde_json::from_str::<ParseNode>(&text).is_ok() {
        log::info!("rendering {} as a parse-tree dump", path);
        let mut view = GrammarView::new(DumpEngine);
        view.set_grammar("(pre-parsed dump)");
        view.set_content(text);
        view.render()?
    } else {
        log::info!("rendering {} as JSON-like text", path);
        let mut view = JsonView::new();
        view.set_text(text);
        view.render()
    };

    println!("{}", root.tree_view());
    Ok(())
}
