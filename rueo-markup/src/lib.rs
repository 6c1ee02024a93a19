//! Parser for rueo dictionary article markup
//!
//! Articles of the Esperanto-Russian dictionary are plain text with a small
//! markup language: `[...]` headwords, `(...)` notes, `<...>` references,
//! `_..._` italics, backtick stress marks and `~` for the headword stem.
//! This crate turns such text into a typed block tree.
//!
//! # Pipeline
//!
//! 1. [`preprocess`] normalises the raw text (x-system, quotes, comments)
//! 2. [`Tokenizer`] turns each line into typed [`Node`]s with exact spans
//! 3. [`ArticleParser`] arranges lines by indentation into [`Block`]s
//! 4. [`merge_continuations`] folds translation blocks split over lines
//!
//! ```ignore
//! use rueo_markup::{ArticleParser, MarkupConfig};
//!
//! let config = MarkupConfig::default();
//! let parsed = ArticleParser::new(&config).parse("[abak/o] *8 1. _архит._ аб`ак(а);\n\t2. счёты.");
//! for issue in &parsed.issues {
//!     eprintln!("{}", issue);
//! }
//! ```

pub mod ast;
pub mod classifier;
pub mod config;
pub mod diagnostics;
pub mod headword;
pub mod loader;
pub mod merger;
pub mod preprocess;
pub mod text;
pub mod tokenizer;

// Re-export the tree types for convenient access
pub use ast::{
    Block, DividerClass, ExplanationBlock, Headword, IllustrationBlock, Lemma, Node, NodeKind,
    OfficialMark, ReferenceBlock, ReferenceMode, Span, TranslationBlock, reconstruct,
};
pub use classifier::{ArticleParser, ParsedArticle, is_alternation_word};
pub use config::{AbbreviationTable, LabelRegistry, MarkupConfig};
pub use diagnostics::{IssueKind, StructuralIssue};
pub use headword::{expand_lemma_pattern, expand_tilde, parse_headword};
pub use loader::{config_from_json, load_config_from_file, load_shortenings_from_file};
pub use merger::merge_continuations;
pub use preprocess::{preprocess, split_articles};
pub use tokenizer::{Tokenized, Tokenizer};

/// Parse one article with the given configuration
pub fn parse_article(article: &str, config: &MarkupConfig) -> ParsedArticle {
    ArticleParser::new(config).parse(article)
}
