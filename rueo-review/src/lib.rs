//! Translation review for rueo dictionary articles
//!
//! This crate turns parsed articles into groups of translation candidates an
//! editor can accept, pick from or correct.
//!
//! # Workflow Example
//!
//! ```ignore
//! use rueo_review::{CandidateGenerator, format_review};
//! use rueo_markup::{MarkupConfig, parse_article};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MarkupConfig::default();
//!
//!     // 1. Parse the article into a block tree
//!     let parsed = parse_article("[abak/o] брюшной, задний плавник.", &config);
//!
//!     // 2. Expand every translation segment into candidate groups
//!     let review = CandidateGenerator::new(&config).generate_review(&parsed)?;
//!
//!     // 3. Print the report
//!     print!("{}", format_review(&review));
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod candidates;
pub mod data;
pub mod error;
pub mod filter;
pub mod morphology;
pub mod notes;
pub mod phrase;
pub mod review;

// Integration tests (only available during testing)
#[cfg(test)]
mod integration_tests;

// Re-export main types for convenient access
pub use batch::{ArticleOutcome, review_batch};
pub use candidates::CandidateGenerator;
pub use data::{
    ArticleReview, Candidate, CandidateDecision, Component, EXPANDED_CANDIDATE, Example,
    LITERAL_CANDIDATE, Phrase, PhraseSet, TranslationGroup,
};
pub use error::{ReviewError, ReviewResult};
pub use filter::{filter, is_pure_reference, is_translation_item};
pub use notes::{NoteExpansion, expand_note, expand_parenthetical_forms};
pub use phrase::{Expansion, MAX_PHRASE_VARIANTS, PhraseBuilder};
pub use review::{
    apply_candidate_selection, collect_phrases, effective_items, extract_examples, format_review,
    needs_review,
};

use rueo_markup::MarkupConfig;

/// Parse and review one article
pub fn review_article(article: &str, config: &MarkupConfig) -> ReviewResult<ArticleReview> {
    let parsed = rueo_markup::parse_article(article, config);
    CandidateGenerator::new(config).generate_review(&parsed)
}
