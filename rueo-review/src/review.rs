//! Review surface: text report, earlier decisions, examples
//!
//! The text report is what the command line prints for an article:
//!
//! ```text
//! abak/o
//!   ⮕ архит. аб`ак | аб`ака  [?]
//!   ⮕ счёты
//!   ⮕ [japana abako] японские счёты
//!   ℹ прибор = <globkalkulilo>
//! ```

use crate::data::{ArticleReview, Candidate, CandidateDecision, Example, TranslationGroup};
use rueo_markup::text::{clean_spacing, unique_in_order};
use rueo_markup::{Block, MarkupConfig, ParsedArticle, reconstruct};
use std::collections::HashMap;
use std::fmt::Write;

/// Candidate id used for items typed in by an editor
pub const MANUAL_CANDIDATE: &str = "manual";

/// Items of the selected candidate, or the expanded items
pub fn effective_items(group: &TranslationGroup) -> &[String] {
    group
        .selected_candidate
        .as_deref()
        .and_then(|id| group.candidate(id))
        .map(|candidate| candidate.items.as_slice())
        .unwrap_or(&group.items)
}

/// Render a review as the plain-text report
pub fn format_review(review: &ArticleReview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", review.headword);
    for group in &review.groups {
        let mut line = String::from("  ⮕ ");
        if let Some(section) = &group.section {
            let _ = write!(line, "[{}] ", section);
        }
        if let Some(label) = &group.label {
            let _ = write!(line, "{} ", label);
        }
        line.push_str(&effective_items(group).join(" | "));
        if group.requires_review && group.accepted != Some(true) {
            line.push_str("  [?]");
        }
        let _ = writeln!(out, "{}", line);
    }
    for note in &review.notes {
        let _ = writeln!(out, "  ℹ {}", note);
    }
    out
}

/// Re-attach earlier editor decisions to freshly generated groups
///
/// Decisions are matched by stable key. Manual items become a `manual`
/// candidate and are selected; otherwise a selected candidate id is kept
/// when the group still offers it.
///
/// # Returns
/// The number of groups a decision was applied to
pub fn apply_candidate_selection(
    groups: &mut [TranslationGroup],
    decisions: &[CandidateDecision],
) -> usize {
    let by_key: HashMap<&str, &CandidateDecision> = decisions
        .iter()
        .map(|decision| (decision.stable_key.as_str(), decision))
        .collect();

    let mut applied = 0;
    for group in groups.iter_mut() {
        let Some(decision) = by_key.get(group.stable_key.as_str()) else {
            continue;
        };
        applied += 1;
        group.accepted = decision.accepted;

        match &decision.manual_items {
            Some(items) if !items.is_empty() => {
                let items = unique_in_order(items.iter().map(|item| clean_spacing(item)));
                group.candidates.retain(|c| c.id != MANUAL_CANDIDATE);
                group
                    .candidates
                    .push(Candidate::new(MANUAL_CANDIDATE, "Manual", items));
                group.selected_candidate = Some(MANUAL_CANDIDATE.to_string());
            }
            _ => match decision.selected_candidate.as_deref() {
                Some(id) if group.candidate(id).is_some() => {
                    group.selected_candidate = Some(id.to_string());
                }
                Some(id) => {
                    tracing::warn!(
                        key = %group.stable_key,
                        candidate = id,
                        "selected candidate no longer offered"
                    );
                    group.selected_candidate = None;
                }
                None => group.selected_candidate = None,
            },
        }
    }
    applied
}

/// True when some group still waits for an editor
pub fn needs_review(groups: &[TranslationGroup]) -> bool {
    groups
        .iter()
        .any(|group| group.accepted != Some(true) && (group.requires_review || group.auto_generated))
}

/// Esperanto examples of an article with their Russian renderings
pub fn extract_examples(article: &ParsedArticle, config: &MarkupConfig) -> Vec<Example> {
    let mut examples = Vec::new();
    collect_examples(&article.headword.children, config, &mut examples);
    examples
}

fn collect_examples(blocks: &[Block], config: &MarkupConfig, out: &mut Vec<Example>) {
    for block in blocks {
        if let Block::Illustration(illustration) = block {
            let eo = illustration
                .source_expanded
                .first()
                .cloned()
                .unwrap_or_else(|| illustration.source_lemma.clone());
            let mut ru = clean_spacing(&reconstruct(&illustration.target_segments).replace('_', ""));
            if ru.ends_with('.') && !config.abbreviations.ends_with_abbreviation(&ru) {
                ru.pop();
            }
            if !eo.is_empty() && !ru.is_empty() {
                out.push(Example { eo, ru });
            }
        }
        collect_examples(block.children(), config, out);
    }
}

/// Every item of every group, first occurrence kept
pub fn collect_phrases(review: &ArticleReview) -> Vec<String> {
    unique_in_order(
        review
            .groups
            .iter()
            .flat_map(|group| effective_items(group).iter().cloned()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::CandidateGenerator;
    use crate::data::{EXPANDED_CANDIDATE, LITERAL_CANDIDATE};
    use rueo_markup::parse_article;

    const ARTICLE: &str =
        "[abak/o] _архит._ аб`ак(а);\n\tсчёты (_прибор_ = <globkalkulilo>).\n\t\tjapana ~ японские счёты.";

    fn review() -> ArticleReview {
        let config = MarkupConfig::default();
        let parsed = parse_article(ARTICLE, &config);
        CandidateGenerator::new(&config)
            .generate_review(&parsed)
            .unwrap()
    }

    // ========== Text report ==========

    #[test]
    fn test_format_review() {
        let text = format_review(&review());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "abak/o");
        assert_eq!(lines[1], "  ⮕ архит. аб`ак | аб`ака  [?]");
        assert!(lines.contains(&"  ⮕ [japana abako] японские счёты"));
        assert!(lines.contains(&"  ℹ прибор = <globkalkulilo>"));
    }

    #[test]
    fn test_accepted_group_loses_marker() {
        let mut review = review();
        review.groups[0].accepted = Some(true);
        let text = format_review(&review);
        assert!(text.lines().nth(1).is_some_and(|line| !line.ends_with("[?]")));
    }

    // ========== Decisions ==========

    #[test]
    fn test_apply_selected_candidate() {
        let mut review = review();
        let key = review.groups[0].stable_key.clone();
        let decisions = vec![CandidateDecision {
            stable_key: key,
            accepted: Some(true),
            selected_candidate: Some(LITERAL_CANDIDATE.to_string()),
            manual_items: None,
        }];
        assert_eq!(apply_candidate_selection(&mut review.groups, &decisions), 1);
        assert_eq!(review.groups[0].selected_candidate.as_deref(), Some(LITERAL_CANDIDATE));
        assert_eq!(effective_items(&review.groups[0]), &["аб`ак(а)".to_string()]);
    }

    #[test]
    fn test_apply_manual_items() {
        let mut review = review();
        let key = review.groups[0].stable_key.clone();
        let decisions = vec![CandidateDecision {
            stable_key: key,
            accepted: Some(true),
            selected_candidate: Some(EXPANDED_CANDIDATE.to_string()),
            manual_items: Some(vec!["  абак ".to_string()]),
        }];
        apply_candidate_selection(&mut review.groups, &decisions);
        assert_eq!(review.groups[0].selected_candidate.as_deref(), Some(MANUAL_CANDIDATE));
        assert_eq!(effective_items(&review.groups[0]), &["абак".to_string()]);
    }

    #[test]
    fn test_unknown_candidate_is_cleared() {
        let mut review = review();
        let key = review.groups[0].stable_key.clone();
        let decisions = vec![CandidateDecision {
            stable_key: key,
            selected_candidate: Some("gone".to_string()),
            ..CandidateDecision::default()
        }];
        apply_candidate_selection(&mut review.groups, &decisions);
        assert_eq!(review.groups[0].selected_candidate, None);
    }

    #[test]
    fn test_needs_review() {
        let mut review = review();
        assert!(needs_review(&review.groups));
        for group in &mut review.groups {
            group.accepted = Some(true);
        }
        assert!(!needs_review(&review.groups));
        assert!(!needs_review(&[]));
    }

    // ========== Examples and phrases ==========

    #[test]
    fn test_extract_examples() {
        let config = MarkupConfig::default();
        let parsed = parse_article(ARTICLE, &config);
        let examples = extract_examples(&parsed, &config);
        assert_eq!(
            examples,
            vec![Example {
                eo: "japana abako".to_string(),
                ru: "японские счёты".to_string(),
            }]
        );
    }

    #[test]
    fn test_collect_phrases() {
        let phrases = collect_phrases(&review());
        assert_eq!(phrases, vec!["аб`ак", "аб`ака", "счёты", "японские счёты"]);
    }
}
