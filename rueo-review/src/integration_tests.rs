//! End-to-end tests: raw article text to reviewed groups
//!
//! Every test runs the full pipeline (preprocessing, tokenizing,
//! classification, merging, expansion, filtering and candidate generation)
//! on fragments of real dictionary articles.

use crate::candidates::CandidateGenerator;
use crate::data::ArticleReview;
use crate::review::format_review;
use crate::review_article;
use rueo_markup::text::parens_balanced;
use rueo_markup::{
    Block, IssueKind, MarkupConfig, NodeKind, TranslationBlock, parse_article, preprocess,
};

fn review(article: &str) -> ArticleReview {
    review_article(article, &MarkupConfig::default()).unwrap()
}

fn all_items(review: &ArticleReview) -> Vec<String> {
    review
        .groups
        .iter()
        .flat_map(|group| group.items.iter().cloned())
        .collect()
}

// ============================================================================
// Notes and continuations
// ============================================================================

#[test]
fn test_commentary_note_survives_continuation() {
    let config = MarkupConfig::default();
    let article =
        "[abak/o]\n\tсчёты (_прибор_ = <globkalkulilo>, <bidkalkulilo>);\n\tабак, соробан.";
    let parsed = parse_article(article, &config);

    let Block::Translation(first) = &parsed.headword.children[0] else {
        panic!("expected a translation block");
    };
    assert!(first
        .content
        .iter()
        .any(|node| node.text().is_some_and(|text| text.trim() == "счёты")));
    assert!(first
        .content
        .iter()
        .any(|node| matches!(node.kind, NodeKind::Note { .. })));

    let review = CandidateGenerator::new(&config)
        .generate_review(&parsed)
        .unwrap();
    assert_eq!(review.groups.len(), 2);
    assert_eq!(review.groups[0].items, vec!["счёты"]);
    assert_eq!(
        review.groups[0].notes,
        vec!["прибор = <globkalkulilo>, <bidkalkulilo>"]
    );
    assert_eq!(review.groups[1].items, vec!["абак", "соробан"]);
}

#[test]
fn test_alternation_gives_exactly_three_phrases() {
    let review = review("[ablativ/o] _грам._ отложительный (_или_ отделительный, _или_ исходный) падеж.");
    assert_eq!(review.groups.len(), 1);
    assert_eq!(
        review.groups[0].items,
        vec!["отложительный падеж", "отделительный падеж", "исходный падеж"]
    );
    assert_eq!(
        review.groups[0].base_items,
        vec!["отложительный (или отделительный, или исходный) падеж"]
    );
    assert!(review.groups[0].requires_review);
}

#[test]
fn test_adjective_list_shares_noun() {
    let review = review("[naĝil/o] плавник; брюшной, задний плавник.");
    assert_eq!(review.groups[1].items, vec!["брюшной плавник", "задний плавник"]);
    assert_eq!(review.groups[1].base_items, vec!["брюшной", "задний плавник"]);
}

#[test]
fn test_reference_only_block_yields_zero_groups() {
    let config = MarkupConfig::default();
    let parsed = parse_article("[abak/o]\n\t1. счёты.\n\t2. _see_ <sorobano>.", &config);
    let generator = CandidateGenerator::new(&config);

    let reference_only: Vec<&TranslationBlock> = parsed
        .headword
        .children
        .iter()
        .filter_map(|block| match block {
            Block::Translation(t) if t.reference_only => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(reference_only.len(), 1);
    assert!(generator.generate(reference_only[0]).unwrap().is_empty());

    let review = generator.generate_review(&parsed).unwrap();
    assert_eq!(all_items(&review), vec!["счёты"]);
}

// ============================================================================
// Spacing and parentheses
// ============================================================================

#[test]
fn test_stress_mark_keeps_space() {
    let review = review("[nomen/o] (`имя) прилагательное.");
    let items = all_items(&review);
    assert!(items.contains(&"`имя прилагательное".to_string()));
    assert!(items.iter().all(|item| !item.contains("`имяприлагательное")));
}

#[test]
fn test_items_have_balanced_parentheses() {
    let articles = [
        "[abak/o] счёты (прибор, абак.",
        "[abak/o] счёты) абак; (соробан (_яп._) доска.",
        "[abak/o] аб`ак(а) (_архит._ плита (капители)).",
    ];
    for article in articles {
        for item in all_items(&review(article)) {
            assert!(parens_balanced(&item), "unbalanced item '{}' in {}", item, article);
        }
    }
}

#[test]
fn test_repeated_inline_parentheticals_stay_bounded() {
    let article = format!("[a/o] {}", "с(а) ".repeat(20));
    let review = review(&article);
    assert_eq!(review.groups.len(), 1);
    assert_eq!(review.groups[0].items.len(), 1);
    assert_eq!(review.issues.len(), 1);
    assert_eq!(review.issues[0].kind, IssueKind::ExpansionLimit);
}

#[test]
fn test_base_items_ignore_expansion() {
    let plain = review("[abak/o] счётная доска.");
    let expanded = review("[abak/o] счётная (_или_ вычислительная) доска.");
    assert_eq!(plain.groups[0].base_items, vec!["счётная доска"]);
    assert_eq!(
        expanded.groups[0].base_items,
        vec!["счётная (или вычислительная) доска"]
    );
    assert_eq!(
        expanded.groups[0].items,
        vec!["счётная доска", "вычислительная доска"]
    );
}

// ============================================================================
// Whole articles
// ============================================================================

#[test]
fn test_full_article_report() {
    let source = preprocess(
        "[abak/o] *8 1. _архит._ аб`ак(а);\r\n\t2. счёты;\r\n\tабак.\r\n\t\tjapana ~ японские счёты. !!! проверить\r\n",
    );
    let review = review(&source);
    let report = format_review(&review);
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(
        lines,
        vec![
            "abak/o",
            "  ⮕ архит. аб`ак | аб`ака  [?]",
            "  ⮕ счёты",
            "  ⮕ абак",
            "  ⮕ [japana abako] японские счёты",
        ]
    );
    assert!(review.issues.is_empty());
}

#[test]
fn test_nested_headword_sections_and_keys() {
    let review = review("[abak/o] счёты.\n\t[~ist/o] абакист;\n\t\tсчётчик.");
    let keys: Vec<&str> = review.groups.iter().map(|g| g.stable_key.as_str()).collect();
    assert_eq!(keys, vec!["-#1", "~ist/o#1", "~ist/o#2"]);
    let ids: Vec<&str> = review.groups.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["group_1", "group_2", "group_3"]);
}

#[test]
fn test_missing_headword_is_reported() {
    let review = review("счёты; абак.");
    assert_eq!(review.headword, "<без заголовка>");
    assert_eq!(all_items(&review), vec!["счёты", "абак"]);
    assert!(!review.issues.is_empty());
}

#[test]
fn test_review_serializes_to_json() {
    let review = review("[abak/o] брюшной, задний плавник.");
    let json = serde_json::to_value(&review).unwrap();
    assert_eq!(json["headword"], "abak/o");
    assert_eq!(json["groups"][0]["autoGenerated"], true);
    assert_eq!(json["groups"][0]["candidates"][1]["id"], "expanded");
}
