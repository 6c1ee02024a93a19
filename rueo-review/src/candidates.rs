//! Candidate generation
//!
//! Turns the block tree of a parsed article into [`TranslationGroup`]s. Every
//! `;` separated segment of a translation becomes one group carrying two
//! candidates: the segment as written (`literal`) and the segment with all
//! alternations and optional parts expanded (`expanded`).
//!
//! ```ignore
//! let generator = CandidateGenerator::new(&config);
//! let review = generator.generate_review(&parsed)?;
//! for group in &review.groups {
//!     println!("{} {:?}", group.stable_key, group.items);
//! }
//! ```

use crate::data::{
    ArticleReview, Candidate, EXPANDED_CANDIDATE, LITERAL_CANDIDATE, TranslationGroup,
};
use crate::error::ReviewResult;
use crate::filter::filter;
use crate::phrase::{Expansion, PhraseBuilder};
use rueo_markup::text::{clean_spacing, unique_in_order};
use rueo_markup::{
    Block, DividerClass, Headword, IllustrationBlock, MarkupConfig, Node, NodeKind,
    ParsedArticle, ReferenceMode, StructuralIssue, TranslationBlock, is_alternation_word,
};
use std::collections::HashMap;

pub struct CandidateGenerator<'a> {
    config: &'a MarkupConfig,
    builder: PhraseBuilder<'a>,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(config: &'a MarkupConfig) -> Self {
        CandidateGenerator {
            config,
            builder: PhraseBuilder::new(config),
        }
    }

    /// Groups of a single translation block, numbered from one
    pub fn generate(&self, block: &TranslationBlock) -> ReviewResult<Vec<TranslationGroup>> {
        let mut collector = Collector::default();
        self.translation(block, None, &mut collector)?;
        Ok(collector.groups)
    }

    /// Build the review of a whole article
    ///
    /// # Returns
    /// * `Ok(ArticleReview)` - Groups in document order, review notes and
    ///   structural issues of the parse and the expansion
    /// * `Err(ReviewError::InvariantViolation)` - The article could not be
    ///   expanded; other articles are unaffected
    pub fn generate_review(&self, article: &ParsedArticle) -> ReviewResult<ArticleReview> {
        let mut collector = Collector {
            issues: article.issues.clone(),
            ..Collector::default()
        };
        self.blocks(&article.headword.children, None, &mut collector)?;

        tracing::debug!(
            headword = article.headword.display_name(),
            groups = collector.groups.len(),
            notes = collector.notes.len(),
            "article reviewed"
        );

        Ok(ArticleReview {
            headword: article.headword.display_name().to_string(),
            groups: collector.groups,
            notes: collector.notes,
            issues: collector.issues,
        })
    }

    fn blocks(
        &self,
        blocks: &[Block],
        section: Option<&str>,
        collector: &mut Collector,
    ) -> ReviewResult<()> {
        for block in blocks {
            match block {
                Block::Headword(nested) => self.headword(nested, collector)?,
                Block::Translation(translation) => {
                    self.translation(translation, section, collector)?;
                }
                Block::Illustration(illustration) => {
                    self.illustration(illustration, section, collector)?;
                }
                Block::Explanation(explanation) => {
                    let text = plain_text(&explanation.content);
                    if !text.is_empty() {
                        collector.note(section, text);
                    }
                }
                Block::Reference(_) => {}
            }
        }
        Ok(())
    }

    fn headword(&self, headword: &Headword, collector: &mut Collector) -> ReviewResult<()> {
        let section = (!headword.raw_form.is_empty()).then_some(headword.raw_form.as_str());
        self.blocks(&headword.children, section, collector)
    }

    fn translation(
        &self,
        block: &TranslationBlock,
        section: Option<&str>,
        collector: &mut Collector,
    ) -> ReviewResult<()> {
        if block.reference_only {
            tracing::debug!(section = ?section, "skipping reference-only block");
            return self.blocks(&block.children, section, collector);
        }

        for segment in block.content.split(|node| node.is_divider(DividerClass::Far)) {
            let mut expansion = Expansion::default();
            for set in self.builder.build(segment)? {
                expansion.absorb(self.builder.expand_set(&set));
            }

            let draft = GroupDraft {
                items: expansion.items,
                base_items: self.literal_items(segment),
                label: self.segment_label(segment),
                section: section.map(str::to_string),
                eo_source: None,
                notes: expansion.notes,
                flagged: block.requires_review,
            };
            collector.issues.extend(expansion.issues);
            collector.push(draft);
        }

        self.blocks(&block.children, section, collector)
    }

    fn illustration(
        &self,
        block: &IllustrationBlock,
        section: Option<&str>,
        collector: &mut Collector,
    ) -> ReviewResult<()> {
        let eo_source = block
            .source_expanded
            .first()
            .cloned()
            .or_else(|| (!block.source_lemma.is_empty()).then(|| block.source_lemma.clone()));

        let mut expansion = Expansion::default();
        for set in self.builder.build(&block.target_segments)? {
            expansion.absorb(self.builder.expand_set(&set));
        }

        let base_items = unique_in_order(
            block
                .target_segments
                .split(|node| node.is_divider(DividerClass::Far))
                .flat_map(|segment| self.literal_items(segment)),
        );

        let draft = GroupDraft {
            items: expansion.items,
            base_items,
            label: self.segment_label(&block.target_segments),
            section: eo_source.clone().or_else(|| section.map(str::to_string)),
            eo_source,
            notes: expansion.notes,
            flagged: block.requires_review,
        };
        collector.issues.extend(expansion.issues);
        collector.push(draft);
        Ok(())
    }

    /// Split a segment on `,` as written, without expanding anything
    pub fn literal_items(&self, segment: &[Node]) -> Vec<String> {
        let mut items = Vec::new();
        let mut current = String::new();
        for node in segment {
            match &node.kind {
                NodeKind::Text { content } => current.push_str(&content.replace('_', "")),
                NodeKind::Note { body } => {
                    current.push('(');
                    current.push_str(&body.replace('_', ""));
                    current.push(')');
                }
                // Only a reference that opens the item is kept
                NodeKind::Reference { target, .. } if current.trim().is_empty() => {
                    current.push('<');
                    current.push_str(target);
                    current.push('>');
                }
                NodeKind::Reference { .. } => {}
                NodeKind::StylisticMarker { tag } if is_alternation_word(tag) => {
                    current.push_str(" или ");
                }
                NodeKind::Divider {
                    class: DividerClass::Near | DividerClass::Far,
                    ..
                } => items.extend(self.literal_item(&std::mem::take(&mut current))),
                NodeKind::Divider { symbol, .. } => current.push(*symbol),
                NodeKind::StylisticMarker { .. }
                | NodeKind::Grammar { .. }
                | NodeKind::SenseNumber { .. }
                | NodeKind::HeadwordMarker { .. } => {}
            }
        }
        items.extend(self.literal_item(&current));
        unique_in_order(items)
    }

    fn literal_item(&self, text: &str) -> Option<String> {
        let mut item = clean_spacing(text);
        if item.ends_with('.') && !self.config.abbreviations.ends_with_abbreviation(&item) {
            item.pop();
            item = clean_spacing(&item);
        }
        (!item.is_empty()).then_some(item)
    }

    /// Display forms of the field and register labels of a segment
    fn segment_label(&self, segment: &[Node]) -> Option<String> {
        let labels: Vec<String> = segment
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::StylisticMarker { tag }
                    if !is_alternation_word(tag) && ReferenceMode::from_label(tag).is_none() =>
                {
                    Some(self.config.labels.display(tag))
                }
                _ => None,
            })
            .collect();
        let labels = unique_in_order(labels);
        (!labels.is_empty()).then(|| labels.join(" "))
    }
}

/// Markup-free text of a node list, for review notes
fn plain_text(nodes: &[Node]) -> String {
    let text: String = nodes
        .iter()
        .map(|node| match &node.kind {
            NodeKind::StylisticMarker { tag } => tag.clone(),
            NodeKind::Note { body } => format!("({})", body),
            _ => node.raw.clone(),
        })
        .collect();
    clean_spacing(&text.replace('_', ""))
}

struct GroupDraft {
    items: Vec<String>,
    base_items: Vec<String>,
    label: Option<String>,
    section: Option<String>,
    eo_source: Option<String>,
    notes: Vec<String>,
    /// The block itself asked for review
    flagged: bool,
}

#[derive(Default)]
struct Collector {
    groups: Vec<TranslationGroup>,
    notes: Vec<String>,
    issues: Vec<StructuralIssue>,
    next_id: usize,
    per_section: HashMap<String, usize>,
}

impl Collector {
    fn note(&mut self, section: Option<&str>, text: String) {
        let note = match section {
            Some(section) => format!("{}: {}", section, text),
            None => text,
        };
        if !self.notes.contains(&note) {
            self.notes.push(note);
        }
    }

    fn push(&mut self, draft: GroupDraft) {
        for note in &draft.notes {
            self.note(draft.section.as_deref(), note.clone());
        }

        let group = TranslationGroup {
            id: String::new(),
            stable_key: String::new(),
            items: unique_in_order(draft.items),
            base_items: draft.base_items,
            label: draft.label,
            section: draft.section,
            requires_review: draft.flagged,
            auto_generated: false,
            eo_source: draft.eo_source,
            candidates: Vec::new(),
            notes: draft.notes,
            selected_candidate: None,
            accepted: None,
        };
        let Some(mut group) = filter(group) else {
            return;
        };

        self.next_id += 1;
        let section_key = group.section.clone().unwrap_or_else(|| "-".to_string());
        let ordinal = self.per_section.entry(section_key.clone()).or_insert(0);
        *ordinal += 1;
        group.id = format!("group_{}", self.next_id);
        group.stable_key = format!("{}#{}", section_key, ordinal);

        let disjoint = !group
            .items
            .iter()
            .any(|item| group.base_items.contains(item));
        group.auto_generated = group.items != group.base_items;
        group.requires_review |= group.auto_generated || disjoint;
        group.candidates = vec![
            Candidate::new(LITERAL_CANDIDATE, "As written", group.base_items.clone()),
            Candidate::new(EXPANDED_CANDIDATE, "Expanded", group.items.clone()),
        ];
        self.groups.push(group);
    }
}
