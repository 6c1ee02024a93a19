//! Phrase Builder and Cross-Product Engine
//!
//! Walks the content of a translation block and collects, for every `;`
//! separated stretch, the phrases written in it. Each phrase is a list of
//! [`Component`]s and stands for the cartesian product of their
//! alternatives.
//!
//! # Algorithm Overview
//!
//! 1. **Build** - text runs extend the last component, notes are handed to
//!    the note expander, `,` closes a phrase, `;` closes a phrase set
//! 2. **Shared tails** - adjective and verb lists get the noun or object of
//!    the closing phrase
//! 3. **Cartesian Product** - every phrase is expanded, capped at
//!    [`MAX_PHRASE_VARIANTS`]
//! 4. **Finalize** - spacing cleaned, leftover parentheticals expanded,
//!    trailing punctuation stripped where safe, parentheses balanced
//!
//! # Example
//!
//! ```ignore
//! // Input: "отложительный (_или_ отделительный, _или_ исходный) падеж."
//! // Output:
//! // [
//! //   "отложительный падеж",
//! //   "отделительный падеж",
//! //   "исходный падеж",
//! // ]
//! ```

use crate::data::{Component, Phrase, PhraseSet};
use crate::error::ReviewResult;
use crate::morphology::distribute_shared_tail;
use crate::notes::{NoteExpansion, can_fuse, expand_note, expand_parenthetical_forms};
use rueo_markup::text::{balance_parens, clean_spacing, parens_balanced};
use rueo_markup::{
    DividerClass, IssueKind, MarkupConfig, Node, NodeKind, StructuralIssue, is_alternation_word,
};

/// Maximum number of phrases one phrase may expand to
pub const MAX_PHRASE_VARIANTS: usize = 256;

/// Items produced from phrases, with the notes and issues met on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub items: Vec<String>,
    pub notes: Vec<String>,
    pub issues: Vec<StructuralIssue>,
}

impl Expansion {
    fn push_item(&mut self, item: String) {
        if !self.items.contains(&item) {
            self.items.push(item);
        }
    }

    /// Merge another expansion, keeping items unique
    pub fn absorb(&mut self, other: Expansion) {
        for item in other.items {
            self.push_item(item);
        }
        self.notes.extend(other.notes);
        self.issues.extend(other.issues);
    }
}

pub struct PhraseBuilder<'a> {
    config: &'a MarkupConfig,
}

impl<'a> PhraseBuilder<'a> {
    pub fn new(config: &'a MarkupConfig) -> Self {
        PhraseBuilder { config }
    }

    /// Collect the phrase sets of a translation block's content
    ///
    /// # Arguments
    /// * `content` - Nodes of one translation block (or one `;` segment)
    ///
    /// # Returns
    /// * `Ok(Vec<PhraseSet>)` - One set per `;` separated stretch
    /// * `Err(ReviewError::InvariantViolation)` - An empty component was built
    pub fn build(&self, content: &[Node]) -> ReviewResult<Vec<PhraseSet>> {
        let mut state = BuildState::default();
        for node in content {
            state.consume(node)?;
            state.previous = Some(node);
        }
        state.close_set();
        Ok(state.sets)
    }

    /// Expand one phrase into finished items
    ///
    /// A phrase that stands for more than [`MAX_PHRASE_VARIANTS`] forms,
    /// counting the parentheticals left inside its text, is returned as its
    /// literal source with an expansion-limit note.
    pub fn expand(&self, phrase: &Phrase) -> Expansion {
        let count = phrase.variant_count();
        let Some(count) = count.filter(|count| *count <= MAX_PHRASE_VARIANTS) else {
            return self.keep_literal(phrase, count);
        };

        let mut combinations = Vec::with_capacity(count);
        cartesian_product_recursive(&phrase.components, 0, &mut String::new(), &mut combinations);

        let mut forms = Vec::new();
        for combination in combinations {
            let budget = MAX_PHRASE_VARIANTS.saturating_sub(forms.len());
            match expand_parenthetical_forms(&clean_spacing(&combination), budget) {
                Some(expanded) => forms.extend(expanded),
                None => return self.keep_literal(phrase, None),
            }
        }

        let mut expansion = Expansion::default();
        for form in forms {
            if let Some(item) = self.finalize(&form) {
                expansion.push_item(item);
            }
        }
        expansion
    }

    fn keep_literal(&self, phrase: &Phrase, variants: Option<usize>) -> Expansion {
        let literal = clean_spacing(&phrase.literal.replace('_', ""));
        tracing::warn!(
            phrase = %literal,
            variants = ?variants,
            limit = MAX_PHRASE_VARIANTS,
            "phrase expansion limit reached, keeping literal text"
        );
        let message = format!(
            "more than {} variants, kept as written: {}",
            MAX_PHRASE_VARIANTS, literal
        );
        let mut expansion = Expansion::default();
        expansion.notes.push(message.clone());
        expansion
            .issues
            .push(StructuralIssue::new(IssueKind::ExpansionLimit, message, None));
        if let Some(item) = self.finalize(&literal) {
            expansion.push_item(item);
        }
        expansion
    }

    /// Expand every phrase of a set; the set's commentary becomes notes
    pub fn expand_set(&self, set: &PhraseSet) -> Expansion {
        let mut expansion = Expansion {
            notes: set.notes.clone(),
            ..Expansion::default()
        };
        for phrase in &set.phrases {
            expansion.absorb(self.expand(phrase));
        }
        expansion
    }

    /// Clean one item: spacing, safe trailing punctuation, balanced parens
    ///
    /// # Returns
    /// `None` when nothing is left
    pub fn finalize(&self, text: &str) -> Option<String> {
        let mut item = clean_spacing(text);
        while let Some(last) = item.chars().last() {
            let strip = match last {
                ',' | ';' | ':' => true,
                '.' => !self.config.abbreviations.ends_with_abbreviation(&item),
                ')' => {
                    let without = &item[..item.len() - 1];
                    !parens_balanced(&item) && parens_balanced(without)
                }
                c => c.is_whitespace(),
            };
            if !strip {
                break;
            }
            item.pop();
        }
        if !parens_balanced(&item) {
            item = clean_spacing(&balance_parens(&item));
        }
        (!item.is_empty()).then_some(item)
    }
}

/// Recursive helper for cartesian product generation
fn cartesian_product_recursive(
    components: &[Component],
    depth: usize,
    current: &mut String,
    results: &mut Vec<String>,
) {
    if depth == components.len() {
        results.push(current.clone());
        return;
    }

    for alternative in components[depth].alternatives() {
        let mark = current.len();
        current.push_str(alternative);
        cartesian_product_recursive(components, depth + 1, current, results);
        current.truncate(mark);
    }
}

#[derive(Default)]
struct BuildState<'n> {
    sets: Vec<PhraseSet>,
    set: PhraseSet,
    components: Vec<Component>,
    literal: String,
    /// Following text may extend the last component
    extendable: bool,
    /// A sentence divider was attached; further content opens a new set
    sentence_closed: bool,
    previous: Option<&'n Node>,
}

impl<'n> BuildState<'n> {
    fn consume(&mut self, node: &'n Node) -> ReviewResult<()> {
        match &node.kind {
            NodeKind::Text { content } => {
                if content.trim().is_empty() && self.components.is_empty() {
                    return Ok(());
                }
                self.begin_content();
                self.text(content, node);
                self.literal.push_str(&node.raw);
            }
            NodeKind::Divider { symbol, class } => match class {
                DividerClass::Near => self.close_phrase(),
                DividerClass::Far => self.close_set(),
                DividerClass::Sentence => {
                    if let Some(last) = self.components.last_mut() {
                        *last = last.map(|alt| format!("{}{}", alt, symbol));
                        self.literal.push(*symbol);
                        self.sentence_closed = true;
                    }
                    self.extendable = false;
                }
                DividerClass::Phrase => self.extendable = false,
            },
            NodeKind::Note { body } => {
                self.begin_content();
                self.note(body, node)?;
                self.literal.push_str(&node.raw);
            }
            NodeKind::Reference { target, label } => {
                self.begin_content();
                if self.components.is_empty() {
                    let text = match label {
                        Some(label) => format!("{} <{}>", label, target),
                        None => format!("<{}>", target),
                    };
                    self.components.push(Component::single(text));
                    self.extendable = false;
                }
                self.literal.push_str(&node.raw);
            }
            NodeKind::StylisticMarker { tag } => {
                if is_alternation_word(tag) && !self.components.is_empty() {
                    if let Some(last) = self.components.last_mut() {
                        *last = last.map(|alt| format!("{} или", alt.trim_end()));
                    }
                    self.extendable = true;
                }
                self.literal.push_str(&node.raw);
            }
            NodeKind::Grammar { .. }
            | NodeKind::SenseNumber { .. }
            | NodeKind::HeadwordMarker { .. } => {}
        }
        Ok(())
    }

    fn begin_content(&mut self) {
        if self.sentence_closed {
            self.close_set();
        }
    }

    fn text(&mut self, content: &str, node: &Node) {
        let space = if self.needs_space(content, node) { " " } else { "" };
        if self.extendable
            && let Some(last) = self.components.last_mut()
        {
            *last = last.map(|alt| format!("{}{}{}", alt, space, content));
        } else {
            self.components
                .push(Component::single(format!("{}{}", space, content)));
        }
        self.extendable = true;
    }

    fn note(&mut self, body: &str, node: &Node) -> ReviewResult<()> {
        let adjacent = self.previous.is_some_and(|previous| {
            previous.span.end == node.span.start
                && previous
                    .text()
                    .is_some_and(|text| !text.ends_with(char::is_whitespace))
        });

        match expand_note(self.components.last(), body)? {
            NoteExpansion::Alternation {
                remainder,
                component,
            } => {
                self.components.pop();
                self.components.extend(remainder);
                self.components.push(component);
                self.extendable = false;
            }
            NoteExpansion::Appended(component) => {
                self.components.pop();
                self.components.push(component);
                self.extendable = false;
            }
            NoteExpansion::Optional { body, single_token } => {
                let fused = match self.components.last() {
                    Some(last)
                        if adjacent
                            && single_token
                            && last.alternatives().iter().all(|alt| can_fuse(alt, &body)) =>
                    {
                        Some(
                            last.alternatives()
                                .iter()
                                .flat_map(|alt| [alt.clone(), format!("{}{}", alt, body.trim())])
                                .collect::<Vec<_>>(),
                        )
                    }
                    _ => None,
                };
                match fused {
                    Some(alternatives) => {
                        self.components.pop();
                        self.components.push(Component::new(alternatives)?);
                        self.extendable = true;
                    }
                    None => {
                        let separated = if adjacent && !body.starts_with(char::is_whitespace) {
                            format!(" {}", body)
                        } else {
                            body
                        };
                        self.components
                            .push(Component::new(vec![String::new(), separated])?);
                        self.extendable = false;
                    }
                }
            }
            NoteExpansion::Commentary(text) => {
                if !text.is_empty() {
                    self.set.notes.push(text);
                }
                self.extendable = false;
            }
        }
        Ok(())
    }

    /// A space is needed between the last component and `next` when the
    /// source had a gap or a note between them and neither side has one
    fn needs_space(&self, next: &str, node: &Node) -> bool {
        let Some(previous) = self.previous else {
            return false;
        };
        let Some(last) = self.components.last() else {
            return false;
        };
        let gap = previous.span.end != node.span.start
            || (previous.text().is_none() && !self.extendable);
        let last_char = last
            .alternatives()
            .iter()
            .rev()
            .find_map(|alt| alt.chars().last());
        let next_char = next.chars().next();
        gap && last_char.is_some_and(|c| !c.is_whitespace() && c != '(')
            && next_char.is_some_and(|c| !c.is_whitespace() && !",.;:)".contains(c))
    }

    fn close_phrase(&mut self) {
        if !self.components.is_empty() {
            let components = std::mem::take(&mut self.components);
            let literal = std::mem::take(&mut self.literal);
            self.set
                .phrases
                .push(Phrase::new(components, literal.trim().to_string()));
        }
        self.literal.clear();
        self.extendable = false;
    }

    fn close_set(&mut self) {
        self.close_phrase();
        self.sentence_closed = false;
        if !self.set.is_empty() {
            let mut set = std::mem::take(&mut self.set);
            set.phrases = distribute_shared_tail(set.phrases);
            self.sets.push(set);
        }
    }
}
