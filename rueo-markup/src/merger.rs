//! Folding of translation blocks that continue one another.
//!
//! The source format wraps long translations over several lines and cuts
//! them at every `;`. A translation is only complete once it reaches a
//! sentence divider or a new sense starts, so consecutive translation blocks
//! are folded until then.

use crate::ast::{Block, Headword, TranslationBlock};

/// Return a copy of the headword tree with continuation blocks folded.
///
/// Applying it twice gives the same tree as applying it once.
pub fn merge_continuations(headword: &Headword) -> Headword {
    Headword {
        children: merge_blocks(&headword.children),
        ..headword.clone()
    }
}

/// Fold consecutive translation blocks of one child list
pub fn merge_blocks(blocks: &[Block]) -> Vec<Block> {
    let mut merged = Vec::with_capacity(blocks.len());
    let mut pending: Option<TranslationBlock> = None;

    for block in blocks {
        match block {
            Block::Translation(translation) => {
                let incoming = TranslationBlock {
                    children: merge_blocks(&translation.children),
                    ..translation.clone()
                };
                pending = match pending.take() {
                    Some(mut current)
                        if !current.ends_with_sentence() && incoming.sense_number.is_none() =>
                    {
                        current.content.extend(incoming.content);
                        current.children.extend(incoming.children);
                        current.requires_review |= incoming.requires_review;
                        Some(current)
                    }
                    Some(current) => {
                        merged.push(finish(current));
                        Some(incoming)
                    }
                    None => Some(incoming),
                };
            }
            Block::Headword(nested) => {
                if let Some(current) = pending.take() {
                    merged.push(finish(current));
                }
                merged.push(Block::Headword(merge_continuations(nested)));
            }
            other => {
                if let Some(current) = pending.take() {
                    merged.push(finish(current));
                }
                merged.push(other.clone());
            }
        }
    }

    if let Some(current) = pending {
        merged.push(finish(current));
    }
    merged
}

fn finish(mut translation: TranslationBlock) -> Block {
    // Joined child lists can put two foldable translations next to each other
    translation.children = merge_blocks(&translation.children);
    translation.reference_only = translation.is_reference_only();
    Block::Translation(translation)
}
