//! Headword metadata: lemmas, homonym numbers, stems and `~` substitution.
//!
//! A headword marker holds one or more comma separated lemma patterns:
//!
//! - `|` marks where the stem used for `~` ends (`aer|o`)
//! - `/` marks the grammatical ending (`abak/o`), and also ends the stem when
//!   there is no `|`
//! - `(...)` is an optional part (`ŝovel(il)o` gives `ŝovelo` and `ŝovelilo`)
//! - `~` in a nested headword stands for the stem of the enclosing one
//! - a trailing Roman numeral (`bat/i II`) is the homonym number
//!
//! ```ignore
//! let head = parse_headword("abak/o", None, &[]);
//! assert_eq!(head.lemma_forms(), vec!["abako"]);
//! assert_eq!(head.bases, vec!["abak"]);
//!
//! let nested = parse_headword("~ist/o", None, &head.bases);
//! assert_eq!(nested.lemma_forms(), vec!["abakisto"]);
//! ```

use crate::ast::{Headword, Lemma, OfficialMark};
use crate::text::unique_in_order;
use regex::Regex;
use std::sync::LazyLock;

static HOMONYM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\b([IVXLCDM]+)$").expect("homonym regex is valid"));

/// Build headword metadata from the text inside a `[...]` marker.
///
/// # Arguments
///
/// * `marker` - bracket content, e.g. `abak/o` or `~ist/o`
/// * `official_mark` - the `*`/`*N` mark that followed the bracket
/// * `parent_bases` - stems of the enclosing headword, empty at top level
pub fn parse_headword(
    marker: &str,
    official_mark: Option<OfficialMark>,
    parent_bases: &[String],
) -> Headword {
    let raw_form = marker.trim().to_string();
    let mut content = raw_form.clone();
    let mut homonym = None;
    if let Some(caps) = HOMONYM.captures(&content) {
        homonym = Some(caps[1].to_string());
        let cut = caps.get(0).map(|m| m.start()).unwrap_or(content.len());
        content.truncate(cut);
    }

    let mut lemmas = Vec::new();
    let mut bases = Vec::new();
    for part in content.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let expansions = lemma_variants(part, parent_bases);
        if expansions.is_empty() {
            let fallback = strip_lemma_markup(part);
            if !fallback.is_empty() {
                lemmas.push(Lemma {
                    raw: part.to_string(),
                    lemma: fallback,
                });
            }
        } else {
            for lemma in &expansions {
                lemmas.push(Lemma {
                    raw: part.to_string(),
                    lemma: lemma.clone(),
                });
            }
        }
        bases.extend(stem_variants(part, parent_bases, &expansions));
    }
    lemmas.dedup_by(|a, b| a.raw == b.raw && a.lemma == b.lemma);

    let mut bases = unique_in_order(bases);
    if bases.is_empty() {
        bases = unique_in_order(lemmas.iter().map(|l| l.lemma.clone()));
    }

    Headword {
        raw_form,
        lemmas,
        official_mark,
        homonym,
        bases,
        children: Vec::new(),
    }
}

/// Expand optional `(...)` parts of a lemma pattern.
///
/// Nested optional parts are allowed; an unclosed `(` runs to the end.
pub fn expand_lemma_pattern(pattern: &str) -> Vec<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let (expanded, _) = expand_from(&chars, 0);
    unique_in_order(expanded.into_iter().filter(|item| !item.is_empty()))
}

fn expand_from(chars: &[char], start: usize) -> (Vec<String>, usize) {
    let mut results = vec![String::new()];
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '(' => {
                let (inner, next) = expand_from(chars, i + 1);
                let mut updated = Vec::with_capacity(results.len() * (inner.len() + 1));
                for current in &results {
                    updated.push(current.clone());
                    for addition in &inner {
                        updated.push(format!("{}{}", current, addition));
                    }
                }
                results = updated;
                i = next;
            }
            ')' => return (results, i + 1),
            _ => {
                let literal_end = (i..chars.len())
                    .find(|&j| chars[j] == '(' || chars[j] == ')')
                    .unwrap_or(chars.len());
                let literal: String = chars[i..literal_end].iter().collect();
                for current in results.iter_mut() {
                    current.push_str(&literal);
                }
                i = literal_end;
            }
        }
    }
    (results, i)
}

fn lemma_variants(raw: &str, parent_bases: &[String]) -> Vec<String> {
    let pattern = raw.replace(['|', '/'], "");
    let expansions = expand_lemma_pattern(&pattern);
    let empty = [String::new()];
    let parents = if parent_bases.is_empty() {
        &empty[..]
    } else {
        parent_bases
    };

    let mut results = Vec::new();
    for base in parents {
        for item in &expansions {
            if item.contains('~') && base.is_empty() {
                continue;
            }
            let replaced = item.replace('~', base);
            if !replaced.is_empty() {
                results.push(replaced);
            }
        }
    }
    unique_in_order(results)
}

fn stem_variants(raw: &str, parent_bases: &[String], lemmas: &[String]) -> Vec<String> {
    let prefix = match (raw.find('|'), raw.find('/')) {
        (Some(bar), _) => Some(&raw[..bar]),
        (None, Some(slash)) => Some(&raw[..slash]),
        (None, None) => None,
    };

    if let Some(prefix) = prefix {
        let prefix = prefix.replace('/', "");
        let empty = [String::new()];
        let parents = if parent_bases.is_empty() {
            &empty[..]
        } else {
            parent_bases
        };
        let mut results = Vec::new();
        for parent in parents {
            for variant in expand_lemma_pattern(&prefix) {
                let candidate = variant.replace('~', parent);
                if !candidate.is_empty() {
                    results.push(candidate);
                }
            }
        }
        return unique_in_order(results);
    }

    if raw.contains('~') && !parent_bases.is_empty() {
        return parent_bases.to_vec();
    }
    lemmas.to_vec()
}

fn strip_lemma_markup(raw: &str) -> String {
    let mut depth = 0usize;
    let mut result = String::new();
    for c in raw.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '|' | '/' | '~' => {}
            _ if depth == 0 => result.push(c),
            _ => {}
        }
    }
    result.trim().to_string()
}

/// Replace `~` in an Esperanto phrase, once per lemma/stem pair.
///
/// A `~` directly followed by a letter (or `'`) takes the stem, a free
/// standing `~` takes the whole lemma: with lemma `abako` and stem `abak`,
/// `japana ~` becomes `japana abako` and `~a` becomes `abaka`.
pub fn expand_tilde(text: &str, lemmas: &[String], bases: &[String]) -> Vec<String> {
    if !text.contains('~') {
        return vec![text.to_string()];
    }
    let count = lemmas.len().max(bases.len()).max(1);
    let mut results = Vec::with_capacity(count);
    for index in 0..count {
        let lemma = lemmas
            .get(index)
            .or_else(|| lemmas.last())
            .cloned()
            .unwrap_or_default();
        let base = bases
            .get(index)
            .or_else(|| bases.last())
            .cloned()
            .unwrap_or_else(|| lemma.clone());
        if lemma.is_empty() && base.is_empty() {
            continue;
        }
        let lemma = if lemma.is_empty() { base.clone() } else { lemma };
        results.push(replace_tilde(text, &lemma, &base));
    }
    if results.is_empty() {
        results.push(text.to_string());
    }
    unique_in_order(results)
}

fn replace_tilde(text: &str, lemma: &str, base: &str) -> String {
    let mut result = String::with_capacity(text.len() + lemma.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '~' {
            let before_letter = chars
                .peek()
                .is_some_and(|next| next.is_alphabetic() || *next == '\'');
            result.push_str(if before_letter { base } else { lemma });
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Lemma patterns ==========

    #[test]
    fn test_simple_headword() {
        let head = parse_headword("abak/o", Some(OfficialMark::Aldono(8)), &[]);
        assert_eq!(head.raw_form, "abak/o");
        assert_eq!(head.lemma_forms(), vec!["abako"]);
        assert_eq!(head.bases, vec!["abak"]);
        assert_eq!(head.official_mark, Some(OfficialMark::Aldono(8)));
        assert_eq!(head.homonym, None);
    }

    #[test]
    fn test_stem_boundary() {
        let head = parse_headword("aer|o", None, &[]);
        assert_eq!(head.lemma_forms(), vec!["aero"]);
        assert_eq!(head.bases, vec!["aer"]);
    }

    #[test]
    fn test_homonym_number() {
        let head = parse_headword("bat/i II", None, &[]);
        assert_eq!(head.homonym.as_deref(), Some("II"));
        assert_eq!(head.lemma_forms(), vec!["bati"]);
    }

    #[test]
    fn test_several_lemmas() {
        let head = parse_headword("abak/o, abak/us/o", None, &[]);
        assert_eq!(head.lemma_forms(), vec!["abako", "abakuso"]);
        assert_eq!(head.bases, vec!["abak"]);
    }

    #[test]
    fn test_optional_part() {
        assert_eq!(expand_lemma_pattern("ŝovel(il)o"), vec!["ŝovelo", "ŝovelilo"]);
        assert_eq!(
            expand_lemma_pattern("a(b(c))d"),
            vec!["ad", "abd", "abcd"]
        );
    }

    #[test]
    fn test_nested_headword_uses_parent_stem() {
        let parent = parse_headword("abak/o", None, &[]);
        let nested = parse_headword("~ist/o", None, &parent.bases);
        assert_eq!(nested.lemma_forms(), vec!["abakisto"]);
        assert_eq!(nested.bases, vec!["abakist"]);

        let adjective = parse_headword("~a", None, &parent.bases);
        assert_eq!(adjective.lemma_forms(), vec!["abaka"]);
        assert_eq!(adjective.bases, vec!["abak"]);
    }

    #[test]
    fn test_orphan_tilde_falls_back_to_plain_text() {
        let head = parse_headword("~a", None, &[]);
        assert_eq!(head.lemma_forms(), vec!["a"]);
    }

    // ========== Tilde ==========

    #[test]
    fn test_expand_tilde() {
        let lemmas = vec!["abako".to_string()];
        let bases = vec!["abak".to_string()];
        assert_eq!(
            expand_tilde("japana ~", &lemmas, &bases),
            vec!["japana abako"]
        );
        assert_eq!(expand_tilde("~a kalkulo", &lemmas, &bases), vec!["abaka kalkulo"]);
    }

    #[test]
    fn test_expand_tilde_per_lemma() {
        let lemmas = vec!["abako".to_string(), "abakuso".to_string()];
        let bases = vec!["abak".to_string()];
        assert_eq!(
            expand_tilde("la ~", &lemmas, &bases),
            vec!["la abako", "la abakuso"]
        );
    }

    #[test]
    fn test_expand_tilde_without_tilde() {
        assert_eq!(expand_tilde("ĉevalo", &[], &[]), vec!["ĉevalo"]);
    }
}
