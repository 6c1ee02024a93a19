//! Note & alternation expansion
//!
//! A parenthetical note in a translation means one of three things:
//!
//! - an alternation: `отложительный (_или_ отделительный) падеж`
//! - an optional segment: `счётная (доска)`
//! - an editorial comment: `счёты (_прибор_ = <globkalkulilo>)`
//!
//! [`expand_note`] decides which one and returns what the phrase builder
//! should do with the component in front of the note.
//! [`expand_parenthetical_forms`] does the same on plain strings, for
//! parentheses that survive inside text runs and note bodies.

use crate::data::Component;
use crate::error::ReviewResult;
use regex::Regex;
use rueo_markup::text::{clean_spacing, find_matching_paren};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

/// Maximum nesting of parentheticals expanded in one call
pub const MAX_NOTE_DEPTH: usize = 50;

static ALTERNATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:или(?:\s+же)?|либо)\b|/").expect("alternation regex is valid")
});

static ITALIC_ALTERNATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)_\s*(или(?:\s+же)?|либо)\s*_").expect("italic alternation regex is valid")
});

/// What a note turns into
#[derive(Debug, Clone, PartialEq)]
pub enum NoteExpansion {
    /// The note offers alternatives for the last word before it. The
    /// preceding component is replaced by `remainder` (if any) followed by
    /// `component`.
    Alternation {
        remainder: Option<Component>,
        component: Component,
    },
    /// Alternatives added to a preceding multi-alternative component; the
    /// returned component replaces it.
    Appended(Component),
    /// Text that may be present or absent
    Optional { body: String, single_token: bool },
    /// Editorial remark, not translation text
    Commentary(String),
}

/// Alternation markers outside any nested parenthesis
fn top_level_markers(plain: &str) -> Vec<Range<usize>> {
    let mut depth = 0usize;
    let mut chars = plain.char_indices().peekable();
    let mut markers = Vec::new();
    for found in ALTERNATION.find_iter(plain) {
        while let Some(&(index, c)) = chars.peek() {
            if index >= found.start() {
                break;
            }
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
            chars.next();
        }
        if depth == 0 {
            markers.push(found.range());
        }
    }
    markers
}

/// True when the note body contains `или`, `или же`, `либо` or `/` outside
/// its nested parentheses
pub fn is_alternation(body: &str) -> bool {
    !top_level_markers(&body.replace('_', " ")).is_empty()
}

/// Italic markup, references or `=` mark a note as editorial; italic
/// alternation words do not
pub fn is_commentary(body: &str) -> bool {
    let body = ITALIC_ALTERNATION.replace_all(body, "$1");
    body.contains('_') || body.contains('<') || body.contains('=')
}

/// Split an alternation body into its alternatives
///
/// ```ignore
/// assert_eq!(split_alternatives("_или_ отделительный, _или_ исходный"),
///            vec!["отделительный", "исходный"]);
/// ```
pub fn split_alternatives(body: &str) -> Vec<String> {
    let plain = body.replace('_', " ");
    let mut parts = Vec::new();
    let mut start = 0;
    for marker in top_level_markers(&plain) {
        parts.push(&plain[start..marker.start]);
        start = marker.end;
    }
    parts.push(&plain[start..]);

    parts
        .into_iter()
        .map(|part| clean_spacing(part.trim_matches(|c: char| c.is_whitespace() || ",;/".contains(c))))
        .filter(|part| !part.is_empty())
        .collect()
}

/// Expand one note against the component accumulated before it
///
/// # Arguments
/// * `preceding` - Last component of the phrase under construction, if any
/// * `body` - Raw note body without the outer parentheses
///
/// # Returns
/// * `Ok(NoteExpansion)` - How the phrase builder should apply the note
/// * `Err(ReviewError::InvariantViolation)` - An empty component was built
pub fn expand_note(preceding: Option<&Component>, body: &str) -> ReviewResult<NoteExpansion> {
    if is_alternation(body) {
        let alternatives = split_alternatives(body);
        if alternatives.is_empty() {
            return Ok(NoteExpansion::Commentary(clean_spacing(&body.replace('_', ""))));
        }
        return alternation(preceding, alternatives);
    }

    if is_commentary(body) {
        return Ok(NoteExpansion::Commentary(clean_spacing(&body.replace('_', ""))));
    }

    let body = ITALIC_ALTERNATION.replace_all(body, "$1");
    let single_token = !body.trim().is_empty() && !body.trim().contains(char::is_whitespace);
    Ok(NoteExpansion::Optional {
        body: body.into_owned(),
        single_token,
    })
}

fn alternation(preceding: Option<&Component>, alternatives: Vec<String>) -> ReviewResult<NoteExpansion> {
    let Some(preceding) = preceding else {
        return Ok(NoteExpansion::Alternation {
            remainder: None,
            component: Component::new(alternatives)?,
        });
    };

    let Some(single) = preceding.as_single() else {
        let mut appended = preceding.clone();
        appended.extend(alternatives);
        return Ok(NoteExpansion::Appended(appended));
    };

    let trimmed = single.trim_end();
    let trailing = &single[trimmed.len()..];
    let (prefix, word) = match trimmed.rfind(char::is_whitespace) {
        Some(index) => {
            let split = index + trimmed[index..].chars().next().map_or(1, char::len_utf8);
            (&trimmed[..split], &trimmed[split..])
        }
        None => ("", trimmed),
    };

    if word.is_empty() {
        return Ok(NoteExpansion::Alternation {
            remainder: Some(preceding.clone()),
            component: Component::new(alternatives)?,
        });
    }

    let mut options = vec![format!("{}{}", word, trailing)];
    options.extend(alternatives.into_iter().map(|alt| format!("{}{}", alt, trailing)));

    Ok(NoteExpansion::Alternation {
        remainder: (!prefix.trim().is_empty()).then(|| Component::single(prefix)),
        component: Component::new(options)?,
    })
}

/// True when a note written directly against `word` is glued to it
///
/// Only a single-token body fuses, and only when no space separates it from
/// the word in the source. Stress marks do not matter: `зв`ёздн(ый)` is one
/// word either way.
pub fn can_fuse(word: &str, body: &str) -> bool {
    !word.is_empty()
        && !word.ends_with(char::is_whitespace)
        && !body.trim().is_empty()
        && !body.starts_with(char::is_whitespace)
        && !body.trim().contains(char::is_whitespace)
}

/// Expand the parentheticals left in a plain string
///
/// The first `(` is matched and the text is expanded into the variant
/// without the parenthetical and the variant with it; an alternation inside
/// replaces the word before the parenthesis instead. Variants are expanded
/// recursively up to [`MAX_NOTE_DEPTH`]; past it the text is returned as is.
///
/// # Arguments
/// * `text` - Text that may contain parentheticals
/// * `limit` - Maximum number of forms
///
/// # Returns
/// * `Some(forms)` - Distinct forms in first-seen order
/// * `None` - More than `limit` forms
///
/// ```ignore
/// assert_eq!(expand_parenthetical_forms("аб`ак(а)", 256), Some(vec!["аб`ак".into(), "аб`ака".into()]));
/// ```
pub fn expand_parenthetical_forms(text: &str, limit: usize) -> Option<Vec<String>> {
    let mut forms = Forms {
        limit,
        ..Forms::default()
    };
    forms.expand(text, 0);
    (!forms.exceeded).then_some(forms.results)
}

#[derive(Default)]
struct Forms {
    limit: usize,
    seen: HashSet<String>,
    emitted: HashSet<String>,
    results: Vec<String>,
    exceeded: bool,
}

impl Forms {
    fn emit(&mut self, form: String) {
        if self.emitted.insert(form.clone()) {
            self.results.push(form);
            if self.results.len() > self.limit {
                self.exceeded = true;
            }
        }
    }

    fn expand(&mut self, text: &str, depth: usize) {
        if self.exceeded {
            return;
        }
        if depth >= MAX_NOTE_DEPTH {
            tracing::debug!(text, "parenthetical nesting limit reached");
            self.emit(text.to_string());
            return;
        }
        // Bounds branches that only repeat earlier forms
        if self.seen.len() > self.limit.saturating_mul(MAX_NOTE_DEPTH) {
            self.exceeded = true;
            return;
        }
        if !self.seen.insert(text.to_string()) {
            return;
        }

        let Some((open, close)) = text
            .find('(')
            .and_then(|open| find_matching_paren(text, open).map(|close| (open, close)))
        else {
            self.emit(text.to_string());
            return;
        };

        for variant in parenthetical_variants(text, open, close) {
            self.expand(&variant, depth + 1);
        }
    }
}

/// The texts one parenthetical at `open..=close` stands for
fn parenthetical_variants(text: &str, open: usize, close: usize) -> Vec<String> {
    let before = &text[..open];
    let inner = &text[open + 1..close];
    let after = &text[close + 1..];

    if inner.trim().is_empty() {
        return vec![format!("{}{}", before, after)];
    }
    if !is_alternation(inner) {
        return vec![
            format!("{}{}", before, after),
            format!("{}{}{}", before, inner, after),
        ];
    }

    let trimmed = before.trim_end();
    let gap = if after.is_empty() || after.starts_with(char::is_whitespace) {
        ""
    } else {
        &before[trimmed.len()..]
    };
    let (prefix, word) = match trimmed.rfind(char::is_whitespace) {
        Some(index) => trimmed.split_at(index + 1),
        None => ("", trimmed),
    };
    let mut options = Vec::new();
    if !word.is_empty() {
        options.push(word.to_string());
    }
    options.extend(split_alternatives(inner));
    options
        .into_iter()
        .map(|option| format!("{}{}{}{}", prefix, option, gap, after))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReviewError;

    // ========== Classification ==========

    #[test]
    fn test_alternation_detection() {
        assert!(is_alternation("_или_ отделительный"));
        assert!(is_alternation("либо счёт"));
        assert!(is_alternation("а/б"));
        assert!(is_alternation("ИЛИ ЖЕ абак"));
        assert!(!is_alternation("прибор"));
        assert!(!is_alternation("вилица"));
    }

    #[test]
    fn test_split_alternatives() {
        assert_eq!(
            split_alternatives("_или_ отделительный, _или_ исходный"),
            vec!["отделительный", "исходный"]
        );
        assert_eq!(split_alternatives("или же абак"), vec!["абак"]);
        assert_eq!(split_alternatives("счёт/подсчёт"), vec!["счёт", "подсчёт"]);
    }

    #[test]
    fn test_commentary_note() {
        let expansion = expand_note(None, "_прибор_ = <globkalkulilo>, <bidkalkulilo>").unwrap();
        assert_eq!(
            expansion,
            NoteExpansion::Commentary("прибор = <globkalkulilo>, <bidkalkulilo>".to_string())
        );
    }

    // ========== Alternation ==========

    #[test]
    fn test_alternation_takes_last_word() {
        let preceding = Component::single("отложительный ");
        let expansion =
            expand_note(Some(&preceding), "_или_ отделительный, _или_ исходный").unwrap();
        match expansion {
            NoteExpansion::Alternation { remainder, component } => {
                assert!(remainder.is_none());
                assert_eq!(
                    component.alternatives(),
                    &["отложительный ", "отделительный ", "исходный "]
                );
            }
            other => panic!("expected alternation, got {:?}", other),
        }
    }

    #[test]
    fn test_alternation_keeps_remainder() {
        let preceding = Component::single("счётная доска");
        match expand_note(Some(&preceding), "или абак").unwrap() {
            NoteExpansion::Alternation { remainder, component } => {
                assert_eq!(remainder.unwrap().as_single(), Some("счётная "));
                assert_eq!(component.alternatives(), &["доска", "абак"]);
            }
            other => panic!("expected alternation, got {:?}", other),
        }
    }

    #[test]
    fn test_alternation_appends_to_multi_component() {
        let preceding = Component::new(vec!["счёты".into(), "абак".into()]).unwrap();
        match expand_note(Some(&preceding), "или соробан").unwrap() {
            NoteExpansion::Appended(component) => {
                assert_eq!(component.alternatives(), &["счёты", "абак", "соробан"]);
            }
            other => panic!("expected appended, got {:?}", other),
        }
    }

    #[test]
    fn test_alternation_without_preceding() {
        match expand_note(None, "абак или счёты").unwrap() {
            NoteExpansion::Alternation { remainder, component } => {
                assert!(remainder.is_none());
                assert_eq!(component.alternatives(), &["абак", "счёты"]);
            }
            other => panic!("expected alternation, got {:?}", other),
        }
    }

    // ========== Optional ==========

    #[test]
    fn test_optional_note() {
        assert_eq!(
            expand_note(None, "`имя").unwrap(),
            NoteExpansion::Optional {
                body: "`имя".to_string(),
                single_token: true
            }
        );
        assert_eq!(
            expand_note(None, "для счёта").unwrap(),
            NoteExpansion::Optional {
                body: "для счёта".to_string(),
                single_token: false
            }
        );
    }

    #[test]
    fn test_can_fuse() {
        assert!(can_fuse("пере", "рас"));
        assert!(can_fuse("аб`ак", "ус"));
        assert!(can_fuse("зв`ёздн", "ый"));
        assert!(!can_fuse("имя ", "`а"));
        assert!(!can_fuse("счётная", "для счёта"));
    }

    #[test]
    fn test_empty_alternation_is_not_an_error() {
        let result = expand_note(None, "или");
        assert!(!matches!(result, Err(ReviewError::InvariantViolation(_))));
    }

    // ========== Nested alternations ==========

    #[test]
    fn test_nested_alternation_is_not_top_level() {
        assert!(!is_alternation("прибор (или абак)"));
        assert!(!is_alternation("для счёта (_или_ подсчёта)"));
        assert!(is_alternation("или абак (прибор)"));
        assert_eq!(
            split_alternatives("_или_ отделительный (падеж), _или_ исходный"),
            vec!["отделительный (падеж)", "исходный"]
        );
    }

    #[test]
    fn test_optional_with_nested_alternation() {
        let preceding = Component::single("счёты ");
        assert_eq!(
            expand_note(Some(&preceding), "прибор (_или_ абак)").unwrap(),
            NoteExpansion::Optional {
                body: "прибор (или абак)".to_string(),
                single_token: false
            }
        );
        assert!(!is_commentary("прибор (_или_ абак)"));
        assert!(is_commentary("_прибор_ (или абак)"));
    }

    // ========== Parenthetical forms ==========

    fn forms(text: &str) -> Vec<String> {
        expand_parenthetical_forms(text, 256).unwrap()
    }

    #[test]
    fn test_expand_optional_form() {
        assert_eq!(forms("аб`ак(а)"), vec!["аб`ак", "аб`ака"]);
        assert_eq!(forms("счётная (доска)"), vec!["счётная ", "счётная доска"]);
    }

    #[test]
    fn test_expand_nested_forms() {
        assert_eq!(forms("a(b(c))"), vec!["a", "ab", "abc"]);
        assert_eq!(
            forms("счёты прибор (или абак)"),
            vec!["счёты прибор", "счёты абак"]
        );
    }

    #[test]
    fn test_expand_alternation_form() {
        assert_eq!(
            forms("счётная доска (или абак) для"),
            vec!["счётная доска для", "счётная абак для"]
        );
    }

    #[test]
    fn test_unmatched_paren_is_literal() {
        assert_eq!(forms("счёты (прибор"), vec!["счёты (прибор"]);
        assert_eq!(forms("счёты"), vec!["счёты"]);
    }

    #[test]
    fn test_depth_limit_returns_literal() {
        let deep = format!("{}x{}", "(".repeat(60), ")".repeat(60));
        let expanded = forms(&deep);
        assert!(!expanded.is_empty());
        assert!(expanded.contains(&String::new()));
    }

    #[test]
    fn test_form_limit() {
        let eight = "с(а) ".repeat(8);
        assert_eq!(expand_parenthetical_forms(&eight, 256).map(|f| f.len()), Some(256));
        assert!(expand_parenthetical_forms(&eight, 255).is_none());

        let many = "с(а) ".repeat(40);
        assert!(expand_parenthetical_forms(&many, 256).is_none());
    }
}
