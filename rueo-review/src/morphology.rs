//! Word-class guesses from Russian endings and the shared-tail rule
//!
//! Dictionary entries compress lists such as `брюшной, задний плавник`,
//! where every adjective in the list goes with the noun of the last item.
//! Only endings are looked at; a wrong guess leaves the list as it was.

use crate::data::{Component, Phrase};
use rueo_markup::text::{is_cyrillic, strip_stress};

pub const ADJECTIVE_ENDINGS: &[&str] = &[
    "ая", "яя", "ий", "ый", "ой", "ое", "ее", "ые", "ие", "ний", "ный", "ской", "ский", "льный",
    "тельный", "чный", "ческий", "оватый", "истый",
];

pub const VERB_ENDINGS: &[&str] = &["ться", "сть", "сти", "чь", "ть", "ти", "сь"];

/// Minimum number of single-word verbs before a shared object is distributed
const MIN_VERB_RUN: usize = 2;

fn normalized_word(word: &str) -> Option<String> {
    let word = strip_stress(word).to_lowercase();
    let letters = word.chars().count();
    (letters >= 3 && word.chars().all(|c| is_cyrillic(c) || c == '-')).then_some(word)
}

pub fn is_adjective(word: &str) -> bool {
    normalized_word(word).is_some_and(|w| ADJECTIVE_ENDINGS.iter().any(|e| w.ends_with(e)))
}

pub fn is_verb(word: &str) -> bool {
    normalized_word(word).is_some_and(|w| VERB_ENDINGS.iter().any(|e| w.ends_with(e)))
}

/// The word of a phrase made of one single-alternative, one-word component
fn single_word(phrase: &Phrase) -> Option<&str> {
    match phrase.components.as_slice() {
        [only] => only
            .as_single()
            .map(str::trim)
            .filter(|word| !word.is_empty() && !word.contains(char::is_whitespace)),
        _ => None,
    }
}

/// First word and the rest of a phrase starting with a plain text component
fn head_and_tail(phrase: &Phrase) -> Option<(&str, &str)> {
    let first = phrase.components.first()?.as_single()?.trim_start();
    let split = first.find(char::is_whitespace)?;
    let (head, tail) = first.split_at(split);
    (!tail.trim().is_empty() || phrase.components.len() > 1).then_some((head, tail))
}

/// Give the tail of the closing phrase to every single-word phrase of the
/// same word class in front of it
///
/// `брюшной`, `задний плавник` becomes `брюшной плавник`, `задний плавник`.
/// Verbs are only distributed when at least two of them precede the
/// closing phrase.
pub fn distribute_shared_tail(phrases: Vec<Phrase>) -> Vec<Phrase> {
    let Some(last) = phrases.last() else {
        return phrases;
    };
    let Some((head, tail)) = head_and_tail(last) else {
        return phrases;
    };

    let (class, min_run): (fn(&str) -> bool, usize) = if is_adjective(head) {
        (is_adjective, 1)
    } else if is_verb(head) {
        (is_verb, MIN_VERB_RUN)
    } else {
        return phrases;
    };

    let closing = phrases.len() - 1;
    let run_start = phrases[..closing]
        .iter()
        .rposition(|phrase| !single_word(phrase).is_some_and(class))
        .map_or(0, |index| index + 1);
    let run = closing - run_start;
    if run < min_run {
        return phrases;
    }

    let rest: Vec<Component> = last.components[1..].to_vec();
    phrases
        .iter()
        .enumerate()
        .map(|(index, phrase)| {
            if index < run_start || index >= closing {
                return phrase.clone();
            }
            let word = single_word(phrase).unwrap_or_default();
            let mut components = vec![Component::single(format!("{}{}", word, tail))];
            components.extend(rest.iter().cloned());
            Phrase::new(components, phrase.literal.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(text: &str) -> Phrase {
        Phrase::new(vec![Component::single(text)], text)
    }

    fn texts(phrases: &[Phrase]) -> Vec<String> {
        phrases
            .iter()
            .map(|p| {
                p.components
                    .iter()
                    .map(|c| c.alternatives()[0].clone())
                    .collect::<String>()
            })
            .collect()
    }

    // ========== Word classes ==========

    #[test]
    fn test_adjective_endings() {
        assert!(is_adjective("брюшной"));
        assert!(is_adjective("задний"));
        assert!(is_adjective("счётная"));
        assert!(is_adjective("ме`дный"));
        assert!(!is_adjective("плавник"));
        assert!(!is_adjective("ой"));
        assert!(!is_adjective("abako"));
    }

    #[test]
    fn test_verb_endings() {
        assert!(is_verb("считать"));
        assert!(is_verb("беречь"));
        assert!(is_verb("учиться"));
        assert!(!is_verb("счёты"));
    }

    // ========== Shared tail ==========

    #[test]
    fn test_adjective_list_gets_noun() {
        let phrases = vec![phrase("брюшной"), phrase(" задний плавник")];
        let result = distribute_shared_tail(phrases);
        assert_eq!(texts(&result), vec!["брюшной плавник", " задний плавник"]);
    }

    #[test]
    fn test_earlier_phrases_untouched() {
        let phrases = vec![phrase("счёты"), phrase(" брюшной"), phrase(" задний плавник")];
        let result = distribute_shared_tail(phrases);
        assert_eq!(
            texts(&result),
            vec!["счёты", "брюшной плавник", " задний плавник"]
        );
    }

    #[test]
    fn test_single_verb_is_not_distributed() {
        let phrases = vec![phrase("считать"), phrase(" вычислять деньги")];
        let result = distribute_shared_tail(phrases.clone());
        assert_eq!(result, phrases);
    }

    #[test]
    fn test_verb_list_gets_object() {
        let phrases = vec![
            phrase("считать"),
            phrase(" подсчитывать"),
            phrase(" вычислять деньги"),
        ];
        let result = distribute_shared_tail(phrases);
        assert_eq!(
            texts(&result),
            vec!["считать деньги", "подсчитывать деньги", " вычислять деньги"]
        );
    }

    #[test]
    fn test_plain_synonyms_untouched() {
        let phrases = vec![phrase("счёты"), phrase(" абак")];
        assert_eq!(distribute_shared_tail(phrases.clone()), phrases);
        let phrases = vec![phrase("красный"), phrase(" синий")];
        assert_eq!(distribute_shared_tail(phrases.clone()), phrases);
    }
}
