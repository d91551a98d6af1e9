//! Random hyphen-joined phrases, e.g. `testily-testful-test`.
//!
//! Readable run identifiers are easier to quote in tickets and chat than a hex
//! string. Words come from a small embedded list grouped by part of speech.

use engkit_error::{EngError, EngResult};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Adverb,
    Adjective,
    Noun,
}

const ADVERBS: &[&str] = &[
    "ably", "aloud", "amply", "boldly", "briskly", "busily", "calmly", "deftly", "duly", "eagerly",
    "evenly", "fairly", "firmly", "gladly", "gently", "hastily", "idly", "justly", "keenly",
    "kindly", "lazily", "loudly", "madly", "meekly", "neatly", "oddly", "openly", "quickly",
    "quietly", "rarely", "safely", "slowly", "snugly", "swiftly", "tidily", "vastly", "warmly",
    "wisely", "wryly", "zealously", "unexpectedly", "so",
];

const ADJECTIVES: &[&str] = &[
    "amber", "ample", "brisk", "candid", "civic", "crisp", "dapper", "eager", "exact", "fabled",
    "favorable", "frank", "gilded", "grand", "humble", "ivory", "jovial", "lucid", "mellow",
    "modest", "nimble", "noble", "opal", "placid", "polar", "quaint", "rapid", "robust", "rustic",
    "serene", "silent", "solid", "steady", "sturdy", "tidy", "upbeat", "vivid", "wary", "zesty",
    "ox", "extraordinary",
];

const NOUNS: &[&str] = &[
    "anvil", "arbor", "badge", "beacon", "cable", "canyon", "cedar", "circuit", "comet", "delta",
    "ember", "falcon", "fern", "forge", "garnet", "harbor", "heron", "island", "jetty", "kernel",
    "lantern", "ledger", "meadow", "nickel", "orbit", "otter", "pebble", "piston", "quarry",
    "raven", "rivet", "saddle", "signal", "spindle", "tundra", "valve", "willow", "wire", "yarrow",
    "zephyr", "ax", "thermocouple",
];

impl PartOfSpeech {
    pub fn words(self) -> &'static [&'static str] {
        match self {
            PartOfSpeech::Adverb => ADVERBS,
            PartOfSpeech::Adjective => ADJECTIVES,
            PartOfSpeech::Noun => NOUNS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseOptions {
    /// Minimum characters per word.
    pub min_length: usize,
    /// Maximum characters per word.
    pub max_length: usize,
    pub order: Vec<PartOfSpeech>,
}

impl Default for PhraseOptions {
    fn default() -> Self {
        Self {
            min_length: 2,
            max_length: 8,
            order: vec![
                PartOfSpeech::Adverb,
                PartOfSpeech::Adjective,
                PartOfSpeech::Noun,
            ],
        }
    }
}

impl PhraseOptions {
    fn candidates(&self, pos: PartOfSpeech) -> EngResult<Vec<&'static str>> {
        let words: Vec<&'static str> = pos
            .words()
            .iter()
            .copied()
            .filter(|w| (self.min_length..=self.max_length).contains(&w.len()))
            .collect();
        if words.is_empty() {
            log::error!("Null Value Error");
            log::debug!("no {:?} between {} and {} chars", pos, self.min_length, self.max_length);
            return Err(EngError::NullValue(format!("{:?} word list", pos)));
        }
        Ok(words)
    }
}

/// Supplies run identifiers.
pub trait PhraseSource {
    fn phrase(&self) -> EngResult<String>;
}

/// Random phrase from the embedded word lists.
#[derive(Debug, Clone, Default)]
pub struct WordListPhrase {
    pub options: PhraseOptions,
}

impl PhraseSource for WordListPhrase {
    fn phrase(&self) -> EngResult<String> {
        get_random_phrase(&self.options)
    }
}

/// Always returns the same phrase.
#[derive(Debug, Clone)]
pub struct FixedPhrase(pub String);

impl PhraseSource for FixedPhrase {
    fn phrase(&self) -> EngResult<String> {
        Ok(self.0.clone())
    }
}

pub fn get_random_phrase(opts: &PhraseOptions) -> EngResult<String> {
    let mut rng = rand::rng();
    let mut words = Vec::with_capacity(opts.order.len());
    for &pos in &opts.order {
        let candidates = opts.candidates(pos)?;
        words.push(candidates[rng.random_range(0..candidates.len())]);
    }
    Ok(words.join("-"))
}

/// Probability that two draws with `opts` produce the same phrase.
///
/// Compare its order of magnitude with the number of runs expected to share a
/// log prefix to judge whether the phrase is long enough.
pub fn get_random_phrase_probability(opts: &PhraseOptions) -> EngResult<f64> {
    let mut prob = 1.0;
    for &pos in &opts.order {
        prob /= opts.candidates(pos)?.len() as f64;
    }
    Ok(prob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phrase_has_three_bounded_words() {
        let phrase = get_random_phrase(&PhraseOptions::default()).unwrap();
        let words: Vec<&str> = phrase.split('-').collect();
        assert_eq!(words.len(), 3);
        assert!(words.iter().all(|w| (2..=8).contains(&w.len())));
        assert!(ADVERBS.contains(&words[0]));
        assert!(ADJECTIVES.contains(&words[1]));
        assert!(NOUNS.contains(&words[2]));
    }

    #[test]
    fn probability_is_product_of_inverse_counts() {
        let opts = PhraseOptions {
            order: vec![PartOfSpeech::Noun],
            ..PhraseOptions::default()
        };
        let nouns = NOUNS.iter().filter(|w| (2..=8).contains(&w.len())).count();
        let prob = get_random_phrase_probability(&opts).unwrap();
        assert!((prob - 1.0 / nouns as f64).abs() < f64::EPSILON);
        assert!(get_random_phrase_probability(&PhraseOptions::default()).unwrap() < prob);
    }

    #[test]
    fn impossible_length_filter_is_null_value() {
        let opts = PhraseOptions {
            min_length: 30,
            max_length: 40,
            ..PhraseOptions::default()
        };
        assert!(matches!(get_random_phrase(&opts), Err(EngError::NullValue(_))));
    }

    #[test]
    fn fixed_phrase_is_returned_verbatim() {
        let source = FixedPhrase("testily-testful-test".to_string());
        assert_eq!(source.phrase().unwrap(), "testily-testful-test");
    }
}
