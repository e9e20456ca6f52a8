//! Lightweight text analysis for scraped travel posts.
//!
//! Place extraction looks for capitalised phrases introduced by a location
//! cue ("in", "to", "visit", ...) or naming a known country. Sentiment is a
//! lexicon average in [-1, 1]: intensifiers scale the next opinion word and
//! a preceding negation flips it at half strength.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Off-the-shelf style entity and sentiment scoring.
pub trait TextAnalyzer: Send + Sync {
    /// Place-type entities mentioned in the text, in order of first mention.
    fn places(&self, text: &str) -> Vec<String>;

    /// Sentiment polarity from -1.0 (negative) to 1.0 (positive).
    fn polarity(&self, text: &str) -> f64;
}

const LOCATION_CUES: &[&str] = &[
    "in", "to", "from", "at", "near", "around", "visit", "visiting", "visited", "across",
    "through", "toward", "towards", "via", "explore", "exploring", "of", "into", "onto",
];

const CONNECTORS: &[&str] = &["de", "del", "da", "di", "do", "dos", "la", "le", "of", "upon"];

const NON_PLACE_WORDS: &[&str] = &[
    "i", "the", "a", "an", "my", "we", "our", "you", "your", "it", "this", "that", "they",
    "he", "she", "if", "but", "and", "so", "also", "edit", "update", "tl", "dr", "thanks",
    "hi", "hello", "any", "what", "where", "when", "how", "is", "are", "day", "monday",
    "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "january", "february",
    "march", "april", "may", "june", "july", "august", "september", "october", "november",
    "december", "airbnb", "uber", "google",
];

const KNOWN_PLACES: &[&str] = &[
    "albania", "andorra", "austria", "belgium", "bosnia", "bulgaria", "croatia", "cyprus",
    "czechia", "denmark", "england", "estonia", "europe", "finland", "france", "germany",
    "greece", "hungary", "iceland", "ireland", "italy", "latvia", "lithuania", "luxembourg",
    "malta", "montenegro", "netherlands", "norway", "poland", "portugal", "romania",
    "scotland", "serbia", "slovakia", "slovenia", "spain", "sweden", "switzerland", "turkey",
    "ukraine", "wales", "asia", "africa", "america", "japan", "mexico", "canada", "morocco",
    "egypt", "thailand", "vietnam", "australia",
];

const LEXICON: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("cheap", 0.4),
    ("clean", 0.37),
    ("delicious", 1.0),
    ("easy", 0.43),
    ("enjoy", 0.4),
    ("enjoyed", 0.5),
    ("excellent", 1.0),
    ("fantastic", 0.4),
    ("friendly", 0.375),
    ("fun", 0.3),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("helpful", 0.5),
    ("incredible", 0.9),
    ("love", 0.5),
    ("loved", 0.7),
    ("lovely", 0.5),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("recommended", 0.4),
    ("safe", 0.5),
    ("stunning", 0.5),
    ("wonderful", 1.0),
    ("worth", 0.3),
    ("avoid", -0.3),
    ("awful", -1.0),
    ("bad", -0.7),
    ("boring", -1.0),
    ("crowded", -0.4),
    ("dangerous", -0.6),
    ("dirty", -0.6),
    ("disappointing", -0.6),
    ("expensive", -0.5),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("noisy", -0.2),
    ("overpriced", -0.5),
    ("overrated", -0.5),
    ("poor", -0.4),
    ("rude", -0.3),
    ("sad", -0.5),
    ("scam", -0.5),
    ("terrible", -1.0),
    ("ugly", -0.7),
    ("unsafe", -0.5),
    ("worst", -1.0),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("extremely", 1.5),
    ("incredibly", 1.4),
    ("really", 1.3),
    ("so", 1.3),
    ("super", 1.3),
    ("very", 1.3),
    ("quite", 1.1),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "hardly"];

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\p{L}][\p{L}'\-]*").expect("valid word pattern"))
}

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?\n]+").expect("valid sentence pattern"))
}

fn is_capitalised(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Lexicon- and pattern-based analyzer with no external model files.
pub struct LexiconAnalyzer {
    lexicon: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }
}

impl LexiconAnalyzer {
    fn sentence_places(&self, sentence: &str, places: &mut Vec<String>) {
        let words: Vec<&str> = word_pattern().find_iter(sentence).map(|m| m.as_str()).collect();
        let mut i = 0;

        while i < words.len() {
            if !is_capitalised(words[i]) || NON_PLACE_WORDS.contains(&words[i].to_lowercase().as_str()) {
                i += 1;
                continue;
            }

            let start = i;
            let mut end = i + 1;
            while end < words.len() {
                if is_capitalised(words[end]) {
                    end += 1;
                } else if CONNECTORS.contains(&words[end])
                    && words.get(end + 1).is_some_and(|next| is_capitalised(next))
                {
                    end += 2;
                } else {
                    break;
                }
            }

            let phrase = words[start..end].join(" ");
            let cued = start > 0 && LOCATION_CUES.contains(&words[start - 1].to_lowercase().as_str());
            let known = KNOWN_PLACES.contains(&phrase.to_lowercase().as_str());

            if (cued || known) && !places.contains(&phrase) {
                places.push(phrase);
            }
            i = end;
        }
    }
}

impl TextAnalyzer for LexiconAnalyzer {
    fn places(&self, text: &str) -> Vec<String> {
        let mut places = Vec::new();
        for sentence in sentence_pattern().split(text) {
            self.sentence_places(sentence, &mut places);
        }
        places
    }

    fn polarity(&self, text: &str) -> f64 {
        let mut scores = Vec::new();
        let mut intensity: Option<f64> = None;
        let mut negated = false;

        for word in word_pattern().find_iter(text) {
            let word = word.as_str().to_lowercase();

            if NEGATIONS.contains(&word.as_str()) || word.ends_with("n't") {
                negated = true;
                continue;
            }
            if let Some(factor) = self.intensifiers.get(word.as_str()) {
                intensity = Some(*factor);
                continue;
            }
            if let Some(value) = self.lexicon.get(word.as_str()) {
                let mut score = value * intensity.unwrap_or(1.0);
                if negated {
                    score *= -0.5;
                }
                scores.push(score.clamp(-1.0, 1.0));
            }
            intensity = None;
            negated = false;
        }

        if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_places_after_cue_words() {
        let analyzer = LexiconAnalyzer::default();
        let places = analyzer.places(
            "We spent a week in Lisbon and then took the train to Porto. I loved Sintra too.",
        );

        assert_eq!(places, vec!["Lisbon".to_string(), "Porto".to_string()]);
    }

    #[test]
    fn test_multi_word_and_known_places() {
        let analyzer = LexiconAnalyzer::default();
        let places =
            analyzer.places("Portugal is great. Fly into Santiago de Compostela from New York City.");

        assert_eq!(
            places,
            vec![
                "Portugal".to_string(),
                "Santiago de Compostela".to_string(),
                "New York City".to_string(),
            ]
        );
    }

    #[test]
    fn test_no_places() {
        let analyzer = LexiconAnalyzer::default();
        assert!(analyzer.places("The food was good. My hotel was fine.").is_empty());
    }

    #[test]
    fn test_polarity_positive_and_negative() {
        let analyzer = LexiconAnalyzer::default();

        assert!(analyzer.polarity("The beaches were beautiful and the food was great") > 0.5);
        assert!(analyzer.polarity("Terrible service and dirty rooms") < -0.5);
        assert_eq!(analyzer.polarity("We took a train"), 0.0);
    }

    #[test]
    fn test_polarity_negation_and_intensity() {
        let analyzer = LexiconAnalyzer::default();

        assert!((analyzer.polarity("not good") - (-0.35)).abs() < 1e-9);
        assert!((analyzer.polarity("isn't bad") - 0.35).abs() < 1e-9);
        assert!((analyzer.polarity("very nice") - 0.78).abs() < 1e-9);
        assert_eq!(analyzer.polarity("extremely wonderful"), 1.0);
    }
}
