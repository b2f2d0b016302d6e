//! Lexicon-based polarity of the untokenized tweet.
//!
//! Each known word contributes its valence, adjusted by preceding booster
//! words, all-caps emphasis and negation within a three-token window. The
//! summed valence is squashed to a compound score in [-1, 1].

use super::FeatureExtractor;
use crate::dataset::Table;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

const NORMALIZATION_ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const CAPS_INCREMENT: f64 = 0.733;
const EXCLAMATION_INCREMENT: f64 = 0.292;

const LEXICON: &[(&str, f64)] = &[
    // positive
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("wonderful", 2.7),
    ("fantastic", 2.6),
    ("love", 3.2),
    ("loved", 2.9),
    ("loves", 2.7),
    ("lovely", 2.8),
    ("like", 1.5),
    ("likes", 1.8),
    ("nice", 1.8),
    ("happy", 2.7),
    ("glad", 2.0),
    ("joy", 2.8),
    ("fun", 2.3),
    ("best", 3.2),
    ("better", 1.9),
    ("beautiful", 2.9),
    ("brilliant", 2.8),
    ("cool", 1.3),
    ("win", 2.8),
    ("winning", 2.4),
    ("success", 2.7),
    ("successful", 2.8),
    ("thanks", 1.9),
    ("thank", 1.5),
    ("grateful", 2.0),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("interesting", 1.7),
    ("helpful", 1.8),
    ("impressive", 2.3),
    ("perfect", 2.7),
    ("proud", 2.1),
    ("hope", 1.9),
    ("hopeful", 1.6),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("congrats", 2.4),
    ("congratulations", 2.9),
    ("welcome", 2.0),
    ("easy", 1.9),
    ("useful", 1.9),
    ("powerful", 1.8),
    ("innovative", 1.9),
    ("strong", 2.3),
    ("safe", 1.9),
    ("free", 2.3),
    ("yes", 1.7),
    ("lol", 1.8),
    ("wow", 2.8),
    // negative
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.1),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("hate", -2.7),
    ("hated", -3.2),
    ("hates", -1.9),
    ("sad", -2.1),
    ("angry", -2.3),
    ("annoying", -1.7),
    ("boring", -1.3),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("wrong", -2.1),
    ("problem", -1.7),
    ("problems", -1.7),
    ("broken", -2.1),
    ("bug", -1.0),
    ("bugs", -1.1),
    ("crash", -1.7),
    ("error", -1.7),
    ("useless", -1.8),
    ("stupid", -2.4),
    ("ugly", -2.3),
    ("poor", -2.1),
    ("pain", -2.3),
    ("painful", -1.9),
    ("fear", -2.2),
    ("scary", -2.2),
    ("worried", -1.2),
    ("difficult", -1.5),
    ("hard", -0.4),
    ("lose", -1.3),
    ("lost", -1.3),
    ("loss", -1.3),
    ("sorry", -0.3),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("dangerous", -2.1),
    ("kill", -3.7),
    ("killed", -3.5),
    ("dead", -3.3),
    ("die", -2.9),
    ("no", -1.2),
];

const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOSTER_INCREMENT),
    ("completely", BOOSTER_INCREMENT),
    ("extremely", BOOSTER_INCREMENT),
    ("incredibly", BOOSTER_INCREMENT),
    ("really", BOOSTER_INCREMENT),
    ("so", BOOSTER_INCREMENT),
    ("totally", BOOSTER_INCREMENT),
    ("very", BOOSTER_INCREMENT),
    ("super", BOOSTER_INCREMENT),
    ("most", BOOSTER_INCREMENT),
    ("barely", -BOOSTER_INCREMENT),
    ("hardly", -BOOSTER_INCREMENT),
    ("slightly", -BOOSTER_INCREMENT),
    ("somewhat", -BOOSTER_INCREMENT),
    ("kinda", -BOOSTER_INCREMENT),
    ("little", -BOOSTER_INCREMENT),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "cannot", "without",
];

fn lexicon() -> &'static HashMap<&'static str, f64> {
    static LEX: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    LEX.get_or_init(|| LEXICON.iter().copied().collect())
}

fn boosters() -> &'static HashMap<&'static str, f64> {
    static BOOST: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    BOOST.get_or_init(|| BOOSTERS.iter().copied().collect())
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

fn is_shouting(token: &str) -> bool {
    token.len() > 1
        && token.chars().any(|c| c.is_alphabetic())
        && token.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())
}

/// Compound polarity of a text in [-1, 1].
pub fn polarity(text: &str) -> f64 {
    let raw: Vec<&str> = text.split_whitespace().collect();
    let words: Vec<String> = raw
        .iter()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .collect();
    let mixed_case = raw.iter().any(|t| !is_shouting(t));

    let mut total = 0.0;
    for (i, word) in words.iter().enumerate() {
        // "no" only counts as negative when it stands alone
        if word == "no" && i + 1 < words.len() && lexicon().contains_key(words[i + 1].as_str()) {
            continue;
        }
        let Some(&base) = lexicon().get(word.as_str()) else {
            continue;
        };
        let mut valence = base;
        if mixed_case && is_shouting(raw[i]) {
            valence += CAPS_INCREMENT * valence.signum();
        }
        for back in 1..=3usize.min(i) {
            let prev = &words[i - back];
            if let Some(&boost) = boosters().get(prev.as_str()) {
                let damp = match back {
                    1 => 1.0,
                    2 => 0.95,
                    _ => 0.9,
                };
                valence += boost * damp * valence.signum();
            }
            if is_negation(prev) {
                valence *= NEGATION_SCALAR;
            }
        }
        total += valence;
    }

    if total != 0.0 {
        let bangs = text.matches('!').count().min(4) as f64;
        total += bangs * EXCLAMATION_INCREMENT * total.signum();
    }

    let compound = total / (total * total + NORMALIZATION_ALPHA).sqrt();
    compound.clamp(-1.0, 1.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    pub column: String,
}

impl Sentiment {
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
        }
    }
}

impl FeatureExtractor for Sentiment {
    fn input_columns(&self) -> Vec<&str> {
        vec![self.column.as_str()]
    }

    fn feature_name(&self) -> String {
        format!("{}_sentiment", self.column)
    }

    fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        Ok(table
            .column(&self.column)?
            .iter()
            .map(|text| vec![polarity(text)])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_text_scores_zero() {
        assert_eq!(polarity("the cat sat on the mat"), 0.0);
        assert_eq!(polarity(""), 0.0);
    }

    #[test]
    fn polarity_sign() {
        assert!(polarity("what a great talk, loved it") > 0.5);
        assert!(polarity("this release is terrible and broken") < -0.5);
    }

    #[test]
    fn negation_flips() {
        assert!(polarity("this is good") > 0.0);
        assert!(polarity("this is not good") < 0.0);
        assert!(polarity("this isn't good") < 0.0);
    }

    #[test]
    fn boosters_and_caps_intensify() {
        let plain = polarity("the demo was good");
        assert!(polarity("the demo was very good") > plain);
        assert!(polarity("the demo was GOOD") > plain);
        assert!(polarity("the demo was good!!") > plain);
    }

    #[test]
    fn stays_bounded() {
        let gushing = "love love love amazing awesome best great perfect ".repeat(20);
        let score = polarity(&gushing);
        assert!(score <= 1.0 && score > 0.99);
    }

    #[test]
    fn extractor_emits_one_column() {
        let table = Table::from_columns(vec![("tweet", vec!["good", "bad"])]);
        let rows = Sentiment::new("tweet").transform(&table).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0][0] > 0.0 && rows[1][0] < 0.0);
    }
}
