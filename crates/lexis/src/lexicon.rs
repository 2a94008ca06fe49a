//! # Review Lexicon
//!
//! Word-level polarity lookup for product and service reviews, with negation and
//! intensifier handling.

use std::collections::HashMap;

use regex::Regex;

use crate::PolarityModel;

const TOKEN_PATTERN: &str = r"[A-Za-z][A-Za-z']*";

/// Factor applied to a sentiment word that follows a negation ("not good").
const NEGATION_FACTOR: f64 = -0.5;

/// How many tokens a pending negation or intensifier survives before it lapses.
const MODIFIER_REACH: usize = 3;

const POSITIVE_WORDS: &[(&str, f64)] = &[
  ("good", 0.7),
  ("great", 0.8),
  ("excellent", 1.0),
  ("amazing", 0.6),
  ("awesome", 1.0),
  ("outstanding", 0.5),
  ("superb", 1.0),
  ("perfect", 1.0),
  ("best", 1.0),
  ("better", 0.5),
  ("wonderful", 1.0),
  ("fantastic", 0.4),
  ("brilliant", 0.9),
  ("beautiful", 0.85),
  ("lovely", 0.5),
  ("love", 0.5),
  ("loved", 0.7),
  ("loves", 0.5),
  ("nice", 0.6),
  ("happy", 0.8),
  ("pleased", 0.5),
  ("satisfied", 0.5),
  ("enjoy", 0.4),
  ("enjoyed", 0.5),
  ("comfortable", 0.4),
  ("easy", 0.43),
  ("fast", 0.2),
  ("quick", 0.33),
  ("fine", 0.42),
  ("fun", 0.3),
  ("cute", 0.5),
  ("useful", 0.3),
  ("helpful", 0.4),
  ("reliable", 0.5),
  ("sturdy", 0.4),
  ("solid", 0.3),
  ("recommend", 0.4),
  ("recommended", 0.4),
  ("worth", 0.3),
  ("impressive", 1.0),
  ("impressed", 0.6),
  ("friendly", 0.375),
  ("clean", 0.37),
  ("smooth", 0.4),
  ("delicious", 1.0),
  ("pretty", 0.25),
  ("glad", 0.5),
  ("exceptional", 0.67),
  ("favorite", 0.5),
  ("incredible", 0.9),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
  ("bad", -0.7),
  ("terrible", -1.0),
  ("awful", -1.0),
  ("horrible", -1.0),
  ("poor", -0.4),
  ("worst", -1.0),
  ("worse", -0.4),
  ("broken", -0.4),
  ("broke", -0.4),
  ("disappointed", -0.75),
  ("disappointing", -0.6),
  ("waste", -0.2),
  ("wasted", -0.2),
  ("useless", -0.5),
  ("flimsy", -0.5),
  ("slow", -0.3),
  ("difficult", -0.5),
  ("hate", -0.8),
  ("hated", -0.9),
  ("sad", -0.5),
  ("angry", -0.5),
  ("annoying", -0.8),
  ("defective", -0.7),
  ("uncomfortable", -0.5),
  ("boring", -1.0),
  ("ugly", -0.7),
  ("wrong", -0.5),
  ("expensive", -0.5),
  ("overpriced", -0.6),
  ("faulty", -0.6),
  ("damaged", -0.5),
  ("dirty", -0.6),
  ("rude", -0.3),
  ("unhappy", -0.6),
  ("unusable", -0.8),
  ("mediocre", -0.4),
  ("cheaply", -0.3),
  ("fake", -0.5),
  ("problem", -0.3),
  ("problems", -0.3),
  ("fail", -0.5),
  ("failed", -0.5),
  ("stupid", -0.8),
  ("painful", -0.7),
  ("disgusting", -1.0),
  ("refund", -0.2),
  ("leaks", -0.3),
  ("noisy", -0.3),
  ("junk", -0.6),
  ("crap", -0.8),
];

const NEGATIONS: &[&str] = &[
  "not", "no", "never", "neither", "nor", "nothing", "none", "cannot", "cant", "can't",
  "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "won't", "wont", "isn't", "isnt",
  "wasn't", "wasnt", "aren't", "arent", "weren't", "werent", "hardly", "barely",
];

const INTENSIFIERS: &[(&str, f64)] = &[
  ("very", 1.3),
  ("really", 1.2),
  ("extremely", 1.5),
  ("super", 1.3),
  ("incredibly", 1.5),
  ("absolutely", 1.4),
  ("totally", 1.3),
  ("highly", 1.3),
  ("so", 1.2),
  ("quite", 1.1),
  ("slightly", 0.5),
  ("somewhat", 0.7),
  ("barely", 0.5),
];

/// Lexicon-backed polarity model.
///
/// The score of a text is the mean polarity of the lexicon words it contains, after
/// modifiers, clamped to `[-1.0, 1.0]`. Texts without any lexicon word score `0.0`.
pub struct LexiconModel {
  words: HashMap<String, f64>,
  intensifiers: HashMap<String, f64>,
  negations: Vec<String>,
  tokenizer: Regex,
}

impl Default for LexiconModel {
  fn default() -> Self {
    Self::new()
  }
}

impl LexiconModel {
  pub fn new() -> Self {
    let words = POSITIVE_WORDS
      .iter()
      .chain(NEGATIVE_WORDS.iter())
      .map(|(word, score)| (word.to_string(), *score))
      .collect();

    let intensifiers =
      INTENSIFIERS.iter().map(|(word, factor)| (word.to_string(), *factor)).collect();

    Self {
      words,
      intensifiers,
      negations: NEGATIONS.iter().map(|word| word.to_string()).collect(),
      tokenizer: Regex::new(TOKEN_PATTERN).expect("token pattern is valid"),
    }
  }

  /// Add or override a lexicon entry. Scores are clamped to `[-1.0, 1.0]`.
  pub fn with_word(mut self, word: &str, score: f64) -> Self {
    self.words.insert(word.to_lowercase(), score.clamp(-1.0, 1.0));
    self
  }

  /// Polarity of a single word, ignoring context
  pub fn word_score(&self, word: &str) -> Option<f64> {
    self.words.get(&word.to_lowercase()).copied()
  }

  pub fn lexicon_size(&self) -> usize {
    self.words.len()
  }

  fn is_negation(&self, token: &str) -> bool {
    self.negations.iter().any(|negation| negation == token)
  }

  fn tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
    self.tokenizer.find_iter(text).map(|m| m.as_str().to_lowercase())
  }
}

#[derive(Default)]
struct Modifiers {
  negated: bool,
  intensity: Option<f64>,
  reach: usize,
}

impl Modifiers {
  fn arm_negation(&mut self) {
    self.negated = !self.negated;
    self.reach = MODIFIER_REACH;
  }

  fn arm_intensity(&mut self, factor: f64) {
    self.intensity = Some(self.intensity.unwrap_or(1.0) * factor);
    self.reach = MODIFIER_REACH;
  }

  fn apply(&mut self, score: f64) -> f64 {
    let mut adjusted = score * self.intensity.unwrap_or(1.0);
    if self.negated {
      adjusted *= NEGATION_FACTOR;
    }
    *self = Self::default();
    adjusted
  }

  fn tick(&mut self) {
    if self.reach > 0 {
      self.reach -= 1;
      if self.reach == 0 {
        *self = Self::default();
      }
    }
  }
}

impl PolarityModel for LexiconModel {
  fn polarity(&self, text: &str) -> f64 {
    let mut modifiers = Modifiers::default();
    let mut total = 0.0;
    let mut scored = 0usize;

    for token in self.tokens(text) {
      if let Some(score) = self.words.get(&token) {
        total += modifiers.apply(*score);
        scored += 1;
      } else if self.is_negation(&token) {
        modifiers.arm_negation();
      } else if let Some(factor) = self.intensifiers.get(&token) {
        modifiers.arm_intensity(*factor);
      } else {
        modifiers.tick();
      }
    }

    if scored == 0 {
      return 0.0;
    }

    (total / scored as f64).clamp(-1.0, 1.0)
  }
}
