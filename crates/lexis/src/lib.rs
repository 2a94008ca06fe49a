//! Lexis - polarity scoring for short review texts
//!
//! The rest of the workspace treats polarity as an opaque capability: anything that
//! can turn a string into a signed score in `[-1.0, 1.0]` implements [`PolarityModel`].
//! [`LexiconModel`] is the built-in implementation; closures work too, which keeps
//! tests free of any particular vocabulary.

pub mod lexicon;

pub use lexicon::LexiconModel;

/// A source of signed polarity scores.
///
/// Positive values lean positive, negative values lean negative and `0.0` means no
/// sentiment signal at all. Implementations must be deterministic for a given text.
pub trait PolarityModel {
  fn polarity(&self, text: &str) -> f64;
}

impl<F> PolarityModel for F
where
  F: Fn(&str) -> f64,
{
  fn polarity(&self, text: &str) -> f64 {
    self(text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockall::mock;

  mock! {
    Model {}
    impl PolarityModel for Model {
      fn polarity(&self, text: &str) -> f64;
    }
  }

  fn score_through_trait<M: PolarityModel>(model: &M, text: &str) -> f64 {
    model.polarity(text)
  }

  #[test]
  fn test_closure_is_a_model() {
    let model = |text: &str| if text.contains("yay") { 0.5 } else { 0.0 };
    assert_eq!(score_through_trait(&model, "yay"), 0.5);
    assert_eq!(score_through_trait(&model, "meh"), 0.0);
  }

  #[test]
  fn test_mocked_model_is_called_once_per_text() {
    let mut mock = MockModel::new();
    mock.expect_polarity().times(1).returning(|_| -0.25);

    assert_eq!(score_through_trait(&mock, "anything"), -0.25);
  }
}
