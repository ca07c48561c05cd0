//! `proptest` strategies for generating arbitrary cuts, batches, and pruner
//! configurations, used by the property tests in [`crate::tests`] and in
//! the integration suite under `tests/`.

use proptest::collection::vec;
use proptest::prelude::*;

use crate::sense::Sense;
use crate::trust::VariantConfig;

pub fn senses() -> impl Strategy<Value = Sense> {
  prop_oneof![
    Just(Sense::Min),
    Just(Sense::Max),
    Just(Sense::Le),
    Just(Sense::Ge),
  ]
}

/// A single row of dimension `d`, coordinates bounded away from the
/// near-zero range the redundancy filter treats specially, so generated
/// batches exercise ordinary normalization rather than its degenerate edge
/// case (covered separately by unit tests).
pub fn cut_row(d: usize) -> impl Strategy<Value = Vec<f64>> {
  vec(-10.0..10.0f64, d..=d)
}

pub fn offset() -> impl Strategy<Value = f64> {
  -10.0..10.0f64
}

/// A batch of `n` candidate cuts: rows, offsets, and my-cut flags, all the
/// same length, ready to hand to [`crate::Pruner::add_cuts`].
pub fn batch(d: usize, n: usize) -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<f64>, Vec<bool>)> {
  (
    vec(cut_row(d), n..=n),
    vec(offset(), n..=n),
    vec(any::<bool>(), n..=n),
  )
}

pub fn average_config() -> impl Strategy<Value = VariantConfig> {
  (0.0..1.0f64, 0.0..0.5f64).map(|(new_cut_trust, my_cut_bonus)| VariantConfig::Average {
    new_cut_trust,
    my_cut_bonus,
  })
}

pub fn decay_config() -> impl Strategy<Value = VariantConfig> {
  (0.01..0.99f64, 0.0..1.0f64, 0.0..0.5f64).map(|(lambda, new_cut_trust, my_cut_bonus)| {
    VariantConfig::Decay {
      lambda,
      new_cut_trust,
      my_cut_bonus,
    }
  })
}

/// Any variant except LevelOne, which needs a sense-aware `cut_value` and
/// is exercised by its own dedicated property tests instead.
pub fn scalar_trust_config() -> impl Strategy<Value = VariantConfig> {
  prop_oneof![average_config(), decay_config()]
}

pub fn capacity(max_n: usize) -> impl Strategy<Value = Option<usize>> {
  prop_oneof![Just(None), (1..=max_n).prop_map(Some)]
}
