//! End-to-end coverage through the public [`crate::Pruner`] API: the worked
//! scenarios that survive the redundancy-filter caveat noted in DESIGN.md,
//! plus property tests over arbitrary batches.

use proptest::prelude::*;
use test_strategy::proptest;

use crate::sense::Sense;
use crate::testing;
use crate::trust::{UpdateSignal, VariantConfig};
use crate::Pruner;

/// Scenario: Average variant, `maxCuts = 2`, sense `Le`. Two non-redundant
/// my-cuts fill the store, `updateStats` differentiates their trust, and a
/// follow-up batch of three candidates is resolved by redundancy filtering
/// plus the eviction loop — one candidate (a duplicate direction with a
/// strictly worse offset) is rejected outright, and the survivor evicts the
/// weaker-trust incumbent rather than the stronger one.
#[test]
fn average_variant_resolves_mixed_batch() {
  let mut pruner = Pruner::new(Sense::Le, 2, Some(2), VariantConfig::average_default()).unwrap();

  let status = pruner
    .add_cuts(vec![vec![1.0, 0.0]], vec![1.0], vec![true])
    .unwrap();
  assert_eq!(status, vec![Some(0)]);

  let status = pruner
    .add_cuts(vec![vec![0.0, 1.0]], vec![1.0], vec![true])
    .unwrap();
  assert_eq!(status, vec![Some(1)]);

  pruner.update_stats(UpdateSignal::Multipliers(vec![1.0, 0.0])).unwrap();
  assert_eq!(pruner.trust(), &[1.0, 0.0]);

  let status = pruner
    .add_cuts(
      vec![vec![1.0, 1.0], vec![-1.0, -1.0], vec![0.0, 1.0]],
      vec![1.0, 1.0, 2.0],
      vec![true, false, true],
    )
    .unwrap();
  // Third candidate duplicates the second incumbent's direction with a
  // looser offset: redundant, rejected before the eviction loop runs.
  assert_eq!(status[2], None);
  // First candidate survives and replaces the weak-trust incumbent (slot 1).
  assert_eq!(status[0], Some(1));
  assert_eq!(status[1], None);

  assert_eq!(pruner.ncuts(), 2);
  assert_eq!(pruner.coefficients().row(0), &[1.0, 0.0]);
  assert_eq!(pruner.coefficients().row(1), &[1.0, 1.0]);
  assert_eq!(pruner.ids(), &[1, 3]);
}

/// Scenario: capacity exactly matches the batch size, so every candidate is
/// admitted by the within-capacity fast path and nothing is ever evicted.
#[test]
fn exact_capacity_batch_admits_everything() {
  let mut pruner = Pruner::new(Sense::Ge, 1, Some(5), VariantConfig::decay_default()).unwrap();
  let rows: Vec<Vec<f64>> = (0..5).map(|k| vec![(k + 1) as f64]).collect();
  let offsets = vec![0.0; 5];
  let my = vec![true; 5];
  let status = pruner.add_cuts(rows, offsets, my).unwrap();
  assert_eq!(status, (0..5).map(Some).collect::<Vec<_>>());
  assert_eq!(pruner.ncuts(), 5);
}

/// P1: a pruner never holds more cuts than its configured capacity.
#[proptest]
fn never_exceeds_capacity(
  #[strategy(testing::capacity(6))] max_cuts: Option<usize>,
  #[strategy(testing::scalar_trust_config())] variant: VariantConfig,
  #[strategy(proptest::collection::vec(testing::batch(2, 1), 1..12))] batches: Vec<(Vec<Vec<f64>>, Vec<f64>, Vec<bool>)>,
) {
  let mut pruner = Pruner::new(Sense::Le, 2, max_cuts, variant).unwrap();
  for (rows, offsets, my) in batches {
    pruner.add_cuts(rows, offsets, my).unwrap();
    if let Some(m) = max_cuts {
      prop_assert!(pruner.ncuts() <= m);
    }
  }
}

/// P2: ids are assigned monotonically and never reused, even across
/// replace/append/evict cycles.
#[proptest]
fn ids_are_monotonic_and_unique(
  #[strategy(testing::scalar_trust_config())] variant: VariantConfig,
  #[strategy(proptest::collection::vec(testing::batch(2, 1), 1..15))] batches: Vec<(Vec<Vec<f64>>, Vec<f64>, Vec<bool>)>,
) {
  let mut pruner = Pruner::new(Sense::Le, 2, Some(4), variant).unwrap();
  let mut max_seen = 0u64;
  for (rows, offsets, my) in batches {
    pruner.add_cuts(rows, offsets, my).unwrap();
    for &id in pruner.ids() {
      prop_assert!(id > 0);
    }
    let batch_max = pruner.ids().iter().copied().max().unwrap_or(0);
    prop_assert!(batch_max >= max_seen);
    max_seen = batch_max;
    let mut sorted = pruner.ids().to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    prop_assert_eq!(sorted.len(), pruner.ids().len());
  }
}

/// `keepOnlyCuts` never resurrects a dropped id, and every surviving id was
/// already present beforehand.
#[proptest]
fn keep_only_is_a_subset_projection(
  #[strategy(testing::scalar_trust_config())] variant: VariantConfig,
  #[strategy(proptest::collection::vec(testing::cut_row(2), 3..8))] rows: Vec<Vec<f64>>,
) {
  let n = rows.len();
  let mut pruner = Pruner::new(Sense::Le, 2, None, variant).unwrap();
  let offsets: Vec<f64> = rows.iter().map(|r| r[0] * 10.0).collect();
  let my = vec![true; n];
  pruner.add_cuts(rows, offsets, my).unwrap();
  let before: std::collections::HashSet<u64> = pruner.ids().iter().copied().collect();

  let keep: Vec<usize> = (0..pruner.ncuts()).step_by(2).collect();
  pruner.keep_only_cuts(&keep).unwrap();

  prop_assert_eq!(pruner.ncuts(), keep.len());
  for &id in pruner.ids() {
    prop_assert!(before.contains(&id));
  }
}

/// P4: re-submitting an already-admitted batch is a no-op — every candidate
/// is now an exact duplicate of an existing cut, so the redundancy filter
/// rejects the whole batch and `A`/`b` are left untouched.
#[proptest]
fn resubmitting_a_batch_is_idempotent(#[strategy(testing::scalar_trust_config())] variant: VariantConfig) {
  let rows = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![2.0, 1.0]];
  let offsets = vec![1.0, 1.0, 1.0];
  let my = vec![true, true, true];

  let mut pruner = Pruner::new(Sense::Le, 2, None, variant).unwrap();
  let first = pruner.add_cuts(rows.clone(), offsets.clone(), my.clone()).unwrap();
  prop_assert!(first.iter().all(Option::is_some));
  let coeffs_before: Vec<Vec<f64>> = pruner.coefficients().iter_rows().map(|r| r.to_vec()).collect();
  let offsets_before = pruner.offsets().to_vec();

  let second = pruner.add_cuts(rows, offsets, my).unwrap();
  prop_assert!(second.iter().all(Option::is_none));
  let coeffs_after: Vec<Vec<f64>> = pruner.coefficients().iter_rows().map(|r| r.to_vec()).collect();
  prop_assert_eq!(coeffs_before, coeffs_after);
  prop_assert_eq!(offsets_before, pruner.offsets().to_vec());
}

/// P5/I4: for a LevelOne pruner, territory always partitions the sampled
/// states exactly, and each `(ix, v)` entry is genuinely the argmax cut at
/// that state.
#[proptest]
fn level_one_territory_always_partitions_states(
  #[strategy(proptest::collection::vec(testing::cut_row(1), 2..6))] rows: Vec<Vec<f64>>,
  #[strategy(proptest::collection::vec(-10.0..10.0f64, 0..10))] states: Vec<f64>,
) {
  let n = rows.len();
  let mut pruner = Pruner::new(Sense::Max, 1, None, VariantConfig::LevelOne).unwrap();
  let offsets: Vec<f64> = rows.iter().map(|r| r[0] / 3.0).collect();
  pruner.add_cuts(rows, offsets, vec![true; n]).unwrap();
  pruner
    .update_stats(UpdateSignal::States(states.into_iter().map(|x| vec![x]).collect()))
    .unwrap();

  let ctx = crate::trust::CutContext {
    a: pruner.coefficients(),
    b: pruner.offsets(),
    is_function: true,
    is_lower_bound: true,
  };
  let lo = pruner.trust_variant().as_level_one().unwrap();
  prop_assert!(lo.territory().invariant_holds(&ctx));
}
