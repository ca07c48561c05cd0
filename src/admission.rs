use log::{debug, trace};

use crate::error::PrunerError;
use crate::redundancy;
use crate::selector::choose_to_remove;
use crate::store::CutStore;
use crate::trust::{CutContext, TrustModel, TrustVariant, UpdateSignal};

/// One `addCuts` call, per §4.5. `max_cuts` is `None` for the unbounded
/// sentinel (`-1` in the distilled spec); `Some(m)` otherwise.
///
/// Returns, for each surviving-or-rejected candidate in input order, the
/// final 0-indexed slot it landed in, or `None` if it was rejected
/// (redundant, or out-competed during eviction planning). The distilled
/// spec uses `0` as the rejection sentinel in a 1-indexed status vector;
/// `Option<usize>` is the idiomatic Rust analogue that doesn't collide with
/// a real 0-indexed slot.
pub fn add_cuts(
  store: &mut CutStore,
  trust: &mut TrustVariant,
  is_function: bool,
  is_lower_bound: bool,
  max_cuts: Option<usize>,
  tol: f64,
  rows: Vec<Vec<f64>>,
  offsets: Vec<f64>,
  is_my_cut: Vec<bool>,
) -> Result<Vec<Option<usize>>, PrunerError> {
  if rows.is_empty() {
    return Ok(Vec::new());
  }

  let redundant = redundancy::find_redundant(
    store.a(),
    store.b(),
    &rows,
    &offsets,
    is_function,
    is_lower_bound,
    tol,
  );

  let mut surviving: Vec<usize> = (0..rows.len()).filter(|&k| !redundant[k]).collect();
  if surviving.is_empty() {
    trace!("addCuts: all {} candidates redundant, no state change", rows.len());
    return Ok(vec![None; rows.len()]);
  }

  // No more than `max_cuts` candidates can ever be admitted in one call,
  // since eviction can free at most `n_cur` slots and the store can never
  // exceed capacity. Reject the surplus outright (status stays `None`)
  // rather than ask `choose_to_remove` for more eviction victims than
  // currently exist — the distilled spec's §4.5 arithmetic assumes
  // `nNew <= maxCuts`, which a single oversized batch can violate.
  if let Some(m) = max_cuts {
    if surviving.len() > m {
      debug!(
        "addCuts: {} surviving candidates exceed capacity {m}, rejecting {} for capacity overflow",
        surviving.len(),
        surviving.len() - m
      );
      surviving.truncate(m);
    }
  }

  let surviving_rows: Vec<Vec<f64>> = surviving.iter().map(|&k| rows[k].clone()).collect();
  let surviving_offsets: Vec<f64> = surviving.iter().map(|&k| offsets[k]).collect();
  let surviving_my: Vec<bool> = surviving.iter().map(|&k| is_my_cut[k]).collect();

  let n_cur = store.n();
  let n_new = surviving.len();

  let mut status = vec![None; rows.len()];

  let within_capacity = match max_cuts {
    None => true,
    Some(m) => n_cur + n_new <= m,
  };

  if within_capacity {
    store.append(&surviving_rows, &surviving_offsets);
    let ctx = CutContext {
      a: store.a(),
      b: store.b(),
      is_function,
      is_lower_bound,
    };
    trust.on_append(&surviving_my, &ctx);
    for (pos, &k) in surviving.iter().enumerate() {
      status[k] = Some(n_cur + pos);
    }
    debug!(
      "addCuts: appended {n_new} cuts without eviction ({n_cur} -> {})",
      n_cur + n_new
    );
    return Ok(status);
  }

  let max_cuts = max_cuts.expect("eviction branch implies a finite capacity");
  // Bounded above by `n_cur`: capacity truncation above guarantees
  // `n_new <= max_cuts`, so `n_cur + n_new - max_cuts <= n_cur`, but the
  // `.min(n_cur)`/`saturating_sub` stay as an explicit belt-and-braces
  // cap so `choose_to_remove` is never asked for more victims than exist.
  let evict_count = (n_cur + n_new).saturating_sub(max_cuts).min(n_cur);
  let eviction_candidates = choose_to_remove(trust.trust(), store.ids(), evict_count);

  let take_init = max_cuts as i64 - n_cur as i64;
  let n_my = surviving_my.iter().filter(|&&m| m).count();
  let l = eviction_candidates.len() as i64;
  let mut take = take_init;
  let mut replaced = eviction_candidates.len();

  while take + l - replaced as i64 < n_new as i64 {
    debug_assert!(replaced > 0, "eviction loop invariant violated");
    let incumbent = eviction_candidates[replaced - 1];
    let hypothetical_my_cut = take < n_my as i64;
    if trust.is_better(incumbent, hypothetical_my_cut) {
      replaced -= 1;
    } else {
      take += 1;
    }
  }

  let take = take.max(0) as usize;
  let replaced_slots = &eviction_candidates[..replaced];

  let n_my_admitted = take.min(n_my);
  let my_candidates: Vec<usize> = surviving
    .iter()
    .copied()
    .zip(surviving_my.iter().copied())
    .filter(|&(_, my)| my)
    .map(|(k, _)| k)
    .take(n_my_admitted)
    .collect();
  let non_my_candidates: Vec<usize> = surviving
    .iter()
    .copied()
    .zip(surviving_my.iter().copied())
    .filter(|&(_, my)| !my)
    .map(|(k, _)| k)
    .take(take - n_my_admitted)
    .collect();
  let admitted: Vec<usize> = my_candidates.into_iter().chain(non_my_candidates).collect();

  let (replacing, appending) = admitted.split_at(replaced.min(admitted.len()));

  let replace_rows: Vec<Vec<f64>> = replacing.iter().map(|&k| rows[k].clone()).collect();
  let replace_offsets: Vec<f64> = replacing.iter().map(|&k| offsets[k]).collect();
  let replace_my: Vec<bool> = replacing.iter().map(|&k| is_my_cut[k]).collect();

  let append_rows: Vec<Vec<f64>> = appending.iter().map(|&k| rows[k].clone()).collect();
  let append_offsets: Vec<f64> = appending.iter().map(|&k| offsets[k]).collect();
  let append_my: Vec<bool> = appending.iter().map(|&k| is_my_cut[k]).collect();

  if !replacing.is_empty() {
    store.replace_at(replaced_slots, &replace_rows, &replace_offsets);
  }
  if !appending.is_empty() {
    store.append(&append_rows, &append_offsets);
  }

  let ctx = CutContext {
    a: store.a(),
    b: store.b(),
    is_function,
    is_lower_bound,
  };
  if !replacing.is_empty() {
    trust.on_replace(replaced_slots, &replace_my, &ctx);
  }
  if !appending.is_empty() {
    trust.on_append(&append_my, &ctx);
  }

  for (pos, &k) in replacing.iter().enumerate() {
    status[k] = Some(replaced_slots[pos]);
  }
  let append_base = n_cur;
  for (pos, &k) in appending.iter().enumerate() {
    status[k] = Some(append_base + pos);
  }

  debug!(
    "addCuts: admitted {} of {n_new} surviving candidates ({} replaced, {} appended), evicted {} incumbents",
    admitted.len(),
    replacing.len(),
    appending.len(),
    replaced
  );

  Ok(status)
}

pub fn update_stats(
  trust: &mut TrustVariant,
  store: &CutStore,
  is_function: bool,
  is_lower_bound: bool,
  signal: UpdateSignal,
) -> Result<(), PrunerError> {
  let ctx = CutContext {
    a: store.a(),
    b: store.b(),
    is_function,
    is_lower_bound,
  };
  trust.update_stats(&signal, &ctx)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::trust::VariantConfig;

  #[test]
  fn oversized_initial_batch_does_not_panic() {
    let mut store = CutStore::new(2);
    let mut trust = TrustVariant::new(VariantConfig::average_default(), 2).unwrap();
    let rows = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0], vec![1.0, 2.0]];
    let offsets = vec![0.0, 0.0, 0.0, 0.0];
    let is_my_cut = vec![true, true, true, true];

    let status = add_cuts(
      &mut store,
      &mut trust,
      false,
      false,
      Some(3),
      1e-6,
      rows,
      offsets,
      is_my_cut,
    )
    .unwrap();

    assert_eq!(store.n(), 3);
    assert_eq!(status.iter().filter(|s| s.is_some()).count(), 3);
    assert_eq!(status.iter().filter(|s| s.is_none()).count(), 1);
  }

  #[test]
  fn oversized_batch_with_existing_cuts_forces_full_eviction_without_panic() {
    let mut store = CutStore::new(2);
    let mut trust = TrustVariant::new(VariantConfig::average_default(), 2).unwrap();
    // Two incumbents fill everything but one slot of a capacity-3 pruner.
    store.append(&[vec![1.0, 0.0], vec![0.0, 1.0]], &[0.0, 0.0]);
    let ctx = CutContext {
      a: store.a(),
      b: store.b(),
      is_function: false,
      is_lower_bound: false,
    };
    trust.on_append(&[true, true], &ctx);

    // Five non-redundant candidates, more than the pruner could ever admit
    // even after evicting both incumbents.
    let rows = vec![
      vec![1.0, 1.0],
      vec![1.0, 2.0],
      vec![1.0, 3.0],
      vec![1.0, 4.0],
      vec![1.0, 5.0],
    ];
    let offsets = vec![0.0; 5];
    let is_my_cut = vec![true; 5];

    let status = add_cuts(
      &mut store,
      &mut trust,
      false,
      false,
      Some(3),
      1e-6,
      rows,
      offsets,
      is_my_cut,
    )
    .unwrap();

    assert_eq!(store.n(), 3);
    assert_eq!(status.iter().filter(|s| s.is_some()).count(), 3);
    assert_eq!(status.iter().filter(|s| s.is_none()).count(), 2);
  }
}
