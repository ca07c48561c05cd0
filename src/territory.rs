use crate::matrix::CutMatrix;
use crate::trust::CutContext;

/// Per-cut LevelOne territory: the set of sampled state points where a cut
/// is the pointwise-optimal supporting cut, and the cut's value there.
///
/// `territories[k]` partitions `0..states.nrows()` across all cuts (I4):
/// every state belongs to exactly one cut's territory, namely whichever cut
/// currently attains `argmax_j cut_value(j, state)` (ties broken by the
/// smallest cut index).
#[derive(Debug, Clone)]
pub struct TerritoryIndex {
  states: CutMatrix,
  territories: Vec<Vec<(usize, f64)>>,
}

impl TerritoryIndex {
  pub fn new(d: usize) -> TerritoryIndex {
    TerritoryIndex {
      states: CutMatrix::new(d),
      territories: Vec::new(),
    }
  }

  pub fn n_states(&self) -> usize {
    self.states.nrows()
  }

  pub fn territory(&self, k: usize) -> &[(usize, f64)] {
    &self.territories[k]
  }

  pub fn territory_size(&self, k: usize) -> usize {
    self.territories[k].len()
  }

  fn argmax(&self, ctx: &CutContext, x: &[f64], n_cuts: usize) -> (usize, f64) {
    let mut best_k = 0;
    let mut best_v = f64::NEG_INFINITY;
    for k in 0..n_cuts {
      let v = ctx.cut_value(k, x);
      if v > best_v {
        best_v = v;
        best_k = k;
      }
    }
    (best_k, best_v)
  }

  /// Append `nn` empty territories for newly appended cuts.
  pub fn on_append_cuts(&mut self, nn: usize) {
    self.territories.extend((0..nn).map(|_| Vec::new()));
  }

  /// Clear the territories of `slots`, returning their former contents as a
  /// single orphan list ready for [`Self::give_territory`].
  pub fn clear_slots(&mut self, slots: &[usize]) -> Vec<(usize, f64)> {
    let mut orphans = Vec::new();
    for &slot in slots {
      orphans.extend(std::mem::take(&mut self.territories[slot]));
    }
    orphans
  }

  /// §4.6 `updateTerritoryForNewCut`: steal every state from every other
  /// cut's territory for which `k` now scores strictly higher.
  pub fn update_territory_for_new_cut(&mut self, k: usize, ctx: &CutContext, n_cuts: usize) {
    for j in 0..n_cuts {
      if j == k {
        continue;
      }
      let mut kept = Vec::new();
      for (ix, v) in self.territories[j].drain(..) {
        let candidate = ctx.cut_value(k, self.states.row(ix));
        if candidate > v {
          self.territories[k].push((ix, candidate));
        } else {
          kept.push((ix, v));
        }
      }
      self.territories[j] = kept;
    }
  }

  /// §4.6 `giveTerritory`: find the argmax cut for state `ix` among all
  /// `n_cuts` current cuts and assign it there (first-match wins on ties).
  pub fn give_territory(&mut self, ix: usize, ctx: &CutContext, n_cuts: usize) {
    let x: Vec<f64> = self.states.row(ix).to_vec();
    let (winner, value) = self.argmax(ctx, &x, n_cuts);
    self.territories[winner].push((ix, value));
  }

  /// §4.6 `addState`: append `x` to `states`, assign it to the current
  /// argmax cut.
  pub fn add_state(&mut self, x: Vec<f64>, ctx: &CutContext, n_cuts: usize) {
    let ix = self.states.nrows();
    self.states.append_rows(std::slice::from_ref(&x));
    let (winner, value) = self.argmax(ctx, &x, n_cuts);
    self.territories[winner].push((ix, value));
  }

  /// Project territories down to the surviving cuts named by `keep` (same
  /// order), dropping their contents, then rehome every dropped cut's
  /// territory via [`Self::give_territory`] against the new cut set.
  pub fn on_keep_only(&mut self, keep: &[usize], ctx: &CutContext) {
    let removed: Vec<usize> = (0..self.territories.len())
      .filter(|i| !keep.contains(i))
      .collect();
    let mut orphans = Vec::new();
    for &r in &removed {
      orphans.extend(std::mem::take(&mut self.territories[r]));
    }
    self.territories = keep.iter().map(|&i| self.territories[i].clone()).collect();
    let n_cuts = self.territories.len();
    for (ix, _) in orphans {
      self.give_territory(ix, ctx, n_cuts);
    }
  }

  pub fn sizes(&self) -> Vec<f64> {
    self.territories.iter().map(|t| t.len() as f64).collect()
  }

  #[cfg(test)]
  pub fn invariant_holds(&self, ctx: &CutContext) -> bool {
    let n_cuts = self.territories.len();
    let mut seen = vec![false; self.states.nrows()];
    for (k, territory) in self.territories.iter().enumerate() {
      for &(ix, v) in territory {
        if seen[ix] {
          return false;
        }
        seen[ix] = true;
        let expected = ctx.cut_value(k, self.states.row(ix));
        if (expected - v).abs() > 1e-9 {
          return false;
        }
        let (argmax_k, _) = self.argmax(ctx, self.states.row(ix), n_cuts);
        if argmax_k != k {
          return false;
        }
      }
    }
    seen.into_iter().all(|s| s)
  }
}
