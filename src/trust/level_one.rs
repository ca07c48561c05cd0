use super::{CutContext, TrustModel, UpdateSignal};
use crate::error::PrunerError;
use crate::territory::TerritoryIndex;

/// LevelOne trust: no scalar counters, `trust[i] = |territories[i]|`. Backed
/// by a [`TerritoryIndex`] tracking which sampled state points each cut
/// currently dominates.
pub struct LevelOneTrust {
  territory: TerritoryIndex,
  trust: Vec<f64>,
}

impl LevelOneTrust {
  pub fn new(d: usize) -> LevelOneTrust {
    LevelOneTrust {
      territory: TerritoryIndex::new(d),
      trust: Vec::new(),
    }
  }

  pub(crate) fn territory(&self) -> &TerritoryIndex {
    &self.territory
  }

  fn refresh_trust(&mut self) {
    self.trust = self.territory.sizes();
  }
}

impl TrustModel for LevelOneTrust {
  /// LevelOne carries no my-cut bonus: a cut's worth is entirely a function
  /// of territory it has earned, and a brand new cut starts with none.
  fn initial_trust(&self, _is_my_cut: bool) -> f64 {
    0.0
  }

  fn on_replace(&mut self, slots: &[usize], _is_my_cut: &[bool], ctx: &CutContext) {
    let n_cuts = self.trust.len();
    let orphans = self.territory.clear_slots(slots);
    for &slot in slots {
      self.territory.update_territory_for_new_cut(slot, ctx, n_cuts);
    }
    for (ix, _) in orphans {
      self.territory.give_territory(ix, ctx, n_cuts);
    }
    self.refresh_trust();
  }

  fn on_append(&mut self, is_my_cut: &[bool], ctx: &CutContext) {
    let nn = is_my_cut.len();
    self.territory.on_append_cuts(nn);
    let n_cuts = self.trust.len() + nn;
    let first_new = n_cuts - nn;
    for k in first_new..n_cuts {
      self.territory.update_territory_for_new_cut(k, ctx, n_cuts);
    }
    self.refresh_trust();
  }

  fn on_keep_only(&mut self, keep: &[usize], ctx: &CutContext) {
    self.territory.on_keep_only(keep, ctx);
    self.refresh_trust();
  }

  fn update_stats(&mut self, signal: &UpdateSignal, ctx: &CutContext) -> Result<(), PrunerError> {
    let states = match signal {
      UpdateSignal::States(s) => s,
      UpdateSignal::Multipliers(_) => {
        return Err(PrunerError::Shape(
          "LevelOne trust expects newly visited states, not multipliers".into(),
        ))
      }
    };
    let n_cuts = self.trust.len();
    if n_cuts == 0 && !states.is_empty() {
      return Err(PrunerError::Shape(
        "cannot add states to a LevelOne pruner with no cuts".into(),
      ));
    }
    for x in states {
      self.territory.add_state(x.clone(), ctx, n_cuts);
    }
    self.refresh_trust();
    Ok(())
  }

  fn trust(&self) -> &[f64] {
    &self.trust
  }
}
