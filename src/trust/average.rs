use super::{CutContext, TrustModel, UpdateSignal};
use crate::error::PrunerError;

const USAGE_EPSILON: f64 = 1e-6;

/// Average-usage trust: trust is the fraction of optimization steps in which
/// a cut's dual multiplier was non-negligible, plus a flat bonus for
/// my-cuts.
pub struct AverageTrust {
  new_cut_trust: f64,
  my_cut_bonus: f64,
  trust: Vec<f64>,
  is_my_cut: Vec<bool>,
  n_used: Vec<u64>,
  n_with: Vec<u64>,
}

impl AverageTrust {
  pub fn new(new_cut_trust: f64, my_cut_bonus: f64) -> AverageTrust {
    AverageTrust {
      new_cut_trust,
      my_cut_bonus,
      trust: Vec::new(),
      is_my_cut: Vec::new(),
      n_used: Vec::new(),
      n_with: Vec::new(),
    }
  }

  fn bonus(&self, i: usize) -> f64 {
    if self.is_my_cut[i] {
      self.my_cut_bonus
    } else {
      0.0
    }
  }
}

impl TrustModel for AverageTrust {
  fn initial_trust(&self, is_my_cut: bool) -> f64 {
    self.new_cut_trust + if is_my_cut { self.my_cut_bonus } else { 0.0 }
  }

  fn on_replace(&mut self, slots: &[usize], is_my_cut: &[bool], _ctx: &CutContext) {
    for (&slot, &my) in slots.iter().zip(is_my_cut.iter()) {
      self.trust[slot] = self.initial_trust(my);
      self.is_my_cut[slot] = my;
      self.n_used[slot] = 0;
      self.n_with[slot] = 0;
    }
  }

  fn on_append(&mut self, is_my_cut: &[bool], _ctx: &CutContext) {
    for &my in is_my_cut {
      self.trust.push(self.initial_trust(my));
      self.is_my_cut.push(my);
      self.n_used.push(0);
      self.n_with.push(0);
    }
  }

  fn on_keep_only(&mut self, keep: &[usize], _ctx: &CutContext) {
    self.trust = keep.iter().map(|&i| self.trust[i]).collect();
    self.is_my_cut = keep.iter().map(|&i| self.is_my_cut[i]).collect();
    self.n_used = keep.iter().map(|&i| self.n_used[i]).collect();
    self.n_with = keep.iter().map(|&i| self.n_with[i]).collect();
  }

  fn update_stats(&mut self, signal: &UpdateSignal, _ctx: &CutContext) -> Result<(), PrunerError> {
    let multipliers = match signal {
      UpdateSignal::Multipliers(m) => m,
      UpdateSignal::States(_) => {
        return Err(PrunerError::Shape(
          "Average trust expects dual multipliers, not states".into(),
        ))
      }
    };
    if multipliers.len() != self.trust.len() {
      return Err(PrunerError::Shape(format!(
        "updateStats signal has length {} but there are {} cuts",
        multipliers.len(),
        self.trust.len()
      )));
    }
    for (i, &sigma_rho) in multipliers.iter().enumerate() {
      self.n_with[i] += 1;
      if sigma_rho.abs() > USAGE_EPSILON {
        self.n_used[i] += 1;
      }
      let average = self.n_used[i] as f64 / self.n_with[i] as f64;
      self.trust[i] = average + self.bonus(i);
    }
    Ok(())
  }

  fn trust(&self) -> &[f64] {
    &self.trust
  }
}
