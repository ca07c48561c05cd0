use super::{CutContext, TrustModel, UpdateSignal};
use crate::error::PrunerError;

const USAGE_EPSILON: f64 = 1e-6;

/// Exponential-decay trust: `trust <- lambda * trust`, then `+= 1` wherever
/// the dual multiplier was non-negligible.
pub struct DecayTrust {
  lambda: f64,
  new_cut_trust: f64,
  my_cut_bonus: f64,
  trust: Vec<f64>,
  is_my_cut: Vec<bool>,
}

impl DecayTrust {
  pub fn new(lambda: f64, new_cut_trust: f64, my_cut_bonus: f64) -> DecayTrust {
    DecayTrust {
      lambda,
      new_cut_trust,
      my_cut_bonus,
      trust: Vec::new(),
      is_my_cut: Vec::new(),
    }
  }
}

impl TrustModel for DecayTrust {
  fn initial_trust(&self, is_my_cut: bool) -> f64 {
    self.new_cut_trust + if is_my_cut { self.my_cut_bonus } else { 0.0 }
  }

  fn on_replace(&mut self, slots: &[usize], is_my_cut: &[bool], _ctx: &CutContext) {
    for (&slot, &my) in slots.iter().zip(is_my_cut.iter()) {
      self.trust[slot] = self.initial_trust(my);
      self.is_my_cut[slot] = my;
    }
  }

  fn on_append(&mut self, is_my_cut: &[bool], _ctx: &CutContext) {
    for &my in is_my_cut {
      self.trust.push(self.initial_trust(my));
      self.is_my_cut.push(my);
    }
  }

  fn on_keep_only(&mut self, keep: &[usize], _ctx: &CutContext) {
    self.trust = keep.iter().map(|&i| self.trust[i]).collect();
    self.is_my_cut = keep.iter().map(|&i| self.is_my_cut[i]).collect();
  }

  fn update_stats(&mut self, signal: &UpdateSignal, _ctx: &CutContext) -> Result<(), PrunerError> {
    let multipliers = match signal {
      UpdateSignal::Multipliers(m) => m,
      UpdateSignal::States(_) => {
        return Err(PrunerError::Shape(
          "Decay trust expects dual multipliers, not states".into(),
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
      self.trust[i] *= self.lambda;
      if sigma_rho.abs() > USAGE_EPSILON {
        self.trust[i] += 1.0;
      }
    }
    Ok(())
  }

  fn trust(&self) -> &[f64] {
    &self.trust
  }
}
