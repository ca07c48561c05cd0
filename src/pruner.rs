use log::warn;

use crate::admission;
use crate::error::PrunerError;
use crate::sense::Sense;
use crate::store::CutStore;
use crate::trust::{TrustModel, TrustVariant, UpdateSignal, VariantConfig};

/// Bounded admission/eviction engine for affine half-space cuts (§1-§2).
///
/// Owns the cut coefficients, a trust-scoring policy, and the capacity
/// invariant that caps how many cuts are kept around at once. All mutating
/// operations go through [`Pruner::add_cuts`], [`Pruner::update_stats`],
/// [`Pruner::remove_cuts`] or [`Pruner::keep_only_cuts`]; none of them panic
/// on well-formed input, but if an internal invariant ever fails to hold the
/// pruner is poisoned (see [`Pruner::is_poisoned`]) and every later mutating
/// call short-circuits with [`PrunerError::InvariantViolation`] rather than
/// risk acting on inconsistent state.
pub struct Pruner {
  store: CutStore,
  trust: TrustVariant,
  sense: Sense,
  max_cuts: Option<usize>,
  tol: f64,
  poisoned: Option<String>,
}

impl Pruner {
  pub const DEFAULT_TOL: f64 = 1e-6;

  /// `max_cuts = None` is the unbounded sentinel (`-1` in the distilled
  /// spec's status vector convention); `Some(0)` is rejected as a
  /// configuration error since a pruner that can hold nothing is never
  /// useful and breaks the eviction-loop arithmetic in [`admission`].
  pub fn new(sense: Sense, d: usize, max_cuts: Option<usize>, variant: VariantConfig) -> Result<Pruner, PrunerError> {
    Self::with_tol(sense, d, max_cuts, variant, Self::DEFAULT_TOL)
  }

  pub fn with_tol(
    sense: Sense,
    d: usize,
    max_cuts: Option<usize>,
    variant: VariantConfig,
    tol: f64,
  ) -> Result<Pruner, PrunerError> {
    if d == 0 {
      return Err(PrunerError::Configuration("dimension d must be positive".into()));
    }
    if max_cuts == Some(0) {
      return Err(PrunerError::Configuration(
        "maxCuts must be positive or the unbounded sentinel".into(),
      ));
    }
    if !(tol.is_finite() && tol >= 0.0) {
      return Err(PrunerError::Configuration(format!("tol must be finite and non-negative, got {tol}")));
    }
    let trust = TrustVariant::new(variant, d)?;
    Ok(Pruner {
      store: CutStore::new(d),
      trust,
      sense,
      max_cuts,
      tol,
      poisoned: None,
    })
  }

  pub fn sense(&self) -> Sense {
    self.sense
  }

  pub fn d(&self) -> usize {
    self.store.d()
  }

  pub fn max_cuts(&self) -> Option<usize> {
    self.max_cuts
  }

  pub fn ncuts(&self) -> usize {
    self.store.n()
  }

  pub fn is_empty(&self) -> bool {
    self.store.n() == 0
  }

  pub fn trust(&self) -> &[f64] {
    self.trust.trust()
  }

  pub fn ids(&self) -> &[u64] {
    self.store.ids()
  }

  /// Coefficient matrix `A`, row `k` is the cut added/replaced at slot `k`.
  pub fn coefficients(&self) -> &crate::matrix::CutMatrix {
    self.store.a()
  }

  pub fn offsets(&self) -> &[f64] {
    self.store.b()
  }

  /// `Some(reason)` once an internal invariant has failed; every mutating
  /// method then returns [`PrunerError::InvariantViolation`] without
  /// touching state.
  pub fn is_poisoned(&self) -> Option<&str> {
    self.poisoned.as_deref()
  }

  fn check_poisoned(&self) -> Result<(), PrunerError> {
    match &self.poisoned {
      Some(reason) => Err(PrunerError::InvariantViolation(reason.clone())),
      None => Ok(()),
    }
  }

  fn poison(&mut self, reason: String) -> PrunerError {
    warn!("pruner invariant violated, poisoning: {reason}");
    self.poisoned = Some(reason.clone());
    PrunerError::InvariantViolation(reason)
  }

  /// I1: after any mutation, trust/ids/coefficient row counts must agree.
  fn check_consistency(&mut self) -> Result<(), PrunerError> {
    let n = self.store.n();
    if self.trust.trust().len() != n {
      return Err(self.poison(format!(
        "trust vector length {} disagrees with cut count {n}",
        self.trust.trust().len()
      )));
    }
    if let Some(m) = self.max_cuts {
      if n > m {
        return Err(self.poison(format!("cut count {n} exceeds maxCuts {m}")));
      }
    }
    Ok(())
  }

  fn validate_batch(&self, rows: &[Vec<f64>], offsets: &[f64], is_my_cut: &[bool]) -> Result<(), PrunerError> {
    if rows.len() != offsets.len() || rows.len() != is_my_cut.len() {
      return Err(PrunerError::Shape(format!(
        "batch size mismatch: {} rows, {} offsets, {} isMyCut flags",
        rows.len(),
        offsets.len(),
        is_my_cut.len()
      )));
    }
    for row in rows {
      if row.len() != self.d() {
        return Err(PrunerError::Shape(format!(
          "row has {} columns, expected d = {}",
          row.len(),
          self.d()
        )));
      }
    }
    Ok(())
  }

  /// §4.5 `addCuts`: filter redundant candidates, then admit as many of the
  /// survivors as capacity and relative trust allow, evicting weak
  /// incumbents as needed. Returns, per input row, the slot it landed in or
  /// `None` if it was rejected.
  pub fn add_cuts(
    &mut self,
    rows: Vec<Vec<f64>>,
    offsets: Vec<f64>,
    is_my_cut: Vec<bool>,
  ) -> Result<Vec<Option<usize>>, PrunerError> {
    self.check_poisoned()?;
    self.validate_batch(&rows, &offsets, &is_my_cut)?;
    let status = admission::add_cuts(
      &mut self.store,
      &mut self.trust,
      self.sense.is_function(),
      self.sense.is_lower_bound(),
      self.max_cuts,
      self.tol,
      rows,
      offsets,
      is_my_cut,
    )?;
    self.check_consistency()?;
    Ok(status)
  }

  /// §4.2/§4.6 `updateStats`: fold a usage signal (dual multipliers for
  /// Average/Decay, newly visited states for LevelOne) into the trust
  /// policy.
  pub fn update_stats(&mut self, signal: UpdateSignal) -> Result<(), PrunerError> {
    self.check_poisoned()?;
    match &signal {
      UpdateSignal::Multipliers(m) => {
        if m.len() != self.ncuts() {
          return Err(PrunerError::Shape(format!(
            "{} multipliers for {} cuts",
            m.len(),
            self.ncuts()
          )));
        }
      }
      UpdateSignal::States(states) => {
        for x in states {
          if x.len() != self.d() {
            return Err(PrunerError::Shape(format!("state has {} coordinates, expected d = {}", x.len(), self.d())));
          }
        }
      }
    }
    admission::update_stats(
      &mut self.trust,
      &self.store,
      self.sense.is_function(),
      self.sense.is_lower_bound(),
      signal,
    )?;
    self.check_consistency()?;
    Ok(())
  }

  /// Drop the cuts named by `remove` (order-independent), shrinking the
  /// store and rehoming LevelOne territory onto the survivors.
  pub fn remove_cuts(&mut self, remove: &[usize]) -> Result<(), PrunerError> {
    self.check_poisoned()?;
    for &ix in remove {
      if ix >= self.ncuts() {
        return Err(PrunerError::Shape(format!("index {ix} out of range for {} cuts", self.ncuts())));
      }
    }
    let remove_set: std::collections::HashSet<usize> = remove.iter().copied().collect();
    let keep: Vec<usize> = (0..self.ncuts()).filter(|i| !remove_set.contains(i)).collect();
    self.project_to(&keep)
  }

  /// Project the store down to exactly `keep` (in order; may reorder).
  pub fn keep_only_cuts(&mut self, keep: &[usize]) -> Result<(), PrunerError> {
    self.check_poisoned()?;
    for &ix in keep {
      if ix >= self.ncuts() {
        return Err(PrunerError::Shape(format!("index {ix} out of range for {} cuts", self.ncuts())));
      }
    }
    self.project_to(keep)
  }

  /// Test-only escape hatch onto the underlying trust policy, used by the
  /// LevelOne territory-invariant property tests in [`crate::tests`].
  #[cfg(test)]
  pub(crate) fn trust_variant(&self) -> &TrustVariant {
    &self.trust
  }

  fn project_to(&mut self, keep: &[usize]) -> Result<(), PrunerError> {
    self.store.keep_only(keep);
    let ctx = crate::trust::CutContext {
      a: self.store.a(),
      b: self.store.b(),
      is_function: self.sense.is_function(),
      is_lower_bound: self.sense.is_lower_bound(),
    };
    self.trust.on_keep_only(keep, &ctx);
    self.check_consistency()
  }
}
