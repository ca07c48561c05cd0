//! Trust scoring policies.
//!
//! A [`TrustVariant`] is a tagged sum type over the three concrete policies
//! (§9 of the design notes: "a tagged variant ... suits a target systems
//! language better than runtime inheritance"), matched inside trait-method
//! bodies rather than dispatched through `Box<dyn Trait>` — the variant is
//! fixed for the lifetime of a pruner, so there's no need to pay for heap
//! allocation and dynamic dispatch just to pick between three known shapes.

mod average;
mod decay;
mod level_one;

pub use average::AverageTrust;
pub use decay::DecayTrust;
pub use level_one::LevelOneTrust;

use crate::error::PrunerError;
use crate::matrix::CutMatrix;

/// Signal fed to [`TrustModel::update_stats`]. Average and Decay expect dual
/// multipliers aligned with the current cuts; LevelOne expects newly visited
/// state points (each a row of length `d`) to fold into its territory index.
pub enum UpdateSignal {
  Multipliers(Vec<f64>),
  States(Vec<Vec<f64>>),
}

/// Read-only view of the cut data a trust update or territory refresh needs:
/// the coefficient matrix, offsets, and sense flags. Borrowed from the
/// owning [`Pruner`](crate::Pruner) for the duration of one call.
pub struct CutContext<'a> {
  pub a: &'a CutMatrix,
  pub b: &'a [f64],
  pub is_function: bool,
  pub is_lower_bound: bool,
}

impl<'a> CutContext<'a> {
  /// The LevelOne cut-value function (§4.6): `<a_k,x> + b_k` for function
  /// cuts, `(b_k - <a_k,x>) / ||a_k||` for polyhedron cuts, negated when the
  /// sense isn't a lower bound so a larger value always means "more
  /// supportive".
  pub fn cut_value(&self, k: usize, x: &[f64]) -> f64 {
    let raw = if self.is_function {
      self.a.dot_row(k, x) + self.b[k]
    } else {
      let norm = self.a.row(k).iter().map(|v| v * v).sum::<f64>().sqrt();
      (self.b[k] - self.a.dot_row(k, x)) / norm
    };
    if self.is_lower_bound {
      raw
    } else {
      -raw
    }
  }
}

/// Common contract shared by the three concrete trust policies.
pub trait TrustModel {
  fn initial_trust(&self, is_my_cut: bool) -> f64;

  /// Reset the trust of the replaced `slots` to each's initial trust (or,
  /// for LevelOne, rehome territory — see [`LevelOneTrust`]).
  fn on_replace(&mut self, slots: &[usize], is_my_cut: &[bool], ctx: &CutContext);

  /// Append trust entries for `is_my_cut.len()` newly appended cuts, whose
  /// slots are the last `is_my_cut.len()` indices of the store.
  fn on_append(&mut self, is_my_cut: &[bool], ctx: &CutContext);

  /// Permute/shrink the trust vector (and any parallel per-cut state) to
  /// match a `keep_only` projection on the store. `ctx` reflects the store
  /// *after* the projection, so LevelOne can rehome any territory orphaned
  /// by a removed cut.
  fn on_keep_only(&mut self, keep: &[usize], ctx: &CutContext);

  fn update_stats(&mut self, signal: &UpdateSignal, ctx: &CutContext) -> Result<(), PrunerError>;

  /// Is the incumbent cut `i` better than a hypothetical new cut that would
  /// be `hypothetical_my_cut`? Defaults to `trust[i] > initial_trust(hypothetical_my_cut)`,
  /// which both Average and Decay use verbatim.
  fn is_better(&self, i: usize, hypothetical_my_cut: bool) -> bool {
    self.trust()[i] > self.initial_trust(hypothetical_my_cut)
  }

  fn trust(&self) -> &[f64];
}

/// Construction-time parameters for a trust policy, validated eagerly by
/// [`Pruner::new`](crate::Pruner::new) into a `ConfigurationError` rather
/// than deferred to first use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariantConfig {
  Average { new_cut_trust: f64, my_cut_bonus: f64 },
  Decay { lambda: f64, new_cut_trust: f64, my_cut_bonus: f64 },
  LevelOne,
}

impl VariantConfig {
  pub fn average_default() -> VariantConfig {
    VariantConfig::Average {
      new_cut_trust: 0.5,
      my_cut_bonus: 0.0,
    }
  }

  pub fn decay_default() -> VariantConfig {
    VariantConfig::Decay {
      lambda: 0.9,
      new_cut_trust: 0.5,
      my_cut_bonus: 0.0,
    }
  }

  fn validate(&self) -> Result<(), PrunerError> {
    match *self {
      VariantConfig::Average { new_cut_trust, my_cut_bonus } => {
        validate_finite("newCutTrust", new_cut_trust)?;
        validate_finite("myCutBonus", my_cut_bonus)
      }
      VariantConfig::Decay { lambda, new_cut_trust, my_cut_bonus } => {
        validate_finite("lambda", lambda)?;
        if !(lambda > 0.0 && lambda < 1.0) {
          return Err(PrunerError::Configuration(format!(
            "lambda must be in (0, 1), got {lambda}"
          )));
        }
        validate_finite("newCutTrust", new_cut_trust)?;
        validate_finite("myCutBonus", my_cut_bonus)
      }
      VariantConfig::LevelOne => Ok(()),
    }
  }
}

fn validate_finite(name: &str, value: f64) -> Result<(), PrunerError> {
  if value.is_finite() {
    Ok(())
  } else {
    Err(PrunerError::Configuration(format!("{name} must be finite, got {value}")))
  }
}

/// Tagged sum type over the three concrete trust policies.
pub enum TrustVariant {
  Average(AverageTrust),
  Decay(DecayTrust),
  LevelOne(LevelOneTrust),
}

impl TrustVariant {
  pub fn new(config: VariantConfig, d: usize) -> Result<TrustVariant, PrunerError> {
    config.validate()?;
    Ok(match config {
      VariantConfig::Average { new_cut_trust, my_cut_bonus } => {
        TrustVariant::Average(AverageTrust::new(new_cut_trust, my_cut_bonus))
      }
      VariantConfig::Decay { lambda, new_cut_trust, my_cut_bonus } => {
        TrustVariant::Decay(DecayTrust::new(lambda, new_cut_trust, my_cut_bonus))
      }
      VariantConfig::LevelOne => TrustVariant::LevelOne(LevelOneTrust::new(d)),
    })
  }

  pub fn as_level_one(&self) -> Option<&LevelOneTrust> {
    match self {
      TrustVariant::LevelOne(lo) => Some(lo),
      _ => None,
    }
  }
}

impl TrustModel for TrustVariant {
  fn initial_trust(&self, is_my_cut: bool) -> f64 {
    match self {
      TrustVariant::Average(v) => v.initial_trust(is_my_cut),
      TrustVariant::Decay(v) => v.initial_trust(is_my_cut),
      TrustVariant::LevelOne(v) => v.initial_trust(is_my_cut),
    }
  }

  fn on_replace(&mut self, slots: &[usize], is_my_cut: &[bool], ctx: &CutContext) {
    match self {
      TrustVariant::Average(v) => v.on_replace(slots, is_my_cut, ctx),
      TrustVariant::Decay(v) => v.on_replace(slots, is_my_cut, ctx),
      TrustVariant::LevelOne(v) => v.on_replace(slots, is_my_cut, ctx),
    }
  }

  fn on_append(&mut self, is_my_cut: &[bool], ctx: &CutContext) {
    match self {
      TrustVariant::Average(v) => v.on_append(is_my_cut, ctx),
      TrustVariant::Decay(v) => v.on_append(is_my_cut, ctx),
      TrustVariant::LevelOne(v) => v.on_append(is_my_cut, ctx),
    }
  }

  fn on_keep_only(&mut self, keep: &[usize], ctx: &CutContext) {
    match self {
      TrustVariant::Average(v) => v.on_keep_only(keep, ctx),
      TrustVariant::Decay(v) => v.on_keep_only(keep, ctx),
      TrustVariant::LevelOne(v) => v.on_keep_only(keep, ctx),
    }
  }

  fn update_stats(&mut self, signal: &UpdateSignal, ctx: &CutContext) -> Result<(), PrunerError> {
    match self {
      TrustVariant::Average(v) => v.update_stats(signal, ctx),
      TrustVariant::Decay(v) => v.update_stats(signal, ctx),
      TrustVariant::LevelOne(v) => v.update_stats(signal, ctx),
    }
  }

  fn is_better(&self, i: usize, hypothetical_my_cut: bool) -> bool {
    match self {
      TrustVariant::Average(v) => v.is_better(i, hypothetical_my_cut),
      TrustVariant::Decay(v) => v.is_better(i, hypothetical_my_cut),
      TrustVariant::LevelOne(v) => v.is_better(i, hypothetical_my_cut),
    }
  }

  fn trust(&self) -> &[f64] {
    match self {
      TrustVariant::Average(v) => v.trust(),
      TrustVariant::Decay(v) => v.trust(),
      TrustVariant::LevelOne(v) => v.trust(),
    }
  }
}
