/// Which inequality a cut encodes and whether the pruner is approximating a
/// piecewise-linear function or a polyhedron.
///
/// The sense is fixed for the lifetime of a [`Pruner`](crate::Pruner) and is
/// encoded internally by two booleans, `is_function` and `is_lower_bound`,
/// matching the sense table of the distilled spec:
///
/// | sense | is_function | is_lower_bound | meaning                                    |
/// |-------|-------------|----------------|---------------------------------------------|
/// | Min   | true        | false          | concave function `min_i <a_i,x> + b_i`      |
/// | Max   | true        | true           | convex function `max_i <a_i,x> + b_i`       |
/// | Le    | false       | false          | polyhedron `<a_i,x> <= b_i`                 |
/// | Ge    | false       | true           | polyhedron `<a_i,x> >= b_i`                 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
  Min,
  Max,
  Le,
  Ge,
}

impl Sense {
  pub fn is_function(self) -> bool {
    matches!(self, Sense::Min | Sense::Max)
  }

  pub fn is_lower_bound(self) -> bool {
    matches!(self, Sense::Max | Sense::Ge)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn matches_sense_table() {
    assert_eq!((Sense::Min.is_function(), Sense::Min.is_lower_bound()), (true, false));
    assert_eq!((Sense::Max.is_function(), Sense::Max.is_lower_bound()), (true, true));
    assert_eq!((Sense::Le.is_function(), Sense::Le.is_lower_bound()), (false, false));
    assert_eq!((Sense::Ge.is_function(), Sense::Ge.is_lower_bound()), (false, true));
  }
}
