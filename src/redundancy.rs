use crate::matrix::CutMatrix;

/// Normalize an incoming candidate row for the redundancy check (§4.4 step
/// 1): function cuts, and any polyhedron cut whose coefficient vector is
/// near-zero, are left as-is; otherwise the row is scaled to unit L2 norm.
fn normalize(a: &[f64], b: f64, is_function: bool, tol: f64) -> (Vec<f64>, f64) {
  let norm = a.iter().map(|v| v * v).sum::<f64>().sqrt();
  if is_function || norm < tol {
    (a.to_vec(), b)
  } else {
    (a.iter().map(|v| v / norm).collect(), b / norm)
  }
}

fn close_linf(a: &[f64], b: &[f64], tol: f64) -> bool {
  a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tol)
}

/// §4.4: for each incoming candidate row, scan the existing cuts for one
/// whose normalized coefficients match within `tol` under `||.||_inf`, and
/// mark the candidate redundant when its offset doesn't strictly improve on
/// that match. Returns the set of redundant candidate indices.
pub fn find_redundant(
  existing_a: &CutMatrix,
  existing_b: &[f64],
  candidate_a: &[Vec<f64>],
  candidate_b: &[f64],
  is_function: bool,
  is_lower_bound: bool,
  tol: f64,
) -> Vec<bool> {
  let normalized_existing: Vec<(Vec<f64>, f64)> = (0..existing_a.nrows())
    .map(|i| normalize(existing_a.row(i), existing_b[i], is_function, tol))
    .collect();

  candidate_a
    .iter()
    .zip(candidate_b.iter())
    .map(|(a, &b)| {
      let (norm_a, norm_b) = normalize(a, b, is_function, tol);
      normalized_existing.iter().any(|(existing_a, existing_b)| {
        if !close_linf(&norm_a, existing_a, tol) {
          return false;
        }
        if is_lower_bound {
          norm_b <= existing_b + tol
        } else {
          norm_b + tol >= *existing_b
        }
      })
    })
    .collect()
}
