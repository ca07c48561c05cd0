use crate::matrix::CutMatrix;

/// Owns the cut matrix `A`, the offsets `b`, and the per-cut monotonic ids.
/// Sense (`is_function`/`is_lower_bound`) is fixed for the store's lifetime
/// and lives on the owning [`Pruner`](crate::Pruner), not here.
///
/// `CutStore` never looks at trust: replacement and appends are mirrored
/// into the trust vector by the caller (the admission engine), since trust
/// bookkeeping is variant-specific (see [`crate::trust`]).
#[derive(Debug, Clone)]
pub struct CutStore {
  a: CutMatrix,
  b: Vec<f64>,
  ids: Vec<u64>,
  id_cursor: u64,
}

impl CutStore {
  pub fn new(d: usize) -> CutStore {
    CutStore {
      a: CutMatrix::new(d),
      b: Vec::new(),
      ids: Vec::new(),
      id_cursor: 0,
    }
  }

  pub fn n(&self) -> usize {
    self.a.nrows()
  }

  pub fn d(&self) -> usize {
    self.a.ncols()
  }

  pub fn a(&self) -> &CutMatrix {
    &self.a
  }

  pub fn b(&self) -> &[f64] {
    &self.b
  }

  pub fn ids(&self) -> &[u64] {
    &self.ids
  }

  pub fn id_cursor(&self) -> u64 {
    self.id_cursor
  }

  fn fresh_ids(&mut self, count: usize) -> Vec<u64> {
    let start = self.id_cursor + 1;
    self.id_cursor += count as u64;
    (0..count as u64).map(|i| start + i).collect()
  }

  /// Extend the store by `rows.len()` cuts, assigning each a fresh
  /// monotonically increasing id. Returns the ids assigned, in order.
  pub fn append(&mut self, rows: &[Vec<f64>], offsets: &[f64]) -> Vec<u64> {
    debug_assert_eq!(rows.len(), offsets.len());
    let ids = self.fresh_ids(rows.len());
    self.a.append_rows(rows);
    self.b.extend_from_slice(offsets);
    self.ids.extend_from_slice(&ids);
    ids
  }

  /// Overwrite the rows named by `slots` with `rows`/`offsets`, assigning
  /// fresh ids so the replaced slots become the youngest cuts. Returns the
  /// ids assigned, in the order of `slots`.
  pub fn replace_at(&mut self, slots: &[usize], rows: &[Vec<f64>], offsets: &[f64]) -> Vec<u64> {
    debug_assert_eq!(slots.len(), rows.len());
    debug_assert_eq!(slots.len(), offsets.len());
    let ids = self.fresh_ids(slots.len());
    self.a.replace_rows(slots, rows);
    for (&slot, &offset) in slots.iter().zip(offsets.iter()) {
      self.b[slot] = offset;
    }
    for (&slot, &id) in slots.iter().zip(ids.iter()) {
      self.ids[slot] = id;
    }
    ids
  }

  /// Project `A`, `b`, and `ids` down to the sequence of indices `keep`,
  /// preserving its order (which may reorder or repeat cuts).
  pub fn keep_only(&mut self, keep: &[usize]) {
    self.a.keep_only(keep);
    self.b = keep.iter().map(|&i| self.b[i]).collect();
    self.ids = keep.iter().map(|&i| self.ids[i]).collect();
  }

  pub fn remove_at(&mut self, remove: &[usize]) {
    let remove: std::collections::HashSet<usize> = remove.iter().copied().collect();
    let keep: Vec<usize> = (0..self.n()).filter(|i| !remove.contains(i)).collect();
    self.keep_only(&keep);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn append_assigns_fresh_ids() {
    let mut store = CutStore::new(1);
    let ids = store.append(&[vec![1.0], vec![2.0]], &[0.0, 0.0]);
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(store.n(), 2);
    assert_eq!(store.ids(), &[1, 2]);
  }

  #[test]
  fn replace_at_assigns_youngest_ids() {
    let mut store = CutStore::new(1);
    store.append(&[vec![1.0], vec![2.0], vec![3.0]], &[0.0, 0.0, 0.0]);
    let new_ids = store.replace_at(&[1], &[vec![9.0]], &[5.0]);
    assert_eq!(new_ids, vec![4]);
    assert_eq!(store.ids(), &[1, 4, 3]);
    assert_eq!(store.b(), &[0.0, 5.0, 0.0]);
    assert_eq!(store.a().row(1), &[9.0]);
  }

  #[test]
  fn keep_only_reorders() {
    let mut store = CutStore::new(1);
    store.append(&[vec![1.0], vec![2.0], vec![3.0]], &[0.0, 0.0, 0.0]);
    store.keep_only(&[2, 0]);
    assert_eq!(store.n(), 2);
    assert_eq!(store.ids(), &[3, 1]);
    assert_eq!(store.a().row(0), &[3.0]);
  }
}
