//! Reversible finite-domain representations.
//!
//! [`IntDomain`] is a trailed sparse set: removal is O(1) via swap-to-end,
//! membership is O(1) via an inverse index, and bounds are cached and
//! updated lazily. [`BoolDomain`] is the `{0, 1}` specialization used by
//! boolean CP variables.

pub mod view;

use crate::trail::{Trail, Trailed};

/// A reversible sparse-set domain over a contiguous integer range
/// `[offset, offset + values.len())`.
///
/// Representation invariant: the first `size` entries of `values` are the
/// live members; `indexes[v - offset]` is the position of value `v` in
/// `values`; `min`/`max` are the current extrema. Removal swaps the victim
/// with the last live entry and decrements `size`.
#[derive(Debug, Clone)]
pub struct IntDomain {
    values: Vec<i32>,
    indexes: Vec<i32>,
    offset: i32,
    size: Trailed<i32>,
    min: Trailed<i32>,
    max: Trailed<i32>,
}

impl IntDomain {
    /// Creates a domain containing every integer in `[lo, hi]` inclusive.
    pub fn new(trail: &mut Trail, lo: i32, hi: i32) -> Self {
        assert!(lo <= hi, "empty initial domain");
        let n = (hi - lo + 1) as usize;
        let values: Vec<i32> = (0..n as i32).collect();
        let indexes: Vec<i32> = (0..n as i32).collect();
        Self {
            values,
            indexes,
            offset: lo,
            size: Trailed::new(trail, n as i32),
            min: Trailed::new(trail, lo),
            max: Trailed::new(trail, hi),
        }
    }

    pub fn size(&self, trail: &Trail) -> i32 {
        self.size.get(trail)
    }

    pub fn is_empty(&self, trail: &Trail) -> bool {
        self.size(trail) == 0
    }

    pub fn min(&self, trail: &Trail) -> i32 {
        self.min.get(trail)
    }

    pub fn max(&self, trail: &Trail) -> i32 {
        self.max.get(trail)
    }

    pub fn is_bound(&self, trail: &Trail) -> bool {
        self.size(trail) == 1
    }

    pub fn bound_value(&self, trail: &Trail) -> Option<i32> {
        self.is_bound(trail).then(|| self.min(trail))
    }

    fn pos(&self, v: i32) -> Option<usize> {
        let local = v - self.offset;
        if local < 0 || local as usize >= self.indexes.len() {
            None
        } else {
            Some(local as usize)
        }
    }

    pub fn contains(&self, trail: &Trail, v: i32) -> bool {
        match self.pos(v) {
            Some(p) => (self.indexes[p] as usize) < self.size(trail) as usize,
            None => false,
        }
    }

    /// Removes `v` from the domain. Returns `true` if `v` was present.
    pub fn remove(&mut self, trail: &mut Trail, v: i32) -> bool {
        if !self.contains(trail, v) {
            return false;
        }
        let size = self.size(trail);
        let p = self.indexes[(v - self.offset) as usize] as usize;
        let last = (size - 1) as usize;
        self.swap(p, last);
        self.size.set(trail, size - 1);

        if self.size(trail) > 0 {
            if v == self.min(trail) {
                let max = self.max(trail);
                let mut x = v + 1;
                while x <= max && !self.contains(trail, x) {
                    x += 1;
                }
                self.min.set(trail, x);
            }
            if v == self.max(trail) {
                let min = self.min(trail);
                let mut x = v - 1;
                while x >= min && !self.contains(trail, x) {
                    x -= 1;
                }
                self.max.set(trail, x);
            }
        }
        true
    }

    /// Removes every value except `v`. No-op (and returns `true`) if the
    /// domain is already `{v}`. Returns `false` if `v ∉ D`.
    pub fn assign(&mut self, trail: &mut Trail, v: i32) -> bool {
        if !self.contains(trail, v) {
            return false;
        }
        let p = self.indexes[(v - self.offset) as usize] as usize;
        self.swap(p, 0);
        self.size.set(trail, 1);
        self.min.set(trail, v);
        self.max.set(trail, v);
        true
    }

    /// Removes every value not in `keep`. Returns `false` if the domain
    /// becomes empty.
    pub fn remove_all_but(&mut self, trail: &mut Trail, keep: &[i32]) -> bool {
        let current: Vec<i32> = self.iter(trail).collect();
        for v in current {
            if !keep.contains(&v) {
                self.remove(trail, v);
            }
        }
        !self.is_empty(trail)
    }

    /// Removes every value strictly below `k`. `k` itself is kept.
    pub fn remove_below(&mut self, trail: &mut Trail, k: i32) -> bool {
        let current: Vec<i32> = self.iter(trail).filter(|&v| v < k).collect();
        for v in current {
            self.remove(trail, v);
        }
        !self.is_empty(trail)
    }

    /// Removes every value strictly above `k`. `k` itself is kept.
    pub fn remove_above(&mut self, trail: &mut Trail, k: i32) -> bool {
        let current: Vec<i32> = self.iter(trail).filter(|&v| v > k).collect();
        for v in current {
            self.remove(trail, v);
        }
        !self.is_empty(trail)
    }

    /// Removes every value strictly between `lo` and `hi`. `lo` and `hi`
    /// themselves are NOT removed.
    pub fn remove_between(&mut self, trail: &mut Trail, lo: i32, hi: i32) -> bool {
        let current: Vec<i32> = self.iter(trail).filter(|&v| v > lo && v < hi).collect();
        for v in current {
            self.remove(trail, v);
        }
        !self.is_empty(trail)
    }

    /// Iterates live members in unspecified order. Callers MUST NOT mutate
    /// the domain while iterating (the iterator snapshots nothing).
    pub fn iter<'a>(&'a self, trail: &'a Trail) -> impl Iterator<Item = i32> + 'a {
        let size = self.size(trail) as usize;
        self.values[..size].iter().map(move |&i| i + self.offset)
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let va = self.values[a];
        let vb = self.values[b];
        self.values.swap(a, b);
        self.indexes[va as usize] = b as i32;
        self.indexes[vb as usize] = a as i32;
    }

}

/// A reversible boolean domain: an [`IntDomain`] over `{0, 1}`.
#[derive(Debug, Clone)]
pub struct BoolDomain {
    inner: IntDomain,
}

impl BoolDomain {
    pub fn new(trail: &mut Trail) -> Self {
        Self {
            inner: IntDomain::new(trail, 0, 1),
        }
    }

    pub fn fixed(trail: &mut Trail, value: bool) -> Self {
        let mut d = Self::new(trail);
        d.inner.assign(trail, value as i32);
        d
    }

    pub fn is_bound(&self, trail: &Trail) -> bool {
        self.inner.is_bound(trail)
    }

    pub fn bound_value(&self, trail: &Trail) -> Option<bool> {
        self.inner.bound_value(trail).map(|v| v != 0)
    }

    pub fn contains(&self, trail: &Trail, v: bool) -> bool {
        self.inner.contains(trail, v as i32)
    }

    pub fn fix(&mut self, trail: &mut Trail, v: bool) -> bool {
        self.inner.assign(trail, v as i32)
    }

    pub fn remove(&mut self, trail: &mut Trail, v: bool) -> bool {
        self.inner.remove(trail, v as i32)
    }

    pub fn as_int_domain(&self) -> &IntDomain {
        &self.inner
    }

    pub fn as_int_domain_mut(&mut self) -> &mut IntDomain {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn contains_remove_contract() {
        let mut trail = Trail::new();
        let mut d = IntDomain::new(&mut trail, 0, 4);
        trail.checkpoint();

        assert!(d.contains(&trail, 2));
        assert!(d.remove(&mut trail, 2));
        assert!(!d.contains(&trail, 2));
        assert_eq!(d.size(&trail), 4);

        // removing again is a no-op, returns false
        assert!(!d.remove(&mut trail, 2));
        assert_eq!(d.size(&trail), 4);
    }

    #[test]
    fn remove_updates_bounds() {
        let mut trail = Trail::new();
        let mut d = IntDomain::new(&mut trail, 0, 4);
        trail.checkpoint();
        assert_eq!((d.min(&trail), d.max(&trail)), (0, 4));
        d.remove(&mut trail, 4);
        assert_eq!(d.max(&trail), 3);
        d.remove(&mut trail, 0);
        assert_eq!(d.min(&trail), 1);
    }

    #[test]
    fn assign_leaves_singleton() {
        let mut trail = Trail::new();
        let mut d = IntDomain::new(&mut trail, 0, 4);
        trail.checkpoint();
        assert!(d.assign(&mut trail, 2));
        assert_eq!(d.size(&trail), 1);
        assert!(d.contains(&trail, 2));
        assert!(!d.contains(&trail, 0));

        assert!(!d.assign(&mut trail, 3));
    }

    #[test]
    fn remove_between_is_strictly_exclusive() {
        let mut trail = Trail::new();
        let mut d = IntDomain::new(&mut trail, 0, 10);
        trail.checkpoint();
        d.remove_between(&mut trail, 2, 6);
        for v in [2, 6] {
            assert!(d.contains(&trail, v), "{v} should survive");
        }
        for v in 3..6 {
            assert!(!d.contains(&trail, v), "{v} should be removed");
        }
    }

    #[test]
    fn reversible_across_restore() {
        let mut trail = Trail::new();
        let mut d = IntDomain::new(&mut trail, 0, 4);

        trail.checkpoint();
        d.remove(&mut trail, 1);
        d.remove(&mut trail, 3);
        assert_eq!(d.size(&trail), 2);

        trail.restore();
        assert_eq!(d.size(&trail), 5);
        for v in 0..=4 {
            assert!(d.contains(&trail, v));
        }
    }

    #[rstest]
    #[case(vec![0, 1, 2, 3, 4], vec![])]
    #[case(vec![0, 1, 2, 3, 4], vec![2])]
    #[case(vec![0, 1, 2, 3, 4], vec![0, 4])]
    #[case(vec![0, 1, 2, 3, 4], vec![0, 1, 2, 3, 4])]
    fn sparse_set_consistency_after_removals(#[case] universe: Vec<i32>, #[case] to_remove: Vec<i32>) {
        let lo = *universe.iter().min().unwrap();
        let hi = *universe.iter().max().unwrap();
        let mut trail = Trail::new();
        let mut d = IntDomain::new(&mut trail, lo, hi);
        trail.checkpoint();
        for v in &to_remove {
            d.remove(&mut trail, *v);
        }
        let size = d.size(&trail) as usize;
        for p in 0..size {
            let v = d.values[p] + d.offset;
            assert_eq!(d.indexes[(v - d.offset) as usize] as usize, p);
        }
        for v in universe {
            if d.contains(&trail, v) {
                let p = d.indexes[(v - d.offset) as usize] as usize;
                assert_eq!(d.values[p] + d.offset, v);
            }
        }
    }

    #[test]
    fn bool_domain_fix_and_remove() {
        let mut trail = Trail::new();
        let mut b = BoolDomain::new(&mut trail);
        trail.checkpoint();
        assert!(b.contains(&trail, true));
        assert!(b.contains(&trail, false));
        b.remove(&mut trail, false);
        assert!(b.is_bound(&trail));
        assert_eq!(b.bound_value(&trail), Some(true));
    }
}
