use im::OrdSet;

/// The set of integer values a variable may still take.
///
/// Domains are persistent: every operation returns a new `Domain` and leaves
/// the receiver untouched, so a search state can be snapshotted with a cheap
/// clone and restored by simply dropping the newer version. Values are kept
/// in an ordered set, which makes the bounds accessors used by arithmetic
/// constraints O(log n).
///
/// Domains are materialised eagerly; [`Domain::range`] is intended for the
/// modest value ranges typical of finite-domain models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain(OrdSet<i64>);

impl Domain {
    pub fn new(values: OrdSet<i64>) -> Self {
        Self(values)
    }

    pub fn empty() -> Self {
        Self(OrdSet::new())
    }

    pub fn singleton(value: i64) -> Self {
        Self(OrdSet::unit(value))
    }

    /// All values from `lower` to `upper` inclusive. Empty when `lower > upper`.
    pub fn range(lower: i64, upper: i64) -> Self {
        Self((lower..=upper).collect())
    }

    pub fn from_values(values: impl IntoIterator<Item = i64>) -> Self {
        Self(values.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` iff exactly one value remains.
    pub fn is_fixed(&self) -> bool {
        self.0.len() == 1
    }

    /// The single remaining value, when fixed.
    pub fn value(&self) -> Option<i64> {
        if self.is_fixed() {
            self.0.get_min().copied()
        } else {
            None
        }
    }

    pub fn min(&self) -> Option<i64> {
        self.0.get_min().copied()
    }

    pub fn max(&self) -> Option<i64> {
        self.0.get_max().copied()
    }

    pub fn contains(&self, value: i64) -> bool {
        self.0.contains(&value)
    }

    /// Values in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    /// A new domain holding only the values that satisfy `keep`.
    pub fn retain(&self, keep: impl Fn(i64) -> bool) -> Self {
        Self(self.0.iter().copied().filter(|v| keep(*v)).collect())
    }

    pub fn remove(&self, value: i64) -> Self {
        self.retain(|v| v != value)
    }

    /// Keeps only the values within `lower..=upper`.
    pub fn restrict(&self, lower: i64, upper: i64) -> Self {
        self.retain(|v| lower <= v && v <= upper)
    }

    pub fn intersect(&self, other: &Domain) -> Self {
        self.retain(|v| other.contains(v))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Domain;

    #[test]
    fn range_is_inclusive_and_ordered() {
        let d = Domain::range(2, 5);
        assert_eq!(d.len(), 4);
        assert_eq!(d.iter().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
        assert_eq!(d.min(), Some(2));
        assert_eq!(d.max(), Some(5));
    }

    #[test]
    fn inverted_range_is_empty() {
        let d = Domain::range(3, 1);
        assert!(d.is_empty());
        assert_eq!(d.min(), None);
    }

    #[test]
    fn singleton_is_fixed() {
        let d = Domain::singleton(7);
        assert!(d.is_fixed());
        assert_eq!(d.value(), Some(7));
        assert_eq!(Domain::range(1, 2).value(), None);
    }

    #[test]
    fn retain_and_remove_do_not_touch_the_original() {
        let d = Domain::range(1, 4);
        let narrowed = d.remove(2);
        assert_eq!(d.len(), 4);
        assert_eq!(narrowed.iter().collect::<Vec<_>>(), vec![1, 3, 4]);
    }

    #[test]
    fn restrict_keeps_the_window() {
        let d = Domain::from_values([1, 3, 5, 7, 9]);
        assert_eq!(d.restrict(3, 7).iter().collect::<Vec<_>>(), vec![3, 5, 7]);
    }

    #[test]
    fn intersect_with_disjoint_domain_is_empty() {
        let a = Domain::range(1, 3);
        let b = Domain::range(4, 6);
        assert!(a.intersect(&b).is_empty());
        assert_eq!(a.intersect(&Domain::range(2, 9)).iter().collect::<Vec<_>>(), vec![2, 3]);
    }
}
