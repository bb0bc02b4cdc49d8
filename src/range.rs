use itertools::Itertools;
use std::fmt;

/// Range where both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range<T>(T, T);

impl<T> Range<T>
where
    T: Ord,
{
    /// Returns `None` if the range would be empty.
    pub fn new(from: T, to: T) -> Option<Self> {
        if from > to {
            return None;
        }
        Some(Range(from, to))
    }

    pub fn contains(&self, val: &T) -> bool {
        val >= &self.0 && val <= &self.1
    }

    pub fn overlaps(&self, other: &Range<T>) -> bool {
        self.0 <= other.1 && other.0 <= self.1
    }

    pub fn start(&self) -> &T {
        &self.0
    }

    pub fn end(&self) -> &T {
        &self.1
    }
}

impl<T> fmt::Display for Range<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.0, self.1)
    }
}

/// An ordered list of ranges, each tagged with a label.
///
/// Lookups return the first range (in insertion order) containing the value, so the order ranges
/// are pushed in is the precedence order.
#[derive(Debug, Clone)]
pub struct RangeSet<T, L> {
    ranges: Vec<(Range<T>, L)>,
}

impl<T, L> Default for RangeSet<T, L> {
    fn default() -> Self {
        Self { ranges: vec![] }
    }
}

impl<T, L> RangeSet<T, L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Range<T>, &L)> + '_ {
        self.ranges.iter().map(|(range, label)| (range, label))
    }

    pub fn push(&mut self, range: Range<T>, label: L) {
        self.ranges.push((range, label));
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl<T, L> RangeSet<T, L>
where
    T: Ord,
{
    /// The label of the first range containing `value`.
    pub fn first_match(&self, value: &T) -> Option<&L> {
        self.ranges
            .iter()
            .find(|(range, _)| range.contains(value))
            .map(|(_, label)| label)
    }

    /// All pairs of ranges that share at least one value, with their positions. Pairs are ordered
    /// by position, and the first element of each pair comes first.
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        self.ranges
            .iter()
            .enumerate()
            .tuple_combinations()
            .filter(|((_, (r1, _)), (_, (r2, _)))| r1.overlaps(r2))
            .map(|((idx1, _), (idx2, _))| (idx1, idx2))
            .collect()
    }
}

impl<T, L> FromIterator<(Range<T>, L)> for RangeSet<T, L> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Range<T>, L)>,
    {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let range = Range::new(3, 5).unwrap();
        assert!(!range.contains(&2));
        assert!(range.contains(&3));
        assert!(range.contains(&5));
        assert!(!range.contains(&6));
        assert!(Range::new(5, 3).is_none());
    }

    #[test]
    fn first_match_wins() {
        let set: RangeSet<u32, &str> = [
            (Range::new(1, 10).unwrap(), "wide"),
            (Range::new(4, 6).unwrap(), "narrow"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.first_match(&5), Some(&"wide"));
        assert_eq!(set.first_match(&11), None);
        assert_eq!(set.overlapping_pairs(), vec![(0, 1)]);
    }

    #[test]
    fn disjoint_ranges_do_not_overlap() {
        let mut set = RangeSet::new();
        set.push(Range::new(1, 3).unwrap(), ());
        set.push(Range::new(4, 6).unwrap(), ());
        assert!(set.overlapping_pairs().is_empty());
    }
}
