use std::collections::BTreeMap;

/// Weights of violated weak constraints, by level.
///
/// Levels without weight are absent, and so two tables with the same weight at every level are equal.
///
/// Tables are ordered lexicographically from the highest level down, with a lower weight at the first difference being *less*.
/// As a lower weight is better, `a < b` exactly when `a` is better than `b`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct WeightAtLevels {
    weights: BTreeMap<i64, i64>,
}

impl WeightAtLevels {
    pub fn weight_at(&self, level: i64) -> i64 {
        self.weights.get(&level).copied().unwrap_or(0)
    }

    /// Adds `weight` at `level`.
    pub fn increase(&mut self, level: i64, weight: i64) {
        let entry = self.weights.entry(level).or_insert(0);
        *entry += weight;
        if *entry == 0 {
            self.weights.remove(&level);
        }
    }

    /// Removes `weight` from `level`.
    pub fn decrease(&mut self, level: i64, weight: i64) {
        self.increase(level, -weight)
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Pairs of level and weight, from the highest level down.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.weights.iter().rev().map(|(level, weight)| (*level, *weight))
    }

    /// True if `self` is strictly better than `other`.
    pub fn is_better_than(&self, other: &Self) -> bool {
        self < other
    }
}

impl PartialOrd for WeightAtLevels {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WeightAtLevels {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let mut levels = self
            .weights
            .keys()
            .chain(other.weights.keys())
            .copied()
            .collect::<Vec<_>>();
        levels.sort_unstable_by(|a, b| b.cmp(a));
        levels.dedup();

        for level in levels {
            match self.weight_at(level).cmp(&other.weight_at(level)) {
                std::cmp::Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl FromIterator<(i64, i64)> for WeightAtLevels {
    /// From pairs of level and weight.
    fn from_iter<T: IntoIterator<Item = (i64, i64)>>(iter: T) -> Self {
        let mut weights = WeightAtLevels::default();
        for (level, weight) in iter {
            weights.increase(level, weight);
        }
        weights
    }
}

impl std::fmt::Display for WeightAtLevels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (index, (level, weight)) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{weight}@{level}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicographic_from_highest() {
        let a = WeightAtLevels::from_iter([(2, 1), (0, 9)]);
        let b = WeightAtLevels::from_iter([(2, 2), (0, 0)]);
        assert!(a.is_better_than(&b));
        assert!(!b.is_better_than(&a));

        let c = WeightAtLevels::from_iter([(1, 5)]);
        assert!(c.is_better_than(&a));
    }

    #[test]
    fn equal_is_not_better() {
        let a = WeightAtLevels::from_iter([(1, 3)]);
        let mut b = WeightAtLevels::from_iter([(1, 1), (0, 2)]);
        b.increase(1, 2);
        b.decrease(0, 2);
        assert_eq!(a, b);
        assert!(!a.is_better_than(&b));
        assert_eq!(format!("{a}"), "[3@1]");
    }
}
