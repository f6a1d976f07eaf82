use std::collections::BTreeMap;

/// The names given to atomic propositions when formulas and models are displayed.
///
/// Atomic propositions are identified by the leaders of their equivalence classes (see [`AtomEquivalence`](crate::utils::AtomEquivalence)).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomNames(BTreeMap<usize, String>);

impl AtomNames {
    /// Names the leaders `p1`, `p2`, ... in increasing order of identifiers.
    ///
    /// # Example
    ///
    /// ```
    /// # use kripkemin::formula::AtomNames;
    /// let names = AtomNames::ordinal([102, 7]);
    /// assert_eq!("p1", names.name_of(7));
    /// assert_eq!("p2", names.name_of(102));
    /// ```
    pub fn ordinal<I>(leaders: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut sorted = leaders.into_iter().collect::<Vec<usize>>();
        sorted.sort_unstable();
        sorted.dedup();
        Self(
            sorted
                .into_iter()
                .enumerate()
                .map(|(i, leader)| (leader, format!("p{}", i + 1)))
                .collect(),
        )
    }

    /// Sets the name of a leader.
    pub fn insert(&mut self, leader: usize, name: String) {
        self.0.insert(leader, name);
    }

    /// Returns the name of a leader.
    ///
    /// Leaders without a registered name are named after their identifier.
    pub fn name_of(&self, leader: usize) -> String {
        self.0
            .get(&leader)
            .cloned()
            .unwrap_or_else(|| leader.to_string())
    }

    /// Returns the number of named leaders.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` iff no leader is named.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
