use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A union-find structure over the identifiers of the atomic subformulas of a formula.
///
/// Two atomic subformulas belong to the same class when they denote the same proposition.
/// Each class has a leader, which is the lowest identifier it contains.
/// Since the leader only depends on the content of the class, it does not depend on the order in which the pairs of equivalent atoms were declared.
///
/// Path compression and union by rank make the operations run in near-constant amortized time.
///
/// # Example
///
/// ```
/// # use kripkemin::utils::AtomEquivalence;
/// let mut equivalence = AtomEquivalence::new_with_atoms([3, 5, 8]);
/// equivalence.union(8, 5);
/// assert_eq!(Some(5), equivalence.find(8));
/// assert_eq!(Some(3), equivalence.find(3));
/// assert_eq!(None, equivalence.find(4));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AtomEquivalence {
    slots: HashMap<usize, usize>,
    ids: Vec<usize>,
    parents: Vec<usize>,
    ranks: Vec<u8>,
    min_ids: Vec<usize>,
}

impl AtomEquivalence {
    /// Builds a structure in which each given atom is alone in its class.
    pub fn new_with_atoms<I>(atoms: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut result = Self::default();
        atoms.into_iter().for_each(|a| {
            result.add(a);
        });
        result
    }

    /// Registers an atom, putting it in its own class.
    ///
    /// Adding an atom that is already registered has no effect.
    pub fn add(&mut self, id: usize) {
        if self.slots.contains_key(&id) {
            return;
        }
        let slot = self.ids.len();
        self.slots.insert(id, slot);
        self.ids.push(id);
        self.parents.push(slot);
        self.ranks.push(0);
        self.min_ids.push(id);
    }

    /// Returns `true` iff the identifier was registered as an atom.
    pub fn contains(&self, id: usize) -> bool {
        self.slots.contains_key(&id)
    }

    /// Returns the number of registered atoms.
    pub fn n_atoms(&self) -> usize {
        self.ids.len()
    }

    /// Merges the classes of two atoms.
    ///
    /// Atoms that were not registered yet are added before the merge.
    pub fn union(&mut self, a: usize, b: usize) {
        self.add(a);
        self.add(b);
        let root_a = self.find_root(self.slots[&a]);
        let root_b = self.find_root(self.slots[&b]);
        if root_a == root_b {
            return;
        }
        let (new_root, child) = match self.ranks[root_a].cmp(&self.ranks[root_b]) {
            std::cmp::Ordering::Less => (root_b, root_a),
            std::cmp::Ordering::Greater => (root_a, root_b),
            std::cmp::Ordering::Equal => {
                self.ranks[root_a] += 1;
                (root_a, root_b)
            }
        };
        self.parents[child] = new_root;
        self.min_ids[new_root] = usize::min(self.min_ids[new_root], self.min_ids[child]);
    }

    /// Returns the leader of the class of an atom, compressing the path to its root.
    ///
    /// Returns [Option::None] if the identifier is not a registered atom.
    pub fn find(&mut self, id: usize) -> Option<usize> {
        let slot = *self.slots.get(&id)?;
        let root = self.find_root(slot);
        Some(self.min_ids[root])
    }

    /// Returns the leader of the class of an atom without modifying the structure.
    ///
    /// Returns [Option::None] if the identifier is not a registered atom.
    pub fn leader_of(&self, id: usize) -> Option<usize> {
        let mut current = *self.slots.get(&id)?;
        while self.parents[current] != current {
            current = self.parents[current];
        }
        Some(self.min_ids[current])
    }

    /// Returns the set of class leaders.
    pub fn leaders(&self) -> BTreeSet<usize> {
        (0..self.ids.len())
            .filter(|slot| self.parents[*slot] == *slot)
            .map(|slot| self.min_ids[slot])
            .collect()
    }

    /// Returns the classes, sorted by their leaders.
    pub fn classes(&self) -> Vec<BTreeSet<usize>> {
        let mut classes: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for id in self.ids.iter() {
            // registered ids always have a leader
            if let Some(leader) = self.leader_of(*id) {
                classes.entry(leader).or_default().insert(*id);
            }
        }
        classes.into_values().collect()
    }

    fn find_root(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.parents[root] != root {
            root = self.parents[root];
        }
        let mut current = slot;
        while self.parents[current] != root {
            let next = self.parents[current];
            self.parents[current] = root;
            current = next;
        }
        root
    }
}
