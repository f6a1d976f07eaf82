use crate::{formula::AtomNames, io::ModelDiagram};
use std::collections::BTreeSet;

/// A finite Kripke model.
///
/// Worlds are identified by the integers from 1 to the number of worlds.
/// Each world is labelled by the set of atoms it satisfies, each atom being represented by the leader of its equivalence class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KripkeModel {
    labels: Vec<BTreeSet<usize>>,
    edges: Vec<(usize, usize)>,
}

impl KripkeModel {
    pub(crate) fn new(labels: Vec<BTreeSet<usize>>, edges: Vec<(usize, usize)>) -> Self {
        Self { labels, edges }
    }

    /// Returns the number of worlds.
    pub fn n_worlds(&self) -> usize {
        self.labels.len()
    }

    /// Iterates over the world identifiers.
    pub fn worlds(&self) -> impl Iterator<Item = usize> {
        1..=self.labels.len()
    }

    /// Returns the atom leaders satisfied at a world, or [Option::None] if the world does not exist.
    pub fn label(&self, world: usize) -> Option<&BTreeSet<usize>> {
        if world == 0 {
            None
        } else {
            self.labels.get(world - 1)
        }
    }

    /// Returns the names of the atoms satisfied at a world, in increasing order of leaders.
    pub fn named_label(&self, world: usize, names: &AtomNames) -> Vec<String> {
        self.label(world)
            .map(|l| l.iter().map(|a| names.name_of(*a)).collect())
            .unwrap_or_default()
    }

    /// Returns the accessibility edges, in the order they were read.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Returns the worlds accessible from a world.
    pub fn successors(&self, world: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .iter()
            .filter(move |(from, _)| *from == world)
            .map(|(_, to)| *to)
    }

    /// Builds the diagram of this model, to be handed to a [`ModelWriter`](crate::io::ModelWriter).
    ///
    /// Worlds are labelled by their identifier; their external label is the comma-separated list of the atoms they satisfy.
    pub fn to_diagram(&self, name: &str, names: &AtomNames) -> ModelDiagram {
        let mut diagram = ModelDiagram::new(name);
        for w in self.worlds() {
            diagram.add_node(w, &w.to_string(), &self.named_label(w, names).join(", "));
        }
        self.edges
            .iter()
            .for_each(|(from, to)| diagram.add_edge(*from, *to));
        diagram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> KripkeModel {
        KripkeModel::new(
            vec![BTreeSet::from([3, 1]), BTreeSet::new()],
            vec![(1, 2), (2, 2), (1, 1)],
        )
    }

    #[test]
    fn test_accessors() {
        let m = model();
        assert_eq!(2, m.n_worlds());
        assert_eq!(vec![1, 2], m.worlds().collect::<Vec<usize>>());
        assert_eq!(Some(&BTreeSet::from([1, 3])), m.label(1));
        assert!(m.label(0).is_none());
        assert!(m.label(3).is_none());
        assert_eq!(vec![2, 1], m.successors(1).collect::<Vec<usize>>());
        assert_eq!(vec![2], m.successors(2).collect::<Vec<usize>>());
    }

    #[test]
    fn test_to_diagram() {
        let m = model();
        let names = AtomNames::ordinal([1, 3]);
        assert_eq!(vec!["p1", "p2"], m.named_label(1, &names));
        let diagram = m.to_diagram("phi", &names);
        assert_eq!("phi", diagram.name());
        assert_eq!("p1, p2", diagram.nodes()[0].external_label());
        assert_eq!("", diagram.nodes()[1].external_label());
        assert_eq!("2", diagram.nodes()[1].label());
        assert_eq!(&[(1, 2), (2, 2), (1, 1)], diagram.edges());
    }
}
