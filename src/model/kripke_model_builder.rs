use super::KripkeModel;
use crate::{
    error::{ModelFinderError, Result},
    io::{Relation, RelationDecoder, RelationSpec},
    utils::AtomEquivalence,
};
use std::collections::BTreeSet;

/// Builds Kripke models from the relations found in the output of the solver.
///
/// The names of the accessibility and valuation relations are given by [`RelationSpec`]s;
/// by default they are `Accessible` (keyed by the source world) and `Valuation` (keyed by the world).
#[derive(Debug, Clone)]
pub struct KripkeModelBuilder {
    accessibility: RelationSpec,
    valuation: RelationSpec,
}

impl Default for KripkeModelBuilder {
    fn default() -> Self {
        Self::new(
            RelationSpec::accessibility("Accessible"),
            RelationSpec::valuation("Valuation"),
        )
    }
}

impl KripkeModelBuilder {
    /// Builds a new model builder given the way the relations are read.
    pub fn new(accessibility: RelationSpec, valuation: RelationSpec) -> Self {
        Self {
            accessibility,
            valuation,
        }
    }

    /// Decodes the relations from the lines of a witness and builds the model.
    pub fn build_from_witness<S: AsRef<str>>(
        &self,
        witness: &[S],
        atoms: &AtomEquivalence,
        n_worlds: usize,
    ) -> Result<KripkeModel> {
        let accessibility = RelationDecoder::extract(witness, &self.accessibility)?;
        let valuation = RelationDecoder::extract(witness, &self.valuation)?;
        Self::build(&accessibility, &valuation, atoms, n_worlds)
    }

    /// Builds a model from its relations.
    ///
    /// The accessibility relation maps worlds to the worlds they reach.
    /// The valuation maps worlds to the subformulas they satisfy; only atomic subformulas are kept,
    /// replaced by the leaders of their equivalence classes.
    ///
    /// Fails with [`ModelFinderError::MalformedWitness`] if a relation refers to a world outside `1..=n_worlds`.
    pub fn build(
        accessibility: &Relation,
        valuation: &Relation,
        atoms: &AtomEquivalence,
        n_worlds: usize,
    ) -> Result<KripkeModel> {
        let check_world = |relation: &Relation, w: usize| {
            if w == 0 || w > n_worlds {
                Err(ModelFinderError::MalformedWitness(format!(
                    "relation {} refers to world {}, but the model has {} world(s)",
                    relation.name(),
                    w,
                    n_worlds
                )))
            } else {
                Ok(())
            }
        };
        let mut labels = vec![BTreeSet::new(); n_worlds];
        for (w, subformulas) in valuation.iter() {
            check_world(valuation, w)?;
            labels[w - 1].extend(subformulas.iter().filter_map(|s| atoms.leader_of(*s)));
        }
        let mut edges = Vec::new();
        for (from, targets) in accessibility.iter() {
            check_world(accessibility, from)?;
            for to in targets {
                check_world(accessibility, *to)?;
                edges.push((from, *to));
            }
        }
        Ok(KripkeModel::new(labels, edges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::AtomNames;
    use std::collections::BTreeMap;

    #[test]
    fn test_build() {
        let accessibility = Relation::new("Accessible", BTreeMap::from([(1, vec![2])]));
        let valuation = Relation::new(
            "Valuation",
            BTreeMap::from([(1, vec![101]), (2, vec![102])]),
        );
        let atoms = AtomEquivalence::new_with_atoms([101, 102]);
        let model = KripkeModelBuilder::build(&accessibility, &valuation, &atoms, 2).unwrap();
        let names = AtomNames::ordinal(atoms.leaders());
        assert_eq!(vec!["p1"], model.named_label(1, &names));
        assert_eq!(vec!["p2"], model.named_label(2, &names));
        assert_eq!(&[(1, 2)], model.edges());
    }

    #[test]
    fn test_non_atoms_are_ignored_and_atoms_are_merged() {
        let mut atoms = AtomEquivalence::new_with_atoms([3, 5, 6]);
        atoms.union(6, 3);
        let valuation = Relation::new(
            "Valuation",
            BTreeMap::from([(1, vec![1, 2, 6]), (2, vec![5, 3, 4])]),
        );
        let model =
            KripkeModelBuilder::build(&Relation::default(), &valuation, &atoms, 3).unwrap();
        assert_eq!(Some(&BTreeSet::from([3])), model.label(1));
        assert_eq!(Some(&BTreeSet::from([3, 5])), model.label(2));
        assert_eq!(Some(&BTreeSet::new()), model.label(3));
        assert!(model.edges().is_empty());
    }

    #[test]
    fn test_world_out_of_range() {
        let accessibility = Relation::new("Accessible", BTreeMap::from([(1, vec![3])]));
        match KripkeModelBuilder::build(
            &accessibility,
            &Relation::default(),
            &AtomEquivalence::default(),
            2,
        ) {
            Err(ModelFinderError::MalformedWitness(m)) => {
                assert!(m.contains("Accessible") && m.contains("world 3"))
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_build_from_witness() {
        let witness = vec![
            "<Satisfiable/>",
            "<DataSet Name='Valuation' TypeSize= '2' >",
            "<ARow><IntValue Name= '2'/><IntValue Name= '1'/><True/></ARow>",
            "</DataSet>",
            "<DataSet Name='Accessible' TypeSize= '2' >",
            "<ARow><IntValue Name= '1'/><IntValue Name= '1'/><True/></ARow>",
            "</DataSet>",
        ];
        let atoms = AtomEquivalence::new_with_atoms([2]);
        let model = KripkeModelBuilder::default()
            .build_from_witness(&witness, &atoms, 1)
            .unwrap();
        assert_eq!(Some(&BTreeSet::from([2])), model.label(1));
        assert_eq!(&[(1, 1)], model.edges());
    }

    #[test]
    fn test_build_from_witness_with_custom_names() {
        let witness = vec![
            "<DataSet Name='R'>",
            "<ARow><IntValue Name= '1'/><IntValue Name= '2'/></ARow>",
            "</DataSet>",
            "<DataSet Name='V'>",
            "</DataSet>",
        ];
        let builder =
            KripkeModelBuilder::new(RelationSpec::accessibility("R"), RelationSpec::valuation("V"));
        let model = builder
            .build_from_witness(&witness, &AtomEquivalence::default(), 2)
            .unwrap();
        assert_eq!(&[(1, 2)], model.edges());
        assert!(KripkeModelBuilder::default()
            .build_from_witness(&witness, &AtomEquivalence::default(), 2)
            .is_err());
    }
}
