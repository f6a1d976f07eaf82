//! Miscellaneous components used in the library.

mod atom_equivalence;
pub use atom_equivalence::AtomEquivalence;
