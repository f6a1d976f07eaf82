//! Modal formulas: connectives, syntax trees, parsing and encoding into problem instances.

mod atom_names;
pub use atom_names::AtomNames;

mod connective;
pub use connective::Connective;

#[allow(clippy::module_inception)]
mod formula;
pub use formula::Formula;

mod formula_parser;
pub use formula_parser::parse_formula;

mod formula_tree;
pub use formula_tree::{FormulaNode, FormulaTree};

mod instance_encoder;
pub use instance_encoder::encode_instance;
