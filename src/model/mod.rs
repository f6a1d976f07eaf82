//! Kripke models built from the answers of the solver.

mod kripke_model;
pub use kripke_model::KripkeModel;

mod kripke_model_builder;
pub use kripke_model_builder::KripkeModelBuilder;
