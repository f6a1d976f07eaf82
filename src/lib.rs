//! Kripkemin finds minimal Kripke models of modal formulas by driving an external finite model finder.
//!
//! Formulas are given as problem instances declaring their subformulas (see [`io::FormulaTreeBuilder`]).
//! The [`search::SearchController`] asks an [`oracle::Oracle`] whether models exist with a given number of worlds,
//! doubling this number until a model is found and then bisecting down to the minimal one.
//! The answer of the oracle is finally turned into a [`model::KripkeModel`].

#![warn(missing_docs)]

pub mod error;

pub mod formula;

pub mod io;

pub mod model;

pub mod oracle;

pub mod search;

pub mod utils;
