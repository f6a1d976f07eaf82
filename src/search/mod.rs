//! The search for the minimal number of worlds of a Kripke model.

mod search_config;
pub use search_config::finite_model_bound;
pub use search_config::SearchConfig;

mod search_controller;
pub use search_controller::Probe;
pub use search_controller::SearchController;
pub use search_controller::SearchListener;
pub use search_controller::SearchOutcome;
pub use search_controller::SearchPhase;
pub use search_controller::SearchState;
