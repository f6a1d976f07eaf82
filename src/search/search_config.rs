/// Returns the finite model bound of a formula given its number of subformulas.
///
/// A satisfiable formula with `n` subformulas has a model with at most `2^n` worlds.
/// The bound saturates at [`usize::MAX`].
pub fn finite_model_bound(n_subformulas: usize) -> usize {
    u32::try_from(n_subformulas)
        .ok()
        .and_then(|n| 1usize.checked_shl(n))
        .unwrap_or(usize::MAX)
}

/// The parameters of a search for a minimal model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// The first number of worlds to probe
    pub starting_size: usize,
    /// The number of worlds beyond which the search gives up
    pub max_size: usize,
    /// Whether the interval found by the doubling phase is refined by bisection
    ///
    /// Bisection is only relevant when satisfiability is monotonic in the number of worlds.
    /// When it is disabled, the first satisfiable probe of the doubling phase ends the search.
    pub bisect: bool,
}

impl SearchConfig {
    /// Builds the default configuration for a formula with the given number of subformulas.
    ///
    /// The maximal size is the [finite model bound](finite_model_bound) of the formula.
    pub fn for_subformulas(n_subformulas: usize) -> Self {
        Self {
            max_size: finite_model_bound(n_subformulas),
            ..Default::default()
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            starting_size: 1,
            max_size: usize::MAX,
            bisect: true,
        }
    }
}
