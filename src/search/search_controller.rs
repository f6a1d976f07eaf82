use super::SearchConfig;
use crate::{
    error::{ModelFinderError, Result},
    io::InstanceTemplate,
    oracle::{Oracle, OracleAnswer, Verdict},
};
use log::{debug, warn};
use std::time::{Duration, Instant};

/// The phases of the search for a minimal model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// The number of worlds is doubled until a model is found; the value is the next size to probe.
    Probing(usize),
    /// The minimal number of worlds lies between the bounds (both included), or is the best size found so far.
    Bisecting {
        /// the lower bound
        lower: usize,
        /// the upper bound
        upper: usize,
    },
    /// A minimal model was found with the given number of worlds.
    Found(usize),
    /// No model exists up to the given number of worlds.
    Bounded(usize),
}

impl SearchPhase {
    /// Returns `true` iff the phase ends the search.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchPhase::Found(_) | SearchPhase::Bounded(_))
    }
}

/// A call to the oracle made during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// the number of worlds
    pub size: usize,
    /// the answer of the oracle
    pub verdict: Verdict,
}

/// The state of a running search.
#[derive(Debug, Clone)]
pub struct SearchState {
    phase: SearchPhase,
    best: Option<(usize, OracleAnswer)>,
    probes: Vec<Probe>,
}

impl SearchState {
    fn new(starting_size: usize) -> Self {
        Self {
            phase: SearchPhase::Probing(starting_size),
            best: None,
            probes: vec![],
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Returns the smallest number of worlds known to admit a model, if any.
    pub fn best_size(&self) -> Option<usize> {
        self.best.as_ref().map(|(s, _)| *s)
    }

    /// Returns the number of oracle calls made so far.
    pub fn n_calls(&self) -> usize {
        self.probes.len()
    }

    /// Returns the oracle calls made so far.
    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }
}

/// The outcome of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A minimal model was found.
    Found {
        /// the number of worlds of the model
        size: usize,
        /// the answer of the oracle for this size
        witness: OracleAnswer,
        /// the calls made to the oracle
        probes: Vec<Probe>,
    },
    /// No model was found up to the maximal size.
    ///
    /// This is not a proof of unsatisfiability unless the maximal size is the finite model bound of the formula.
    Bounded {
        /// the maximal number of worlds
        max_size: usize,
        /// the calls made to the oracle
        probes: Vec<Probe>,
    },
}

impl SearchOutcome {
    /// Returns the calls made to the oracle.
    pub fn probes(&self) -> &[Probe] {
        match self {
            SearchOutcome::Found { probes, .. } | SearchOutcome::Bounded { probes, .. } => probes,
        }
    }
}

/// A trait for objects listening to the progress of a search.
pub trait SearchListener {
    /// Called before each call to the oracle.
    fn probe_start(&self, _size: usize) {}

    /// Called after each successful call to the oracle.
    fn probe_end(&self, _probe: &Probe, _elapsed: Duration) {}

    /// Called each time the search enters a new phase.
    fn phase_changed(&self, _state: &SearchState) {}
}

/// Searches the minimal number of worlds for which a problem instance is satisfiable.
///
/// The search starts by doubling the number of worlds, from the starting size, until the oracle finds a model.
/// If the maximal size is exceeded first, the search ends with [`SearchOutcome::Bounded`].
/// Otherwise the interval between the last unsatisfiable size and the satisfiable one is bisected,
/// before the oracle is called again on the smallest satisfiable size to get the witness of this size.
///
/// The bisection assumes that the existence of a model is monotonic in the number of worlds.
/// It can be disabled (see [`SearchConfig::bisect`]) when this assumption does not hold.
///
/// Each probe works on its own copy of the instance, derived from the template by [`InstanceTemplate::with_size`].
pub struct SearchController<'a> {
    template: &'a InstanceTemplate,
    config: SearchConfig,
    listeners: Vec<Box<dyn SearchListener>>,
}

impl<'a> SearchController<'a> {
    /// Builds a new controller.
    pub fn new(template: &'a InstanceTemplate, config: SearchConfig) -> Self {
        Self {
            template,
            config,
            listeners: vec![],
        }
    }

    /// Adds a listener.
    pub fn add_listener(&mut self, listener: Box<dyn SearchListener>) {
        self.listeners.push(listener);
    }

    /// Runs the search.
    ///
    /// Oracle errors end the search and are returned.
    pub fn run(&self, oracle: &mut dyn Oracle) -> Result<SearchOutcome> {
        let mut state = SearchState::new(self.config.starting_size.max(1));
        self.notify_phase(&state);
        loop {
            let next_phase = match state.phase() {
                SearchPhase::Probing(size) => self.doubling_step(oracle, &mut state, size)?,
                SearchPhase::Bisecting { lower, upper } if lower <= upper => {
                    self.bisection_step(oracle, &mut state, lower, upper)?
                }
                SearchPhase::Bisecting { .. } => self.materialize_best(oracle, &mut state)?,
                SearchPhase::Found(size) => {
                    let (_, witness) = state.best.take().ok_or_else(|| {
                        ModelFinderError::MalformedWitness(format!(
                            "no witness recorded for size {}",
                            size
                        ))
                    })?;
                    return Ok(SearchOutcome::Found {
                        size,
                        witness,
                        probes: state.probes,
                    });
                }
                SearchPhase::Bounded(max_size) => {
                    return Ok(SearchOutcome::Bounded {
                        max_size,
                        probes: state.probes,
                    })
                }
            };
            if next_phase != state.phase {
                state.phase = next_phase;
                self.notify_phase(&state);
            }
        }
    }

    fn doubling_step(
        &self,
        oracle: &mut dyn Oracle,
        state: &mut SearchState,
        size: usize,
    ) -> Result<SearchPhase> {
        if size > self.config.max_size {
            return Ok(SearchPhase::Bounded(self.config.max_size));
        }
        let answer = self.probe(oracle, state, size)?;
        if answer.verdict().is_sat() {
            state.best = Some((size, answer));
            if self.config.bisect {
                Ok(SearchPhase::Bisecting {
                    lower: (size / 2).max(1),
                    upper: size,
                })
            } else {
                Ok(SearchPhase::Found(size))
            }
        } else {
            Ok(match size.checked_mul(2) {
                Some(next) => SearchPhase::Probing(next),
                None => SearchPhase::Bounded(self.config.max_size),
            })
        }
    }

    fn bisection_step(
        &self,
        oracle: &mut dyn Oracle,
        state: &mut SearchState,
        lower: usize,
        upper: usize,
    ) -> Result<SearchPhase> {
        let midpoint = lower + (upper - lower) / 2;
        let answer = self.probe(oracle, state, midpoint)?;
        if answer.verdict().is_sat() {
            state.best = Some((midpoint, answer));
            Ok(SearchPhase::Bisecting {
                lower,
                upper: midpoint - 1,
            })
        } else {
            Ok(SearchPhase::Bisecting {
                lower: midpoint + 1,
                upper,
            })
        }
    }

    fn materialize_best(
        &self,
        oracle: &mut dyn Oracle,
        state: &mut SearchState,
    ) -> Result<SearchPhase> {
        let size = state.best_size().ok_or_else(|| {
            ModelFinderError::MalformedWitness("bisection ended without any model".to_string())
        })?;
        let answer = self.probe(oracle, state, size)?;
        if answer.verdict().is_sat() {
            state.best = Some((size, answer));
        } else {
            warn!(
                "the oracle found no model with {} world(s) on a second call; keeping the first witness",
                size
            );
        }
        Ok(SearchPhase::Found(size))
    }

    fn probe(
        &self,
        oracle: &mut dyn Oracle,
        state: &mut SearchState,
        size: usize,
    ) -> Result<OracleAnswer> {
        self.listeners.iter().for_each(|l| l.probe_start(size));
        let start = Instant::now();
        let answer = oracle.query(&self.template.with_size(size))?;
        let probe = Probe {
            size,
            verdict: answer.verdict(),
        };
        let elapsed = start.elapsed();
        self.listeners.iter().for_each(|l| l.probe_end(&probe, elapsed));
        state.probes.push(probe);
        Ok(answer)
    }

    fn notify_phase(&self, state: &SearchState) {
        debug!("search phase is now {:?}", state.phase);
        self.listeners.iter().for_each(|l| l.phase_changed(state));
    }
}
