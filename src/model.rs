//! Immutable data model shared by the builder and the decoder.
//!
//! Everything here is constructed once by [`crate::builder`] and then only
//! read. Each probability model carries its own defaulting rule, exposed as a
//! single `probability(..)` lookup so the fallback tiers stay testable in
//! isolation rather than being re-derived at every call site.

use std::collections::HashMap;

/// Action label substituted wherever a step has no action of its own.
pub const NO_OP_ACTION: &str = "N";

/// The fixed, ordered set of valid states.
///
/// Order is first-occurrence order of the initial-weight source and is the
/// canonical tie-break order everywhere in the decoder: whenever two states
/// score equally, the one earlier in this sequence wins.
#[derive(Clone, Debug)]
pub struct StateSpace {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl StateSpace {
    /// Build from labels, keeping the first occurrence of each duplicate.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Self {
            labels: Vec::new(),
            index: HashMap::new(),
        };
        for label in labels {
            let label = label.into();
            if !out.index.contains_key(&label) {
                out.index.insert(label.clone(), out.labels.len());
                out.labels.push(label);
            }
        }
        out
    }

    /// Number of states `|S|`.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Index of a label, if it names a valid state.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Label at `idx`. Panics if `idx >= len()`.
    pub fn label(&self, idx: usize) -> &str {
        &self.labels[idx]
    }

    /// All labels in canonical order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Start-of-sequence distribution over the state space, normalized to 1.
#[derive(Clone, Debug)]
pub struct InitialDistribution {
    probs: Vec<f64>,
}

impl InitialDistribution {
    pub(crate) fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Probability of starting in `state` (index into the state space).
    pub fn probability(&self, state: usize) -> f64 {
        self.probs.get(state).copied().unwrap_or(0.0)
    }
}

/// Listed destinations plus the smoothing default for one (state, action) pair.
#[derive(Clone, Debug)]
pub struct TransitionRow {
    pub(crate) dests: HashMap<usize, f64>,
    pub(crate) default_prob: f64,
}

impl TransitionRow {
    /// Explicitly listed destination probabilities.
    pub fn destinations(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.dests.iter().map(|(&s, &p)| (s, p))
    }

    pub fn listed_count(&self) -> usize {
        self.dests.len()
    }

    /// Probability of any destination not listed for this pair.
    pub fn default_probability(&self) -> f64 {
        self.default_prob
    }
}

/// Action-conditioned transition probabilities with two-tier defaulting.
///
/// Tier one: a (state, action) pair seen in training has a row; destinations
/// missing from that row get the row's default probability. Tier two: a pair
/// never seen at all falls back to uniform `1/|S|` when the global default
/// weight is positive, and to 0 otherwise. The tiers deliberately distinguish
/// "destination unseen for a known pair" from "pair itself unseen".
#[derive(Clone, Debug)]
pub struct TransitionModel {
    /// Rows indexed by source state, then keyed by action label.
    pub(crate) rows: Vec<HashMap<String, TransitionRow>>,
    pub(crate) default_weight: f64,
    pub(crate) n_states: usize,
}

impl TransitionModel {
    /// P(to | from, action) under the two-tier fallback.
    pub fn probability(&self, from: usize, action: &str, to: usize) -> f64 {
        match self.rows.get(from).and_then(|r| r.get(action)) {
            Some(row) => row.dests.get(&to).copied().unwrap_or(row.default_prob),
            None => {
                if self.default_weight > 0.0 {
                    1.0 / self.n_states as f64
                } else {
                    0.0
                }
            }
        }
    }

    /// The row for a (state, action) pair, if it was observed in training.
    pub fn row(&self, from: usize, action: &str) -> Option<&TransitionRow> {
        self.rows.get(from).and_then(|r| r.get(action))
    }

    /// Global default weight the model was built with.
    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }

    /// Actions observed for a given source state.
    pub fn actions(&self, from: usize) -> impl Iterator<Item = &str> {
        self.rows
            .get(from)
            .into_iter()
            .flat_map(|r| r.keys().map(String::as_str))
    }
}

/// Listed observation probabilities plus the smoothing default for one state.
#[derive(Clone, Debug)]
pub struct EmissionRow {
    pub(crate) probs: HashMap<String, f64>,
    pub(crate) default_prob: f64,
}

impl EmissionRow {
    pub fn observations(&self) -> impl Iterator<Item = (&str, f64)> {
        self.probs.iter().map(|(o, &p)| (o.as_str(), p))
    }

    pub fn listed_count(&self) -> usize {
        self.probs.len()
    }

    pub fn default_probability(&self) -> f64 {
        self.default_prob
    }
}

/// Per-state emission probabilities. Every valid state has a row, even when
/// nothing was observed for it.
#[derive(Clone, Debug)]
pub struct EmissionModel {
    pub(crate) rows: Vec<EmissionRow>,
}

impl EmissionModel {
    /// P(observation | state), defaulting when the observation is unlisted.
    pub fn probability(&self, state: usize, observation: &str) -> f64 {
        match self.rows.get(state) {
            Some(row) => row
                .probs
                .get(observation)
                .copied()
                .unwrap_or(row.default_prob),
            None => 0.0,
        }
    }

    pub fn row(&self, state: usize) -> Option<&EmissionRow> {
        self.rows.get(state)
    }
}

/// A fully built model: the fixed state space plus the three distributions.
#[derive(Clone, Debug)]
pub struct HmmModel {
    pub states: StateSpace,
    pub initial: InitialDistribution,
    pub transitions: TransitionModel,
    pub emissions: EmissionModel,
}

/// One decode request: N observations and the actions driving the N−1
/// transitions between them. `actions[i]` conditions the step from time i to
/// i+1; a missing or `None` entry collapses to [`NO_OP_ACTION`].
#[derive(Clone, Debug)]
pub struct DecodingInput {
    pub observations: Vec<String>,
    pub actions: Vec<Option<String>>,
}

impl DecodingInput {
    pub fn new(observations: Vec<String>, actions: Vec<Option<String>>) -> Self {
        Self {
            observations,
            actions,
        }
    }

    /// The action governing the transition into step `t` (t ≥ 1).
    pub(crate) fn action_into(&self, t: usize) -> &str {
        self.actions
            .get(t - 1)
            .and_then(|a| a.as_deref())
            .unwrap_or(NO_OP_ACTION)
    }
}

/// The Viterbi-optimal path, one label per observation. A label is the empty
/// string only where reconstruction found no predecessor (degenerate
/// all-zero-probability rows).
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedPath {
    pub states: Vec<String>,
    /// Joint probability of the returned path and the observations.
    pub score: f64,
}
