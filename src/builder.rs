//! Distribution builder: raw non-negative weights in, normalized models out.
//!
//! Weights are pseudo-counts; callers never pre-normalize. Smoothing follows
//! the additive scheme: a context's total mass is its listed weights plus the
//! default weight once for every event the context could have listed but did
//! not. Dividing by that total yields listed probabilities and a single
//! per-context default probability, so unseen events keep non-zero mass
//! without materializing an entry per (context, event) pair.
//!
//! The builders are the only fallible stage of the pipeline; the decoder is
//! total over the resulting models.

use crate::model::{
    EmissionModel, EmissionRow, InitialDistribution, StateSpace, TransitionModel, TransitionRow,
};
use std::collections::HashMap;
use thiserror::Error;

/// Fatal configuration faults detected while building distributions.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("initial state weights are empty")]
    EmptyInitialWeights,
    #[error("initial state weights sum to zero")]
    ZeroInitialMass,
}

/// One raw (from, action, to, weight) training tuple.
#[derive(Clone, Debug)]
pub struct TransitionWeight {
    pub from: String,
    pub action: String,
    pub to: String,
    pub weight: f64,
}

impl TransitionWeight {
    pub fn new(
        from: impl Into<String>,
        action: impl Into<String>,
        to: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            from: from.into(),
            action: action.into(),
            to: to.into(),
            weight,
        }
    }
}

/// One raw (state, observation, weight) training tuple.
#[derive(Clone, Debug)]
pub struct EmissionWeight {
    pub state: String,
    pub observation: String,
    pub weight: f64,
}

impl EmissionWeight {
    pub fn new(state: impl Into<String>, observation: impl Into<String>, weight: f64) -> Self {
        Self {
            state: state.into(),
            observation: observation.into(),
            weight,
        }
    }
}

/// Normalize initial-state weights and fix the canonical state space.
///
/// Label order in `weights` becomes the tie-break order for the whole
/// pipeline; a duplicated label keeps its first position and its last weight.
///
/// # Errors
/// [`ConfigError::EmptyInitialWeights`] when `weights` is empty,
/// [`ConfigError::ZeroInitialMass`] when the weights sum to zero.
pub fn build_initial(
    weights: &[(String, f64)],
) -> Result<(StateSpace, InitialDistribution), ConfigError> {
    if weights.is_empty() {
        return Err(ConfigError::EmptyInitialWeights);
    }
    let states = StateSpace::from_labels(weights.iter().map(|(label, _)| label.clone()));
    let mut per_state = vec![0.0f64; states.len()];
    for (label, weight) in weights {
        if let Some(idx) = states.index_of(label) {
            per_state[idx] = *weight;
        }
    }
    let total: f64 = per_state.iter().sum();
    if total == 0.0 {
        return Err(ConfigError::ZeroInitialMass);
    }
    for w in &mut per_state {
        *w /= total;
    }
    Ok((states, InitialDistribution::new(per_state)))
}

/// Build the action-conditioned transition model.
///
/// Tuples naming a state outside `states` on either side are discarded before
/// aggregation. For each surviving (from, action) pair the total mass is the
/// listed weights plus `default_weight` for each unlisted destination; a
/// zero total yields probability 0 everywhere in that pair rather than a
/// division fault.
pub fn build_transitions(
    raw: &[TransitionWeight],
    states: &StateSpace,
    default_weight: f64,
) -> TransitionModel {
    let n = states.len();
    let mut grouped: HashMap<(usize, String), HashMap<usize, f64>> = HashMap::new();
    for tw in raw {
        let (from, to) = match (states.index_of(&tw.from), states.index_of(&tw.to)) {
            (Some(from), Some(to)) => (from, to),
            _ => continue,
        };
        grouped
            .entry((from, tw.action.clone()))
            .or_default()
            .insert(to, tw.weight);
    }

    let mut rows: Vec<HashMap<String, TransitionRow>> = vec![HashMap::new(); n];
    for ((from, action), dests) in grouped {
        let listed: f64 = dests.values().sum();
        let total = listed + default_weight * (n - dests.len()) as f64;
        let row = if total > 0.0 {
            TransitionRow {
                dests: dests.into_iter().map(|(s, w)| (s, w / total)).collect(),
                default_prob: default_weight / total,
            }
        } else {
            TransitionRow {
                dests: dests.into_keys().map(|s| (s, 0.0)).collect(),
                default_prob: 0.0,
            }
        };
        rows[from].insert(action, row);
    }

    TransitionModel {
        rows,
        default_weight,
        n_states: n,
    }
}

/// Build the emission model.
///
/// Every valid state gets a row, including states with no listed
/// observations. The total mass for a state uses `vocabulary_size`, the
/// number of distinct observation labels expected to exist, which may exceed
/// the number listed for any single state.
pub fn build_emissions(
    raw: &[EmissionWeight],
    states: &StateSpace,
    vocabulary_size: usize,
    default_weight: f64,
) -> EmissionModel {
    let n = states.len();
    let mut grouped: Vec<HashMap<String, f64>> = vec![HashMap::new(); n];
    for ew in raw {
        if let Some(idx) = states.index_of(&ew.state) {
            grouped[idx].insert(ew.observation.clone(), ew.weight);
        }
    }

    let rows = grouped
        .into_iter()
        .map(|obs| {
            let listed: f64 = obs.values().sum();
            let total = listed + default_weight * (vocabulary_size as f64 - obs.len() as f64);
            if total > 0.0 {
                EmissionRow {
                    probs: obs.into_iter().map(|(o, w)| (o, w / total)).collect(),
                    default_prob: default_weight / total,
                }
            } else {
                EmissionRow {
                    probs: obs.into_keys().map(|o| (o, 0.0)).collect(),
                    default_prob: 0.0,
                }
            }
        })
        .collect();

    EmissionModel { rows }
}
