//! Viterbi engine: maximum-probability state paths over a built model.
//!
//! Classic table-filling dynamic programming: a score table `V[t][s]` holding
//! the best probability of any path ending in state `s` at step `t`, and a
//! back-pointer table for reconstruction. O(N × |S|²) time, O(N × |S|) space.
//!
//! The decoder never errors. Every probability lookup defaults (see
//! [`crate::model`]), so unseen actions and observations degrade the path
//! score instead of aborting, and the returned path always has one label per
//! observation.

use crate::model::{DecodedPath, DecodingInput, HmmModel};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Decoder over a read-only model. Each decode owns its tables, so one
/// `Viterbi` can serve many independent requests, concurrently under the
/// `parallel` feature.
pub struct Viterbi<'m> {
    model: &'m HmmModel,
}

impl<'m> Viterbi<'m> {
    pub fn new(model: &'m HmmModel) -> Self {
        Self { model }
    }

    /// Decode one request into its most probable state path.
    ///
    /// Ties at every max are broken toward the state earlier in the canonical
    /// state order, via strict `>` scans. An empty observation sequence
    /// yields an empty path.
    pub fn decode(&self, input: &DecodingInput) -> DecodedPath {
        let n = input.observations.len();
        let n_states = self.model.states.len();
        if n == 0 || n_states == 0 {
            return DecodedPath {
                states: Vec::new(),
                score: 0.0,
            };
        }

        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("viterbi_decode", steps = n, states = n_states);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mut scores = vec![vec![0.0f64; n_states]; n];
        let mut back: Vec<Vec<Option<usize>>> = vec![vec![None; n_states]; n];

        for s in 0..n_states {
            scores[0][s] = self.model.initial.probability(s)
                * self
                    .model
                    .emissions
                    .probability(s, &input.observations[0]);
        }

        for t in 1..n {
            let action = input.action_into(t);
            let obs = &input.observations[t];
            for s_to in 0..n_states {
                let mut best = 0.0f64;
                let mut arg: Option<usize> = None;
                for s_from in 0..n_states {
                    let cand = scores[t - 1][s_from]
                        * self.model.transitions.probability(s_from, action, s_to);
                    if cand > best {
                        best = cand;
                        arg = Some(s_from);
                    }
                }
                scores[t][s_to] = best * self.model.emissions.probability(s_to, obs);
                back[t][s_to] = arg;
            }
        }

        // Termination: first maximal state in canonical order wins.
        let mut last = 0usize;
        let mut best = f64::NEG_INFINITY;
        for (s, &v) in scores[n - 1].iter().enumerate() {
            if v > best {
                best = v;
                last = s;
            }
        }

        // Walk back-pointers; an absent predecessor renders as the empty
        // marker and stays absent for the remainder of the walk.
        let mut indices: Vec<Option<usize>> = Vec::with_capacity(n);
        let mut cur = Some(last);
        indices.push(cur);
        for t in (1..n).rev() {
            cur = cur.and_then(|s| back[t][s]);
            indices.push(cur);
        }
        indices.reverse();

        let states = indices
            .into_iter()
            .map(|idx| match idx {
                Some(s) => self.model.states.label(s).to_string(),
                None => String::new(),
            })
            .collect();

        DecodedPath {
            states,
            score: scores[n - 1][last],
        }
    }

    /// Decode a batch of independent requests, in parallel when the
    /// `parallel` feature is enabled.
    pub fn decode_batch(&self, inputs: &[DecodingInput]) -> Vec<DecodedPath> {
        #[cfg(feature = "parallel")]
        {
            inputs.par_iter().map(|input| self.decode(input)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            inputs.iter().map(|input| self.decode(input)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_emissions, build_initial, build_transitions, EmissionWeight, TransitionWeight};
    use crate::model::HmmModel;

    fn wall_model() -> HmmModel {
        let (states, initial) =
            build_initial(&[("A".into(), 1.0), ("B".into(), 1.0)]).expect("valid weights");
        let transitions = build_transitions(
            &[TransitionWeight::new("A", "move", "B", 3.0)],
            &states,
            1.0,
        );
        let emissions = build_emissions(
            &[EmissionWeight::new("A", "see_wall", 9.0)],
            &states,
            2,
            1.0,
        );
        HmmModel {
            states,
            initial,
            transitions,
            emissions,
        }
    }

    #[test]
    fn single_step_picks_highest_initial_times_emission() {
        let model = wall_model();
        let input = DecodingInput::new(vec!["see_wall".into()], vec![]);
        let path = Viterbi::new(&model).decode(&input);
        // V[0][A] = 0.5 × 0.9 = 0.45, V[0][B] = 0.5 × 0.5 = 0.25
        assert_eq!(path.states, vec!["A".to_string()]);
        assert!((path.score - 0.45).abs() < 1e-12);
    }

    #[test]
    fn empty_observations_decode_to_empty_path() {
        let model = wall_model();
        let path = Viterbi::new(&model).decode(&DecodingInput::new(vec![], vec![]));
        assert!(path.states.is_empty());
        assert_eq!(path.score, 0.0);
    }

    #[test]
    fn missing_action_uses_noop() {
        let model = wall_model();
        // No (state, "N") pair trained, so every transition is uniform 1/2
        // and the path follows the emissions alone.
        let input = DecodingInput::new(vec!["see_wall".into(), "see_wall".into()], vec![None]);
        let path = Viterbi::new(&model).decode(&input);
        assert_eq!(path.states, vec!["A".to_string(), "A".into()]);
    }

    #[test]
    fn batch_matches_individual_decodes() {
        let model = wall_model();
        let decoder = Viterbi::new(&model);
        let inputs = vec![
            DecodingInput::new(vec!["see_wall".into()], vec![]),
            DecodingInput::new(
                vec!["see_wall".into(), "other".into()],
                vec![Some("move".into())],
            ),
        ];
        let batch = decoder.decode_batch(&inputs);
        assert_eq!(batch.len(), 2);
        for (got, input) in batch.iter().zip(&inputs) {
            assert_eq!(got, &decoder.decode(input));
        }
    }
}
