//! Smoothed-count Hidden Markov Models with action-conditioned Viterbi decoding.
//!
//! This crate builds an HMM from sparse non-negative weights (pseudo-counts)
//! and decodes the most likely hidden-state sequence for a run of observations
//! interleaved with actions.
//!
//! ## Core idea
//! 1. Feed raw weights to the builder functions in [`builder`]. Smoothing
//!    assigns every unseen (state, action, next-state) or (state, observation)
//!    pair an explicit default probability, so model size stays proportional
//!    to the *observed* data rather than to `|S|²` or `|S| × vocabulary`.
//! 2. Assemble an [`HmmModel`] and hand it to [`Viterbi`] together with a
//!    [`DecodingInput`].
//! 3. The decoder returns the maximum-probability state path; unseen actions
//!    and observations degrade to default probabilities instead of failing.
//!
//! ## Quick start
//! ```
//! use hmm_decode::{
//!     build_emissions, build_initial, build_transitions, DecodingInput, EmissionWeight,
//!     HmmModel, TransitionWeight, Viterbi,
//! };
//!
//! let (states, initial) = build_initial(&[
//!     ("A".into(), 1.0),
//!     ("B".into(), 1.0),
//! ])?;
//! let transitions = build_transitions(
//!     &[TransitionWeight::new("A", "move", "B", 3.0)],
//!     &states,
//!     1.0,
//! );
//! let emissions = build_emissions(
//!     &[EmissionWeight::new("A", "see_wall", 9.0)],
//!     &states,
//!     2,
//!     1.0,
//! );
//! let model = HmmModel { states, initial, transitions, emissions };
//!
//! let input = DecodingInput::new(vec!["see_wall".into()], vec![]);
//! let path = Viterbi::new(&model).decode(&input);
//! assert_eq!(path.states, vec!["A".to_string()]);
//! # Ok::<(), hmm_decode::ConfigError>(())
//! ```
//!
//! ## Feature flags
//! - `parallel`: batch decoding over independent requests via rayon.
//! - `tracing`: trace spans around the decoder's forward pass.

pub mod builder;
pub mod decoder;
pub mod io;
pub mod model;

pub use crate::builder::{
    build_emissions, build_initial, build_transitions, ConfigError, EmissionWeight,
    TransitionWeight,
};
pub use crate::decoder::Viterbi;
pub use crate::model::{
    DecodedPath, DecodingInput, EmissionModel, HmmModel, InitialDistribution, StateSpace,
    TransitionModel, NO_OP_ACTION,
};
