//! CLI driver: read the four weight/sequence files, decode, write the path.
//!
//! Run with:
//! `cargo run --bin decode -- [--dir DIR] [--out FILE]`

use std::env;
use std::error::Error;
use std::path::PathBuf;

use hmm_decode::{
    build_emissions, build_initial, build_transitions, io, DecodingInput, HmmModel, Viterbi,
};

struct Options {
    dir: PathBuf,
    out: PathBuf,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut dir = PathBuf::from(".");
        let mut out = PathBuf::from("states.txt");
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dir" => {
                    dir = PathBuf::from(args.next().ok_or("--dir requires a value")?);
                }
                "--out" => {
                    out = PathBuf::from(args.next().ok_or("--out requires a value")?);
                }
                "-h" | "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(Self { dir, out })
    }

    fn print_help() {
        eprintln!("usage: decode [--dir DIR] [--out FILE]");
        eprintln!();
        eprintln!("Reads state_weights.txt, state_action_state_weights.txt,");
        eprintln!("state_observation_weights.txt and observation_actions.txt from DIR");
        eprintln!("(default: current directory), decodes the most likely state path");
        eprintln!("and writes it to FILE (default: states.txt).");
    }
}

fn run(options: &Options) -> Result<(), Box<dyn Error>> {
    let dir = &options.dir;

    let weights = io::read_state_weights(dir.join("state_weights.txt"))?;
    let (states, initial) = build_initial(&weights)?;

    let (raw_transitions, transition_default) =
        io::read_transition_weights(dir.join("state_action_state_weights.txt"))?;
    let transitions = build_transitions(&raw_transitions, &states, transition_default);

    let (raw_emissions, vocabulary_size, emission_default) =
        io::read_emission_weights(dir.join("state_observation_weights.txt"))?;
    let emissions = build_emissions(&raw_emissions, &states, vocabulary_size, emission_default);

    let (observations, mut actions) =
        io::read_observation_actions(dir.join("observation_actions.txt"))?;
    // A trailing empty action column marks "no action after the last step";
    // the decoder expects N−1 actions, so trim it.
    if matches!(actions.last(), Some(None)) && actions.len() >= observations.len() {
        actions.pop();
    }

    let model = HmmModel {
        states,
        initial,
        transitions,
        emissions,
    };
    let path = Viterbi::new(&model).decode(&DecodingInput::new(observations, actions));

    io::write_state_path(&options.out, &path.states)?;
    eprintln!(
        "decode: wrote {} states to {} (path probability {:.6e})",
        path.states.len(),
        options.out.display(),
        path.score
    );
    Ok(())
}

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("decode: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };
    if let Err(err) = run(&options) {
        eprintln!("decode: {err}");
        std::process::exit(2);
    }
}
