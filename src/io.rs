//! File-format adapter for the weight and sequence files.
//!
//! Formats are adapter-owned; the core only sees the tuples defined in
//! [`crate::builder`] and [`crate::model`]. Each input file is a header line,
//! one line of counts/defaults, then data lines. Fields are shell-style
//! tokens: whitespace-separated, with double- or single-quoted fields kept
//! whole and their quotes stripped. Blank lines are ignored.

use crate::builder::{EmissionWeight, TransitionWeight};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Faults reading or writing the adapter's file formats.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: line {line}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

/// Split a line into fields, honoring single and double quotes.
fn fields(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    for c in line.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else {
                    cur.push(c);
                }
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    out.push(std::mem::take(&mut cur));
                    in_token = false;
                }
            }
            None => {
                cur.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        out.push(cur);
    }
    out
}

/// Non-blank lines of a file, each with its 1-based line number.
fn data_lines(path: &Path) -> Result<Vec<(usize, String)>, AdapterError> {
    let text = fs::read_to_string(path).map_err(|source| AdapterError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .enumerate()
        .filter_map(|(i, l)| {
            let l = l.trim();
            if l.is_empty() {
                None
            } else {
                Some((i + 1, l.to_string()))
            }
        })
        .collect())
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> AdapterError {
    AdapterError::Malformed {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

fn parse_field<T: std::str::FromStr>(
    path: &Path,
    line: usize,
    tokens: &[String],
    idx: usize,
    what: &str,
) -> Result<T, AdapterError> {
    let raw = tokens
        .get(idx)
        .ok_or_else(|| malformed(path, line, format!("missing {what} (field {})", idx + 1)))?;
    raw.parse()
        .map_err(|_| malformed(path, line, format!("invalid {what}: {raw:?}")))
}

/// Read initial-state weights: `(label, weight)` pairs in file order.
///
/// The second non-blank line's first field is the state count; exactly that
/// many data lines follow, each `state weight`.
pub fn read_state_weights(path: impl AsRef<Path>) -> Result<Vec<(String, f64)>, AdapterError> {
    let path = path.as_ref();
    let lines = data_lines(path)?;
    if lines.len() < 2 {
        return Err(malformed(path, lines.len(), "missing header or count line"));
    }
    let (count_line, count_text) = &lines[1];
    let count: usize = parse_field(path, *count_line, &fields(count_text), 0, "state count")?;
    let mut out = Vec::with_capacity(count);
    for (line_no, text) in lines.iter().skip(2).take(count) {
        let tokens = fields(text);
        let weight: f64 = parse_field(path, *line_no, &tokens, 1, "weight")?;
        out.push((tokens[0].clone(), weight));
    }
    if out.len() < count {
        return Err(malformed(
            path,
            lines.last().map(|(n, _)| *n).unwrap_or(0),
            format!("expected {count} state lines, found {}", out.len()),
        ));
    }
    Ok(out)
}

/// Read transition weights and the global default weight (fourth field of the
/// count line). Data lines are `from action to weight`, to end of file.
pub fn read_transition_weights(
    path: impl AsRef<Path>,
) -> Result<(Vec<TransitionWeight>, f64), AdapterError> {
    let path = path.as_ref();
    let lines = data_lines(path)?;
    if lines.len() < 2 {
        return Err(malformed(path, lines.len(), "missing header or count line"));
    }
    let (count_line, count_text) = &lines[1];
    let default_weight: f64 =
        parse_field(path, *count_line, &fields(count_text), 3, "default weight")?;
    let mut out = Vec::new();
    for (line_no, text) in lines.iter().skip(2) {
        let tokens = fields(text);
        let weight: f64 = parse_field(path, *line_no, &tokens, 3, "weight")?;
        out.push(TransitionWeight::new(
            tokens[0].clone(),
            tokens[1].clone(),
            tokens[2].clone(),
            weight,
        ));
    }
    Ok((out, default_weight))
}

/// Read emission weights, the observation vocabulary size (third field of the
/// count line) and the default weight (fourth field). Data lines are
/// `state observation weight`, to end of file.
pub fn read_emission_weights(
    path: impl AsRef<Path>,
) -> Result<(Vec<EmissionWeight>, usize, f64), AdapterError> {
    let path = path.as_ref();
    let lines = data_lines(path)?;
    if lines.len() < 2 {
        return Err(malformed(path, lines.len(), "missing header or count line"));
    }
    let (count_line, count_text) = &lines[1];
    let count_tokens = fields(count_text);
    let vocabulary_size: usize =
        parse_field(path, *count_line, &count_tokens, 2, "vocabulary size")?;
    let default_weight: f64 = parse_field(path, *count_line, &count_tokens, 3, "default weight")?;
    let mut out = Vec::new();
    for (line_no, text) in lines.iter().skip(2) {
        let tokens = fields(text);
        let weight: f64 = parse_field(path, *line_no, &tokens, 2, "weight")?;
        out.push(EmissionWeight::new(
            tokens[0].clone(),
            tokens[1].clone(),
            weight,
        ));
    }
    Ok((out, vocabulary_size, default_weight))
}

/// Read the decoding input: `observation [action]` lines, one per step. A
/// missing action field becomes `None` (the decoder's no-op).
pub fn read_observation_actions(
    path: impl AsRef<Path>,
) -> Result<(Vec<String>, Vec<Option<String>>), AdapterError> {
    let path = path.as_ref();
    let lines = data_lines(path)?;
    if lines.len() < 2 {
        return Err(malformed(path, lines.len(), "missing header or count line"));
    }
    let (count_line, count_text) = &lines[1];
    let count: usize = parse_field(path, *count_line, &fields(count_text), 0, "step count")?;
    let mut observations = Vec::with_capacity(count);
    let mut actions = Vec::with_capacity(count);
    for (line_no, text) in lines.iter().skip(2).take(count) {
        let tokens = fields(text);
        if tokens.is_empty() {
            return Err(malformed(path, *line_no, "missing observation"));
        }
        observations.push(tokens[0].clone());
        actions.push(tokens.get(1).cloned());
    }
    if observations.len() < count {
        return Err(malformed(
            path,
            lines.last().map(|(n, _)| *n).unwrap_or(0),
            format!("expected {count} step lines, found {}", observations.len()),
        ));
    }
    Ok((observations, actions))
}

/// Write the decoded path: `states`, the count, then each label quoted on its
/// own line with no trailing newline after the last.
pub fn write_state_path(path: impl AsRef<Path>, states: &[String]) -> Result<(), AdapterError> {
    let path = path.as_ref();
    let mut out = String::from("states\n");
    out.push_str(&states.len().to_string());
    out.push('\n');
    for (i, s) in states.iter().enumerate() {
        out.push('"');
        out.push_str(s);
        out.push('"');
        if i != states.len() - 1 {
            out.push('\n');
        }
    }
    fs::write(path, out).map_err(|source| AdapterError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_handles_quotes_and_whitespace() {
        assert_eq!(fields("a b  c"), vec!["a", "b", "c"]);
        assert_eq!(fields(r#""two words" x"#), vec!["two words", "x"]);
        assert_eq!(fields("'single quoted' y"), vec!["single quoted", "y"]);
        assert_eq!(fields("  "), Vec::<String>::new());
        assert_eq!(fields(r#""""#), vec![""]);
    }

    #[test]
    fn state_weights_roundtrip() {
        let dir = std::env::temp_dir().join("hmm_decode_io_test_sw");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("state_weights.txt");
        std::fs::write(&file, "state_weights\n2 1\n\"A\" 3\n\"B\" 1\n").unwrap();
        let weights = read_state_weights(&file).unwrap();
        assert_eq!(
            weights,
            vec![("A".to_string(), 3.0), ("B".to_string(), 1.0)]
        );
    }

    #[test]
    fn transition_weights_parse_default() {
        let dir = std::env::temp_dir().join("hmm_decode_io_test_tw");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("state_action_state_weights.txt");
        std::fs::write(
            &file,
            "state_action_state_weights\n1 2 2 1\n\"A\" \"move\" \"B\" 3\n",
        )
        .unwrap();
        let (raw, default_weight) = read_transition_weights(&file).unwrap();
        assert_eq!(default_weight, 1.0);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].from, "A");
        assert_eq!(raw[0].action, "move");
        assert_eq!(raw[0].to, "B");
        assert_eq!(raw[0].weight, 3.0);
    }

    #[test]
    fn observation_actions_with_missing_action() {
        let dir = std::env::temp_dir().join("hmm_decode_io_test_oa");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("observation_actions.txt");
        std::fs::write(&file, "observation_actions\n2\n\"wall\" \"move\"\n\"wall\"\n").unwrap();
        let (obs, acts) = read_observation_actions(&file).unwrap();
        assert_eq!(obs, vec!["wall".to_string(), "wall".into()]);
        assert_eq!(acts, vec![Some("move".to_string()), None]);
    }

    #[test]
    fn write_state_path_format() {
        let dir = std::env::temp_dir().join("hmm_decode_io_test_out");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("states.txt");
        write_state_path(&file, &["A".to_string(), "B".to_string()]).unwrap();
        let text = std::fs::read_to_string(&file).unwrap();
        assert_eq!(text, "states\n2\n\"A\"\n\"B\"");
    }

    #[test]
    fn malformed_count_line_is_positioned() {
        let dir = std::env::temp_dir().join("hmm_decode_io_test_bad");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("state_weights.txt");
        std::fs::write(&file, "state_weights\nnot_a_number\n").unwrap();
        let err = read_state_weights(&file).unwrap_err();
        assert!(matches!(err, AdapterError::Malformed { line: 2, .. }));
    }
}
