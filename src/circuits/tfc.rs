// src/circuits/tfc.rs

//! Reader and writer for the line-oriented TFC circuit format.
//!
//! ```text
//! # circuit 'adder': 1 gates, quantum cost 5, cnot cost 5, ancillas 0
//! .v a0,a1,b0
//! .i a0,a1,b0
//! .o a0,a1,b0
//! BEGIN
//! T3 a0,a1',b0
//! END
//! ```
//!
//! `T<k>` names a gate over `k` lines: `k - 1` controls then the target. A
//! trailing `'` marks a negative control. Lines starting with `#` are comments.

use super::{Circuit, CircuitBuilder};
use crate::core::{LineId, RevError};
use crate::operations::{sequence_cnot_cost, sequence_cost, Control, Gate};
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// Serializes the flattened gate list of `circuit`.
///
/// Lines are named `{register}{bit}`; if two lines would share a name (register
/// `a` of width 11 next to register `a1`), every line is named `b{index}` instead.
pub fn to_tfc(circuit: &Circuit) -> String {
    let mut names: Vec<String> = (0..circuit.num_lines()).map(|l| circuit.line_name(LineId(l))).collect();
    let unique: HashSet<&String> = names.iter().collect();
    if unique.len() != names.len() {
        names = (0..circuit.num_lines()).map(|l| LineId(l).to_string()).collect();
    }

    let gates = circuit.flatten();
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "# circuit '{}': {} gates, quantum cost {}, cnot cost {}, ancillas {}",
        circuit.name(),
        gates.len(),
        sequence_cost(&gates),
        sequence_cnot_cost(&gates),
        circuit.ancilla_count()
    );
    let data: Vec<&str> = circuit.data_lines().iter().map(|l| names[l.0].as_str()).collect();
    let _ = writeln!(out, ".v {}", names.join(","));
    let _ = writeln!(out, ".i {}", data.join(","));
    let _ = writeln!(out, ".o {}", data.join(","));
    out.push_str("BEGIN\n");
    for gate in &gates {
        let mut parts: Vec<String> = gate
            .controls()
            .iter()
            .map(|c| format!("{}{}", names[c.line.0], if c.positive { "" } else { "'" }))
            .collect();
        parts.push(names[gate.target().0].clone());
        let _ = writeln!(out, "T{} {}", gate.control_count() + 1, parts.join(","));
    }
    out.push_str("END\n");
    out
}

fn format_error(line: usize, message: impl Into<String>) -> RevError {
    RevError::Format { line, message: message.into() }
}

/// Parses TFC text into a flat circuit with one data register `v` covering every
/// line named in `.v`, in declaration order.
pub fn from_tfc(text: &str) -> Result<Circuit, RevError> {
    let mut variables: Option<HashMap<String, LineId>> = None;
    let mut builder: Option<CircuitBuilder> = None;
    let mut in_body = false;
    let mut finished = false;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if finished {
            return Err(format_error(line_no, "content after END"));
        }

        if !in_body {
            if let Some(rest) = directive(line, ".v") {
                let mut map = HashMap::new();
                for (i, name) in split_names(rest).into_iter().enumerate() {
                    if map.insert(name.to_string(), LineId(i)).is_some() {
                        return Err(format_error(line_no, format!("variable '{}' declared twice", name)));
                    }
                }
                let mut b = CircuitBuilder::new("tfc");
                b.data("v", map.len());
                variables = Some(map);
                builder = Some(b);
            } else if let Some(rest) = directive(line, ".i").or_else(|| directive(line, ".o")) {
                let vars = variables.as_ref().ok_or_else(|| format_error(line_no, "directive before .v"))?;
                if let Some(unknown) = split_names(rest).into_iter().find(|n| !vars.contains_key(*n)) {
                    return Err(format_error(line_no, format!("unknown variable '{}'", unknown)));
                }
            } else if line == "BEGIN" {
                if variables.is_none() {
                    return Err(format_error(line_no, "BEGIN before .v"));
                }
                in_body = true;
            } else if line.starts_with('.') {
                // Other directives (.c constants, .ol garbage) carry no gate semantics.
                continue;
            } else {
                return Err(format_error(line_no, format!("unexpected '{}' before BEGIN", line)));
            }
            continue;
        }

        if line == "END" {
            in_body = false;
            finished = true;
            continue;
        }
        let (Some(vars), Some(b)) = (variables.as_ref(), builder.as_mut()) else {
            return Err(format_error(line_no, "gate before .v"));
        };
        let gate = parse_gate(line, line_no, vars)?;
        b.gate(gate).map_err(|e| format_error(line_no, e.to_string()))?;
    }

    if !finished {
        return Err(format_error(text.lines().count(), "missing END"));
    }
    builder.map(CircuitBuilder::build).ok_or_else(|| format_error(0, "missing .v"))
}

/// `rest` of `line` when it is the directive `tag` followed by whitespace or nothing.
fn directive<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

fn split_names(rest: &str) -> Vec<&str> {
    rest.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

fn parse_gate(line: &str, line_no: usize, vars: &HashMap<String, LineId>) -> Result<Gate, RevError> {
    let (head, operands) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| format_error(line_no, format!("gate '{}' has no operands", line)))?;
    let arity: usize = head
        .strip_prefix('T')
        .and_then(|k| k.parse().ok())
        .ok_or_else(|| format_error(line_no, format!("unknown gate '{}'", head)))?;

    let names = split_names(operands);
    if names.len() != arity || arity == 0 {
        return Err(format_error(
            line_no,
            format!("gate {} expects {} operands, found {}", head, arity, names.len()),
        ));
    }

    let resolve = |name: &str| {
        vars.get(name)
            .copied()
            .ok_or_else(|| format_error(line_no, format!("unknown variable '{}'", name)))
    };

    let (target_name, control_names) = names.split_last().ok_or_else(|| format_error(line_no, "empty gate"))?;
    if target_name.ends_with('\'') {
        return Err(format_error(line_no, "target cannot be negated"));
    }
    let target = resolve(*target_name)?;
    let controls = control_names
        .iter()
        .map(|n| match n.strip_suffix('\'') {
            Some(base) => resolve(base).map(Control::neg),
            None => resolve(*n).map(Control::pos),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Gate::new(target, controls).map_err(|e| format_error(line_no, e.to_string()))
}
