//! Net timing weights and the `.wts` parser.
//!
//! A `.wts` file assigns a floating-point weight to nets, one
//! `<net> <weight>` entry per line. Weights are kept by name so a weights
//! file stays inspectable without the netlist; resolving against a netlist
//! flags entries for nets that do not exist.

use crate::diag::{Diagnostic, DiagnosticSink};
use crate::dialect::Dialect;
use crate::error::FormatError;
use crate::netlist::Netlist;
use crate::parse::{parse_f64, LineReader};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-net timing weights in file order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetWeights {
    entries: Vec<(String, f64)>,
    #[serde(skip)]
    by_name: HashMap<String, f64>,
}

impl NetWeights {
    /// Returns the weight for a net, if one was given.
    pub fn get(&self, net: &str) -> Option<f64> {
        self.by_name.get(net).copied()
    }

    /// Iterates over the entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, w)| (name.as_str(), *w))
    }

    /// Returns the number of weighted nets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no weights were given.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Warns about entries that name nets absent from the netlist.
    pub fn resolve(&self, netlist: &Netlist, sink: &DiagnosticSink) {
        for (name, _) in &self.entries {
            if netlist.lookup_net(name).is_none() {
                sink.emit(Diagnostic::warning(format!(
                    "weight given for net '{name}' which the netlist does not define"
                )));
            }
        }
    }

    /// Rebuilds the name index after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.by_name.clear();
        for (name, w) in &self.entries {
            self.by_name.insert(name.clone(), *w);
        }
    }
}

/// Parses a `.wts` file.
///
/// # Errors
///
/// Returns [`FormatError`] on malformed lines, non-numeric or negative
/// weights, or duplicate net entries.
pub fn parse_wts(text: &str, dialect: &Dialect) -> Result<NetWeights, FormatError> {
    let mut entries = Vec::new();
    let mut by_name = HashMap::new();

    for (line_no, line) in LineReader::new(text, dialect) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(FormatError::at_line(
                line_no,
                "expected '<net> <weight>'".to_string(),
            ));
        }
        let name = tokens[0];
        if by_name.contains_key(name) {
            return Err(FormatError::at_line(
                line_no,
                format!("duplicate weight entry for net '{name}'"),
            ));
        }
        let weight = parse_f64(tokens[1], line_no, "net weight")?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(FormatError::at_line(
                line_no,
                format!("net weight must be a finite non-negative number, got '{}'", tokens[1]),
            ));
        }
        by_name.insert(name.to_string(), weight);
        entries.push((name.to_string(), weight));
    }

    Ok(NetWeights { entries, by_name })
}

/// Serializes weights back to `.wts` text in file order.
pub fn write_wts(weights: &NetWeights) -> String {
    let mut out = String::new();
    for (name, w) in weights.iter() {
        out.push_str(&format!("{name} {w}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::parse_lib;
    use crate::netlist::{parse_nets, parse_nodes};

    #[test]
    fn parse_basic() {
        let weights = parse_wts("n1 1.5\nn2 0.25\n", &Dialect::default()).unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights.get("n1"), Some(1.5));
        assert_eq!(weights.get("n3"), None);
    }

    #[test]
    fn duplicate_entry_fails() {
        let err = parse_wts("n1 1.0\nn1 2.0\n", &Dialect::default()).unwrap_err();
        assert!(err.message.contains("duplicate weight entry for net 'n1'"));
    }

    #[test]
    fn non_numeric_weight_fails() {
        let err = parse_wts("n1 heavy\n", &Dialect::default()).unwrap_err();
        assert!(err.message.contains("expected a number for net weight"));
    }

    #[test]
    fn negative_weight_fails() {
        let err = parse_wts("n1 -0.5\n", &Dialect::default()).unwrap_err();
        assert!(err.message.contains("finite non-negative"));
    }

    #[test]
    fn resolve_warns_on_unknown_net() {
        let dialect = Dialect::default();
        let library = parse_lib(
            "CELL INV\n PIN A INPUT\n PIN Y OUTPUT\nEND CELL\n",
            &dialect,
        )
        .unwrap();
        let mut netlist = parse_nodes("u0 INV\nu1 INV\n", &library, &dialect).unwrap();
        parse_nets(
            "net n1 2\n\tu0 Y\n\tu1 A\nendnet\n",
            &library,
            &mut netlist,
            &dialect,
        )
        .unwrap();

        let weights = parse_wts("n1 1.0\nphantom 2.0\n", &dialect).unwrap();
        let sink = DiagnosticSink::new();
        weights.resolve(&netlist, &sink);
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'phantom'"));
        assert!(!sink.has_errors());
    }

    #[test]
    fn write_roundtrip() {
        let dialect = Dialect::default();
        let weights = parse_wts("n1 1.5\nn2 0.25\n", &dialect).unwrap();
        let reparsed = parse_wts(&write_wts(&weights), &dialect).unwrap();
        assert_eq!(reparsed.get("n1"), Some(1.5));
        assert_eq!(reparsed.get("n2"), Some(0.25));
    }
}
