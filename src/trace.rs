//! Calculation protocol
//!
//! Every solver writes the intermediate values it used, in order, so the
//! engineer signing off a design can follow the numbers line by line. The
//! protocol is kept whether the calculation succeeds or fails.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered, human-readable trace lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Protocol {
    lines: Vec<String>,
}

impl Protocol {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Start a protocol with a title line
    pub fn titled(title: impl Into<String>) -> Self {
        let mut protocol = Self::new();
        protocol.line(title);
        protocol
    }

    pub fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// A framed section heading
    pub fn heading(&mut self, title: &str) {
        let rule = "=".repeat(46);
        self.lines.push(rule.clone());
        self.lines.push(title.to_string());
        self.lines.push(rule);
    }

    /// Append another protocol, indenting its lines
    pub fn extend_indented(&mut self, other: &Protocol, indent: &str) {
        for line in &other.lines {
            if line.is_empty() {
                self.lines.push(String::new());
            } else {
                self.lines.push(format!("{indent}{line}"));
            }
        }
    }

    pub fn extend(&mut self, other: Protocol) {
        self.lines.extend(other.lines);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// An outcome together with the protocol written while producing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traced<T, E> {
    pub outcome: Result<T, E>,
    pub protocol: Protocol,
}

impl<T, E: fmt::Display> Traced<T, E> {
    pub fn ok(value: T, protocol: Protocol) -> Self {
        Self {
            outcome: Ok(value),
            protocol,
        }
    }

    pub fn fail(error: E, protocol: Protocol) -> Self {
        Self {
            outcome: Err(error),
            protocol,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&E> {
        self.outcome.as_ref().err()
    }

    /// Failure message for display, `None` on success
    pub fn message(&self) -> Option<String> {
        self.error().map(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_keeps_order() {
        let mut protocol = Protocol::titled("Vertical loads");
        protocol.line("L = N_Ed / (τ · U)");
        protocol.blank();
        protocol.heading("Table");

        assert_eq!(protocol.len(), 6);
        assert_eq!(protocol.lines()[0], "Vertical loads");
        assert_eq!(protocol.lines()[2], "");
        assert_eq!(protocol.lines()[4], "Table");
    }

    #[test]
    fn test_indented_extend_skips_blank_lines() {
        let mut inner = Protocol::titled("a");
        inner.blank();
        let mut outer = Protocol::new();
        outer.extend_indented(&inner, "  ");
        assert_eq!(outer.lines(), &["  a".to_string(), String::new()]);
    }

    #[test]
    fn test_failure_keeps_protocol() {
        let traced: Traced<f64, String> =
            Traced::fail("no convergence".to_string(), Protocol::titled("start"));
        assert!(!traced.is_ok());
        assert_eq!(traced.message().as_deref(), Some("no convergence"));
        assert_eq!(traced.protocol.len(), 1);
    }

    #[test]
    fn test_protocol_serializes_as_list() {
        let protocol = Protocol::titled("x");
        assert_eq!(serde_json::to_string(&protocol).unwrap(), "[\"x\"]");
    }
}
