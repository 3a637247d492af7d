//! Automaton to DOT (Graphviz) conversion.
//!
//! # DOT Format
//!
//! The generated output follows these conventions:
//! - States are circles labeled with their handle; accepting states use `doublecircle`
//! - An invisible point node with an arrow marks the initial state
//! - Edges are labeled with their character interval, `a` or `a-z`
//! - The graph is laid out left to right
//!
//! Singletons are expanded into their chain of states for rendering.
//!
//! # Examples
//!
//! ```
//! use xeger_rs::xeger::compile;
//!
//! let a = compile("ab*").unwrap();
//! let dot = a.to_dot().unwrap();
//! assert!(dot.starts_with("digraph {"));
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::fmt::Write as _;

use crate::automaton::Automaton;
use crate::state::{write_char, Transition};

/// Configuration options for DOT output generation.
///
/// # Examples
///
/// ```
/// use xeger_rs::basic_automata::make_char_range;
/// use xeger_rs::dot::DotConfig;
///
/// let a = make_char_range('a', 'z');
/// let config = DotConfig {
///     rankdir: "TB",
///     ..DotConfig::default()
/// };
/// let dot = a.to_dot_with_config(&config).unwrap();
/// assert!(dot.contains("rankdir=TB"));
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Layout direction (default: "LR")
    pub rankdir: &'static str,
    /// Shape for rejecting states (default: "circle")
    pub state_shape: &'static str,
    /// Shape for accepting states (default: "doublecircle")
    pub accept_shape: &'static str,
    /// Style for transitions (default: "solid")
    pub edge_style: &'static str,
    /// Whether to label states with their handle (default: true)
    pub show_state_ids: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            rankdir: "LR",
            state_shape: "circle",
            accept_shape: "doublecircle",
            edge_style: "solid",
            show_state_ids: true,
        }
    }
}

fn edge_label(t: &Transition) -> Result<String, std::fmt::Error> {
    let mut label = String::new();
    write_char(&mut label, t.min())?;
    if t.min() != t.max() {
        label.push('-');
        write_char(&mut label, t.max())?;
    }
    // Escape for a quoted DOT string.
    Ok(label.replace('\\', "\\\\"))
}

impl Automaton {
    /// Converts the automaton to DOT format with the default configuration.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the automaton to DOT format with a custom configuration.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let g = self.to_graph();

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "rankdir={};", config.rankdir)?;
        writeln!(dot, "initial [shape=point];")?;

        for s in g.states() {
            let shape = if g.state(s).is_accept() {
                config.accept_shape
            } else {
                config.state_shape
            };
            let label = if config.show_state_ids { s.to_string() } else { String::new() };
            writeln!(dot, "{} [shape={}, label=\"{}\"];", s, shape, label)?;
        }

        writeln!(dot, "initial -> {};", g.initial())?;
        for s in g.states() {
            for t in g.state(s).sorted_transitions(true) {
                writeln!(
                    dot,
                    "{} -> {} [label=\"{}\", style={}];",
                    s,
                    t.to(),
                    edge_label(&t)?,
                    config.edge_style
                )?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::basic_automata::{make_char_range, make_empty, make_string};
    use crate::basic_operations::{concatenate, repeat};

    #[test]
    fn test_to_dot_basic() {
        let a = concatenate(vec![make_string("a"), repeat(make_char_range('0', '9'))]);
        let dot = a.to_dot().unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("initial -> 0;"));
        assert!(dot.contains("[label=\"0-9\", style=solid]"));
        assert!(dot.contains("shape=doublecircle"));
    }

    #[test]
    fn test_to_dot_singleton() {
        let dot = make_string("ab").to_dot().unwrap();
        assert!(dot.contains("0 -> 1 [label=\"a\""));
        assert!(dot.contains("1 -> 2 [label=\"b\""));
        assert!(dot.contains("2 [shape=doublecircle"));
    }

    #[test]
    fn test_to_dot_empty_language() {
        let dot = make_empty().to_dot().unwrap();
        assert!(dot.contains("0 [shape=circle"));
        assert!(!dot.contains("label=\"a"));
    }

    #[test]
    fn test_escaped_labels() {
        let dot = make_char_range('\n', 'z').to_dot().unwrap();
        assert!(dot.contains("label=\"\\\\u{000a}-z\""));
    }

    #[test]
    fn test_custom_config() {
        let config = DotConfig {
            show_state_ids: false,
            edge_style: "dashed",
            ..DotConfig::default()
        };
        let dot = make_string("a").to_dot_with_config(&config).unwrap();
        assert!(dot.contains("0 [shape=circle, label=\"\"];"));
        assert!(dot.contains("style=dashed"));
    }
}
