//! # xeger-rs: regular expressions as automata, run backwards
//!
//! **`xeger-rs`** compiles a regular expression into a minimal finite automaton and then walks
//! that automaton at random to produce strings the expression matches. The name is "regex"
//! spelled backwards: instead of asking whether a string matches, we ask for a string that does.
//!
//! ## How it works
//!
//! A pattern goes through a fixed pipeline:
//!
//! 1. **Parse** the pattern into a [`RegExp`][crate::regexp::RegExp] tree.
//! 2. **Construct** an automaton bottom-up from the tree using the primitives in
//!    [`basic_automata`] and the combinators in [`basic_operations`].
//! 3. **Minimize** it (Hopcroft by default, see [`minimization`]).
//! 4. **Generate** strings with a random walk ([`generator`]).
//!
//! Automata accepting exactly one string stay in a compact *singleton* form until an
//! operation needs a real graph. Graphs keep their states in an arena addressed by
//! [`StateId`][crate::state::StateId] handles, so every transformation is an arena-to-arena
//! rebuild with no shared pointers.
//!
//! ## Basic Usage
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use xeger_rs::{compile, generate, matches};
//!
//! // 1. Compile a pattern
//! let a = compile("(foo|ba[rz])-[0-9]{2,4}").unwrap();
//!
//! // 2. Draw a few strings
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! for _ in 0..10 {
//!     let s = generate(&a, &mut rng).unwrap();
//!     assert!(matches(&a, &s));
//! }
//!
//! // 3. Automata are values: combine them with operators
//! let b = compile("ba.-.*").unwrap();
//! let both = &a & &b;
//! assert!(both.run("baz-123"));
//! assert!(!both.run("foo-123"));
//! ```
//!
//! ## Core Components
//!
//! - **[`xeger`]**: the entry points [`compile`], [`generate`], [`matches`] and the [`Xeger`] handle.
//! - **[`regexp`]**: the pattern grammar, parser and tree-to-automaton compiler.
//! - **[`automaton`]**: the [`Automaton`] type and its graph representation.
//! - **[`minimization`]**: Hopcroft, Brzozowski and Huffman minimization.
//! - **[`strings`]**: shortest examples, finiteness and counting of accepted strings.
//! - **[`dot`]**: Graphviz export.

pub mod automaton;
pub mod basic_automata;
pub mod basic_operations;
pub mod config;
pub mod dot;
pub mod error;
pub mod generator;
pub mod minimization;
pub mod operators;
pub mod regexp;
pub mod state;
pub mod state_pair;
pub mod state_set;
pub mod strings;
pub mod xeger;

pub use crate::automaton::Automaton;
pub use crate::error::{Error, Result, SyntaxError};
pub use crate::xeger::{compile, generate, matches, Xeger};
