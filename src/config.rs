//! Configuration of parsing, compilation and minimization.
//!
//! All options are plain values: there is no process-wide state, so compilations with
//! different settings can run side by side on different threads.
//!
//! # Examples
//!
//! ```
//! use xeger_rs::config::{CompileOptions, MinimizationAlgorithm, SyntaxFlags};
//!
//! let options = CompileOptions::default()
//!     .with_syntax(SyntaxFlags::INTERSECTION | SyntaxFlags::COMPLEMENT)
//!     .with_minimization(MinimizationAlgorithm::Brzozowski);
//! assert!(options.syntax.contains(SyntaxFlags::COMPLEMENT));
//! assert!(!options.syntax.contains(SyntaxFlags::ANYSTRING));
//! ```

use std::fmt::{self, Display, Formatter};
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::automaton::Automaton;

/// Optional syntax constructs enabled in the parser.
///
/// With a construct disabled, its metacharacter is parsed as a literal character.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SyntaxFlags(u32);

impl SyntaxFlags {
    /// `&` intersection.
    pub const INTERSECTION: Self = Self(0x0001);
    /// `~` complement.
    pub const COMPLEMENT: Self = Self(0x0002);
    /// `#` empty language.
    pub const EMPTY: Self = Self(0x0004);
    /// `@` any string.
    pub const ANYSTRING: Self = Self(0x0008);
    /// `<name>` named automaton.
    pub const AUTOMATON: Self = Self(0x0010);
    /// `<n-m>` numeric interval.
    pub const INTERVAL: Self = Self(0x0020);
    pub const ALL: Self = Self(0xffff);
    pub const NONE: Self = Self(0x0000);
    /// Everything but `@`, which then stands for itself as in e-mail addresses.
    pub const ALL_EXCEPT_ANY_STRING: Self = Self(0xffff & !0x0008);

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for SyntaxFlags {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for SyntaxFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SyntaxFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for SyntaxFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Algorithm used to minimize automata.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum MinimizationAlgorithm {
    /// Partition refinement, `O(n log n)`.
    #[default]
    Hopcroft,
    /// Reverse and determinize, twice.
    Brzozowski,
    /// Pairwise distinguishability marking, `O(n^2)`.
    Huffman,
}

impl Display for MinimizationAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            MinimizationAlgorithm::Hopcroft => "hopcroft",
            MinimizationAlgorithm::Brzozowski => "brzozowski",
            MinimizationAlgorithm::Huffman => "huffman",
        };
        write!(f, "{}", name)
    }
}

/// Whether operands held by the caller may be consumed by an operation.
///
/// The combinators of [`basic_operations`][crate::basic_operations] take their operands
/// by value. Code that keeps an automaton in place (a tree walk, a cache) obtains an
/// operand from it with [`acquire`][MutationPolicy::acquire].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum MutationPolicy {
    /// Hand out clones; the held automaton is never altered.
    #[default]
    Preserve,
    /// Hand out the automaton itself, leaving the empty language behind.
    Mutate,
}

impl MutationPolicy {
    /// Obtain an operand from `a` according to the policy.
    pub fn acquire(self, a: &mut Automaton) -> Automaton {
        match self {
            MutationPolicy::Preserve => a.clone(),
            MutationPolicy::Mutate => std::mem::take(a),
        }
    }
}

/// Options of [`compile_with`][crate::xeger::compile_with].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CompileOptions {
    /// Enabled syntax constructs (default: all).
    pub syntax: SyntaxFlags,
    /// Minimization algorithm (default: Hopcroft).
    pub minimization: MinimizationAlgorithm,
    /// Ownership of intermediate automata during the tree walk (default: `Mutate`).
    pub mutation: MutationPolicy,
    /// Whether to minimize every intermediate automaton (default: true).
    pub minimize: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            syntax: SyntaxFlags::ALL,
            minimization: MinimizationAlgorithm::Hopcroft,
            mutation: MutationPolicy::Mutate,
            minimize: true,
        }
    }
}

impl CompileOptions {
    pub fn with_syntax(mut self, syntax: SyntaxFlags) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn with_minimization(mut self, minimization: MinimizationAlgorithm) -> Self {
        self.minimization = minimization;
        self
    }

    pub fn with_mutation(mut self, mutation: MutationPolicy) -> Self {
        self.mutation = mutation;
        self
    }

    pub fn with_minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }
}
