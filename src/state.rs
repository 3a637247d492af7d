//! States and interval transitions.
//!
//! A [`State`] lives inside the arena of exactly one automaton and is addressed by a
//! lightweight [`StateId`] handle. Transitions are labeled with an inclusive character
//! interval `[min, max]` and point to a destination handle in the same arena.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// Smallest character of the alphabet.
pub const MIN_CHAR: char = '\0';

/// Largest character of the alphabet.
pub const MAX_CHAR: char = char::MAX;

/// A handle of a state inside the arena of one automaton.
///
/// Handles are only meaningful for the automaton that produced them. Algorithms that
/// build a fresh graph always hand out fresh handles.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StateId(u32);

impl StateId {
    pub const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Return the arena index of the state.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The character following `c`, skipping the surrogate gap.
pub fn char_succ(c: char) -> Option<char> {
    match c {
        '\u{D7FF}' => Some('\u{E000}'),
        MAX_CHAR => None,
        _ => char::from_u32(c as u32 + 1),
    }
}

/// The character preceding `c`, skipping the surrogate gap.
pub fn char_pred(c: char) -> Option<char> {
    match c {
        '\u{E000}' => Some('\u{D7FF}'),
        MIN_CHAR => None,
        _ => char::from_u32(c as u32 - 1),
    }
}

/// Number of characters in the inclusive interval `[min, max]`.
pub fn char_count(min: char, max: char) -> u32 {
    if min > max {
        return 0;
    }
    let span = max as u32 - min as u32 + 1;
    if (min as u32) < 0xD800 && (max as u32) > 0xDFFF {
        span - 0x800
    } else {
        span
    }
}

/// Whether an interval ending at `max` overlaps or touches an interval starting at `min`.
pub(crate) fn touches(max: char, min: char) -> bool {
    match char_succ(max) {
        Some(next) => min <= next,
        None => true,
    }
}

pub(crate) fn write_char(f: &mut impl fmt::Write, c: char) -> fmt::Result {
    if ('\u{21}'..='\u{7e}').contains(&c) && c != '\\' && c != '"' {
        write!(f, "{}", c)
    } else {
        write!(f, "\\u{{{:04x}}}", c as u32)
    }
}

/// An edge labeled with the inclusive character interval `[min, max]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Transition {
    min: char,
    max: char,
    to: StateId,
}

impl Transition {
    /// Create a transition on a single character.
    pub fn new(c: char, to: StateId) -> Self {
        Self { min: c, max: c, to }
    }

    /// Create a transition on an interval, swapping the bounds if given in reverse.
    pub fn range(min: char, max: char, to: StateId) -> Self {
        if max < min {
            Self { min: max, max: min, to }
        } else {
            Self { min, max, to }
        }
    }

    pub fn min(&self) -> char {
        self.min
    }
    pub fn max(&self) -> char {
        self.max
    }
    pub fn to(&self) -> StateId {
        self.to
    }

    pub fn contains(&self, c: char) -> bool {
        self.min <= c && c <= self.max
    }

    /// Same interval, different destination.
    pub(crate) fn retarget(self, to: StateId) -> Self {
        Self { to, ..self }
    }

    /// Order by destination, then ascending `min`, then descending `max`.
    pub fn cmp_dest_first(&self, other: &Self) -> Ordering {
        self.to
            .cmp(&other.to)
            .then(self.min.cmp(&other.min))
            .then(other.max.cmp(&self.max))
    }

    /// Order by ascending `min`, then descending `max`, then destination.
    pub fn cmp_min_first(&self, other: &Self) -> Ordering {
        self.min
            .cmp(&other.min)
            .then(other.max.cmp(&self.max))
            .then(self.to.cmp(&other.to))
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_char(f, self.min)?;
        if self.min != self.max {
            write!(f, "-")?;
            write_char(f, self.max)?;
        }
        write!(f, " -> {}", self.to)
    }
}

/// A node of the automaton graph.
///
/// Freshly created states are rejecting and have no transitions.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct State {
    accept: bool,
    transitions: Vec<Transition>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_accept(&self) -> bool {
        self.accept
    }
    pub fn set_accept(&mut self, accept: bool) {
        self.accept = accept;
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    pub fn add_transition(&mut self, t: Transition) {
        self.transitions.push(t);
    }

    pub(crate) fn set_transitions(&mut self, transitions: Vec<Transition>) {
        self.transitions = transitions;
    }

    pub(crate) fn take_transitions(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.transitions)
    }

    /// Destination of the first transition labeled with `c`, if any.
    ///
    /// For a state of a deterministic automaton this is the only such destination.
    pub fn step(&self, c: char) -> Option<StateId> {
        self.transitions.iter().find(|t| t.contains(c)).map(|t| t.to)
    }

    /// Push the destinations of every transition labeled with `c`.
    pub fn step_all(&self, c: char, dest: &mut Vec<StateId>) {
        dest.extend(self.transitions.iter().filter(|t| t.contains(c)).map(|t| t.to));
    }

    /// Transitions sorted either destination-first or interval-first.
    pub fn sorted_transitions(&self, to_first: bool) -> Vec<Transition> {
        let mut ts = self.transitions.clone();
        if to_first {
            ts.sort_by(Transition::cmp_dest_first);
        } else {
            ts.sort_by(Transition::cmp_min_first);
        }
        ts
    }

    /// Merge overlapping and adjacent transitions to the same destination.
    pub(crate) fn reduce(&mut self) {
        let ts = self.sorted_transitions(true);
        self.transitions.clear();
        let mut current: Option<Transition> = None;
        for t in ts {
            current = match current {
                Some(c) if c.to == t.to && touches(c.max, t.min) => {
                    Some(Transition::range(c.min, c.max.max(t.max), c.to))
                }
                Some(c) => {
                    self.transitions.push(c);
                    Some(t)
                }
                None => Some(t),
            };
        }
        if let Some(c) = current {
            self.transitions.push(c);
        }
    }
}
