//! The automaton: a singleton string or an explicit graph over an arena of states.
//!
//! # Representation
//!
//! An [`Automaton`] is either
//!
//! - a **singleton**, the language consisting of exactly one string, stored as the string
//!   itself without any states, or
//! - a **graph**: an arena of [`State`]s owned by a [`Graph`], an initial handle and a
//!   flag telling whether the transitions of every state are non-overlapping.
//!
//! Operations that need states call [`Automaton::expand_singleton`] first. Expansion is
//! one-directional: a graph never collapses back into a singleton.
//!
//! The live part of a graph is the set of states reachable from its initial state.
//! Arena slots that became unreachable are simply ignored by every algorithm and are
//! dropped by [`Graph::compact`].
//!
//! # Invariants
//!
//! - A graph flagged deterministic has no two overlapping transitions leaving one state.
//!   The flag may be false for a deterministic graph, never true for a nondeterministic one.
//! - After [`Graph::reduce`], no two transitions of a state to the same destination
//!   overlap or touch.
//! - After [`Graph::remove_dead_transitions`], every reachable state can reach an
//!   accepting state, except the lone initial state of the empty language.

use std::collections::{BTreeSet, VecDeque};
use std::fmt::{self, Display, Formatter};
use std::sync::OnceLock;

use log::debug;

use crate::minimization;
use crate::state::{char_pred, char_succ, write_char, State, StateId, Transition, MAX_CHAR, MIN_CHAR};
use crate::state_pair::{epsilon_closure, StatePair};
use crate::state_set::StateSet;

/// Szudzik pairing of the state and transition counts.
fn pairing(a: u64, b: u64) -> u64 {
    if a < b {
        b * b + a
    } else {
        a * a + a + b
    }
}

/// An explicit automaton graph: an arena of states and an initial state handle.
#[derive(Debug, Clone)]
pub struct Graph {
    states: Vec<State>,
    initial: StateId,
    deterministic: bool,
    hash_code: OnceLock<u64>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// A graph with a single rejecting initial state: the empty language.
    pub fn new() -> Self {
        Self {
            states: vec![State::new()],
            initial: StateId::new(0),
            deterministic: true,
            hash_code: OnceLock::new(),
        }
    }

    fn clear_hash(&mut self) {
        self.hash_code.take();
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }
    pub fn set_initial(&mut self, initial: StateId) {
        self.clear_hash();
        self.initial = initial;
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }
    pub(crate) fn set_deterministic(&mut self, deterministic: bool) {
        self.deterministic = deterministic;
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }
    pub fn state_mut(&mut self, id: StateId) -> &mut State {
        self.clear_hash();
        &mut self.states[id.index()]
    }

    /// Allocate a fresh rejecting state without transitions.
    pub fn add_state(&mut self) -> StateId {
        self.clear_hash();
        self.states.push(State::new());
        StateId::new(self.states.len() - 1)
    }

    pub fn add_transition(&mut self, from: StateId, t: Transition) {
        self.state_mut(from).add_transition(t);
    }

    /// Number of arena slots, including unreachable ones.
    pub fn arena_len(&self) -> usize {
        self.states.len()
    }

    /// Handles of all states reachable from the initial state, in breadth-first order.
    pub fn states(&self) -> Vec<StateId> {
        let mut visited = StateSet::new(self.states.len());
        let mut order = vec![self.initial];
        visited.insert(self.initial);
        let mut i = 0;
        while i < order.len() {
            let s = order[i];
            for t in self.state(s).transitions() {
                if visited.insert(t.to()) {
                    order.push(t.to());
                }
            }
            i += 1;
        }
        order
    }

    /// Reachable accepting states.
    pub fn accept_states(&self) -> Vec<StateId> {
        self.states().into_iter().filter(|&s| self.state(s).is_accept()).collect()
    }

    /// Reachable states from which some accepting state is reachable.
    pub fn live_states(&self) -> StateSet {
        let reachable = self.states();
        let mut reverse: Vec<Vec<StateId>> = vec![Vec::new(); self.states.len()];
        for &s in &reachable {
            for t in self.state(s).transitions() {
                reverse[t.to().index()].push(s);
            }
        }
        let mut live = StateSet::new(self.states.len());
        let mut queue = VecDeque::new();
        for &s in &reachable {
            if self.state(s).is_accept() && live.insert(s) {
                queue.push_back(s);
            }
        }
        while let Some(s) = queue.pop_front() {
            for &p in &reverse[s.index()] {
                if live.insert(p) {
                    queue.push_back(p);
                }
            }
        }
        live
    }

    /// Sorted interval start points of all reachable transitions, always including
    /// [`MIN_CHAR`]. Consecutive points delimit the maximal character classes that no
    /// transition distinguishes.
    pub fn start_points(&self) -> Vec<char> {
        let mut points = BTreeSet::new();
        points.insert(MIN_CHAR);
        for s in self.states() {
            for t in self.state(s).transitions() {
                points.insert(t.min());
                if let Some(next) = char_succ(t.max()) {
                    points.insert(next);
                }
            }
        }
        points.into_iter().collect()
    }

    /// Absorb `to` into `from` as if joined by an epsilon edge: `from` inherits the
    /// accept flag and a copy of every transition of `to`.
    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        let target = self.state(to).clone();
        let source = self.state_mut(from);
        if target.is_accept() {
            source.set_accept(true);
        }
        for &t in target.transitions() {
            source.add_transition(t);
        }
    }

    /// Add a batch of epsilon edges, closing them transitively first.
    pub fn add_epsilons(&mut self, pairs: impl IntoIterator<Item = StatePair>) {
        for p in epsilon_closure(pairs) {
            self.add_epsilon(p.s1, p.s2);
        }
        self.deterministic = false;
    }

    /// Move every state of `other` into this arena. Returns the new handle of the
    /// initial state of `other`. The moved states are not reachable until linked.
    pub(crate) fn append(&mut self, other: Graph) -> StateId {
        self.clear_hash();
        let offset = self.states.len();
        let shift = |id: StateId| StateId::new(id.index() + offset);
        for mut s in other.states {
            let ts = s.take_transitions().into_iter().map(|t| t.retarget(shift(t.to()))).collect();
            s.set_transitions(ts);
            self.states.push(s);
        }
        shift(other.initial)
    }

    /// Rebuild the arena with only the reachable states, numbered in breadth-first
    /// order, so the initial state becomes `0`.
    pub fn compact(&mut self) {
        let order = self.states();
        if order.len() == self.states.len() && self.initial.index() == 0 {
            let identity = order.iter().enumerate().all(|(i, s)| s.index() == i);
            if identity {
                return;
            }
        }
        let mut map = vec![StateId::new(0); self.states.len()];
        for (i, &s) in order.iter().enumerate() {
            map[s.index()] = StateId::new(i);
        }
        let states = order
            .iter()
            .map(|&s| {
                let mut state = std::mem::take(&mut self.states[s.index()]);
                let ts = state.take_transitions().into_iter().map(|t| t.retarget(map[t.to().index()])).collect();
                state.set_transitions(ts);
                state
            })
            .collect();
        self.states = states;
        self.initial = StateId::new(0);
        self.clear_hash();
    }

    /// Merge overlapping and adjacent transitions with a common destination.
    pub fn reduce(&mut self) {
        for s in self.states() {
            self.state_mut(s).reduce();
        }
    }

    /// Make the transition function total by routing every undefined input to a fresh
    /// absorbing rejecting state.
    pub fn totalize(&mut self) {
        let reachable = self.states();
        let sink = self.add_state();
        self.add_transition(sink, Transition::range(MIN_CHAR, MAX_CHAR, sink));
        for s in reachable {
            let mut next = Some(MIN_CHAR);
            for t in self.state(s).sorted_transitions(false) {
                let Some(n) = next else { break };
                if t.min() > n {
                    if let Some(before) = char_pred(t.min()) {
                        self.add_transition(s, Transition::range(n, before, sink));
                    }
                }
                if t.max() >= n {
                    next = char_succ(t.max());
                }
            }
            if let Some(n) = next {
                self.add_transition(s, Transition::range(n, MAX_CHAR, sink));
            }
        }
    }

    /// Drop every transition into a state that cannot reach acceptance, then compact
    /// and reduce.
    pub fn remove_dead_transitions(&mut self) {
        let live = self.live_states();
        for s in self.states() {
            let state = self.state_mut(s);
            let ts = state.take_transitions().into_iter().filter(|t| live.contains(t.to())).collect();
            state.set_transitions(ts);
        }
        self.compact();
        self.reduce();
    }

    pub fn number_of_states(&self) -> usize {
        self.states().len()
    }

    pub fn number_of_transitions(&self) -> usize {
        self.states().into_iter().map(|s| self.state(s).num_transitions()).sum()
    }
}

/// A finite automaton over `char`.
#[derive(Debug, Clone)]
pub enum Automaton {
    /// The language containing exactly this string.
    Singleton(String),
    /// An explicit state graph.
    Graph(Graph),
}

impl Default for Automaton {
    /// The empty language.
    fn default() -> Self {
        Automaton::Graph(Graph::new())
    }
}

impl From<Graph> for Automaton {
    fn from(graph: Graph) -> Self {
        Automaton::Graph(graph)
    }
}

impl Automaton {
    pub fn is_singleton(&self) -> bool {
        matches!(self, Automaton::Singleton(_))
    }

    pub fn singleton(&self) -> Option<&str> {
        match self {
            Automaton::Singleton(s) => Some(s),
            Automaton::Graph(_) => None,
        }
    }

    pub fn graph(&self) -> Option<&Graph> {
        match self {
            Automaton::Singleton(_) => None,
            Automaton::Graph(g) => Some(g),
        }
    }

    /// Chain of one state per character ending in an accepting state.
    fn singleton_graph(s: &str) -> Graph {
        let mut g = Graph::new();
        let mut p = g.initial();
        for c in s.chars() {
            let q = g.add_state();
            g.add_transition(p, Transition::new(c, q));
            p = q;
        }
        g.state_mut(p).set_accept(true);
        g
    }

    /// Materialize the graph form and return it.
    pub fn expand_singleton(&mut self) -> &mut Graph {
        if let Automaton::Singleton(s) = self {
            debug!("expand_singleton({:?})", s);
            *self = Automaton::Graph(Self::singleton_graph(s));
        }
        match self {
            Automaton::Graph(g) => g,
            Automaton::Singleton(_) => unreachable!(),
        }
    }

    /// The graph form, consuming the automaton.
    pub fn into_graph(self) -> Graph {
        match self {
            Automaton::Singleton(s) => Self::singleton_graph(&s),
            Automaton::Graph(g) => g,
        }
    }

    /// A graph-form copy, leaving `self` untouched.
    pub fn to_graph(&self) -> Graph {
        self.clone().into_graph()
    }

    pub fn is_deterministic(&self) -> bool {
        match self {
            Automaton::Singleton(_) => true,
            Automaton::Graph(g) => g.is_deterministic(),
        }
    }

    pub fn number_of_states(&self) -> usize {
        match self {
            Automaton::Singleton(s) => s.chars().count() + 1,
            Automaton::Graph(g) => g.number_of_states(),
        }
    }

    pub fn number_of_transitions(&self) -> usize {
        match self {
            Automaton::Singleton(s) => s.chars().count(),
            Automaton::Graph(g) => g.number_of_transitions(),
        }
    }

    /// Whether the language is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Automaton::Singleton(_) => false,
            Automaton::Graph(g) => !g.live_states().contains(g.initial()),
        }
    }

    /// Whether the language is exactly `{""}`.
    pub fn is_empty_string(&self) -> bool {
        match self {
            Automaton::Singleton(s) => s.is_empty(),
            Automaton::Graph(g) => {
                let live = g.live_states();
                let initial = g.state(g.initial());
                initial.is_accept() && initial.transitions().iter().all(|t| !live.contains(t.to()))
            }
        }
    }

    /// Whether the language is the set of all strings, judged on the minimal form.
    pub fn is_total(&self) -> bool {
        let Automaton::Graph(g) = self else {
            return false;
        };
        let initial = g.state(g.initial());
        match initial.transitions() {
            [t] => initial.is_accept() && t.to() == g.initial() && t.min() == MIN_CHAR && t.max() == MAX_CHAR,
            _ => false,
        }
    }

    /// Reduce the graph form. No effect on singletons.
    pub fn reduce(&mut self) {
        if let Automaton::Graph(g) = self {
            g.reduce();
        }
    }

    /// Totalize, expanding a singleton first.
    pub fn totalize(&mut self) {
        self.expand_singleton().totalize();
    }

    /// Remove dead transitions from the graph form. No effect on singletons.
    pub fn remove_dead_transitions(&mut self) {
        if let Automaton::Graph(g) = self {
            g.remove_dead_transitions();
        }
    }

    /// Drop unreachable arena slots. No effect on singletons.
    pub fn compact(&mut self) {
        if let Automaton::Graph(g) = self {
            g.compact();
        }
    }

    /// Hash of the minimal form, computed from its state and transition counts.
    ///
    /// Minimizes the automaton if the hash is not cached yet.
    pub fn hash_code(&mut self) -> u64 {
        if let Automaton::Graph(g) = self {
            if let Some(&h) = g.hash_code.get() {
                return h;
            }
        }
        minimization::minimize(self);
        let h = pairing(self.number_of_states() as u64, self.number_of_transitions() as u64);
        if let Automaton::Graph(g) = self {
            let _ = g.hash_code.set(h);
        }
        h
    }
}

impl Display for Automaton {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Automaton::Singleton(s) => {
                write!(f, "singleton: ")?;
                for c in s.chars() {
                    write_char(f, c)?;
                }
                writeln!(f)
            }
            Automaton::Graph(g) => {
                writeln!(f, "initial state: {}", g.initial())?;
                for s in g.states() {
                    let state = g.state(s);
                    let kind = if state.is_accept() { "accept" } else { "reject" };
                    writeln!(f, "state {} [{}]:", s, kind)?;
                    for t in state.transitions() {
                        writeln!(f, "  {}", t)?;
                    }
                }
                Ok(())
            }
        }
    }
}
