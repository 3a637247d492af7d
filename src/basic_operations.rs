//! Algebraic operations on automata.
//!
//! Every combinator takes its operands **by value** and is free to rewrite them in place,
//! which is how sub-automata are glued together without copying their arenas twice.
//! A caller that still needs an operand afterwards passes a clone, or hands it over
//! through [`MutationPolicy::acquire`][crate::config::MutationPolicy::acquire], which
//! clones under the `Preserve` policy and moves under the `Mutate` policy. Read-only
//! queries ([`run`], [`intersection`], [`subset_of`]) borrow.
//!
//! Construction follows Thompson: operands are linked by epsilon edges, which are
//! absorbed on the spot ([`Graph::add_epsilon`]), so the results are nondeterministic
//! but epsilon-free. [`determinize`] turns them back into DFAs by subset construction.

use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};

use log::debug;

use crate::automaton::{Automaton, Graph};
use crate::basic_automata::{make_empty, make_empty_string};
use crate::state::{char_pred, char_succ, StateId, Transition, MAX_CHAR};
use crate::state_pair::{StatePair, Worklist};
use crate::state_set::StateSet;

fn graph_of(a: &Automaton) -> Cow<'_, Graph> {
    match a {
        Automaton::Graph(g) => Cow::Borrowed(g),
        Automaton::Singleton(_) => Cow::Owned(a.to_graph()),
    }
}

/// Transition tables of every arena slot, sorted interval-first.
fn sorted_tables(g: &Graph) -> Vec<Vec<Transition>> {
    (0..g.arena_len())
        .map(|i| g.state(StateId::new(i)).sorted_transitions(false))
        .collect()
}

/// Concatenation of all operands in order. The empty list gives the empty string.
///
/// Singleton operands are concatenated as strings while possible. Otherwise every
/// accepting state of one operand absorbs the initial state of the next and loses its
/// own accept flag, unless the next operand accepts the empty string.
pub fn concatenate(automata: Vec<Automaton>) -> Automaton {
    if automata.iter().all(Automaton::is_singleton) {
        let s: String = automata.iter().filter_map(Automaton::singleton).collect();
        return Automaton::Singleton(s);
    }
    if automata.iter().any(Automaton::is_empty) {
        return make_empty();
    }
    debug!("concatenate({} automata)", automata.len());

    let mut iter = automata.into_iter();
    let Some(first) = iter.next() else {
        return make_empty_string();
    };
    let mut g = first.into_graph();
    let mut accepts = g.accept_states();
    for a in iter {
        if a.is_empty_string() {
            continue;
        }
        let other = a.into_graph();
        let offset = g.arena_len();
        let mut next_accepts: Vec<StateId> = other
            .accept_states()
            .into_iter()
            .map(|s| StateId::new(s.index() + offset))
            .collect();
        let init = g.append(other);
        for s in accepts {
            g.state_mut(s).set_accept(false);
            g.add_epsilon(s, init);
            if g.state(s).is_accept() {
                next_accepts.push(s);
            }
        }
        accepts = next_accepts;
    }
    g.set_deterministic(false);
    g.compact();
    Automaton::Graph(g)
}

/// Union of all operands. The empty list gives the empty language.
///
/// A fresh initial state absorbs the initial state of every non-empty operand.
pub fn union(automata: Vec<Automaton>) -> Automaton {
    let mut live: Vec<Automaton> = automata.into_iter().filter(|a| !a.is_empty()).collect();
    if let Some(s) = live.first().and_then(Automaton::singleton) {
        if live.iter().all(|a| a.singleton() == Some(s)) {
            return live.swap_remove(0);
        }
    }
    if live.len() == 1 {
        return live.swap_remove(0);
    }
    debug!("union({} automata)", live.len());

    let mut g = Graph::new();
    let s = g.initial();
    for a in live {
        let init = g.append(a.into_graph());
        g.add_epsilon(s, init);
    }
    g.set_deterministic(false);
    g.compact();
    Automaton::Graph(g)
}

/// Product construction: accepts the strings accepted by both operands.
///
/// Explores reachable state pairs breadth-first over the interval-sorted transition
/// tables, intersecting the intervals of every pair of overlapping transitions. The
/// result is deterministic when both operands are.
pub fn intersection(a1: &Automaton, a2: &Automaton) -> Automaton {
    let (g1, g2) = match (a1, a2) {
        (Automaton::Singleton(s), other) | (other, Automaton::Singleton(s)) => {
            return if run(other, s) {
                Automaton::Singleton(s.clone())
            } else {
                make_empty()
            };
        }
        (Automaton::Graph(g1), Automaton::Graph(g2)) => (g1, g2),
    };
    let tables1 = sorted_tables(g1);
    let tables2 = sorted_tables(g2);

    let mut c = Graph::new();
    let mut ids: HashMap<StatePair, StateId> = HashMap::new();
    let mut queue = VecDeque::new();
    let start = StatePair::new(g1.initial(), g2.initial());
    ids.insert(start, c.initial());
    queue.push_back(start);

    while let Some(p) = queue.pop_front() {
        let r = ids[&p];
        let accept = g1.state(p.s1).is_accept() && g2.state(p.s2).is_accept();
        c.state_mut(r).set_accept(accept);
        let t1 = &tables1[p.s1.index()];
        let t2 = &tables2[p.s2.index()];
        let mut b2 = 0;
        for x in t1 {
            while b2 < t2.len() && t2[b2].max() < x.min() {
                b2 += 1;
            }
            for y in t2[b2..].iter().take_while(|y| x.max() >= y.min()) {
                if y.max() < x.min() {
                    continue;
                }
                let q = StatePair::new(x.to(), y.to());
                let target = match ids.get(&q) {
                    Some(&id) => id,
                    None => {
                        let id = c.add_state();
                        ids.insert(q, id);
                        queue.push_back(q);
                        id
                    }
                };
                let min = x.min().max(y.min());
                let max = x.max().min(y.max());
                c.add_transition(r, Transition::range(min, max, target));
            }
        }
    }

    c.set_deterministic(g1.is_deterministic() && g2.is_deterministic());
    c.remove_dead_transitions();
    debug!("intersection: {} pairs, {} live states", ids.len(), c.number_of_states());
    Automaton::Graph(c)
}

/// Complement with respect to the set of all strings.
///
/// Determinizes, totalizes and flips every accept flag; the absorbing state introduced
/// by totalization becomes accepting, everything that can no longer reach acceptance is
/// removed afterwards.
pub fn complement(mut a: Automaton) -> Automaton {
    determinize(&mut a);
    let g = a.expand_singleton();
    g.totalize();
    for s in g.states() {
        let state = g.state_mut(s);
        let accept = state.is_accept();
        state.set_accept(!accept);
    }
    g.remove_dead_transitions();
    a
}

/// The strings of `a1` that are not in `a2`.
pub fn minus(a1: Automaton, a2: &Automaton) -> Automaton {
    if a1.is_empty() {
        return make_empty();
    }
    if a2.is_empty() {
        return a1;
    }
    if let Some(s) = a1.singleton() {
        return if run(a2, s) { make_empty() } else { a1 };
    }
    intersection(&a1, &complement(a2.clone()))
}

/// Accepts the language of `a` plus the empty string.
pub fn optional(a: Automaton) -> Automaton {
    let mut g = a.into_graph();
    let init = g.initial();
    let s = g.add_state();
    g.add_epsilon(s, init);
    g.state_mut(s).set_accept(true);
    g.set_initial(s);
    g.set_deterministic(false);
    Automaton::Graph(g)
}

/// Kleene star.
pub fn repeat(a: Automaton) -> Automaton {
    let mut g = a.into_graph();
    let init = g.initial();
    let s = g.add_state();
    g.state_mut(s).set_accept(true);
    g.add_epsilon(s, init);
    for p in g.accept_states() {
        g.add_epsilon(p, s);
    }
    g.set_initial(s);
    g.set_deterministic(false);
    g.compact();
    Automaton::Graph(g)
}

/// `min` or more concatenated repetitions.
pub fn repeat_min(a: Automaton, min: usize) -> Automaton {
    if min == 0 {
        return repeat(a);
    }
    let mut parts = vec![a.clone(); min];
    parts.push(repeat(a));
    concatenate(parts)
}

/// Between `min` and `max` (inclusive) concatenated repetitions.
///
/// Gives the empty language when `min > max`. The optional tail is a chain of
/// `max - min` copies where every copy may stop at any of its accepting states.
pub fn repeat_range(a: Automaton, min: usize, max: usize) -> Automaton {
    if min > max {
        return make_empty();
    }
    let extra = max - min;
    let b = match min {
        0 => make_empty_string(),
        1 => a.clone(),
        _ => concatenate(vec![a.clone(); min]),
    };
    if extra == 0 {
        return b;
    }

    let mut d = a.to_graph();
    for _ in 1..extra {
        let mut c = a.to_graph();
        let accepts = c.accept_states();
        let init = c.append(d);
        for p in accepts {
            c.add_epsilon(p, init);
        }
        d = c;
    }
    let mut g = b.into_graph();
    let accepts = g.accept_states();
    let init = g.append(d);
    for p in accepts {
        g.add_epsilon(p, init);
    }
    g.set_deterministic(false);
    g.compact();
    Automaton::Graph(g)
}

/// Subset construction. No effect on singletons and graphs already flagged
/// deterministic.
pub fn determinize(a: &mut Automaton) {
    if let Automaton::Graph(g) = a {
        determinize_graph(g);
    }
}

pub(crate) fn determinize_graph(g: &mut Graph) {
    if g.is_deterministic() {
        return;
    }
    let mut initial = StateSet::new(g.arena_len());
    initial.insert(g.initial());
    determinize_from(g, initial);
}

/// Subset construction starting from an arbitrary set of states of `g`.
///
/// The alphabet is partitioned by the start points of `g`; each reachable set of states
/// becomes one state of the new graph, accepting iff any member accepts.
pub(crate) fn determinize_from(g: &mut Graph, initial: StateSet) {
    let points = g.start_points();
    let before = g.number_of_states();

    let mut d = Graph::new();
    let mut ids: HashMap<StateSet, StateId> = HashMap::new();
    ids.insert(initial.clone(), d.initial());
    let mut queue = VecDeque::from([initial]);

    while let Some(set) = queue.pop_front() {
        let r = ids[&set];
        if set.iter().any(|q| g.state(q).is_accept()) {
            d.state_mut(r).set_accept(true);
        }
        for (n, &point) in points.iter().enumerate() {
            let mut p = StateSet::new(g.arena_len());
            for q in &set {
                for t in g.state(q).transitions() {
                    if t.contains(point) {
                        p.insert(t.to());
                    }
                }
            }
            if p.is_empty() {
                continue;
            }
            let target = match ids.get(&p) {
                Some(&id) => id,
                None => {
                    let id = d.add_state();
                    ids.insert(p.clone(), id);
                    queue.push_back(p);
                    id
                }
            };
            let max = points.get(n + 1).and_then(|&next| char_pred(next)).unwrap_or(MAX_CHAR);
            d.add_transition(r, Transition::range(point, max, target));
        }
    }

    d.set_deterministic(true);
    d.remove_dead_transitions();
    debug!("determinize: {} -> {} states", before, d.number_of_states());
    *g = d;
}

/// Reverse every transition and swap the roles of initial and accepting states.
///
/// Returns the set of formerly accepting states, the initial set of the reversed
/// automaton. The graph also gets a fresh initial state absorbing that set, so all of
/// it stays reachable.
pub(crate) fn reverse(g: &mut Graph) -> StateSet {
    let states = g.states();
    let accepts = g.accept_states();
    let mut reversed: Vec<Vec<Transition>> = vec![Vec::new(); g.arena_len()];
    for &r in &states {
        for t in g.state(r).transitions() {
            reversed[t.to().index()].push(t.retarget(r));
        }
    }
    for &r in &states {
        let state = g.state_mut(r);
        state.set_accept(false);
        state.set_transitions(std::mem::take(&mut reversed[r.index()]));
    }
    let old_initial = g.initial();
    g.state_mut(old_initial).set_accept(true);

    let s = g.add_state();
    for &r in &accepts {
        g.add_epsilon(s, r);
    }
    g.set_initial(s);
    g.set_deterministic(false);

    let mut set = StateSet::new(g.arena_len());
    set.extend(accepts);
    set
}

/// Whether `a` accepts `s`.
///
/// Walks the single path of a deterministic graph in `O(|s|)`, or simulates a
/// nondeterministic one over the set of active states.
pub fn run(a: &Automaton, s: &str) -> bool {
    let g = match a {
        Automaton::Singleton(x) => return x == s,
        Automaton::Graph(g) => g,
    };
    if g.is_deterministic() {
        let mut p = g.initial();
        for c in s.chars() {
            match g.state(p).step(c) {
                Some(q) => p = q,
                None => return false,
            }
        }
        g.state(p).is_accept()
    } else {
        let mut current = StateSet::new(g.arena_len());
        current.insert(g.initial());
        let mut next = StateSet::new(g.arena_len());
        let mut dest = Vec::new();
        for c in s.chars() {
            next.clear();
            for q in &current {
                dest.clear();
                g.state(q).step_all(c, &mut dest);
                next.extend(dest.iter().copied());
            }
            if next.is_empty() {
                return false;
            }
            std::mem::swap(&mut current, &mut next);
        }
        current.iter().any(|q| g.state(q).is_accept())
    }
}

/// Whether the language of `a1` is a subset of the language of `a2`.
///
/// Walks the product of `a1` with a determinized copy of `a2`, failing as soon as some
/// input leads `a1` to acceptance or along a live transition that `a2` cannot follow.
pub fn subset_of(a1: &Automaton, a2: &Automaton) -> bool {
    if let Some(s) = a1.singleton() {
        return run(a2, s);
    }
    let g1 = graph_of(a1);
    let mut a2 = a2.clone();
    determinize(&mut a2);
    let g2 = a2.into_graph();
    // Transitions of `a1` into dead states contribute no strings.
    let live1 = g1.live_states();
    let tables1: Vec<Vec<Transition>> = sorted_tables(&g1)
        .into_iter()
        .map(|ts| ts.into_iter().filter(|t| live1.contains(t.to())).collect())
        .collect();
    let tables2 = sorted_tables(&g2);

    let mut worklist = Worklist::new();
    worklist.push(StatePair::new(g1.initial(), g2.initial()));
    while let Some(p) = worklist.pop() {
        if g1.state(p.s1).is_accept() && !g2.state(p.s2).is_accept() {
            return false;
        }
        let t1 = &tables1[p.s1.index()];
        let t2 = &tables2[p.s2.index()];
        let mut b2 = 0;
        for x in t1 {
            while b2 < t2.len() && t2[b2].max() < x.min() {
                b2 += 1;
            }
            // Smallest character of `x` not yet covered by `t2`; `None` once past MAX_CHAR.
            let mut uncovered = Some(x.min());
            for y in t2[b2..].iter().take_while(|y| x.max() >= y.min()) {
                if let Some(u) = uncovered {
                    if y.min() > u {
                        return false;
                    }
                }
                uncovered = char_succ(y.max());
                worklist.push(StatePair::new(x.to(), y.to()));
            }
            if let Some(u) = uncovered {
                if u <= x.max() {
                    return false;
                }
            }
        }
    }
    true
}

/// Whether both automata accept the same language.
pub fn same_language(a1: &Automaton, a2: &Automaton) -> bool {
    if let (Some(x), Some(y)) = (a1.singleton(), a2.singleton()) {
        return x == y;
    }
    subset_of(a1, a2) && subset_of(a2, a1)
}

impl Automaton {
    /// See [`union`].
    pub fn union(&self, other: &Automaton) -> Automaton {
        union(vec![self.clone(), other.clone()])
    }

    /// See [`concatenate`].
    pub fn concatenate(&self, other: &Automaton) -> Automaton {
        concatenate(vec![self.clone(), other.clone()])
    }

    /// See [`intersection`].
    pub fn intersection(&self, other: &Automaton) -> Automaton {
        intersection(self, other)
    }

    /// See [`complement`].
    pub fn complement(&self) -> Automaton {
        complement(self.clone())
    }

    /// See [`minus`].
    pub fn minus(&self, other: &Automaton) -> Automaton {
        minus(self.clone(), other)
    }

    pub fn optional(&self) -> Automaton {
        optional(self.clone())
    }

    pub fn repeat(&self) -> Automaton {
        repeat(self.clone())
    }

    pub fn repeat_min(&self, min: usize) -> Automaton {
        repeat_min(self.clone(), min)
    }

    pub fn repeat_range(&self, min: usize, max: usize) -> Automaton {
        repeat_range(self.clone(), min, max)
    }

    /// Determinize in place. See [`determinize`].
    pub fn determinize(&mut self) {
        determinize(self)
    }

    /// See [`run`].
    pub fn run(&self, s: &str) -> bool {
        run(self, s)
    }

    pub fn subset_of(&self, other: &Automaton) -> bool {
        subset_of(self, other)
    }

    pub fn same_language(&self, other: &Automaton) -> bool {
        same_language(self, other)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::basic_automata::{make_any_string, make_char, make_char_range, make_string};

    fn assert_deterministic(a: &Automaton) {
        let g = a.graph().expect("graph form");
        for s in g.states() {
            let ts = g.state(s).sorted_transitions(false);
            for w in ts.windows(2) {
                assert!(w[0].max() < w[1].min(), "overlap at state {}: {} / {}", s, w[0], w[1]);
            }
        }
    }

    #[test]
    fn test_concatenate_singletons() {
        let a = concatenate(vec![make_string("ab"), make_char('c'), make_string("")]);
        assert_eq!(a.singleton(), Some("abc"));
        assert_eq!(concatenate(vec![]).singleton(), Some(""));
    }

    #[test]
    fn test_concatenate_graphs() {
        let a = concatenate(vec![make_char_range('a', 'c'), make_string("x"), make_char_range('0', '9')]);
        assert!(a.run("ax0"));
        assert!(a.run("cx9"));
        assert!(!a.run("ax"));
        assert!(!a.run("dx0"));
    }

    #[test]
    fn test_concatenate_with_empty() {
        let a = concatenate(vec![make_char_range('a', 'c'), make_empty()]);
        assert!(a.is_empty());
    }

    #[test]
    fn test_concatenate_empty_string_is_identity() {
        let base = repeat(make_char_range('a', 'b'));
        let a = concatenate(vec![base.clone(), make_empty_string()]);
        for s in ["", "a", "abba", "c"] {
            assert_eq!(a.run(s), base.run(s), "{:?}", s);
        }
    }

    #[test]
    fn test_union() {
        let a = union(vec![make_string("foo"), make_string("bar"), make_empty()]);
        assert!(a.run("foo"));
        assert!(a.run("bar"));
        assert!(!a.run("baz"));
        assert!(!a.run(""));
        assert!(union(vec![]).is_empty());
    }

    #[test]
    fn test_union_with_empty_language_is_identity() {
        let base = make_char_range('a', 'f');
        let a = union(vec![base.clone(), make_empty()]);
        assert!(same_language(&a, &base));
    }

    #[test]
    fn test_intersection() {
        let a = make_char_range('a', 'm');
        let b = make_char_range('h', 'z');
        let c = intersection(&repeat(a), &repeat(b));
        assert!(c.run("hijklm"));
        assert!(c.run(""));
        assert!(!c.run("ha"));
        assert!(!c.run("z"));
    }

    #[test]
    fn test_intersection_singleton() {
        let a = intersection(&make_string("abc"), &repeat(make_char_range('a', 'c')));
        assert_eq!(a.singleton(), Some("abc"));
        let b = intersection(&make_string("abd"), &repeat(make_char_range('a', 'c')));
        assert!(b.is_empty());
    }

    #[test]
    fn test_complement() {
        let a = make_string("ab");
        let c = complement(a.clone());
        assert!(!c.run("ab"));
        assert!(c.run(""));
        assert!(c.run("a"));
        assert!(c.run("abc"));
        assert!(c.run("\u{10FFFF}"));
    }

    #[test]
    fn test_double_complement() {
        let a = union(vec![make_string("x"), repeat(make_char_range('0', '9'))]);
        let cc = complement(complement(a.clone()));
        for s in ["", "x", "xx", "0123", "12x", "y"] {
            assert_eq!(cc.run(s), a.run(s), "{:?}", s);
        }
    }

    #[test]
    fn test_minus() {
        let digits = repeat(make_char_range('0', '9'));
        let m = minus(digits, &make_string("42"));
        assert!(m.run("41"));
        assert!(m.run(""));
        assert!(!m.run("42"));
        let m = minus(make_string("42"), &make_char_range('0', '9'));
        assert_eq!(m.singleton(), Some("42"));
    }

    #[test]
    fn test_optional_and_repeat() {
        let a = optional(make_string("ab"));
        assert!(a.run(""));
        assert!(a.run("ab"));
        assert!(!a.run("abab"));

        let a = repeat(make_string("ab"));
        assert!(a.run(""));
        assert!(a.run("ababab"));
        assert!(!a.run("aba"));
    }

    #[test]
    fn test_repeat_min() {
        let a = repeat_min(make_char('a'), 2);
        assert!(!a.run("a"));
        assert!(a.run("aa"));
        assert!(a.run("aaaaa"));
    }

    #[test]
    fn test_repeat_range() {
        let a = repeat_range(make_char_range('a', 'c'), 2, 3);
        assert!(!a.run("a"));
        assert!(a.run("ab"));
        assert!(a.run("abc"));
        assert!(!a.run("abca"));

        let a = repeat_range(make_char('a'), 0, 2);
        assert!(a.run(""));
        assert!(a.run("aa"));
        assert!(!a.run("aaa"));

        let a = repeat_range(make_char('a'), 2, 2);
        assert_eq!(a.singleton(), Some("aa"));

        assert!(repeat_range(make_char('a'), 3, 2).is_empty());
    }

    #[test]
    fn test_determinize() {
        let mut a = union(vec![make_string("ab"), make_string("ac"), repeat(make_char_range('a', 'z'))]);
        assert!(!a.is_deterministic());
        determinize(&mut a);
        assert!(a.is_deterministic());
        assert_deterministic(&a);
        assert!(a.run("ab"));
        assert!(a.run("zzz"));
        assert!(!a.run("A"));
    }

    #[test]
    fn test_run_nondeterministic() {
        let a = union(vec![make_string("abc"), make_string("abd")]);
        assert!(!a.is_deterministic());
        assert!(a.run("abc"));
        assert!(a.run("abd"));
        assert!(!a.run("ab"));
        assert!(!a.run("abe"));
    }

    #[test]
    fn test_subset_of() {
        let digits = repeat(make_char_range('0', '9'));
        let any = make_any_string();
        assert!(subset_of(&digits, &any));
        assert!(!subset_of(&any, &digits));
        assert!(subset_of(&make_string("123"), &digits));
        assert!(!subset_of(&make_string("12a"), &digits));
        assert!(subset_of(&make_empty(), &digits));
    }

    #[test]
    fn test_subset_ignores_dead_states() {
        let a = make_char_range('a', 'c');
        let mut total = a.clone();
        total.totalize();
        assert!(subset_of(&total, &a));
        assert!(subset_of(&a, &total));
        assert!(same_language(&total, &a));

        // A hand-built dead branch on 'z'.
        let mut g = make_string("ab").into_graph();
        let dead = g.add_state();
        g.add_transition(g.initial(), Transition::new('z', dead));
        g.add_transition(dead, Transition::range('0', '9', dead));
        let b = Automaton::Graph(g);
        assert!(same_language(&b, &make_string("ab")));
        assert!(!same_language(&b, &make_string("abc")));

        // Nothing is live at all.
        let mut g = Graph::new();
        let s = g.add_state();
        g.add_transition(g.initial(), Transition::new('x', s));
        assert!(subset_of(&Automaton::Graph(g), &make_string("y")));
    }

    #[test]
    fn test_reverse() {
        let mut g = make_string("abc").into_graph();
        let initial = reverse(&mut g);
        assert_eq!(initial.len(), 1);
        let a = Automaton::Graph(g);
        assert!(a.run("cba"));
        assert!(!a.run("abc"));
    }
}
