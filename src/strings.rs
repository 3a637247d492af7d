//! Questions about the strings of a language.
//!
//! - [`shortest_example`]: the shortest (then smallest) accepted or rejected string.
//! - [`is_finite`] and [`finite_strings`]: whether the language is finite, and its members.
//! - [`count_strings`]: the exact number of accepted strings of a given length.
//!
//! # Examples
//!
//! ```
//! use num_bigint::BigUint;
//! use xeger_rs::xeger::compile;
//!
//! let a = compile("[a-c]{2}|x").unwrap();
//! assert_eq!(a.shortest_example(true).as_deref(), Some("x"));
//! assert!(a.is_finite());
//! assert_eq!(a.count_strings(2), BigUint::from(9u32));
//! ```

use std::collections::{BTreeSet, HashMap, VecDeque};

use num_bigint::BigUint;

use crate::automaton::{Automaton, Graph};
use crate::basic_operations::determinize;
use crate::state::{char_count, char_succ, StateId, MIN_CHAR};
use crate::state_set::StateSet;

/// The shortest string accepted (or, with `accepted == false`, rejected) by `a`.
///
/// Among strings of equal length the lexicographically smallest one is returned.
/// `None` if there is no such string.
pub fn shortest_example(a: &Automaton, accepted: bool) -> Option<String> {
    if let Some(s) = a.singleton() {
        return Some(match (accepted, s.is_empty()) {
            (true, _) => s.to_string(),
            (false, false) => String::new(),
            (false, true) => MIN_CHAR.to_string(),
        });
    }
    if accepted {
        a.graph().and_then(|g| shortest_in(g, true))
    } else {
        // Rejection must be witnessed by a state, so every input needs a transition.
        let mut total = a.clone();
        determinize(&mut total);
        total.totalize();
        total.graph().and_then(|g| shortest_in(g, false))
    }
}

fn shortest_in(g: &Graph, accepted: bool) -> Option<String> {
    let mut path: HashMap<StateId, String> = HashMap::new();
    let mut queue = VecDeque::new();
    path.insert(g.initial(), String::new());
    queue.push_back(g.initial());
    let mut best: Option<String> = None;
    let key = |s: &str| (s.chars().count(), s.to_string());

    while let Some(q) = queue.pop_front() {
        let p = path[&q].clone();
        let state = g.state(q);
        if state.is_accept() == accepted {
            if best.as_deref().map_or(true, |b| key(&p) < key(b)) {
                best = Some(p);
            }
            continue;
        }
        for t in state.transitions() {
            let mut np = p.clone();
            np.push(t.min());
            match path.get(&t.to()) {
                None => {
                    queue.push_back(t.to());
                    path.insert(t.to(), np);
                }
                Some(tp) if key(&np) < key(tp) => {
                    path.insert(t.to(), np);
                }
                Some(_) => {}
            }
        }
    }
    best
}

/// Whether the language of `a` is finite.
pub fn is_finite(a: &Automaton) -> bool {
    let Automaton::Graph(g) = a else {
        return true;
    };
    let live = g.live_states();
    if !live.contains(g.initial()) {
        return true;
    }
    // Iterative DFS looking for a cycle among live states.
    let mut on_path = StateSet::new(g.arena_len());
    let mut done = StateSet::new(g.arena_len());
    let mut stack: Vec<(StateId, usize)> = vec![(g.initial(), 0)];
    on_path.insert(g.initial());
    while let Some((s, i)) = stack.pop() {
        let transitions = g.state(s).transitions();
        if let Some(t) = transitions.get(i) {
            stack.push((s, i + 1));
            let to = t.to();
            if !live.contains(to) || done.contains(to) {
                continue;
            }
            if on_path.contains(to) {
                return false;
            }
            on_path.insert(to);
            stack.push((to, 0));
        } else {
            on_path.remove(s);
            done.insert(s);
        }
    }
    true
}

/// All strings of a finite language, or `None` if the language is infinite or has more
/// than `limit` members.
pub fn finite_strings(a: &Automaton, limit: Option<usize>) -> Option<BTreeSet<String>> {
    let g = match a {
        Automaton::Singleton(s) => {
            return (limit != Some(0)).then(|| BTreeSet::from([s.clone()]));
        }
        Automaton::Graph(g) => g,
    };
    let live = g.live_states();
    let mut strings = BTreeSet::new();
    if !live.contains(g.initial()) {
        return Some(strings);
    }
    let mut walk = FiniteWalk {
        g,
        live: &live,
        on_path: StateSet::new(g.arena_len()),
        prefix: String::new(),
        strings: &mut strings,
        limit,
    };
    walk.visit(g.initial()).then_some(strings)
}

struct FiniteWalk<'a> {
    g: &'a Graph,
    live: &'a StateSet,
    on_path: StateSet,
    prefix: String,
    strings: &'a mut BTreeSet<String>,
    limit: Option<usize>,
}

impl FiniteWalk<'_> {
    /// Returns false as soon as a cycle or the limit is hit.
    fn visit(&mut self, s: StateId) -> bool {
        if self.g.state(s).is_accept() {
            self.strings.insert(self.prefix.clone());
            if self.limit.is_some_and(|l| self.strings.len() > l) {
                return false;
            }
        }
        self.on_path.insert(s);
        for t in self.g.state(s).transitions() {
            if !self.live.contains(t.to()) {
                continue;
            }
            if self.on_path.contains(t.to()) {
                return false;
            }
            let mut c = Some(t.min());
            while let Some(ch) = c.filter(|&ch| ch <= t.max()) {
                self.prefix.push(ch);
                let ok = self.visit(t.to());
                self.prefix.pop();
                if !ok {
                    return false;
                }
                c = char_succ(ch);
            }
        }
        self.on_path.remove(s);
        true
    }
}

/// Number of accepted strings with exactly `length` characters.
pub fn count_strings(a: &Automaton, length: usize) -> BigUint {
    if let Some(s) = a.singleton() {
        return BigUint::from(u32::from(s.chars().count() == length));
    }
    let mut d = a.clone();
    determinize(&mut d);
    let Some(g) = d.graph() else {
        return BigUint::ZERO;
    };
    let n = g.arena_len();
    let mut current = vec![BigUint::ZERO; n];
    current[g.initial().index()] = BigUint::from(1u32);
    for _ in 0..length {
        let mut next = vec![BigUint::ZERO; n];
        for (q, count) in current.iter().enumerate() {
            if *count == BigUint::ZERO {
                continue;
            }
            for t in g.state(StateId::new(q)).transitions() {
                next[t.to().index()] += count * BigUint::from(char_count(t.min(), t.max()));
            }
        }
        current = next;
    }
    current
        .into_iter()
        .enumerate()
        .filter(|(q, _)| g.state(StateId::new(*q)).is_accept())
        .map(|(_, count)| count)
        .sum()
}

impl Automaton {
    /// See [`shortest_example`].
    pub fn shortest_example(&self, accepted: bool) -> Option<String> {
        shortest_example(self, accepted)
    }

    /// See [`is_finite`].
    pub fn is_finite(&self) -> bool {
        is_finite(self)
    }

    /// See [`finite_strings`].
    pub fn finite_strings(&self, limit: Option<usize>) -> Option<BTreeSet<String>> {
        finite_strings(self, limit)
    }

    /// See [`count_strings`].
    pub fn count_strings(&self, length: usize) -> BigUint {
        count_strings(self, length)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::basic_automata::{make_any_string, make_char_range, make_empty, make_string};
    use crate::basic_operations::{complement, concatenate, repeat, repeat_range, union};

    #[test]
    fn test_shortest_accepted() {
        let a = union(vec![make_string("bb"), make_string("ab"), make_string("abc")]);
        assert_eq!(shortest_example(&a, true).as_deref(), Some("ab"));
        assert_eq!(shortest_example(&make_empty(), true), None);
        assert_eq!(shortest_example(&make_string("xy"), true).as_deref(), Some("xy"));
    }

    #[test]
    fn test_shortest_rejected() {
        let a = repeat(make_char_range('a', 'z'));
        assert_eq!(shortest_example(&a, false).as_deref(), Some("\0"));
        let a = complement(make_string(""));
        assert_eq!(shortest_example(&a, false).as_deref(), Some(""));
        assert_eq!(shortest_example(&make_any_string(), false), None);
        assert_eq!(shortest_example(&make_string(""), false).as_deref(), Some("\0"));
    }

    #[test]
    fn test_is_finite() {
        assert!(is_finite(&make_string("abc")));
        assert!(is_finite(&repeat_range(make_char_range('a', 'c'), 1, 3)));
        assert!(!is_finite(&repeat(make_string("ab"))));
        assert!(is_finite(&make_empty()));
    }

    #[test]
    fn test_finite_strings() {
        let a = concatenate(vec![make_char_range('a', 'b'), union(vec![make_string("x"), make_string("")])]);
        let strings = finite_strings(&a, None).unwrap();
        let expected: BTreeSet<String> = ["a", "ax", "b", "bx"].iter().map(|s| s.to_string()).collect();
        assert_eq!(strings, expected);
        assert_eq!(finite_strings(&a, Some(3)), None);
        assert_eq!(finite_strings(&repeat(make_string("a")), None), None);
        assert_eq!(finite_strings(&make_empty(), None), Some(BTreeSet::new()));
    }

    #[test]
    fn test_count_strings() {
        let a = repeat_range(make_char_range('a', 'c'), 2, 3);
        assert_eq!(count_strings(&a, 1), BigUint::ZERO);
        assert_eq!(count_strings(&a, 2), BigUint::from(9u32));
        assert_eq!(count_strings(&a, 3), BigUint::from(27u32));
        assert_eq!(count_strings(&make_string("ab"), 2), BigUint::from(1u32));

        // Overlapping alternatives are counted once.
        let b = union(vec![make_char_range('a', 'm'), make_char_range('h', 'z')]);
        assert_eq!(count_strings(&b, 1), BigUint::from(26u32));

        let any = make_any_string();
        let per_char = BigUint::from(char_count(MIN_CHAR, char::MAX));
        assert_eq!(count_strings(&any, 2), &per_char * &per_char);
    }
}
