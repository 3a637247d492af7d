//! Pairs of states and the worklists that drive pairwise algorithms.
//!
//! Product constructions (intersection, subset testing) explore pairs of states
//! breadth-first; [`Worklist`] remembers every item it has ever accepted so that each
//! pair is expanded once. [`epsilon_closure`] closes a batch of epsilon edges
//! transitively before they are absorbed into a graph.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::hash::Hash;

use crate::state::StateId;

/// An ordered pair of state handles.
///
/// Depending on the algorithm both components index the same arena (epsilon edges)
/// or two different arenas (product constructions).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StatePair {
    pub s1: StateId,
    pub s2: StateId,
}

impl StatePair {
    pub fn new(s1: StateId, s2: StateId) -> Self {
        Self { s1, s2 }
    }
}

/// A FIFO queue that accepts every item at most once over its whole lifetime.
#[derive(Debug, Clone)]
pub struct Worklist<T> {
    queue: VecDeque<T>,
    seen: HashSet<T>,
}

impl<T> Default for Worklist<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            seen: HashSet::new(),
        }
    }
}

impl<T> Worklist<T>
where
    T: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `item` unless it was enqueued before. Returns true if it was enqueued.
    pub fn push(&mut self, item: T) -> bool {
        if self.seen.insert(item.clone()) {
            self.queue.push_back(item);
            true
        } else {
            false
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    /// Whether `item` was ever enqueued.
    pub fn seen(&self, item: &T) -> bool {
        self.seen.contains(item)
    }

    /// Number of items still waiting.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Transitive closure of a set of epsilon edges `s1 -> s2`.
///
/// The result contains the input pairs first, in input order, followed by the pairs
/// implied by chaining (`a -> b` and `b -> c` give `a -> c`).
pub fn epsilon_closure(pairs: impl IntoIterator<Item = StatePair>) -> Vec<StatePair> {
    let mut all = Vec::new();
    let mut members = HashSet::new();
    let mut forward: BTreeMap<StateId, BTreeSet<StateId>> = BTreeMap::new();
    let mut back: BTreeMap<StateId, BTreeSet<StateId>> = BTreeMap::new();

    for p in pairs {
        if members.insert(p) {
            all.push(p);
            forward.entry(p.s1).or_default().insert(p.s2);
            back.entry(p.s2).or_default().insert(p.s1);
        }
    }

    let mut worklist: VecDeque<StatePair> = all.iter().copied().collect();
    let mut workset: HashSet<StatePair> = members.clone();

    while let Some(p) = worklist.pop_front() {
        workset.remove(&p);
        let to: Vec<StateId> = forward.get(&p.s2).map(|s| s.iter().copied().collect()).unwrap_or_default();
        let from: Vec<StateId> = back.get(&p.s1).map(|s| s.iter().copied().collect()).unwrap_or_default();
        for s in to {
            let pp = StatePair::new(p.s1, s);
            if members.insert(pp) {
                all.push(pp);
                forward.entry(p.s1).or_default().insert(s);
                back.entry(s).or_default().insert(p.s1);
                if workset.insert(pp) {
                    worklist.push_back(pp);
                }
                for &q in &from {
                    let qq = StatePair::new(q, p.s1);
                    if workset.insert(qq) {
                        worklist.push_back(qq);
                    }
                }
            }
        }
    }

    all
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn pair(a: usize, b: usize) -> StatePair {
        StatePair::new(StateId::new(a), StateId::new(b))
    }

    #[test]
    fn test_worklist_dedup() {
        let mut w = Worklist::new();
        assert!(w.push(pair(0, 1)));
        assert!(w.push(pair(1, 0)));
        assert!(!w.push(pair(0, 1)));
        assert_eq!(w.len(), 2);
        assert_eq!(w.pop(), Some(pair(0, 1)));
        // Popped items are still remembered.
        assert!(!w.push(pair(0, 1)));
        assert!(w.seen(&pair(0, 1)));
        assert_eq!(w.pop(), Some(pair(1, 0)));
        assert!(w.is_empty());
    }

    #[test]
    fn test_closure_chain() {
        let closure = epsilon_closure([pair(0, 1), pair(1, 2), pair(2, 3)]);
        let set: HashSet<_> = closure.iter().copied().collect();
        for (a, b) in [(0, 1), (1, 2), (2, 3), (0, 2), (1, 3), (0, 3)] {
            assert!(set.contains(&pair(a, b)), "missing {} -> {}", a, b);
        }
        assert_eq!(set.len(), 6);
        assert_eq!(&closure[..3], &[pair(0, 1), pair(1, 2), pair(2, 3)]);
    }

    #[test]
    fn test_closure_duplicates() {
        let closure = epsilon_closure([pair(0, 1), pair(0, 1)]);
        assert_eq!(closure, vec![pair(0, 1)]);
    }
}
