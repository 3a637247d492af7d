//! Minimization of automata.
//!
//! Three algorithms produce the same minimal deterministic automaton, up to the
//! numbering of its states:
//!
//! - [Hopcroft](MinimizationAlgorithm::Hopcroft): partition refinement driven by reverse
//!   transitions, `O(n log n)`. This is the default.
//! - [Brzozowski](MinimizationAlgorithm::Brzozowski): determinize the reverse of the
//!   reverse. Exponential in the worst case, often fast in practice.
//! - [Huffman](MinimizationAlgorithm::Huffman): marks distinguishable pairs of states,
//!   propagating marks backwards along recorded dependencies, `O(n^2)`.
//!
//! Singletons are minimal by construction and are left untouched.
//!
//! # Examples
//!
//! ```
//! use xeger_rs::basic_automata::make_string;
//! use xeger_rs::basic_operations::union;
//! use xeger_rs::config::MinimizationAlgorithm;
//! use xeger_rs::minimization::minimize_with;
//!
//! // "ac" | "bc" needs only three states: start, middle and final.
//! let mut a = union(vec![make_string("ac"), make_string("bc")]);
//! minimize_with(&mut a, MinimizationAlgorithm::Huffman);
//! assert_eq!(a.number_of_states(), 3);
//! ```

use std::collections::HashMap;

use log::debug;

use crate::automaton::{Automaton, Graph};
use crate::basic_operations::{determinize_from, determinize_graph, reverse};
use crate::config::MinimizationAlgorithm;
use crate::state::{StateId, Transition, MAX_CHAR, MIN_CHAR};

/// Minimize with the default algorithm.
pub fn minimize(a: &mut Automaton) {
    minimize_with(a, MinimizationAlgorithm::default());
}

pub fn minimize_with(a: &mut Automaton, algorithm: MinimizationAlgorithm) {
    let Automaton::Graph(g) = a else {
        return;
    };
    let before = g.number_of_states();
    match algorithm {
        MinimizationAlgorithm::Hopcroft => minimize_hopcroft(g),
        MinimizationAlgorithm::Brzozowski => minimize_brzozowski(g),
        MinimizationAlgorithm::Huffman => minimize_huffman(g),
    }
    debug!("minimize[{}]: {} -> {} states", algorithm, before, g.number_of_states());
}

impl Automaton {
    /// Minimize in place with the default algorithm.
    pub fn minimize(&mut self) {
        minimize(self)
    }

    pub fn minimize_with(&mut self, algorithm: MinimizationAlgorithm) {
        minimize_with(self, algorithm)
    }
}

fn step_total(g: &Graph, q: StateId, c: char) -> StateId {
    match g.state(q).step(c) {
        Some(p) => p,
        None => panic!("state {} of a total automaton has no transition on {:?}", q, c),
    }
}

/// Determinize, totalize and renumber so that the arena holds exactly the reachable
/// states, indexed `0..n`.
fn prepare_total(g: &mut Graph) {
    determinize_graph(g);
    g.totalize();
    g.compact();
}

/// Replace `g` by the quotient graph: `class[q]` is the class of state `q`, and each
/// class takes the transitions of its first member.
fn rebuild_from_classes(g: &mut Graph, class: &[usize], num_classes: usize) {
    let mut representative: Vec<Option<StateId>> = vec![None; num_classes];
    for (q, &c) in class.iter().enumerate() {
        if representative[c].is_none() {
            representative[c] = Some(StateId::new(q));
        }
    }

    let mut m = Graph::new();
    let ids: Vec<StateId> = (0..num_classes)
        .map(|c| if c == 0 { m.initial() } else { m.add_state() })
        .collect();
    for (c, rep) in representative.iter().enumerate() {
        let Some(rep) = *rep else { continue };
        let state = g.state(rep);
        m.state_mut(ids[c]).set_accept(state.is_accept());
        for t in state.transitions() {
            m.add_transition(ids[c], t.retarget(ids[class[t.to().index()]]));
        }
    }
    m.set_initial(ids[class[g.initial().index()]]);
    m.set_deterministic(true);
    m.remove_dead_transitions();
    *g = m;
}

fn minimize_brzozowski(g: &mut Graph) {
    let initial = reverse(g);
    determinize_from(g, initial);
    let initial = reverse(g);
    determinize_from(g, initial);
}

const NIL: usize = usize::MAX;

/// Doubly linked lists of states, one per `(block, symbol)`, threaded through a node
/// per `(state, symbol)` so that a state moves between blocks in constant time.
struct ActiveLists {
    sigma: usize,
    first: Vec<usize>,
    size: Vec<usize>,
    prev: Vec<usize>,
    next: Vec<usize>,
    /// Block whose list holds the node, or `NIL`.
    owner: Vec<usize>,
}

impl ActiveLists {
    fn new(num_blocks: usize, num_states: usize, sigma: usize) -> Self {
        let lists = num_blocks * sigma;
        let nodes = num_states * sigma;
        Self {
            sigma,
            first: vec![NIL; lists],
            size: vec![0; lists],
            prev: vec![NIL; nodes],
            next: vec![NIL; nodes],
            owner: vec![NIL; nodes],
        }
    }

    fn size(&self, block: usize, x: usize) -> usize {
        self.size[block * self.sigma + x]
    }

    fn owner(&self, q: usize, x: usize) -> Option<usize> {
        let o = self.owner[q * self.sigma + x];
        (o != NIL).then_some(o)
    }

    fn add(&mut self, block: usize, q: usize, x: usize) {
        let list = block * self.sigma + x;
        let node = q * self.sigma + x;
        let head = self.first[list];
        self.prev[node] = NIL;
        self.next[node] = head;
        if head != NIL {
            self.prev[head] = node;
        }
        self.first[list] = node;
        self.size[list] += 1;
        self.owner[node] = block;
    }

    fn remove(&mut self, q: usize, x: usize) {
        let node = q * self.sigma + x;
        let block = self.owner[node];
        assert_ne!(block, NIL, "state {} is not active on symbol {}", q, x);
        let list = block * self.sigma + x;
        let (p, n) = (self.prev[node], self.next[node]);
        if p != NIL {
            self.next[p] = n;
        } else {
            self.first[list] = n;
        }
        if n != NIL {
            self.prev[n] = p;
        }
        self.size[list] -= 1;
        self.owner[node] = NIL;
        self.prev[node] = NIL;
        self.next[node] = NIL;
    }

    fn members(&self, block: usize, x: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.size(block, x));
        let mut node = self.first[block * self.sigma + x];
        while node != NIL {
            out.push(node / self.sigma);
            node = self.next[node];
        }
        out
    }
}

fn minimize_hopcroft(g: &mut Graph) {
    determinize_graph(g);
    if let [t] = g.state(g.initial()).transitions() {
        if t.to() == g.initial() && t.min() == MIN_CHAR && t.max() == MAX_CHAR {
            return;
        }
    }
    prepare_total(g);

    let n = g.arena_len();
    let sigma = g.start_points();
    let ns = sigma.len();
    // Block ids never exceed n, counting one possibly empty initial block.
    let cap = n + 1;

    // incoming[q * ns + x]: states entering q on symbol x.
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); n * ns];
    let mut block = vec![0usize; n];
    let mut block_size = vec![0usize; cap];
    for q in 0..n {
        let id = StateId::new(q);
        let j = if g.state(id).is_accept() { 0 } else { 1 };
        block[q] = j;
        block_size[j] += 1;
        for (x, &c) in sigma.iter().enumerate() {
            let p = step_total(g, id, c);
            incoming[p.index() * ns + x].push(q);
        }
    }

    let mut active = ActiveLists::new(cap, n, ns);
    for q in 0..n {
        for x in 0..ns {
            if !incoming[q * ns + x].is_empty() {
                active.add(block[q], q, x);
            }
        }
    }

    let mut pending = std::collections::VecDeque::new();
    // pending_flag[x * n + j]: (j, x) is in `pending`.
    let mut pending_flag = vec![false; ns * cap];
    for x in 0..ns {
        let j = if active.size(0, x) <= active.size(1, x) { 0 } else { 1 };
        pending.push_back((j, x));
        pending_flag[x * cap + j] = true;
    }

    let mut split_flag = vec![false; n];
    let mut refine: Vec<usize> = Vec::new();
    let mut refine_flag = vec![false; cap];
    let mut split_block: Vec<Vec<usize>> = vec![Vec::new(); cap];
    let mut k = 2;

    while let Some((p, x)) = pending.pop_front() {
        pending_flag[x * cap + p] = false;
        for m in active.members(p, x) {
            for &s in &incoming[m * ns + x] {
                if !split_flag[s] {
                    split_flag[s] = true;
                    let j = block[s];
                    split_block[j].push(s);
                    if !refine_flag[j] {
                        refine_flag[j] = true;
                        refine.push(j);
                    }
                }
            }
        }

        for &j in &refine {
            if split_block[j].len() < block_size[j] {
                for &s in &split_block[j] {
                    block_size[j] -= 1;
                    block_size[k] += 1;
                    block[s] = k;
                    for c in 0..ns {
                        if active.owner(s, c) == Some(j) {
                            active.remove(s, c);
                            active.add(k, s, c);
                        }
                    }
                }
                for c in 0..ns {
                    let aj = active.size(j, c);
                    let ak = active.size(k, c);
                    if !pending_flag[c * cap + j] && 0 < aj && aj <= ak {
                        pending_flag[c * cap + j] = true;
                        pending.push_back((j, c));
                    } else {
                        pending_flag[c * cap + k] = true;
                        pending.push_back((k, c));
                    }
                }
                k += 1;
            }
            for &s in &split_block[j] {
                split_flag[s] = false;
            }
            refine_flag[j] = false;
            split_block[j].clear();
        }
        refine.clear();
    }

    // Number the non-empty blocks densely, keeping the initial state's block first.
    let mut renumber = vec![NIL; k];
    let mut num_classes = 0;
    let initial_block = block[g.initial().index()];
    renumber[initial_block] = 0;
    num_classes += 1;
    for &b in &block {
        if renumber[b] == NIL {
            renumber[b] = num_classes;
            num_classes += 1;
        }
    }
    let class: Vec<usize> = block.iter().map(|&b| renumber[b]).collect();
    rebuild_from_classes(g, &class, num_classes);
}

/// Whether no pair of targets reached on a common character is already marked.
fn states_agree(tables: &[Vec<Transition>], mark: &[bool], n: usize, n1: usize, n2: usize) -> bool {
    let mut disagree = false;
    for_overlapping(&tables[n1], &tables[n2], |m1, m2| {
        if mark[m1.min(m2) * n + m1.max(m2)] {
            disagree = true;
        }
    });
    !disagree
}

/// Calls `f` with the target indices of every pair of overlapping transitions.
fn for_overlapping(t1: &[Transition], t2: &[Transition], mut f: impl FnMut(usize, usize)) {
    let (mut k1, mut k2) = (0, 0);
    while k1 < t1.len() && k2 < t2.len() {
        if t1[k1].max() < t2[k2].min() {
            k1 += 1;
        } else if t2[k2].max() < t1[k1].min() {
            k2 += 1;
        } else {
            f(t1[k1].to().index(), t2[k2].to().index());
            if t1[k1].max() < t2[k2].max() {
                k1 += 1;
            } else {
                k2 += 1;
            }
        }
    }
}

fn minimize_huffman(g: &mut Graph) {
    prepare_total(g);
    let n = g.arena_len();
    let tables: Vec<Vec<Transition>> = (0..n)
        .map(|q| g.state(StateId::new(q)).sorted_transitions(false))
        .collect();

    // mark[n1 * n + n2] with n1 < n2: the pair is distinguishable.
    let mut mark = vec![false; n * n];
    let mut triggers: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
    for n1 in 0..n {
        for n2 in n1 + 1..n {
            if g.state(StateId::new(n1)).is_accept() != g.state(StateId::new(n2)).is_accept() {
                mark[n1 * n + n2] = true;
            }
        }
    }

    for n1 in 0..n {
        for n2 in n1 + 1..n {
            if mark[n1 * n + n2] {
                continue;
            }
            if states_agree(&tables, &mark, n, n1, n2) {
                for_overlapping(&tables[n1], &tables[n2], |m1, m2| {
                    if m1 != m2 {
                        triggers.entry((m1.min(m2), m1.max(m2))).or_default().push((n1, n2));
                    }
                });
            } else {
                let mut stack = vec![(n1, n2)];
                while let Some((a, b)) = stack.pop() {
                    if mark[a * n + b] {
                        continue;
                    }
                    mark[a * n + b] = true;
                    if let Some(ts) = triggers.get(&(a, b)) {
                        for &(m1, m2) in ts {
                            let pair = (m1.min(m2), m1.max(m2));
                            if !mark[pair.0 * n + pair.1] {
                                stack.push(pair);
                            }
                        }
                    }
                }
            }
        }
    }

    let mut class = vec![NIL; n];
    let mut num_classes = 0;
    // The initial state is 0 after compaction, so its class is 0.
    for n1 in 0..n {
        if class[n1] != NIL {
            continue;
        }
        class[n1] = num_classes;
        for n2 in n1 + 1..n {
            if !mark[n1 * n + n2] {
                class[n2] = num_classes;
            }
        }
        num_classes += 1;
    }
    rebuild_from_classes(g, &class, num_classes);
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::basic_automata::{make_char_range, make_empty, make_string};
    use crate::basic_operations::{complement, concatenate, repeat, union};

    const ALGORITHMS: [MinimizationAlgorithm; 3] = [
        MinimizationAlgorithm::Hopcroft,
        MinimizationAlgorithm::Brzozowski,
        MinimizationAlgorithm::Huffman,
    ];

    /// (a|b)*abb, whose minimal DFA has four states.
    fn abb() -> Automaton {
        concatenate(vec![
            repeat(union(vec![make_string("a"), make_string("b")])),
            make_string("abb"),
        ])
    }

    #[test]
    fn test_minimal_size() {
        for alg in ALGORITHMS {
            let mut a = abb();
            minimize_with(&mut a, alg);
            assert!(a.is_deterministic(), "{}", alg);
            assert_eq!(a.number_of_states(), 4, "{}", alg);
            for s in ["abb", "aabb", "babb", "abbabb"] {
                assert!(a.run(s), "{}: {:?}", alg, s);
            }
            for s in ["", "ab", "abba", "abbc"] {
                assert!(!a.run(s), "{}: {:?}", alg, s);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        for alg in ALGORITHMS {
            let mut a = union(vec![repeat(make_char_range('0', '9')), make_string("x")]);
            minimize_with(&mut a, alg);
            let (states, transitions) = (a.number_of_states(), a.number_of_transitions());
            minimize_with(&mut a, alg);
            assert_eq!(a.number_of_states(), states, "{}", alg);
            assert_eq!(a.number_of_transitions(), transitions, "{}", alg);
        }
    }

    #[test]
    fn test_empty_language() {
        for alg in ALGORITHMS {
            let mut a = complement(repeat(make_char_range(MIN_CHAR, MAX_CHAR)));
            minimize_with(&mut a, alg);
            assert!(a.is_empty(), "{}", alg);
            assert_eq!(a.number_of_states(), 1, "{}", alg);

            let mut a = make_empty();
            minimize_with(&mut a, alg);
            assert!(a.is_empty(), "{}", alg);
        }
    }

    #[test]
    fn test_any_string_shortcut() {
        let mut a = repeat(make_char_range(MIN_CHAR, MAX_CHAR));
        minimize(&mut a);
        assert!(a.is_total());
    }

    #[test]
    fn test_singleton_untouched() {
        let mut a = make_string("abc");
        minimize(&mut a);
        assert_eq!(a.singleton(), Some("abc"));
    }

    #[test]
    fn test_algorithms_agree() {
        let base = union(vec![
            concatenate(vec![make_char_range('a', 'c'), repeat(make_string("xy"))]),
            make_string("bxyxy"),
            repeat(make_char_range('b', 'b')),
        ]);
        let sizes: Vec<usize> = ALGORITHMS
            .iter()
            .map(|&alg| {
                let mut a = base.clone();
                minimize_with(&mut a, alg);
                for s in ["", "a", "bxy", "cxyxy", "bb", "bxyx", "d"] {
                    assert_eq!(a.run(s), base.run(s), "{}: {:?}", alg, s);
                }
                a.number_of_states()
            })
            .collect();
        assert!(sizes.windows(2).all(|w| w[0] == w[1]), "{:?}", sizes);
    }
}
