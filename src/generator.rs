//! Random strings from an automaton.
//!
//! The generator performs a random walk from the initial state. At every state it picks
//! uniformly among the outgoing transitions plus, at an accepting state, the option to
//! stop. A transition contributes one character drawn uniformly from its interval.
//!
//! The walk has no length bound: it ends almost surely because stopping has positive
//! probability at every accepting state on the way.
//!
//! # Examples
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use xeger_rs::generator::generate;
//! use xeger_rs::xeger::compile;
//!
//! let a = compile("[a-c]{2,3}").unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let s = generate(&a, &mut rng).unwrap();
//! assert!((2..=3).contains(&s.chars().count()));
//! assert!(a.run(&s));
//! ```

use log::trace;
use rand::Rng;

use crate::automaton::Automaton;
use crate::error::{Error, Result};
use crate::state::{StateId, Transition};

/// Generate a random string accepted by `a`.
///
/// Fails with [`Error::Generation`] if the language of `a` is empty. Transitions into
/// states that cannot reach acceptance are never taken, so the walk cannot get stuck.
pub fn generate<R: Rng + ?Sized>(a: &Automaton, rng: &mut R) -> Result<String> {
    let g = match a {
        Automaton::Singleton(s) => return Ok(s.clone()),
        Automaton::Graph(g) => g,
    };
    let live = g.live_states();
    if !live.contains(g.initial()) {
        return Err(Error::Generation);
    }

    let mut out = String::new();
    let mut s = g.initial();
    loop {
        let state = g.state(s);
        let mut transitions = state.sorted_transitions(true);
        transitions.retain(|t| live.contains(t.to()));
        if transitions.is_empty() {
            assert!(state.is_accept(), "dead end at rejecting state {}", s);
            break;
        }
        let options = transitions.len() + usize::from(state.is_accept());
        let choice = rng.gen_range(0..options);
        trace!("state {}: option {} of {}", s, choice, options);
        if state.is_accept() {
            if choice == 0 {
                break;
            }
            s = step(&transitions[choice - 1], &mut out, rng);
        } else {
            s = step(&transitions[choice], &mut out, rng);
        }
    }
    Ok(out)
}

fn step<R: Rng + ?Sized>(t: &Transition, out: &mut String, rng: &mut R) -> StateId {
    let c = rng.gen_range(t.min()..=t.max());
    out.push(c);
    t.to()
}

impl Automaton {
    /// See [`generate`].
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
        generate(self, rng)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use test_log::test;

    use super::*;
    use crate::basic_automata::{make_char_range, make_empty, make_string};
    use crate::basic_operations::{repeat, union};

    #[test]
    fn test_singleton() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(generate(&make_string("abc"), &mut rng).unwrap(), "abc");
    }

    #[test]
    fn test_empty_language() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(generate(&make_empty(), &mut rng), Err(Error::Generation));
    }

    #[test]
    fn test_walk_stays_in_language() {
        let mut a = union(vec![make_string("foo"), repeat(make_char_range('0', '9'))]);
        a.minimize();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let s = a.generate(&mut rng).unwrap();
            assert!(a.run(&s), "{:?}", s);
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let mut a = repeat(make_char_range('a', 'z'));
        a.minimize();
        let xs: Vec<String> = {
            let mut rng = ChaCha8Rng::seed_from_u64(99);
            (0..20).map(|_| generate(&a, &mut rng).unwrap()).collect()
        };
        let ys: Vec<String> = {
            let mut rng = ChaCha8Rng::seed_from_u64(99);
            (0..20).map(|_| generate(&a, &mut rng).unwrap()).collect()
        };
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_surrogate_gap_never_emitted() {
        let mut a = repeat(make_char_range('\u{D000}', '\u{E0FF}'));
        a.minimize();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let s = generate(&a, &mut rng).unwrap();
            assert!(s.chars().all(|c| ('\u{D000}'..='\u{D7FF}').contains(&c) || ('\u{E000}'..='\u{E0FF}').contains(&c)));
        }
    }
}
