//! Automata for primitive languages.
//!
//! Every constructor returns a fresh automaton owned by the caller. Single strings are
//! returned in singleton form; everything else is a small deterministic graph.
//!
//! # Examples
//!
//! ```
//! use xeger_rs::basic_automata::{make_char_range, make_interval};
//!
//! let lower = make_char_range('a', 'z');
//! assert!(lower.run("q"));
//! assert!(!lower.run("Q"));
//!
//! let percent = make_interval(0, 100, 0);
//! assert!(percent.run("42"));
//! assert!(percent.run("007"));
//! assert!(!percent.run("101"));
//! ```

use log::debug;

use crate::automaton::{Automaton, Graph};
use crate::config::{CompileOptions, SyntaxFlags};
use crate::minimization::minimize;
use crate::regexp::RegExp;
use crate::state::{char_pred, char_succ, StateId, Transition, MAX_CHAR, MIN_CHAR};
use crate::state_pair::StatePair;

/// The empty language: a single rejecting state.
pub fn make_empty() -> Automaton {
    Automaton::Graph(Graph::new())
}

/// The language containing only the empty string.
pub fn make_empty_string() -> Automaton {
    Automaton::Singleton(String::new())
}

/// All strings: one accepting state looping on every character.
pub fn make_any_string() -> Automaton {
    let mut g = Graph::new();
    let s = g.initial();
    g.state_mut(s).set_accept(true);
    g.add_transition(s, Transition::range(MIN_CHAR, MAX_CHAR, s));
    Automaton::Graph(g)
}

/// All single-character strings.
pub fn make_any_char() -> Automaton {
    make_char_range(MIN_CHAR, MAX_CHAR)
}

pub fn make_char(c: char) -> Automaton {
    Automaton::Singleton(c.to_string())
}

/// Single characters in `[min, max]`. The bounds are swapped if given in reverse.
pub fn make_char_range(min: char, max: char) -> Automaton {
    if min == max {
        return make_char(min);
    }
    let mut g = Graph::new();
    let s1 = g.initial();
    let s2 = g.add_state();
    g.state_mut(s2).set_accept(true);
    g.add_transition(s1, Transition::range(min, max, s2));
    Automaton::Graph(g)
}

/// Any single character of `chars`.
pub fn make_char_set(chars: &str) -> Automaton {
    let mut it = chars.chars();
    if let (Some(c), None) = (it.next(), it.next()) {
        return make_char(c);
    }
    let mut g = Graph::new();
    let s1 = g.initial();
    let s2 = g.add_state();
    g.state_mut(s2).set_accept(true);
    for c in chars.chars() {
        g.add_transition(s1, Transition::new(c, s2));
    }
    g.reduce();
    Automaton::Graph(g)
}

pub fn make_string(s: &str) -> Automaton {
    Automaton::Singleton(s.to_string())
}

/// Builds the digit trees of [`make_interval`] inside one graph.
struct IntervalBuilder<'a> {
    g: &'a mut Graph,
    /// States reachable by reading only padding zeros.
    initials: Vec<StateId>,
}

impl IntervalBuilder<'_> {
    fn new_state(&mut self, accept: bool) -> StateId {
        let s = self.g.add_state();
        self.g.state_mut(s).set_accept(accept);
        s
    }

    /// Any `x.len() - n` digits.
    fn any_of_right_length(&mut self, x: &[char], n: usize) -> StateId {
        if n == x.len() {
            return self.new_state(true);
        }
        let s = self.new_state(false);
        let next = self.any_of_right_length(x, n + 1);
        self.g.add_transition(s, Transition::range('0', '9', next));
        s
    }

    /// Digit strings `>= x[n..]` of the same length.
    fn at_least(&mut self, x: &[char], n: usize, zeros: bool) -> StateId {
        if n == x.len() {
            return self.new_state(true);
        }
        let s = self.new_state(false);
        if zeros {
            self.initials.push(s);
        }
        let c = x[n];
        let next = self.at_least(x, n + 1, zeros && c == '0');
        self.g.add_transition(s, Transition::new(c, next));
        if c < '9' {
            let any = self.any_of_right_length(x, n + 1);
            self.g.add_transition(s, Transition::range(next_digit(c), '9', any));
        }
        s
    }

    /// Digit strings `<= x[n..]` of the same length.
    fn at_most(&mut self, x: &[char], n: usize) -> StateId {
        if n == x.len() {
            return self.new_state(true);
        }
        let s = self.new_state(false);
        let c = x[n];
        let next = self.at_most(x, n + 1);
        self.g.add_transition(s, Transition::new(c, next));
        if c > '0' {
            let any = self.any_of_right_length(x, n + 1);
            self.g.add_transition(s, Transition::range('0', prev_digit(c), any));
        }
        s
    }

    /// Digit strings between `x[n..]` and `y[n..]`, both of the same length.
    fn between(&mut self, x: &[char], y: &[char], n: usize, zeros: bool) -> StateId {
        if n == x.len() {
            return self.new_state(true);
        }
        let s = self.new_state(false);
        if zeros {
            self.initials.push(s);
        }
        let (cx, cy) = (x[n], y[n]);
        if cx == cy {
            let next = self.between(x, y, n + 1, zeros && cx == '0');
            self.g.add_transition(s, Transition::new(cx, next));
        } else {
            let low = self.at_least(x, n + 1, zeros && cx == '0');
            self.g.add_transition(s, Transition::new(cx, low));
            let high = self.at_most(y, n + 1);
            self.g.add_transition(s, Transition::new(cy, high));
            if next_digit(cx) < cy {
                let any = self.any_of_right_length(x, n + 1);
                self.g.add_transition(s, Transition::range(next_digit(cx), prev_digit(cy), any));
            }
        }
        s
    }
}

fn next_digit(c: char) -> char {
    char_succ(c).unwrap_or(c)
}

fn prev_digit(c: char) -> char {
    char_pred(c).unwrap_or(c)
}

fn padded(value: u64, width: usize) -> Vec<char> {
    format!("{:0>width$}", value, width = width).chars().collect()
}

/// Decimal representations of the integers in `[min, max]`.
///
/// With `digits > 0` only numbers written with exactly that many digits (zero-padded)
/// are accepted. Otherwise the number of leading zeros is unconstrained.
///
/// # Panics
///
/// Panics if `min > max`, or if `max` does not fit in `digits` digits.
pub fn make_interval(min: u64, max: u64, digits: usize) -> Automaton {
    assert!(min <= max, "interval bounds out of order: {} > {}", min, max);
    let width = max.to_string().len();
    assert!(digits == 0 || width <= digits, "{} does not fit in {} digits", max, digits);
    let d = if digits > 0 { digits } else { width };
    let x = padded(min, d);
    let y = padded(max, d);
    debug!("make_interval({}, {}, {})", min, max, digits);

    let mut g = Graph::new();
    let mut builder = IntervalBuilder {
        g: &mut g,
        initials: Vec::new(),
    };
    let initial = builder.between(&x, &y, 0, digits == 0);
    let initials = builder.initials;
    g.set_initial(initial);
    if digits == 0 {
        let pairs: Vec<StatePair> = initials
            .into_iter()
            .filter(|&p| p != initial)
            .map(|p| StatePair::new(initial, p))
            .collect();
        g.add_epsilons(pairs);
        g.add_transition(initial, Transition::new('0', initial));
        g.set_deterministic(false);
    }
    g.compact();

    let mut a = Automaton::Graph(g);
    minimize(&mut a);
    a
}

/// Strings containing `s` as a substring, built directly as a KMP-style matcher.
pub fn make_string_matcher(s: &str) -> Automaton {
    let chars: Vec<char> = s.chars().collect();
    let mut g = Graph::new();
    let mut states = vec![g.initial()];
    for _ in 0..chars.len() {
        states.push(g.add_state());
    }
    let last = states[chars.len()];
    g.state_mut(last).set_accept(true);
    g.add_transition(last, Transition::range(MIN_CHAR, MAX_CHAR, last));

    for i in 0..chars.len() {
        let c = chars[i];
        let mut done = vec![c];
        g.add_transition(states[i], Transition::new(c, states[i + 1]));
        // Fall back to the longest proper prefix that is also a suffix of chars[..i].
        for j in (1..=i).rev() {
            let d = chars[j - 1];
            if !done.contains(&d) && chars[..j - 1] == chars[i + 1 - j..i] {
                g.add_transition(states[i], Transition::new(d, states[j]));
                done.push(d);
            }
        }
        done.sort_unstable();
        let mut next = Some(MIN_CHAR);
        for &d in &done {
            if let (Some(n), Some(before)) = (next, char_pred(d)) {
                if n <= before {
                    g.add_transition(states[i], Transition::range(n, before, states[0]));
                }
            }
            next = char_succ(d);
        }
        if let Some(n) = next {
            g.add_transition(states[i], Transition::range(n, MAX_CHAR, states[0]));
        }
    }
    g.set_deterministic(true);
    Automaton::Graph(g)
}

fn compile_fixed(pattern: &str) -> Automaton {
    let options = CompileOptions::default();
    let re = match RegExp::parse(pattern, SyntaxFlags::ALL) {
        Ok(re) => re,
        Err(e) => panic!("built-in pattern {:?} does not parse: {}", pattern, e),
    };
    let mut a = match re.to_automaton(&options) {
        Ok(a) => a,
        Err(e) => panic!("built-in pattern {:?} does not compile: {}", pattern, e),
    };
    minimize(&mut a);
    a
}

/// Decimal numbers with at most `i` significant digits, surrounded by optional whitespace.
pub fn make_total_digits(i: usize) -> Automaton {
    compile_fixed(&format!(
        "[ \t\n\r]*[-+]?0*([0-9]{{0,{i}}}|((([0-9]\\.*){{0,{i}}})&@\\.@)0*)[ \t\n\r]*"
    ))
}

/// Decimal numbers with at most `i` fraction digits, surrounded by optional whitespace.
pub fn make_fraction_digits(i: usize) -> Automaton {
    compile_fixed(&format!(
        "[ \t\n\r]*[-+]?[0-9]+(\\.[0-9]{{0,{i}}}0*)?[ \t\n\r]*"
    ))
}
