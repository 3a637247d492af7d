//! Operator overloads for building languages.
//!
//! | Operator | Meaning |
//! |---|---|
//! | `&a \| &b` | union |
//! | `&a & &b` | intersection |
//! | `!&a` | complement |
//! | `&a - &b` | difference |
//! | `&a + &b` | concatenation |
//!
//! The borrowed forms clone their operands. The owned forms consume them and avoid the copy.

use std::ops::{Add, BitAnd, BitOr, Not, Sub};

use crate::automaton::Automaton;
use crate::basic_operations::{complement, concatenate, intersection, minus, union};

impl BitOr for &Automaton {
    type Output = Automaton;

    fn bitor(self, rhs: Self) -> Self::Output {
        union(vec![self.clone(), rhs.clone()])
    }
}

impl BitOr for Automaton {
    type Output = Automaton;

    fn bitor(self, rhs: Self) -> Self::Output {
        union(vec![self, rhs])
    }
}

impl BitAnd for &Automaton {
    type Output = Automaton;

    fn bitand(self, rhs: Self) -> Self::Output {
        intersection(self, rhs)
    }
}

impl BitAnd for Automaton {
    type Output = Automaton;

    fn bitand(self, rhs: Self) -> Self::Output {
        intersection(&self, &rhs)
    }
}

impl Not for &Automaton {
    type Output = Automaton;

    fn not(self) -> Self::Output {
        complement(self.clone())
    }
}

impl Not for Automaton {
    type Output = Automaton;

    fn not(self) -> Self::Output {
        complement(self)
    }
}

impl Sub for &Automaton {
    type Output = Automaton;

    fn sub(self, rhs: Self) -> Self::Output {
        minus(self.clone(), rhs)
    }
}

impl Sub for Automaton {
    type Output = Automaton;

    fn sub(self, rhs: Self) -> Self::Output {
        minus(self, &rhs)
    }
}

impl Add for &Automaton {
    type Output = Automaton;

    fn add(self, rhs: Self) -> Self::Output {
        concatenate(vec![self.clone(), rhs.clone()])
    }
}

impl Add for Automaton {
    type Output = Automaton;

    fn add(self, rhs: Self) -> Self::Output {
        concatenate(vec![self, rhs])
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::basic_automata::{make_char_range, make_empty, make_string};
    use crate::basic_operations::repeat;

    #[test]
    fn test_union_and_concat() {
        let a = make_string("foo");
        let b = make_string("bar");
        let u = &a | &b;
        assert!(u.run("foo"));
        assert!(u.run("bar"));
        assert!(!u.run("foobar"));

        let c = &a + &b;
        assert!(c.run("foobar"));
        assert!(!c.run("foo"));

        // Operands are untouched.
        assert_eq!(a.singleton(), Some("foo"));
    }

    #[test]
    fn test_intersection_and_minus() {
        let lower = repeat(make_char_range('a', 'z'));
        let ab = repeat(make_char_range('a', 'b'));
        let both = &lower & &ab;
        assert!(both.run("abba"));
        assert!(!both.run("abc"));

        let diff = &lower - &ab;
        assert!(diff.run("abc"));
        assert!(!diff.run("abba"));
        assert!(!diff.run(""));
    }

    #[test]
    fn test_not() {
        let a = make_string("x");
        let na = !&a;
        assert!(!na.run("x"));
        assert!(na.run(""));
        assert!(na.run("xx"));
        assert!((!na).same_language(&a));
    }

    #[test]
    fn test_owned_forms() {
        let u = make_string("a") | make_empty();
        assert!(u.same_language(&make_string("a")));
        let c = make_string("a") + make_string("b");
        assert!(c.run("ab"));
        let i = make_string("a") & make_char_range('a', 'c');
        assert!(i.run("a"));
        let d = make_char_range('a', 'c') - make_string("b");
        assert!(d.run("a"));
        assert!(!d.run("b"));
    }
}
