//! The public surface: compile a pattern, draw strings from it, test candidates.
//!
//! # Examples
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use xeger_rs::xeger::{compile, generate, matches};
//!
//! let a = compile("[0-9]{3}-[0-9]{4}").unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! let phone = generate(&a, &mut rng).unwrap();
//! assert_eq!(phone.len(), 8);
//! assert!(matches(&a, &phone));
//! assert!(!matches(&a, "12-3456"));
//! ```

use log::debug;
use rand::Rng;

use crate::automaton::Automaton;
use crate::config::{CompileOptions, SyntaxFlags};
use crate::error::Result;
pub use crate::regexp::AutomatonProvider;
use crate::regexp::RegExp;

/// Compile `pattern` with the default options into a minimal automaton.
pub fn compile(pattern: &str) -> Result<Automaton> {
    compile_with(pattern, &CompileOptions::default())
}

/// Compile `pattern` with explicit options.
///
/// The result is minimized with `options.minimization` unless `options.minimize` is off.
pub fn compile_with(pattern: &str, options: &CompileOptions) -> Result<Automaton> {
    let re = RegExp::parse(pattern, options.syntax)?;
    finish(re.to_automaton(options)?, options)
}

/// Compile `pattern`, resolving `<name>` references through `provider`.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use xeger_rs::basic_automata::make_char_range;
/// use xeger_rs::config::CompileOptions;
/// use xeger_rs::xeger::compile_with_provider;
///
/// let mut names = HashMap::new();
/// names.insert("hex".to_string(), make_char_range('a', 'f'));
/// let a = compile_with_provider("0x<hex>+", &mut names, &CompileOptions::default()).unwrap();
/// assert!(a.run("0xbeef"));
/// ```
pub fn compile_with_provider(
    pattern: &str,
    provider: &mut dyn AutomatonProvider,
    options: &CompileOptions,
) -> Result<Automaton> {
    let re = RegExp::parse(pattern, options.syntax)?;
    finish(re.to_automaton_with(provider, options)?, options)
}

fn finish(mut a: Automaton, options: &CompileOptions) -> Result<Automaton> {
    if options.minimize {
        a.minimize_with(options.minimization);
    }
    debug!(
        "compiled automaton: {} states, {} transitions",
        a.number_of_states(),
        a.number_of_transitions()
    );
    Ok(a)
}

/// Draw a random string from the language of `a`.
///
/// See [`generator::generate`][crate::generator::generate].
pub fn generate<R: Rng + ?Sized>(a: &Automaton, rng: &mut R) -> Result<String> {
    crate::generator::generate(a, rng)
}

/// Whether `candidate` belongs to the language of `a`.
pub fn matches(a: &Automaton, candidate: &str) -> bool {
    a.run(candidate)
}

/// A compiled pattern ready to produce matching strings.
///
/// Anchors are accepted for convenience: one leading `^` and one trailing unescaped `$`
/// are removed before compiling, since every pattern matches whole strings anyway. The
/// `@` character is an ordinary literal here, so e-mail like patterns work unescaped.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use xeger_rs::Xeger;
///
/// let x = Xeger::new("^[a-z]{3,8}@example\\.com$").unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(5);
/// let email = x.generate(&mut rng).unwrap();
/// assert!(email.ends_with("@example.com"));
/// assert!(x.matches(&email));
/// ```
#[derive(Debug, Clone)]
pub struct Xeger {
    pattern: String,
    automaton: Automaton,
}

impl Xeger {
    pub fn new(pattern: &str) -> Result<Self> {
        let options = CompileOptions::default()
            .with_syntax(SyntaxFlags::ALL_EXCEPT_ANY_STRING)
            .with_minimize(true);
        Self::with_options(pattern, &options)
    }

    /// Like [`Xeger::new`], with explicit compile options.
    pub fn with_options(pattern: &str, options: &CompileOptions) -> Result<Self> {
        let stripped = strip_anchors(pattern);
        let mut automaton = RegExp::parse(stripped, options.syntax)?.to_automaton(options)?;
        automaton.minimize_with(options.minimization);
        Ok(Self {
            pattern: pattern.to_string(),
            automaton,
        })
    }

    /// The pattern as given, anchors included.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
        crate::generator::generate(&self.automaton, rng)
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.automaton.run(candidate)
    }
}

fn strip_anchors(pattern: &str) -> &str {
    let mut p = pattern.strip_prefix('^').unwrap_or(pattern);
    if let Some(rest) = p.strip_suffix('$') {
        let backslashes = rest.chars().rev().take_while(|&c| c == '\\').count();
        if backslashes % 2 == 0 {
            p = rest;
        }
    }
    p
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use test_log::test;

    use super::*;
    use crate::basic_automata::make_char_range;
    use crate::error::Error;

    #[test]
    fn test_strip_anchors() {
        assert_eq!(strip_anchors("^abc$"), "abc");
        assert_eq!(strip_anchors("abc"), "abc");
        assert_eq!(strip_anchors("^^a"), "^a");
        assert_eq!(strip_anchors("a\\$"), "a\\$");
        assert_eq!(strip_anchors("a\\\\$"), "a\\\\");
        assert_eq!(strip_anchors("$"), "");
    }

    #[test]
    fn test_compile_and_match() {
        let a = compile("(ab)+c?").unwrap();
        assert!(matches(&a, "ab"));
        assert!(matches(&a, "ababc"));
        assert!(!matches(&a, "abcab"));
        assert!(!matches(&a, ""));
    }

    #[test]
    fn test_compile_syntax_error() {
        let e = compile("a(b").unwrap_err();
        assert!(matches!(e, Error::Syntax(ref s) if s.position == 3), "{}", e);
    }

    #[test]
    fn test_compile_without_minimize() {
        let options = CompileOptions::default().with_minimize(false);
        let a = compile_with("a|a|a", &options).unwrap();
        let b = compile("a|a|a").unwrap();
        assert!(a.same_language(&b));
        assert!(a.number_of_states() >= b.number_of_states());
    }

    #[test]
    fn test_provider() {
        let mut names = HashMap::new();
        names.insert("digit".to_string(), make_char_range('0', '9'));
        let options = CompileOptions::default();
        let a = compile_with_provider("<digit>{2}", &mut names, &options).unwrap();
        assert!(a.run("42"));
        let e = compile_with_provider("<nope>", &mut names, &options).unwrap_err();
        assert_eq!(e, Error::UndefinedAutomaton { name: "nope".into() });
    }

    #[test]
    fn test_xeger_literal_at() {
        let x = Xeger::new("^a@b$").unwrap();
        assert_eq!(x.pattern(), "^a@b$");
        assert!(x.matches("a@b"));
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(x.generate(&mut rng).unwrap(), "a@b");
    }

    #[test]
    fn test_xeger_empty_language() {
        let x = Xeger::new("#").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(x.generate(&mut rng), Err(Error::Generation));
    }
}
