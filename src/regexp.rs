//! Regular expressions: the expression tree, its parser and its compiler to automata.
//!
//! # Syntax
//!
//! ```text
//! regexp   ::= unionexp
//! unionexp ::= interexp ( '|' interexp )*
//! interexp ::= concatexp ( '&' concatexp )*          [INTERSECTION]
//! concatexp::= repeatexp+
//! repeatexp::= complexp ( '?' | '*' | '+' | '{' n '}' | '{' n ',}' | '{' n ',' m '}' )*
//! complexp ::= '~' complexp                           [COMPLEMENT]
//!            | charclassexp
//! charclassexp ::= '[' '^'? charclass+ ']' | simpleexp
//! charclass::= charexp ( '-' charexp )?
//! simpleexp::= charexp | '.' | '#' [EMPTY] | '@' [ANYSTRING]
//!            | '"' <unicode string without '"'> '"'
//!            | '(' ')' | '(' unionexp ')' | '(?' flags ':' unionexp ')'
//!            | '<' identifier '>'                     [AUTOMATON]
//!            | '<' n '-' m '>'                         [INTERVAL]
//! charexp  ::= <unicode character> | '\' <unicode character>
//! ```
//!
//! Constructs marked with a flag are only recognized when the corresponding
//! [`SyntaxFlags`] bit is set; otherwise their metacharacter stands for itself. The
//! shorthand `\d` is expanded to `[0-9]` before parsing. Flags of a `(?flags:...)` group
//! are accepted and ignored.
//!
//! # Examples
//!
//! ```
//! use xeger_rs::config::{CompileOptions, SyntaxFlags};
//! use xeger_rs::regexp::RegExp;
//!
//! let re = RegExp::parse("(ab|c)+&~(.*cc.*)", SyntaxFlags::ALL).unwrap();
//! let a = re.to_automaton(&CompileOptions::default()).unwrap();
//! assert!(a.run("abcab"));
//! assert!(!a.run("abcc"));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};

use log::debug;

use crate::automaton::Automaton;
use crate::basic_automata::{
    make_any_char, make_any_string, make_char, make_char_range, make_empty, make_interval, make_string,
};
use crate::basic_operations::{complement, concatenate, intersection, optional, repeat, repeat_min, repeat_range, union};
use crate::config::{CompileOptions, SyntaxFlags};
use crate::error::{Error, Result, SyntaxError};
use crate::minimization::minimize_with;

/// A source of automata for `<name>` references.
pub trait AutomatonProvider {
    /// The automaton registered under `name`.
    ///
    /// The compiler obtains it through the [`MutationPolicy`][crate::config::MutationPolicy]
    /// of the compilation, so under `Mutate` it is moved out of the provider.
    fn get_automaton(&mut self, name: &str) -> Option<&mut Automaton>;
}

impl AutomatonProvider for HashMap<String, Automaton> {
    fn get_automaton(&mut self, name: &str) -> Option<&mut Automaton> {
        self.get_mut(name)
    }
}

impl AutomatonProvider for BTreeMap<String, Automaton> {
    fn get_automaton(&mut self, name: &str) -> Option<&mut Automaton> {
        self.get_mut(name)
    }
}

/// A parsed regular expression.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RegExp {
    Union(Box<RegExp>, Box<RegExp>),
    Concatenation(Box<RegExp>, Box<RegExp>),
    Intersection(Box<RegExp>, Box<RegExp>),
    Optional(Box<RegExp>),
    Repeat(Box<RegExp>),
    RepeatMin(Box<RegExp>, usize),
    RepeatMinMax(Box<RegExp>, usize, usize),
    Complement(Box<RegExp>),
    Char(char),
    CharRange(char, char),
    AnyChar,
    Empty,
    String(String),
    AnyString,
    Automaton(String),
    Interval { min: u64, max: u64, digits: usize },
}

impl RegExp {
    pub fn union(lhs: Self, rhs: Self) -> Self {
        RegExp::Union(Box::new(lhs), Box::new(rhs))
    }

    /// Concatenation, folding adjacent literal characters and strings into one string.
    pub fn concatenation(lhs: Self, rhs: Self) -> Self {
        if lhs.is_literal() && rhs.is_literal() {
            return Self::join_literals(&lhs, &rhs);
        }
        match (lhs, rhs) {
            (RegExp::Concatenation(a, b), rhs) if b.is_literal() && rhs.is_literal() => {
                RegExp::Concatenation(a, Box::new(Self::join_literals(&b, &rhs)))
            }
            (lhs, RegExp::Concatenation(a, b)) if lhs.is_literal() && a.is_literal() => {
                RegExp::Concatenation(Box::new(Self::join_literals(&lhs, &a)), b)
            }
            (lhs, rhs) => RegExp::Concatenation(Box::new(lhs), Box::new(rhs)),
        }
    }

    pub fn intersection(lhs: Self, rhs: Self) -> Self {
        RegExp::Intersection(Box::new(lhs), Box::new(rhs))
    }

    pub fn optional(e: Self) -> Self {
        RegExp::Optional(Box::new(e))
    }

    pub fn repeat(e: Self) -> Self {
        RegExp::Repeat(Box::new(e))
    }

    pub fn repeat_min(e: Self, min: usize) -> Self {
        RegExp::RepeatMin(Box::new(e), min)
    }

    pub fn repeat_range(e: Self, min: usize, max: usize) -> Self {
        RegExp::RepeatMinMax(Box::new(e), min, max)
    }

    pub fn complement(e: Self) -> Self {
        RegExp::Complement(Box::new(e))
    }

    fn is_literal(&self) -> bool {
        matches!(self, RegExp::Char(_) | RegExp::String(_))
    }

    fn push_literal(&self, out: &mut String) {
        match self {
            RegExp::Char(c) => out.push(*c),
            RegExp::String(s) => out.push_str(s),
            _ => unreachable!("not a literal: {:?}", self),
        }
    }

    fn join_literals(lhs: &Self, rhs: &Self) -> Self {
        let mut s = String::new();
        lhs.push_literal(&mut s);
        rhs.push_literal(&mut s);
        RegExp::String(s)
    }

    /// Parse `pattern` with the given optional constructs enabled.
    pub fn parse(pattern: &str, flags: SyntaxFlags) -> Result<Self, SyntaxError> {
        let chars = expand_digit_class(pattern);
        if chars.is_empty() {
            return Ok(RegExp::String(String::new()));
        }
        let mut parser = Parser { chars, pos: 0, flags };
        let e = parser.parse_union()?;
        if parser.more() {
            return Err(parser.error("end of pattern expected"));
        }
        debug!("parsed {:?} as {}", pattern, e);
        Ok(e)
    }

    /// The names of all `<name>` references in the tree.
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut counts = HashMap::new();
        self.count_identifiers(&mut counts);
        counts.into_keys().collect()
    }

    fn count_identifiers(&self, counts: &mut HashMap<String, usize>) {
        match self {
            RegExp::Union(a, b) | RegExp::Concatenation(a, b) | RegExp::Intersection(a, b) => {
                a.count_identifiers(counts);
                b.count_identifiers(counts);
            }
            RegExp::Optional(a)
            | RegExp::Repeat(a)
            | RegExp::RepeatMin(a, _)
            | RegExp::RepeatMinMax(a, _, _)
            | RegExp::Complement(a) => a.count_identifiers(counts),
            RegExp::Automaton(name) => *counts.entry(name.clone()).or_default() += 1,
            _ => {}
        }
    }

    /// Compile to an automaton. Fails if the tree references a named automaton.
    pub fn to_automaton(&self, options: &CompileOptions) -> Result<Automaton> {
        Compiler::new(self, *options, None).compile(self)
    }

    /// Compile to an automaton, resolving `<name>` references through `provider`.
    pub fn to_automaton_with(&self, provider: &mut dyn AutomatonProvider, options: &CompileOptions) -> Result<Automaton> {
        Compiler::new(self, *options, Some(provider)).compile(self)
    }

    /// Collects the maximal subtrees below `self` that are not of the same binary kind.
    fn leaves(&self) -> Vec<&RegExp> {
        let same_kind = |e: &RegExp| match (self, e) {
            (RegExp::Union(..), RegExp::Union(..)) => true,
            (RegExp::Concatenation(..), RegExp::Concatenation(..)) => true,
            _ => false,
        };
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(e) = stack.pop() {
            match e {
                RegExp::Union(a, b) | RegExp::Concatenation(a, b) if same_kind(e) => {
                    stack.push(b);
                    stack.push(a);
                }
                _ => out.push(e),
            }
        }
        out
    }
}

/// Replace the `\d` shorthand by `[0-9]`, leaving other escapes alone.
fn expand_digit_class(pattern: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('d') => out.extend("[0-9]".chars()),
            Some(d) => out.extend([c, d]),
            None => out.push(c),
        }
    }
    out
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    flags: SyntaxFlags,
}

impl Parser {
    fn error(&self, message: &str) -> SyntaxError {
        SyntaxError::new(self.pos, message)
    }

    fn more(&self) -> bool {
        self.pos < self.chars.len()
    }

    fn check(&self, flag: SyntaxFlags) -> bool {
        self.flags.contains(flag)
    }

    fn peek(&self, set: &str) -> bool {
        self.chars.get(self.pos).is_some_and(|c| set.contains(*c))
    }

    fn eat(&mut self, c: char) -> bool {
        if self.chars.get(self.pos) == Some(&c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), SyntaxError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    fn next(&mut self) -> Result<char, SyntaxError> {
        match self.chars.get(self.pos) {
            Some(&c) => {
                self.pos += 1;
                Ok(c)
            }
            None => Err(self.error("unexpected end of pattern")),
        }
    }

    /// Right-nested fold, matching the right recursion of the grammar.
    fn fold_right(items: Vec<RegExp>, f: impl Fn(RegExp, RegExp) -> RegExp) -> RegExp {
        let mut iter = items.into_iter().rev();
        let mut acc = iter.next().unwrap_or(RegExp::String(String::new()));
        for e in iter {
            acc = f(e, acc);
        }
        acc
    }

    fn parse_union(&mut self) -> Result<RegExp, SyntaxError> {
        let mut items = vec![self.parse_intersection()?];
        while self.eat('|') {
            items.push(self.parse_intersection()?);
        }
        Ok(Self::fold_right(items, RegExp::union))
    }

    fn parse_intersection(&mut self) -> Result<RegExp, SyntaxError> {
        let mut items = vec![self.parse_concatenation()?];
        while self.check(SyntaxFlags::INTERSECTION) && self.eat('&') {
            items.push(self.parse_concatenation()?);
        }
        Ok(Self::fold_right(items, RegExp::intersection))
    }

    fn at_concatenation_end(&self) -> bool {
        !self.more() || self.peek(")|") || (self.check(SyntaxFlags::INTERSECTION) && self.peek("&"))
    }

    fn parse_concatenation(&mut self) -> Result<RegExp, SyntaxError> {
        let mut items = vec![self.parse_repeat()?];
        while !self.at_concatenation_end() {
            items.push(self.parse_repeat()?);
        }
        Ok(Self::fold_right(items, RegExp::concatenation))
    }

    fn parse_number(&mut self) -> Result<Option<usize>, SyntaxError> {
        let start = self.pos;
        while self.peek("0123456789") {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse()
            .map(Some)
            .map_err(|_| SyntaxError::new(start, "repetition bound too large"))
    }

    fn parse_repeat(&mut self) -> Result<RegExp, SyntaxError> {
        let mut e = self.parse_complement()?;
        while self.peek("?*+{") {
            if self.eat('?') {
                e = RegExp::optional(e);
            } else if self.eat('*') {
                e = RegExp::repeat(e);
            } else if self.eat('+') {
                e = RegExp::repeat_min(e, 1);
            } else if self.eat('{') {
                let Some(n) = self.parse_number()? else {
                    return Err(self.error("integer expected"));
                };
                let m = if self.eat(',') { self.parse_number()? } else { Some(n) };
                self.expect('}')?;
                e = match m {
                    Some(m) => RegExp::repeat_range(e, n, m),
                    None => RegExp::repeat_min(e, n),
                };
            }
        }
        Ok(e)
    }

    fn parse_complement(&mut self) -> Result<RegExp, SyntaxError> {
        if self.check(SyntaxFlags::COMPLEMENT) && self.eat('~') {
            Ok(RegExp::complement(self.parse_complement()?))
        } else {
            self.parse_char_class_exp()
        }
    }

    fn parse_char_class_exp(&mut self) -> Result<RegExp, SyntaxError> {
        if !self.eat('[') {
            return self.parse_simple();
        }
        let negate = self.eat('^');
        let mut e = self.parse_char_class()?;
        while self.more() && !self.peek("]") {
            e = RegExp::union(e, self.parse_char_class()?);
        }
        if negate {
            e = RegExp::intersection(RegExp::AnyChar, RegExp::complement(e));
        }
        self.expect(']')?;
        Ok(e)
    }

    fn parse_char_class(&mut self) -> Result<RegExp, SyntaxError> {
        let c = self.parse_char()?;
        if !self.eat('-') {
            return Ok(RegExp::Char(c));
        }
        if self.peek("]") {
            // A '-' right before ']' is a literal.
            return Ok(RegExp::union(RegExp::Char(c), RegExp::Char('-')));
        }
        let d = self.parse_char()?;
        Ok(if c == d { RegExp::Char(c) } else { RegExp::CharRange(c.min(d), c.max(d)) })
    }

    fn parse_simple(&mut self) -> Result<RegExp, SyntaxError> {
        if self.eat('.') {
            Ok(RegExp::AnyChar)
        } else if self.check(SyntaxFlags::EMPTY) && self.eat('#') {
            Ok(RegExp::Empty)
        } else if self.check(SyntaxFlags::ANYSTRING) && self.eat('@') {
            Ok(RegExp::AnyString)
        } else if self.eat('"') {
            let start = self.pos;
            while self.more() && !self.peek("\"") {
                self.pos += 1;
            }
            let s: String = self.chars[start..self.pos].iter().collect();
            self.expect('"')?;
            Ok(RegExp::String(s))
        } else if self.eat('(') {
            if self.eat('?') {
                while self.peek("imnsx") {
                    self.pos += 1;
                }
                self.expect(':')?;
            }
            if self.eat(')') {
                return Ok(RegExp::String(String::new()));
            }
            let e = self.parse_union()?;
            self.expect(')')?;
            Ok(e)
        } else if (self.check(SyntaxFlags::AUTOMATON) || self.check(SyntaxFlags::INTERVAL)) && self.eat('<') {
            self.parse_angle()
        } else {
            Ok(RegExp::Char(self.parse_char()?))
        }
    }

    /// The body of `<...>`, after the opening bracket.
    fn parse_angle(&mut self) -> Result<RegExp, SyntaxError> {
        let start = self.pos;
        while self.more() && !self.peek(">") {
            self.pos += 1;
        }
        let body: String = self.chars[start..self.pos].iter().collect();
        self.expect('>')?;
        let at = self.pos - 1;

        let Some((smin, smax)) = body.split_once('-') else {
            if !self.check(SyntaxFlags::AUTOMATON) {
                return Err(SyntaxError::new(at, "interval syntax error"));
            }
            return Ok(RegExp::Automaton(body));
        };
        if !self.check(SyntaxFlags::INTERVAL) {
            return Err(SyntaxError::new(at, "illegal identifier"));
        }
        if smin.is_empty() || smax.is_empty() || smax.contains('-') {
            return Err(SyntaxError::new(at, "interval syntax error"));
        }
        let parse = |s: &str| s.parse::<u64>().map_err(|_| SyntaxError::new(at, "interval syntax error"));
        let (mut min, mut max) = (parse(smin)?, parse(smax)?);
        let digits = if smin.len() == smax.len() { smin.len() } else { 0 };
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Ok(RegExp::Interval { min, max, digits })
    }

    fn parse_char(&mut self) -> Result<char, SyntaxError> {
        self.eat('\\');
        self.next()
    }
}

/// Walks a tree bottom-up, building and optionally minimizing one automaton per node.
struct Compiler<'p> {
    options: CompileOptions,
    provider: Option<&'p mut dyn AutomatonProvider>,
    /// Named automata fetched so far, with the number of references still to compile.
    named: HashMap<String, (Automaton, usize)>,
    uses: HashMap<String, usize>,
}

impl<'p> Compiler<'p> {
    fn new(re: &RegExp, options: CompileOptions, provider: Option<&'p mut dyn AutomatonProvider>) -> Self {
        let mut uses = HashMap::new();
        re.count_identifiers(&mut uses);
        Self {
            options,
            provider,
            named: HashMap::new(),
            uses,
        }
    }

    fn finish(&self, mut a: Automaton) -> Automaton {
        if self.options.minimize {
            minimize_with(&mut a, self.options.minimization);
        }
        a
    }

    fn lookup(&mut self, name: &str) -> Result<Automaton> {
        if !self.named.contains_key(name) {
            let undefined = || Error::UndefinedAutomaton { name: name.to_string() };
            let provider = self.provider.as_deref_mut().ok_or_else(undefined)?;
            let slot = provider.get_automaton(name).ok_or_else(undefined)?;
            let a = self.options.mutation.acquire(slot);
            let uses = self.uses.get(name).copied().unwrap_or(1);
            self.named.insert(name.to_string(), (a, uses));
        }
        let Some((a, remaining)) = self.named.get_mut(name) else {
            unreachable!("'{}' was just resolved", name);
        };
        *remaining -= 1;
        if *remaining == 0 {
            let (a, _) = self.named.remove(name).unwrap_or_default();
            Ok(a)
        } else {
            Ok(a.clone())
        }
    }

    fn compile(&mut self, re: &RegExp) -> Result<Automaton> {
        let a = match re {
            RegExp::Union(..) => {
                let parts = re.leaves().into_iter().map(|e| self.compile(e)).collect::<Result<Vec<_>>>()?;
                self.finish(union(parts))
            }
            RegExp::Concatenation(..) => {
                let parts = re.leaves().into_iter().map(|e| self.compile(e)).collect::<Result<Vec<_>>>()?;
                self.finish(concatenate(parts))
            }
            RegExp::Intersection(a, b) => {
                let a = self.compile(a)?;
                let b = self.compile(b)?;
                self.finish(intersection(&a, &b))
            }
            RegExp::Optional(e) => {
                let a = self.compile(e)?;
                self.finish(optional(a))
            }
            RegExp::Repeat(e) => {
                let a = self.compile(e)?;
                self.finish(repeat(a))
            }
            RegExp::RepeatMin(e, min) => {
                let a = self.compile(e)?;
                self.finish(repeat_min(a, *min))
            }
            RegExp::RepeatMinMax(e, min, max) => {
                let a = self.compile(e)?;
                self.finish(repeat_range(a, *min, *max))
            }
            RegExp::Complement(e) => {
                let a = self.compile(e)?;
                self.finish(complement(a))
            }
            RegExp::Char(c) => make_char(*c),
            RegExp::CharRange(from, to) => make_char_range(*from, *to),
            RegExp::AnyChar => make_any_char(),
            RegExp::Empty => make_empty(),
            RegExp::String(s) => make_string(s),
            RegExp::AnyString => make_any_string(),
            RegExp::Automaton(name) => self.lookup(name)?,
            RegExp::Interval { min, max, digits } => make_interval(*min, *max, *digits),
        };
        Ok(a)
    }
}

/// Characters with a meaning somewhere in the grammar.
const METACHARACTERS: &str = "|&~()[]{}?*+.#@<>\"\\^-";

/// Writes `c` so that it parses back as the literal character.
fn write_escaped(f: &mut Formatter<'_>, c: char) -> fmt::Result {
    if METACHARACTERS.contains(c) || c.is_whitespace() {
        write!(f, "\\{}", c)
    } else {
        write!(f, "{}", c)
    }
}

impl Display for RegExp {
    /// Writes the expression back in the concrete syntax, fully parenthesized.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RegExp::Union(a, b) => write!(f, "({}|{})", a, b),
            RegExp::Concatenation(a, b) => write!(f, "{}{}", a, b),
            RegExp::Intersection(a, b) => write!(f, "({}&{})", a, b),
            RegExp::Optional(a) => write!(f, "({})?", a),
            RegExp::Repeat(a) => write!(f, "({})*", a),
            RegExp::RepeatMin(a, min) => write!(f, "({}){{{},}}", a, min),
            RegExp::RepeatMinMax(a, min, max) => write!(f, "({}){{{},{}}}", a, min, max),
            RegExp::Complement(a) => write!(f, "~({})", a),
            RegExp::Char(c) => write_escaped(f, *c),
            RegExp::CharRange(from, to) => {
                write!(f, "[")?;
                write_escaped(f, *from)?;
                write!(f, "-")?;
                write_escaped(f, *to)?;
                write!(f, "]")
            }
            RegExp::AnyChar => write!(f, "."),
            RegExp::Empty => write!(f, "#"),
            // `\d` inside quotes would be expanded on reparse.
            RegExp::String(s) if s.contains(['"', '\\']) => {
                write!(f, "(")?;
                for c in s.chars() {
                    write_escaped(f, c)?;
                }
                write!(f, ")")
            }
            RegExp::String(s) => write!(f, "\"{}\"", s),
            RegExp::AnyString => write!(f, "@"),
            RegExp::Automaton(name) => write!(f, "<{}>", name),
            RegExp::Interval { min, max, digits } => {
                write!(f, "<{:0>w$}-{:0>w$}>", min, max, w = *digits)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::config::MutationPolicy;

    fn compile(pattern: &str) -> Automaton {
        RegExp::parse(pattern, SyntaxFlags::ALL)
            .unwrap()
            .to_automaton(&CompileOptions::default())
            .unwrap()
    }

    #[test]
    fn test_literal_folding() {
        let re = RegExp::parse("abc", SyntaxFlags::ALL).unwrap();
        assert_eq!(re, RegExp::String("abc".into()));
        let re = RegExp::parse("ab*", SyntaxFlags::ALL).unwrap();
        assert_eq!(
            re,
            RegExp::Concatenation(Box::new(RegExp::Char('a')), Box::new(RegExp::repeat(RegExp::Char('b'))))
        );
        let re = RegExp::parse("x*abc", SyntaxFlags::ALL).unwrap();
        assert_eq!(
            re,
            RegExp::Concatenation(Box::new(RegExp::repeat(RegExp::Char('x'))), Box::new(RegExp::String("abc".into())))
        );
    }

    #[test]
    fn test_empty_pattern() {
        assert_eq!(RegExp::parse("", SyntaxFlags::ALL).unwrap(), RegExp::String(String::new()));
        assert_eq!(RegExp::parse("()", SyntaxFlags::ALL).unwrap(), RegExp::String(String::new()));
    }

    #[test]
    fn test_precedence() {
        let a = compile("ab|cd");
        assert!(a.run("ab"));
        assert!(a.run("cd"));
        assert!(!a.run("abd"));

        let a = compile("ab+");
        assert!(a.run("abbb"));
        assert!(!a.run("abab"));
    }

    #[test]
    fn test_repeat_bounds() {
        let a = compile("a{2}");
        assert!(a.run("aa"));
        assert!(!a.run("aaa"));
        let a = compile("a{2,}");
        assert!(!a.run("a"));
        assert!(a.run("aaaaa"));
        let a = compile("(ab){1,2}");
        assert!(a.run("abab"));
        assert!(!a.run(""));
        assert!(compile("a{3,2}").is_empty());
    }

    #[test]
    fn test_char_classes() {
        let a = compile("[a-cx]");
        assert!(a.run("b"));
        assert!(a.run("x"));
        assert!(!a.run("d"));

        let a = compile("[^a-c]");
        assert!(a.run("d"));
        assert!(!a.run("b"));
        assert!(!a.run(""));
        assert!(!a.run("dd"));

        let a = compile("[a-]");
        assert!(a.run("a"));
        assert!(a.run("-"));
        assert!(!a.run("b"));

        let a = compile("[z-a]");
        assert!(a.run("m"));
    }

    #[test]
    fn test_digit_shorthand() {
        let a = compile("\\d{3}");
        assert!(a.run("123"));
        assert!(!a.run("12a"));
        let a = compile("\\\\d");
        assert!(a.run("\\d"));
    }

    #[test]
    fn test_escapes_and_strings() {
        let a = compile("\\.\\*");
        assert!(a.run(".*"));
        assert!(!a.run("ab"));
        let a = compile("\"a|b\"c");
        assert!(a.run("a|bc"));
        assert!(!a.run("ac"));
    }

    #[test]
    fn test_non_capturing_group() {
        let a = compile("(?i:ab)c");
        assert!(a.run("abc"));
        assert!(RegExp::parse("(?q:a)", SyntaxFlags::ALL).is_err());
    }

    #[test]
    fn test_optional_constructs() {
        assert!(compile("#").is_empty());
        assert!(compile("a@").run("axyz"));
        assert!(compile("~(a*)").run("b"));
        assert!(!compile("~(a*)").run("aa"));
        assert!(compile("[a-z]*&.{2}").run("ok"));
        assert!(!compile("[a-z]*&.{2}").run("okk"));

        // Disabled constructs are literals.
        let re = RegExp::parse("a@b&~#", SyntaxFlags::NONE).unwrap();
        assert_eq!(re, RegExp::String("a@b&~#".into()));
    }

    #[test]
    fn test_interval() {
        let re = RegExp::parse("<7-42>", SyntaxFlags::ALL).unwrap();
        assert_eq!(re, RegExp::Interval { min: 7, max: 42, digits: 0 });
        let re = RegExp::parse("<42-07>", SyntaxFlags::ALL).unwrap();
        assert_eq!(re, RegExp::Interval { min: 7, max: 42, digits: 2 });
        let a = compile("<07-42>");
        assert!(a.run("07"));
        assert!(!a.run("7"));
        assert!(!a.run("43"));

        for bad in ["<-5>", "<5->", "<1-2-3>", "<a-5>"] {
            let e = RegExp::parse(bad, SyntaxFlags::ALL).unwrap_err();
            assert_eq!(e.message, "interval syntax error", "{}", bad);
        }
    }

    #[test]
    fn test_syntax_errors() {
        let cases = [
            ("(ab", 3, "expected ')'"),
            ("[ab", 3, "expected ']'"),
            ("a{", 2, "integer expected"),
            ("a{2", 3, "expected '}'"),
            ("a{2,3", 5, "expected '}'"),
            ("ab)", 2, "end of pattern expected"),
            ("\"ab", 3, "expected '\"'"),
            ("a\\", 2, "unexpected end of pattern"),
            ("a|", 2, "unexpected end of pattern"),
        ];
        for (pattern, position, message) in cases {
            let e = RegExp::parse(pattern, SyntaxFlags::ALL).unwrap_err();
            assert_eq!((e.position, e.message.as_str()), (position, message), "{:?}", pattern);
        }
        let e = RegExp::parse("a{99999999999999999999999}", SyntaxFlags::ALL).unwrap_err();
        assert_eq!(e.position, 2);
    }

    #[test]
    fn test_named_automata() {
        let mut provider = HashMap::new();
        provider.insert("digit".to_string(), crate::basic_automata::make_char_range('0', '9'));
        let re = RegExp::parse("<digit>-<digit>", SyntaxFlags::ALL).unwrap();
        assert_eq!(re.identifiers(), BTreeSet::from(["digit".to_string()]));

        let options = CompileOptions::default().with_mutation(MutationPolicy::Preserve);
        let a = re.to_automaton_with(&mut provider, &options).unwrap();
        assert!(a.run("1-2"));
        assert!(!a.run("1-a"));
        assert!(!provider["digit"].is_empty());

        let options = CompileOptions::default().with_mutation(MutationPolicy::Mutate);
        let a = re.to_automaton_with(&mut provider, &options).unwrap();
        assert!(a.run("3-4"));
        assert!(provider["digit"].is_empty());
    }

    #[test]
    fn test_undefined_automaton() {
        let re = RegExp::parse("<nope>", SyntaxFlags::ALL).unwrap();
        let e = re.to_automaton(&CompileOptions::default()).unwrap_err();
        assert_eq!(e, Error::UndefinedAutomaton { name: "nope".into() });
        let mut provider: BTreeMap<String, Automaton> = BTreeMap::new();
        assert!(re.to_automaton_with(&mut provider, &CompileOptions::default()).is_err());
    }

    #[test]
    fn test_display_reparses() {
        for pattern in ["(a|bc)*d{2,3}", "[^x-z]+", "~(ab)&.*", "<3-15>", "<003-015>", "\"q\"?", "a\\\"b"] {
            let re = RegExp::parse(pattern, SyntaxFlags::ALL).unwrap();
            let again = RegExp::parse(&re.to_string(), SyntaxFlags::ALL).unwrap();
            let (a, b) = (
                again.to_automaton(&CompileOptions::default()).unwrap(),
                re.to_automaton(&CompileOptions::default()).unwrap(),
            );
            assert!(a.same_language(&b), "{} vs {}", pattern, re);
        }
        let re = RegExp::parse("a|b*", SyntaxFlags::ALL).unwrap();
        assert_eq!(re.to_string(), "(a|(b)*)");
    }

    #[test]
    fn test_display_keeps_plain_letters() {
        // A printed `\d` would come back as a digit class.
        for (re, text) in [
            (RegExp::Char('d'), "d"),
            (RegExp::CharRange('a', 'd'), "[a-d]"),
            (RegExp::Char('*'), "\\*"),
            (RegExp::CharRange('-', '^'), "[\\--\\^]"),
            (RegExp::String("\\d".into()), "(\\\\d)"),
        ] {
            assert_eq!(re.to_string(), text);
            assert_eq!(RegExp::parse(text, SyntaxFlags::ALL).unwrap(), re, "{}", text);
        }

        for pattern in ["d", "[a-d]+", "\\\\d", "x d\\\"", "[ -~]"] {
            let re = RegExp::parse(pattern, SyntaxFlags::ALL).unwrap();
            let again = RegExp::parse(&re.to_string(), SyntaxFlags::ALL).unwrap();
            let options = CompileOptions::default();
            let (a, b) = (again.to_automaton(&options).unwrap(), re.to_automaton(&options).unwrap());
            assert!(a.same_language(&b), "{} vs {}", pattern, re);
        }
        assert!(!compile("d").run("1"));
    }

    #[test]
    fn test_unminimized_compile() {
        let re = RegExp::parse("(a|b)*abb", SyntaxFlags::ALL).unwrap();
        let raw = re.to_automaton(&CompileOptions::default().with_minimize(false)).unwrap();
        let min = re.to_automaton(&CompileOptions::default()).unwrap();
        assert!(raw.same_language(&min));
        assert!(raw.number_of_states() >= min.number_of_states());
    }
}
