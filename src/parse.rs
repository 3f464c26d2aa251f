// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use inst::InstClass;
use Error;
use Flags;

/// A term produced by the parser: the linear, marker-based form of the
/// pattern that the transition builder consumes.
///
/// Postfix operators appear *after* the term or group they bind to, just
/// as they do in the pattern source. Counted repetitions never appear
/// here; the parser unrolls them into copies of the preceding unit.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// A literal character.
    Char(char),
    /// A character class.
    Class(InstClass),
    /// An id annotation produced by the `{n!}` extension.
    Id(u32),
    /// `(`
    Open,
    /// `)`
    Close,
    /// `|`
    Alternate,
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `?`
    Question,
}

/// The parser's output: the term stack, the flag set with the `^`/`$`
/// anchors folded in, and the exact length of the program the transition
/// builder will produce from it.
#[derive(Clone, Debug)]
pub struct Parsed {
    pub terms: Vec<Term>,
    pub flags: Flags,
    pub prog_len: usize,
}

/// Parse a pattern into a term stack.
///
/// A leading `^` (position 0 only) folds into `MATCH_BEGIN`; an unescaped
/// trailing `$` folds into `MATCH_END`. Anywhere else both characters are
/// literals. `size_limit` bounds the predicted program length, which in
/// particular bounds counted-repetition unrolling.
pub fn parse(re: &str, flags: Flags, size_limit: usize) -> Result<Parsed, Error> {
    let chars: Vec<char> = re.chars().collect();
    let mut flags = flags;
    let mut start = 0;
    let mut end = chars.len();
    if chars.first() == Some(&'^') {
        flags.insert(Flags::MATCH_BEGIN);
        start = 1;
    }
    if end > start && chars[end - 1] == '$' {
        // An odd number of preceding backslashes means the `$` is escaped.
        let backslashes = chars[start..end - 1]
            .iter()
            .rev()
            .take_while(|&&c| c == '\\')
            .count();
        if backslashes % 2 == 0 {
            flags.insert(Flags::MATCH_END);
            end -= 1;
        }
    }
    let mut p = Parser {
        chars: chars,
        pos: start,
        end: end,
        flags: flags,
        terms: Vec::new(),
        size_limit: size_limit,
    };
    p.parse_terms()?;
    let prog_len = predicted_len(&p.terms);
    if prog_len > size_limit {
        return Err(Error::CompiledTooBig(size_limit));
    }
    Ok(Parsed { terms: p.terms, flags: p.flags, prog_len: prog_len })
}

/// The exact number of instructions the transition builder emits for a
/// term stack. `Begin` and `End` account for the constant 2; `*` and `|`
/// cost two edge instructions each, `+` and `?` one.
pub fn predicted_len(terms: &[Term]) -> usize {
    let mut n = 2;
    for t in terms {
        n += match *t {
            Term::Char(_) | Term::Class(_) | Term::Id(_) => 1,
            Term::Plus | Term::Question => 1,
            Term::Star | Term::Alternate => 2,
            Term::Open | Term::Close => 0,
        };
    }
    n
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    /// Exclusive end of the scan region. A folded trailing `$` is excluded.
    end: usize,
    flags: Flags,
    terms: Vec<Term>,
    size_limit: usize,
}

impl Parser {
    fn parse_terms(&mut self) -> Result<(), Error> {
        let mut depth = 0usize;
        while !self.eof() {
            let c = self.cur();
            match c {
                '\\' => {
                    self.bump();
                    if self.eof() {
                        return Err(self.err("dangling backslash"));
                    }
                    let lit = self.cur();
                    self.bump();
                    self.terms.push(Term::Char(lit));
                }
                '.' => {
                    self.bump();
                    let cls = self.dot_class();
                    self.terms.push(Term::Class(cls));
                }
                '|' => {
                    self.bump();
                    self.terms.push(Term::Alternate);
                }
                '(' => {
                    self.bump();
                    depth += 1;
                    self.terms.push(Term::Open);
                }
                ')' => {
                    if depth == 0 {
                        return Err(self.err("unbalanced parenthesis"));
                    }
                    self.bump();
                    depth -= 1;
                    self.terms.push(Term::Close);
                }
                '*' => {
                    self.bump();
                    self.push_iter(Term::Star)?;
                }
                '+' => {
                    self.bump();
                    self.push_iter(Term::Plus)?;
                }
                '?' => {
                    self.bump();
                    self.push_iter(Term::Question)?;
                }
                '{' => {
                    self.bump();
                    self.parse_counted()?;
                }
                '[' => {
                    self.bump();
                    self.parse_class()?;
                }
                _ => {
                    self.bump();
                    self.terms.push(Term::Char(c));
                }
            }
        }
        if depth != 0 {
            return Err(self.err("unbalanced parenthesis"));
        }
        Ok(())
    }

    /// `.` is a negated class. With `NEWLINE`, line terminators are
    /// excluded from it.
    fn dot_class(&self) -> InstClass {
        let mut ranges = Vec::new();
        if self.flags.contains(Flags::NEWLINE) {
            ranges.push(('\n', '\n'));
            ranges.push(('\r', '\r'));
        }
        InstClass { negated: true, ranges: ranges }
    }

    fn push_iter(&mut self, it: Term) -> Result<(), Error> {
        let s = self.unit_start()?;
        if self.unit_is_empty_group(s) {
            return Err(self.err("repetition operator on an empty group"));
        }
        self.terms.push(it);
        Ok(())
    }

    /// Index in `terms` where the last complete term or group starts: the
    /// unit a postfix operator binds to and the slice the iterator
    /// rewriter copies.
    fn unit_start(&self) -> Result<usize, Error> {
        let mut i = self.terms.len();
        loop {
            if i == 0 {
                return Err(self.err("repetition operator at the start of an expression"));
            }
            i -= 1;
            match self.terms[i] {
                Term::Close => {
                    let mut depth = 1;
                    while depth > 0 {
                        debug_assert!(i > 0);
                        i -= 1;
                        match self.terms[i] {
                            Term::Close => depth += 1,
                            Term::Open => depth -= 1,
                            _ => {}
                        }
                    }
                    return Ok(i);
                }
                // A postfix operator binds together with its operand.
                Term::Star | Term::Plus | Term::Question => {}
                Term::Char(_) | Term::Class(_) | Term::Id(_) => return Ok(i),
                Term::Open | Term::Alternate => {
                    return Err(self.err("repetition operator at the start of an expression"));
                }
            }
        }
    }

    fn unit_is_empty_group(&self, s: usize) -> bool {
        self.terms.len() - s == 2 && self.terms[s] == Term::Open
    }

    /// `{m,n}`, `{m,}`, `{,n}`, `{n}` and the `{n!}` id-tag extension.
    /// The cursor sits just past the `{`.
    fn parse_counted(&mut self) -> Result<(), Error> {
        let lo = self.parse_number()?;
        if self.eof() {
            return Err(self.err("malformed counted repetition"));
        }
        match self.cur() {
            '}' => {
                self.bump();
                match lo {
                    Some(n) => self.rewrite_iter(n, Some(n)),
                    None => Err(self.err("malformed counted repetition")),
                }
            }
            '!' => {
                self.bump();
                if self.eof() || self.cur() != '}' {
                    return Err(self.err("malformed id tag"));
                }
                self.bump();
                match lo {
                    Some(n) => self.rewrite_id(n),
                    None => Err(self.err("malformed id tag")),
                }
            }
            ',' => {
                self.bump();
                let hi = self.parse_number()?;
                if self.eof() || self.cur() != '}' {
                    return Err(self.err("malformed counted repetition"));
                }
                self.bump();
                let m = lo.unwrap_or(0);
                match hi {
                    Some(n) if n < m => Err(self.err("invalid repetition range")),
                    Some(n) => self.rewrite_iter(m, Some(n)),
                    None if lo.is_none() => {
                        Err(self.err("malformed counted repetition"))
                    }
                    None => self.rewrite_iter(m, None),
                }
            }
            _ => Err(self.err("malformed counted repetition")),
        }
    }

    fn parse_number(&mut self) -> Result<Option<u32>, Error> {
        let mut saw = false;
        let mut n: u32 = 0;
        while !self.eof() {
            let d = match self.cur().to_digit(10) {
                Some(d) => d,
                None => break,
            };
            saw = true;
            n = match n.checked_mul(10).and_then(|n| n.checked_add(d)) {
                Some(n) => n,
                None => return Err(self.err("repetition count too large")),
            };
            self.bump();
        }
        Ok(if saw { Some(n) } else { None })
    }

    /// The iterator rewriter. Replaces the preceding unit with copies of
    /// itself: `m` verbatim copies plus `n - m` optional ones, or `m`
    /// copies ending in `+` when the upper bound is open. The result is
    /// wrapped in a group so that a subsequent operator binds to the whole
    /// replication.
    fn rewrite_iter(&mut self, m: u32, n: Option<u32>) -> Result<(), Error> {
        let s = self.unit_start()?;
        if self.unit_is_empty_group(s) {
            return Err(self.err("repetition operator on an empty group"));
        }
        let unit = self.terms.split_off(s);
        let copies = match n {
            Some(n) => n,
            None => if m == 0 { 1 } else { m },
        };
        self.check_expansion(copies as usize, unit.len())?;
        self.terms.push(Term::Open);
        match n {
            None => {
                if m == 0 {
                    self.terms.extend(unit.iter().cloned());
                    self.terms.push(Term::Star);
                } else {
                    for _ in 0..m {
                        self.terms.extend(unit.iter().cloned());
                    }
                    self.terms.push(Term::Plus);
                }
            }
            Some(n) => {
                // `{0,0}` deletes the unit and leaves the empty group.
                for _ in 0..m {
                    self.terms.extend(unit.iter().cloned());
                }
                for _ in 0..(n - m) {
                    self.terms.extend(unit.iter().cloned());
                    self.terms.push(Term::Question);
                }
            }
        }
        self.terms.push(Term::Close);
        Ok(())
    }

    /// The `{n!}` extension: `n` verbatim copies of the preceding unit
    /// followed by an id annotation, wrapped in a group. Every path that
    /// completes the replication carries the id.
    fn rewrite_id(&mut self, n: u32) -> Result<(), Error> {
        let s = self.unit_start()?;
        if self.unit_is_empty_group(s) {
            return Err(self.err("id tag on an empty group"));
        }
        let unit = self.terms.split_off(s);
        self.check_expansion(n as usize, unit.len())?;
        self.terms.push(Term::Open);
        if n > 0 {
            for _ in 0..n {
                self.terms.extend(unit.iter().cloned());
            }
            self.terms.push(Term::Id(n));
        }
        self.terms.push(Term::Close);
        Ok(())
    }

    fn check_expansion(&self, copies: usize, unit_len: usize) -> Result<(), Error> {
        let projected = self.terms.len()
            .saturating_add(copies.saturating_mul(unit_len.saturating_add(1)))
            .saturating_add(2);
        if projected > self.size_limit {
            return Err(Error::CompiledTooBig(self.size_limit));
        }
        Ok(())
    }

    /// `[...]` with an optional leading `^`, single characters and
    /// `c-c` ranges. A `]` directly after the opening (or after `^`) is a
    /// literal. No escapes are recognized inside a class.
    fn parse_class(&mut self) -> Result<(), Error> {
        let mut negated = false;
        if !self.eof() && self.cur() == '^' {
            negated = true;
            self.bump();
        }
        let mut ranges = Vec::new();
        let mut first = true;
        loop {
            if self.eof() {
                return Err(self.err("unclosed character class"));
            }
            let lo = self.cur();
            if lo == ']' && !first {
                self.bump();
                break;
            }
            first = false;
            self.bump();
            let is_range = !self.eof()
                && self.cur() == '-'
                && self.peek(1).map_or(false, |c| c != ']');
            if is_range {
                self.bump();
                let hi = self.cur();
                self.bump();
                if lo > hi {
                    return Err(self.err("invalid character class range"));
                }
                ranges.push((lo, hi));
            } else {
                ranges.push((lo, lo));
            }
        }
        if negated && self.flags.contains(Flags::NEWLINE) {
            // An inverted class must not swallow line terminators.
            ranges.push(('\n', '\n'));
            ranges.push(('\r', '\r'));
        }
        self.terms.push(Term::Class(InstClass { negated: negated, ranges: ranges }));
        Ok(())
    }

    fn cur(&self) -> char {
        self.chars[self.pos]
    }

    fn peek(&self, k: usize) -> Option<char> {
        if self.pos + k < self.end {
            Some(self.chars[self.pos + k])
        } else {
            None
        }
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eof(&self) -> bool {
        self.pos >= self.end
    }

    fn err(&self, msg: &str) -> Error {
        Error::Syntax(format!("{} (near position {})", msg, self.pos))
    }
}
