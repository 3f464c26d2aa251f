// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A streaming, longest-match regular expression engine.
//!
//! This crate compiles a POSIX-like pattern into an immutable `Machine`
//! and scans input through a `Matcher` session, reporting the *best*
//! match: the leftmost one, extended as far as it will go (or cut as
//! short as possible under `NON_GREEDY`). Input can arrive in chunks of
//! any size; feeding `"ab"` then `"cd"` is indistinguishable from feeding
//! `"abcd"`.
//!
//! ```rust
//! use streamre::{Flags, Machine};
//!
//! let m = Machine::new("a(b|c)*d", Flags::empty()).unwrap();
//! let span = m.find("xxabbcdyy").unwrap();
//! assert_eq!((span.begin, span.end), (2, 7));
//! ```
//!
//! Streaming works the same way through an explicit session:
//!
//! ```rust
//! use streamre::{Flags, Machine};
//!
//! let m = Machine::new("^ab+$", Flags::empty()).unwrap();
//! let mut session = m.matcher();
//! session.feed("ab");
//! session.feed("bb");
//! assert_eq!(session.result().map(|s| (s.begin, s.end)), Some((0, 4)));
//! ```
//!
//! # Syntax
//!
//! Literals, `.`, `[...]` classes (with `^` negation and `c-c` ranges),
//! `(...)` grouping, `|` alternation, the `*`/`+`/`?` operators and
//! counted repetitions `{m,n}`, `{m,}`, `{,n}`, `{n}`. A leading `^`
//! anchors the match to the start of the input and a trailing `$` to its
//! end; anywhere else both are literals. `\x` escapes any single
//! character `x`. There are no capture groups, backreferences or
//! lookaround.
//!
//! The non-standard `{n!}` operator repeats the preceding term `n` times
//! and tags the replication with the id `n`. Ids travel with every
//! matching path, rank otherwise-equal candidates, and come back in
//! [`MatchSpan::id`](struct.MatchSpan.html):
//!
//! ```rust
//! use streamre::{Flags, Machine};
//!
//! let m = Machine::new("(ab){3!}", Flags::empty()).unwrap();
//! assert_eq!(m.find("ababab").map(|s| (s.begin, s.end, s.id)), Some((0, 6, 3)));
//! ```
//!
//! Positions are counted in characters (Unicode scalar values), not
//! bytes.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;
extern crate aho_corasick;
extern crate memchr;

use std::error;
use std::fmt;

pub use nfa::Matcher;

use program::Program;

mod compile;
mod inst;
mod nfa;
mod parse;
mod prefix;
mod program;
mod state;
mod trace;

/// The default cap on compiled program length, in instructions. Counted
/// repetitions unroll, so the cap keeps patterns like `a{1000}{1000}`
/// from exhausting memory at compile time.
const DEFAULT_SIZE_LIMIT: usize = 1 << 16;

/// An error that occurred while compiling a regular expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A syntax error in the pattern.
    Syntax(String),
    /// The compiled program would exceed the configured size limit.
    CompiledTooBig(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Syntax(ref err) => write!(f, "regex syntax error: {}", err),
            Error::CompiledTooBig(limit) => {
                write!(f, "compiled regex exceeds size limit of {} instructions", limit)
            }
        }
    }
}

impl error::Error for Error {}

bitflags! {
    /// Match-time behavior flags.
    ///
    /// `MATCH_BEGIN` and `MATCH_END` can be set by the caller or folded in
    /// from a leading `^` / trailing `$`. `ID_CHECK` is derived during
    /// compilation whenever an id tag is present.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags: u32 {
        /// Matches may only start at the beginning of the input.
        const MATCH_BEGIN = 1 << 0;
        /// Matches must run to the end of the input.
        const MATCH_END = 1 << 1;
        /// `.` and negated classes exclude `\n` and `\r`.
        const NEWLINE = 1 << 2;
        /// Prefer the shortest match over the longest.
        const NON_GREEDY = 1 << 3;
        /// Ids participate in candidate priority. Set by the compiler.
        const ID_CHECK = 1 << 4;
        /// Log the compiled program for debugging.
        const VERBOSE = 1 << 5;
    }
}

/// The span of a best match: character offsets into the input consumed so
/// far, with `end` exclusive, plus the id tag carried by the matching
/// path (`0` when the pattern has no id tags).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchSpan {
    pub begin: usize,
    pub end: usize,
    pub id: u32,
}

/// A compiled regular expression.
///
/// A machine is immutable: it can be shared between threads and drive any
/// number of independent [`Matcher`](struct.Matcher.html) sessions.
#[derive(Clone, Debug)]
pub struct Machine {
    program: Program,
}

impl Machine {
    /// Compile a pattern with the default program size limit.
    pub fn new(re: &str, flags: Flags) -> Result<Machine, Error> {
        Machine::with_size_limit(DEFAULT_SIZE_LIMIT, re, flags)
    }

    /// Compile a pattern, capping the compiled program (and therefore
    /// counted-repetition unrolling) at `size_limit` instructions.
    pub fn with_size_limit(size_limit: usize, re: &str, flags: Flags) -> Result<Machine, Error> {
        let program = Program::new(re, flags, size_limit)?;
        Ok(Machine { program: program })
    }

    /// Start a match session.
    pub fn matcher(&self) -> Matcher {
        Matcher::new(&self.program)
    }

    /// Run the whole of `text` through a fresh session and return the
    /// best match.
    pub fn find(&self, text: &str) -> Option<MatchSpan> {
        let mut session = self.matcher();
        session.feed(text);
        session.result()
    }

    /// Returns true if and only if the pattern matches somewhere in
    /// `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// The original pattern string.
    pub fn as_str(&self) -> &str {
        &self.program.original
    }

    /// The flag set in effect, including flags folded in from the pattern
    /// and derived by the compiler.
    pub fn flags(&self) -> Flags {
        self.program.flags
    }
}
