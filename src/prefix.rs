// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use aho_corasick::AhoCorasick;
use memchr::memchr;

use inst::InstClass;

/// Cap on how many literal characters the scanner will expand the seed
/// predicates into before falling back to a plain predicate scan.
const EXPAND_LIMIT: usize = 32;

/// An outgoing predicate of the start state's ε-closure.
#[derive(Clone, Debug)]
pub enum Pred {
    Char(char),
    Class(InstClass),
}

impl Pred {
    fn matches(&self, c: char) -> bool {
        match *self {
            Pred::Char(lit) => lit == c,
            Pred::Class(ref cls) => cls.matches(c),
        }
    }
}

/// A fast-forward scanner over the characters that can start a match.
///
/// When the match engine is sitting in its re-seeded start state, nothing
/// but the seed closure's own predicates can consume the next character,
/// so the input can be skipped to the first character any of them accepts.
///
/// There are a few ways to do that quickly:
///
/// 1. The predicates reduce to a single ASCII literal. Just use memchr.
/// 2. They reduce to a set of ASCII literals: a 256-entry membership map,
///    one lookup per input byte.
/// 3. They reduce to arbitrary literal characters: an Aho-Corasick
///    automaton over their encodings.
/// 4. Otherwise the characters are tested against the predicates one at a
///    time, which still avoids touching the state vectors.
///
/// Reported positions are always char boundaries: an ASCII byte never
/// occurs inside a UTF-8 sequence, and the automaton's patterns are whole
/// characters.
#[derive(Clone, Debug)]
pub enum Scanner {
    /// No predicates at all. Never advances through the input.
    Empty,
    /// A single ASCII literal.
    Byte(u8),
    /// A set of two or more ASCII literals.
    Bytes {
        chars: Vec<u8>,
        sparse: Vec<bool>,
    },
    /// General literal characters.
    Literals(AhoCorasick),
    /// Arbitrary predicates; scan characters one at a time.
    Ranges(Vec<Pred>),
}

impl Scanner {
    /// Build a scanner from the seed closure's predicates. `class_span` is
    /// the widest class in the program, measured in characters; a span
    /// past the expansion cap skips the literal reduction outright.
    pub fn build(preds: Vec<Pred>, class_span: usize) -> Scanner {
        if preds.is_empty() {
            return Scanner::Empty;
        }
        if class_span > EXPAND_LIMIT {
            return Scanner::Ranges(preds);
        }
        let mut lits: Vec<char> = Vec::new();
        let mut literal = true;
        'reduce: for p in &preds {
            match *p {
                Pred::Char(c) => lits.push(c),
                Pred::Class(ref cls) => {
                    if cls.negated || lits.len() + cls.num_chars() > EXPAND_LIMIT {
                        literal = false;
                        break 'reduce;
                    }
                    for &(lo, hi) in &cls.ranges {
                        for cp in (lo as u32)..(hi as u32 + 1) {
                            if let Some(c) = ::std::char::from_u32(cp) {
                                lits.push(c);
                            }
                        }
                    }
                }
            }
        }
        lits.sort();
        lits.dedup();
        if !literal || lits.len() > EXPAND_LIMIT {
            return Scanner::Ranges(preds);
        }
        if lits.iter().all(|c| c.is_ascii()) {
            if lits.len() == 1 {
                return Scanner::Byte(lits[0] as u8);
            }
            let chars: Vec<u8> = lits.iter().map(|&c| c as u8).collect();
            let mut sparse = vec![false; 256];
            for &b in &chars {
                sparse[b as usize] = true;
            }
            return Scanner::Bytes { chars: chars, sparse: sparse };
        }
        let pats: Vec<String> = lits.iter().map(|c| c.to_string()).collect();
        match AhoCorasick::new(&pats) {
            Ok(ac) => Scanner::Literals(ac),
            Err(_) => Scanner::Ranges(preds),
        }
    }

    /// Byte offset of the first position in `haystack` whose character
    /// satisfies at least one predicate.
    pub fn find(&self, haystack: &str) -> Option<usize> {
        match *self {
            Scanner::Empty => None,
            Scanner::Byte(b) => memchr(b, haystack.as_bytes()),
            Scanner::Bytes { ref sparse, .. } => {
                haystack.as_bytes().iter().position(|&b| sparse[b as usize])
            }
            Scanner::Literals(ref ac) => ac.find(haystack).map(|m| m.start()),
            Scanner::Ranges(ref preds) => {
                haystack
                    .char_indices()
                    .find(|&(_, c)| preds.iter().any(|p| p.matches(c)))
                    .map(|(i, _)| i)
            }
        }
    }

    /// The number of distinct literals this scanner looks for, zero when
    /// it scans predicates instead.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        match *self {
            Scanner::Empty | Scanner::Ranges(_) => 0,
            Scanner::Byte(_) => 1,
            Scanner::Bytes { ref chars, .. } => chars.len(),
            Scanner::Literals(ref ac) => ac.patterns_len(),
        }
    }
}
