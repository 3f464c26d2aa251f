// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

extern crate quickcheck;
extern crate regex;
extern crate streamre;

use quickcheck::{quickcheck, Arbitrary, Gen};
use streamre::{Flags, Machine};

/// A randomly generated pattern over a small grammar that both this crate
/// and the `regex` crate (used as the oracle) understand: literals over
/// `a`-`c`, `.`, a few classes, groups, alternation, the postfix
/// operators and small counted repetitions. Anchors and id tags are
/// exercised separately through flags and the deterministic tests.
#[derive(Clone, Debug)]
struct Pattern(String);

/// A short haystack over a small alphabet (including a line terminator).
#[derive(Clone, Debug)]
struct Haystack(String);

impl Arbitrary for Pattern {
    fn arbitrary(g: &mut Gen) -> Pattern {
        let mut s = String::new();
        gen_expr(g, 0, &mut s);
        Pattern(s)
    }
}

impl Arbitrary for Haystack {
    fn arbitrary(g: &mut Gen) -> Haystack {
        let len = usize::arbitrary(g) % 8;
        let mut s = String::new();
        for _ in 0..len {
            s.push(*g.choose(&['a', 'b', 'c', 'x', '\n']).unwrap());
        }
        Haystack(s)
    }
}

fn gen_expr(g: &mut Gen, depth: usize, out: &mut String) {
    let arms = 1 + usize::arbitrary(g) % 2;
    for i in 0..arms {
        if i > 0 {
            out.push('|');
        }
        gen_concat(g, depth, out);
    }
}

fn gen_concat(g: &mut Gen, depth: usize, out: &mut String) {
    let n = 1 + usize::arbitrary(g) % 3;
    for _ in 0..n {
        gen_piece(g, depth, out);
    }
}

fn gen_piece(g: &mut Gen, depth: usize, out: &mut String) {
    gen_atom(g, depth, out);
    match u8::arbitrary(g) % 8 {
        0 => out.push('*'),
        1 => out.push('+'),
        2 => out.push('?'),
        3 => out.push_str(g.choose(&["{1,2}", "{0,1}", "{2}"]).unwrap()),
        _ => {}
    }
}

fn gen_atom(g: &mut Gen, depth: usize, out: &mut String) {
    let max = if depth >= 2 { 4 } else { 6 };
    match u8::arbitrary(g) % max {
        0 | 1 => out.push(*g.choose(&['a', 'b', 'c']).unwrap()),
        2 => out.push('.'),
        3 => out.push_str(g.choose(&["[ab]", "[^a]", "[a-c]"]).unwrap()),
        _ => {
            out.push('(');
            gen_expr(g, depth + 1, out);
            out.push(')');
        }
    }
}

/// Decide the expected best match by brute force: a candidate window
/// `(b, e)` matches iff the anchored oracle regex accepts exactly that
/// window; the best one is the leftmost, extended as far as possible
/// (greedy) or cut as short as possible (non-greedy).
fn oracle(pat: &str, text: &str, flags: Flags) -> Option<(usize, usize)> {
    let re = regex::Regex::new(&format!("(?s)^(?:{})$", pat)).unwrap();
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let greedy = !flags.contains(Flags::NON_GREEDY);
    let b_hi = if flags.contains(Flags::MATCH_BEGIN) { 0 } else { n };
    for b in 0..b_hi + 1 {
        let e_lo = if flags.contains(Flags::MATCH_END) { n } else { b };
        let mut hits = Vec::new();
        for e in e_lo..n + 1 {
            if e < b {
                continue;
            }
            let window: String = chars[b..e].iter().collect();
            if re.is_match(&window) {
                hits.push(e);
            }
        }
        if let Some(&e) = if greedy { hits.last() } else { hits.first() } {
            return Some((b, e));
        }
    }
    None
}

fn run(pat: &str, text: &str, flags: Flags) -> Option<(usize, usize)> {
    Machine::new(pat, flags)
        .unwrap()
        .find(text)
        .map(|s| (s.begin, s.end))
}

#[test]
fn matches_the_oracle_greedy() {
    fn prop(pat: Pattern, text: Haystack, begin: bool, end: bool) -> bool {
        let mut flags = Flags::empty();
        if begin {
            flags.insert(Flags::MATCH_BEGIN);
        }
        if end {
            flags.insert(Flags::MATCH_END);
        }
        let got = run(&pat.0, &text.0, flags);
        let want = oracle(&pat.0, &text.0, flags);
        if got != want {
            println!(
                "pattern {:?}, text {:?}, flags {:?}: got {:?}, want {:?}",
                pat.0, text.0, flags, got, want
            );
        }
        got == want
    }
    quickcheck(prop as fn(Pattern, Haystack, bool, bool) -> bool);
}

#[test]
fn matches_the_oracle_shortest_when_anchored() {
    fn prop(pat: Pattern, text: Haystack, end: bool) -> bool {
        let mut flags = Flags::MATCH_BEGIN | Flags::NON_GREEDY;
        if end {
            flags.insert(Flags::MATCH_END);
        }
        run(&pat.0, &text.0, flags) == oracle(&pat.0, &text.0, flags)
    }
    quickcheck(prop as fn(Pattern, Haystack, bool) -> bool);
}

#[test]
fn streaming_is_chunking_invariant() {
    fn prop(pat: Pattern, text: Haystack, cuts: Vec<usize>) -> bool {
        let m = Machine::new(&pat.0, Flags::empty()).unwrap();
        let expect = m.find(&text.0);

        let mut cuts: Vec<usize> = cuts
            .into_iter()
            .map(|c| c % (text.0.len() + 1))
            .collect();
        cuts.sort();
        let mut session = m.matcher();
        let mut at = 0;
        for cut in cuts {
            if cut > at {
                session.feed(&text.0[at..cut]);
                at = cut;
            }
        }
        session.feed(&text.0[at..]);
        session.result() == expect
    }
    quickcheck(prop as fn(Pattern, Haystack, Vec<usize>) -> bool);
}

#[test]
fn reset_is_a_fresh_session() {
    fn prop(pat: Pattern, noise: Haystack, text: Haystack) -> bool {
        let m = Machine::new(&pat.0, Flags::empty()).unwrap();
        let mut fresh = m.matcher();
        fresh.feed(&text.0);

        let mut reused = m.matcher();
        reused.feed(&noise.0);
        reused.reset();
        reused.feed(&text.0);

        fresh.result() == reused.result()
    }
    quickcheck(prop as fn(Pattern, Haystack, Haystack) -> bool);
}

#[test]
fn compiling_twice_is_deterministic() {
    fn prop(pat: Pattern, text: Haystack) -> bool {
        let a = Machine::new(&pat.0, Flags::empty()).unwrap();
        let b = Machine::new(&pat.0, Flags::empty()).unwrap();
        a.find(&text.0) == b.find(&text.0)
    }
    quickcheck(prop as fn(Pattern, Haystack) -> bool);
}

#[test]
fn best_match_is_monotone_while_streaming() {
    fn prop(pat: Pattern, text: Haystack) -> bool {
        let m = Machine::new(&pat.0, Flags::empty()).unwrap();
        let mut session = m.matcher();
        let mut last: Option<(usize, usize)> = None;
        for c in text.0.chars() {
            let mut buf = [0; 4];
            session.feed(c.encode_utf8(&mut buf));
            let now = session.result().map(|s| (s.begin, s.end));
            match (last, now) {
                // A greedy best never disappears, never moves right and
                // never shrinks.
                (Some(_), None) => return false,
                (Some((pb, pe)), Some((b, e))) => {
                    if b > pb || (b == pb && e < pe) {
                        return false;
                    }
                }
                _ => {}
            }
            last = now;
        }
        true
    }
    quickcheck(prop as fn(Pattern, Haystack) -> bool);
}

#[test]
fn arbitrary_patterns_never_panic() {
    fn prop(pat: String, text: Haystack) -> bool {
        let pat: String = pat.chars().take(20).collect();
        if let Ok(m) = Machine::new(&pat, Flags::empty()) {
            let _ = m.find(&text.0);
        }
        true
    }
    quickcheck(prop as fn(String, Haystack) -> bool);
}
