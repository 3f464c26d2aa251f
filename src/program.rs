// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use compile;
use inst::Inst;
use parse::{self, Parsed};
use prefix::{Pred, Scanner};
use trace::Trace;
use Error;
use Flags;

/// Program represents a compiled regular expression. Once an expression is
/// compiled, its representation is immutable and will never change, so a
/// program can be shared freely; every match session owns its own mutable
/// state.
#[derive(Clone, Debug)]
pub struct Program {
    /// The original regular expression string.
    pub original: String,
    /// The flat instruction sequence. Starts with `Begin`, ends with `End`.
    pub insts: Vec<Inst>,
    /// Slot index for each program position, or `-1` for positions that
    /// only route ε-transitions.
    pub slots: Vec<i32>,
    /// Program position of each slot. Slot 0 is `Begin`; the last slot is
    /// `End`; everything in between consumes a character.
    pub slot_pos: Vec<usize>,
    /// Flags after anchor folding and analysis.
    pub flags: Flags,
    /// The `Begin` ε-closure: `(slot, id)` pairs seeded into a fresh match
    /// session. Contains the `End` slot iff the pattern is nullable.
    pub seed: Vec<(usize, u32)>,
    /// Fast-forward scanner over the seed predicates.
    pub prefix: Scanner,
    /// Characters spanned by the widest class in the program.
    pub class_span: usize,
}

impl Program {
    /// Compiles a pattern: parse, build transitions, analyze slots, trace
    /// the start closure and derive the fast-forward scanner.
    pub fn new(re: &str, flags: Flags, size_limit: usize) -> Result<Program, Error> {
        let Parsed { terms, flags, prog_len } = parse::parse(re, flags, size_limit)?;
        let insts = compile::build(&terms, prog_len);

        // The search-state analyzer: one forward pass assigning term slots
        // to Begin, every consuming instruction and End.
        let mut flags = flags;
        let mut slots = Vec::with_capacity(insts.len());
        let mut slot_pos = Vec::new();
        let mut class_span = 0;
        for (pc, inst) in insts.iter().enumerate() {
            let slotted = match *inst {
                Inst::Begin | Inst::End | Inst::Char(_) => true,
                Inst::Class(ref cls) => {
                    if cls.num_chars() > class_span {
                        class_span = cls.num_chars();
                    }
                    true
                }
                Inst::Id(n) => {
                    if n > 0 {
                        flags.insert(Flags::ID_CHECK);
                    }
                    false
                }
                Inst::Branch(_) | Inst::Jump(_) => false,
            };
            if slotted {
                slots.push(slot_pos.len() as i32);
                slot_pos.push(pc);
            } else {
                slots.push(-1);
            }
        }

        // The Begin closure, traced once and reused by every session.
        let mut seed: Vec<(usize, u32)> = Vec::new();
        {
            let mut trace = Trace::new(insts.len());
            trace.closure(&insts, 1, 0, |pc, id| {
                let slot = slots[pc] as usize;
                match seed.iter_mut().find(|e| e.0 == slot) {
                    Some(e) => {
                        if id > e.1 {
                            e.1 = id;
                        }
                    }
                    None => seed.push((slot, id)),
                }
            });
        }

        let mut preds = Vec::new();
        for &(slot, _) in &seed {
            match insts[slot_pos[slot]] {
                Inst::Char(c) => preds.push(Pred::Char(c)),
                Inst::Class(ref cls) => preds.push(Pred::Class(cls.clone())),
                _ => {}
            }
        }
        let prefix = Scanner::build(preds, class_span);

        if flags.contains(Flags::VERBOSE) {
            debug!(
                "compiled {:?}: {} insts, {} slots, seed {:?}, scanner {:?}",
                re,
                insts.len(),
                slot_pos.len(),
                seed,
                prefix
            );
        }
        Ok(Program {
            original: re.to_owned(),
            insts: insts,
            slots: slots,
            slot_pos: slot_pos,
            flags: flags,
            seed: seed,
            prefix: prefix,
            class_span: class_span,
        })
    }

    /// Total number of term slots, anchors included.
    pub fn num_slots(&self) -> usize {
        self.slot_pos.len()
    }

    /// The slot of the `End` sentinel.
    pub fn end_slot(&self) -> usize {
        self.slot_pos.len() - 1
    }

    /// The id carried by the ε-path from `Begin` to `End`, when one
    /// exists. `Some` means the pattern matches the empty string.
    pub fn nullable(&self) -> Option<u32> {
        let end = self.end_slot();
        self.seed.iter().find(|e| e.0 == end).map(|e| e.1)
    }

    /// True iff matches may only start at the beginning of the input.
    pub fn anchored_begin(&self) -> bool {
        self.flags.contains(Flags::MATCH_BEGIN)
    }

    /// True iff matches must run to the end of the input.
    pub fn anchored_end(&self) -> bool {
        self.flags.contains(Flags::MATCH_END)
    }
}
