//! Node consistency and AC-3 arc consistency over the domain store.
//!
//! Node consistency removes every word whose length differs from its slot's. Arc consistency
//! then removes every word that has no partner in some crossing slot: a word `X` for slot `x`
//! survives against slot `y` only if `y`'s domain holds a different word `Y` with the same letter
//! at the crossing cell. The `X != Y` clause only stops a slot from being supported by the very
//! same word in a crossing slot; it does not make the words of the whole grid distinct.

use std::collections::{HashSet, VecDeque};

use log::{debug, trace};

use crate::domains::Domains;
use crate::puzzle::{Overlap, Puzzle};
use crate::word_list::WordList;
use crate::{Arc, SlotId, WordId};

/// Remove every word whose length doesn't match its slot's length, returning the number of
/// eliminations. This can leave a domain empty, which is a valid (if hopeless) state.
pub fn enforce_node_consistency(puzzle: &Puzzle, words: &WordList, domains: &mut Domains) -> usize {
    let mut eliminated = 0;

    for (slot_id, slot) in puzzle.slots().iter().enumerate() {
        eliminated += domains.retain(slot_id, |word_id| words.get(word_id).len() == slot.length());
    }

    debug!("node consistency eliminated {eliminated} options");
    eliminated
}

/// Make slot `x` arc consistent with slot `y`, removing every word from `x`'s domain that has no
/// compatible word in `y`'s domain. Returns whether anything was removed. Slots that don't cross
/// are left alone.
pub fn revise(
    puzzle: &Puzzle,
    words: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some(Overlap { first, second }) = puzzle.overlap(x, y) else {
        return false;
    };

    let eliminated: Vec<WordId> = domains.iter(x).filter(|&x_word_id| {
        let Some(letter) = words.get(x_word_id).letter_at(first) else {
            return true;
        };

        !domains.iter(y).any(|y_word_id| {
            y_word_id != x_word_id && words.get(y_word_id).letter_at(second) == Some(letter)
        })
    }).collect();

    for &word_id in &eliminated {
        domains.remove(x, word_id);
    }

    if !eliminated.is_empty() {
        trace!(
            "revise {} against {} eliminated {} options",
            puzzle.slot(x), puzzle.slot(y), eliminated.len()
        );
    }

    !eliminated.is_empty()
}

/// FIFO worklist of arcs for `ac3`. An arc that is already waiting isn't queued a second time.
#[derive(Debug)]
struct ConsistencyQueue {
    queue: VecDeque<Arc>,
    queued: HashSet<Arc>,
}

impl ConsistencyQueue {
    fn with_initial_queue<Items>(items: Items) -> ConsistencyQueue
        where
            Items: IntoIterator<Item=Arc>
    {
        let mut queue = ConsistencyQueue { queue: VecDeque::new(), queued: HashSet::new() };
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<Arc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: Arc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Enforce arc consistency with AC-3, starting from the given arcs or, if `arcs` is `None`, from
/// every arc in the puzzle. Returns `false` as soon as a revision empties a domain, in which case
/// the puzzle has no solution. Domains that were already empty before the call aren't reported.
pub fn ac3(
    puzzle: &Puzzle,
    words: &WordList,
    domains: &mut Domains,
    arcs: Option<&[Arc]>,
) -> bool {
    let mut queue = match arcs {
        Some(arcs) => ConsistencyQueue::with_initial_queue(arcs.iter().copied()),
        None => ConsistencyQueue::with_initial_queue(puzzle.arcs()),
    };

    let mut revisions = 0;

    while let Some((x, y)) = queue.pop_front() {
        if !revise(puzzle, words, domains, x, y) {
            continue;
        }
        revisions += 1;

        if domains.is_empty(x) {
            debug!("arc consistency emptied the domain of {} after {revisions} revisions", puzzle.slot(x));
            return false;
        }

        // The narrower domain of `x` may invalidate support for any slot crossing it.
        for z in puzzle.neighbors(x) {
            for arc in [(z, x), (x, z)] {
                if arc != (x, y) {
                    queue.enqueue(arc);
                }
            }
        }
    }

    debug!("arc consistency reached a fixpoint after {revisions} revisions");
    true
}
