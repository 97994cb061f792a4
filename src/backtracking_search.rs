//! Backtracking search over the (already narrowed) domain store. Slots are chosen with the
//! minimum-remaining-values heuristic, breaking ties toward the slot with the most crossings, and
//! each slot's options are tried least-constraining first.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::trace;

use crate::domains::Domains;
use crate::puzzle::{Puzzle, Slot};
use crate::word_list::{Word, WordList};
use crate::{SlotId, WordId};

/// A struct tracking statistics about the solving process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// How many tentative assignments the search made.
    pub states: u64,
    /// How many times a slot ran out of options and the search had to back up.
    pub backtracks: u64,
    pub node_eliminations: usize,
    pub arc_eliminations: usize,
    pub duration: Duration,
}

/// Settings for a single solve.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Reject any assignment that uses the same word in two different slots. Without this, only
    /// the arc-consistency pass discourages repeats, and only between crossing slots.
    pub distinct_words: bool,

    /// Give up once the search has backtracked this many times.
    pub max_backtracks: Option<u64>,

    /// Give up once the search has been running for this long.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FillFailure {
    #[error("no solution")]
    HardFailure,

    #[error("gave up after {0} backtracks")]
    ExceededBacktrackLimit(u64),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// A partial or complete mapping from slot to chosen word, indexed by `SlotId`. `None` means the
/// slot is unassigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    word_ids: Vec<Option<WordId>>,
}

impl Assignment {
    /// An assignment with every slot unassigned.
    pub fn new(slot_count: usize) -> Assignment {
        Assignment { word_ids: vec![None; slot_count] }
    }

    pub fn slot_count(&self) -> usize {
        self.word_ids.len()
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.word_ids.get(slot_id).copied().flatten()
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.get(slot_id).is_some()
    }

    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) {
        self.word_ids[slot_id] = Some(word_id);
    }

    pub fn unassign(&mut self, slot_id: SlotId) {
        self.word_ids[slot_id] = None;
    }

    /// The assigned (slot, word) pairs, in `SlotId` order.
    pub fn assigned(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.word_ids.iter().enumerate()
            .filter_map(|(slot_id, word_id)| word_id.map(|word_id| (slot_id, word_id)))
    }

    pub fn assigned_count(&self) -> usize {
        self.word_ids.iter().filter(|word_id| word_id.is_some()).count()
    }

    pub fn word<'w>(&self, words: &'w WordList, slot_id: SlotId) -> Option<&'w Word> {
        self.get(slot_id).map(|word_id| words.get(word_id))
    }

    /// Resolve the assignment into a map from slot to word string.
    pub fn to_map(&self, puzzle: &Puzzle, words: &WordList) -> BTreeMap<Slot, String> {
        self.assigned()
            .map(|(slot_id, word_id)| (puzzle.slot(slot_id), words.get(word_id).string.clone()))
            .collect()
    }
}

/// Does every slot of the puzzle have a word?
pub fn assignment_complete(puzzle: &Puzzle, assignment: &Assignment) -> bool {
    assignment.slot_count() == puzzle.slot_count()
        && (0..puzzle.slot_count()).all(|slot_id| assignment.is_assigned(slot_id))
}

/// Do the assigned words fit the grid? Every assigned word must match its slot's length and agree
/// with every assigned crossing slot at the shared cell. Unassigned slots aren't considered, and
/// the same word may appear in more than one slot.
pub fn consistent(puzzle: &Puzzle, words: &WordList, assignment: &Assignment) -> bool {
    assignment.assigned().all(|(slot_id, word_id)| {
        let word = words.get(word_id);
        if word.len() != puzzle.slot(slot_id).length() {
            return false;
        }

        puzzle.crossings(slot_id).iter().all(|crossing| {
            match assignment.word(words, crossing.other_slot_id) {
                Some(other_word) => {
                    word.letter_at(crossing.overlap.first)
                        == other_word.letter_at(crossing.overlap.second)
                }
                None => true,
            }
        })
    })
}

/// Is every assigned word used in exactly one slot?
pub fn all_words_distinct(assignment: &Assignment) -> bool {
    let mut seen = BitSet::new();
    assignment.assigned().all(|(_, word_id)| seen.insert(word_id))
}

/// Choose the unassigned slot with the fewest remaining options, preferring the slot with the
/// most crossings on a tie and the lowest `SlotId` after that.
pub fn select_unassigned_variable(
    puzzle: &Puzzle,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..puzzle.slot_count())
        .filter(|&slot_id| !assignment.is_assigned(slot_id))
        .min_by_key(|&slot_id| (domains.len(slot_id), Reverse(puzzle.degree(slot_id))))
}

/// Return the options for a slot ordered by how many options each would rule out across all of
/// the crossing slots' domains, least constraining first. Ties keep `WordId` order.
pub fn order_domain_values(
    puzzle: &Puzzle,
    words: &WordList,
    domains: &Domains,
    slot_id: SlotId,
) -> Vec<WordId> {
    let mut options: Vec<WordId> = domains.iter(slot_id).collect();

    options.sort_by_cached_key(|&word_id| {
        let word = words.get(word_id);

        puzzle.crossings(slot_id).iter().map(|crossing| {
            let letter = word.letter_at(crossing.overlap.first);

            domains.iter(crossing.other_slot_id)
                .map(|other_word_id| {
                    (words.get(other_word_id).letter_at(crossing.overlap.second) != letter) as usize
                })
                .sum::<usize>()
        }).sum::<usize>()
    });

    options
}

/// Recursive depth-first search for a complete assignment.
pub struct Search<'a> {
    puzzle: &'a Puzzle,
    words: &'a WordList,
    domains: &'a Domains,
    distinct_words: bool,
    max_backtracks: Option<u64>,
    start: Instant,
    deadline: Option<Instant>,
    statistics: Statistics,
}

impl<'a> Search<'a> {
    pub fn new(
        puzzle: &'a Puzzle,
        words: &'a WordList,
        domains: &'a Domains,
        options: &FillOptions,
    ) -> Search<'a> {
        let start = Instant::now();

        Search {
            puzzle,
            words,
            domains,
            distinct_words: options.distinct_words,
            max_backtracks: options.max_backtracks,
            start,
            deadline: options.timeout.map(|timeout| start + timeout),
            statistics: Statistics::default(),
        }
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// `consistent`, plus the distinct-words rule when it's enabled.
    pub fn consistent(&self, assignment: &Assignment) -> bool {
        consistent(self.puzzle, self.words, assignment)
            && (!self.distinct_words || all_words_distinct(assignment))
    }

    /// Extend `assignment` into a complete, consistent assignment. On `HardFailure` the
    /// assignment is left as it was passed in.
    pub fn backtrack(&mut self, assignment: &mut Assignment) -> Result<(), FillFailure> {
        if assignment_complete(self.puzzle, assignment) {
            return Ok(());
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(FillFailure::Timeout(self.start.elapsed()));
            }
        }

        let Some(slot_id) = select_unassigned_variable(self.puzzle, self.domains, assignment) else {
            return Err(FillFailure::HardFailure);
        };

        for word_id in order_domain_values(self.puzzle, self.words, self.domains, slot_id) {
            self.statistics.states += 1;
            assignment.assign(slot_id, word_id);

            if self.consistent(assignment) {
                trace!("trying {} for {}", self.words.get(word_id), self.puzzle.slot(slot_id));

                match self.backtrack(assignment) {
                    Ok(()) => return Ok(()),
                    Err(FillFailure::HardFailure) => {}
                    Err(failure) => {
                        assignment.unassign(slot_id);
                        return Err(failure);
                    }
                }
            }

            assignment.unassign(slot_id);
        }

        self.statistics.backtracks += 1;
        if let Some(max_backtracks) = self.max_backtracks {
            if self.statistics.backtracks >= max_backtracks {
                return Err(FillFailure::ExceededBacktrackLimit(max_backtracks));
            }
        }

        Err(FillFailure::HardFailure)
    }
}
