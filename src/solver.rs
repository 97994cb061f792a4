//! The solving engine: owns a domain store for one puzzle and word list and moves it through
//! node consistency, arc consistency and backtracking search.

use instant::Instant;
use log::{debug, info};

use crate::arc_consistency;
use crate::backtracking_search::{
    assignment_complete, consistent, order_domain_values, select_unassigned_variable,
    Assignment, FillFailure, FillOptions, Search, Statistics,
};
use crate::domains::Domains;
use crate::puzzle::Puzzle;
use crate::word_list::WordList;
use crate::{Arc, SlotId, WordId};

/// Where a solver is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Every slot still has every word in its domain.
    Initial,
    NodeConsistent,
    ArcConsistent,
    /// Propagation proved there is no solution.
    Failed,
    Searching,
    Solved,
    /// The search tried every branch without finding a solution.
    Unsatisfiable,
    /// The search hit a backtrack limit or timeout.
    Aborted,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// A failed fill, along with the statistics gathered up to the point of failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{failure}")]
pub struct FillError {
    pub failure: FillFailure,
    pub statistics: Statistics,
}

pub struct Solver<'a> {
    puzzle: &'a Puzzle,
    words: &'a WordList,
    domains: Domains,
    phase: Phase,
    statistics: Statistics,
}

impl<'a> Solver<'a> {
    /// Create a solver with a fresh domain store mapping every slot to the full word list.
    pub fn new(puzzle: &'a Puzzle, words: &'a WordList) -> Solver<'a> {
        Solver {
            puzzle,
            words,
            domains: Domains::new(puzzle.slot_count(), words.len()),
            phase: Phase::Initial,
            statistics: Statistics::default(),
        }
    }

    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    fn transition(&mut self, phase: Phase) {
        debug!("solver phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Restrict every domain to words of the right length.
    pub fn enforce_node_consistency(&mut self) {
        self.statistics.node_eliminations +=
            arc_consistency::enforce_node_consistency(self.puzzle, self.words, &mut self.domains);
        self.transition(Phase::NodeConsistent);
    }

    /// Make slot `x` arc consistent with slot `y`; see [`arc_consistency::revise`].
    pub fn revise(&mut self, x: SlotId, y: SlotId) -> bool {
        let before = self.domains.len(x);
        let revised = arc_consistency::revise(self.puzzle, self.words, &mut self.domains, x, y);
        self.statistics.arc_eliminations += before - self.domains.len(x);
        revised
    }

    /// Run AC-3 from the given arcs, or from every arc if `arcs` is `None`. Returns `false` if a
    /// domain was wiped out, which moves the solver to `Phase::Failed`.
    pub fn ac3(&mut self, arcs: Option<&[Arc]>) -> bool {
        let before = self.domains.total_len();
        let consistent = arc_consistency::ac3(self.puzzle, self.words, &mut self.domains, arcs);
        self.statistics.arc_eliminations += before - self.domains.total_len();

        self.transition(if consistent { Phase::ArcConsistent } else { Phase::Failed });
        consistent
    }

    /// Run node consistency and then AC-3. A slot left with no options after node consistency
    /// fails the solve straight away. Returns `false` if the puzzle is unsolvable.
    pub fn propagate(&mut self) -> bool {
        let start = Instant::now();

        self.enforce_node_consistency();

        let consistent = match self.domains.first_empty() {
            Some(slot_id) => {
                debug!("no words fit {}", self.puzzle.slot(slot_id));
                self.transition(Phase::Failed);
                false
            }
            None => self.ac3(None),
        };

        debug!(
            "{} options remain after propagation ({} removed by length, {} by crossings)",
            self.domains.total_len(),
            self.statistics.node_eliminations,
            self.statistics.arc_eliminations,
        );

        self.statistics.duration += start.elapsed();
        consistent
    }

    pub fn assignment_complete(&self, assignment: &Assignment) -> bool {
        assignment_complete(self.puzzle, assignment)
    }

    pub fn consistent(&self, assignment: &Assignment) -> bool {
        consistent(self.puzzle, self.words, assignment)
    }

    pub fn select_unassigned_variable(&self, assignment: &Assignment) -> Option<SlotId> {
        select_unassigned_variable(self.puzzle, &self.domains, assignment)
    }

    pub fn order_domain_values(&self, slot_id: SlotId) -> Vec<WordId> {
        order_domain_values(self.puzzle, self.words, &self.domains, slot_id)
    }

    /// Backtrack from an empty assignment over the current domains. Search only reads the domain
    /// store. A solver whose propagation failed reports `HardFailure` without searching.
    pub fn search(&mut self, options: &FillOptions) -> Result<Assignment, FillFailure> {
        if self.phase == Phase::Failed {
            return Err(FillFailure::HardFailure);
        }

        self.transition(Phase::Searching);
        let start = Instant::now();

        let mut assignment = Assignment::new(self.puzzle.slot_count());
        let mut search = Search::new(self.puzzle, self.words, &self.domains, options);
        let result = search.backtrack(&mut assignment);

        let search_statistics = search.statistics();
        self.statistics.states += search_statistics.states;
        self.statistics.backtracks += search_statistics.backtracks;
        self.statistics.duration += start.elapsed();

        match result {
            Ok(()) => {
                self.transition(Phase::Solved);
                Ok(assignment)
            }
            Err(FillFailure::HardFailure) => {
                self.transition(Phase::Unsatisfiable);
                Err(FillFailure::HardFailure)
            }
            Err(failure) => {
                self.transition(Phase::Aborted);
                Err(failure)
            }
        }
    }

    /// Propagate and search. The solver is consumed, since its domain store has been narrowed
    /// for this one solve.
    pub fn solve(mut self, options: &FillOptions) -> Result<FillSuccess, FillError> {
        let result = if self.propagate() {
            self.search(options)
        } else {
            Err(FillFailure::HardFailure)
        };

        match result {
            Ok(assignment) => {
                info!(
                    "solved {} slots in {:?} ({} states, {} backtracks)",
                    self.puzzle.slot_count(),
                    self.statistics.duration,
                    self.statistics.states,
                    self.statistics.backtracks,
                );
                Ok(FillSuccess { statistics: self.statistics, assignment })
            }
            Err(failure) => {
                info!("{failure} ({:?}, {:?})", self.phase, self.statistics);
                Err(FillError { failure, statistics: self.statistics })
            }
        }
    }
}

/// Search for a valid fill for the given puzzle and word list.
pub fn find_fill(
    puzzle: &Puzzle,
    words: &WordList,
    options: &FillOptions,
) -> Result<FillSuccess, FillError> {
    Solver::new(puzzle, words).solve(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Direction, Slot};

    fn tee_puzzle() -> Puzzle {
        Puzzle::from_template_str(
            "
            ___
            #_#
            #_#
            ",
        ).unwrap()
    }

    #[test]
    fn test_phases_for_a_solvable_puzzle() {
        let puzzle = tee_puzzle();
        let words = WordList::from_words(["art", "cat", "to"]);
        let mut solver = Solver::new(&puzzle, &words);
        assert_eq!(solver.phase(), Phase::Initial);
        assert_eq!(solver.domains().total_len(), 6);

        assert!(solver.propagate());
        assert_eq!(solver.phase(), Phase::ArcConsistent);
        assert_eq!(solver.statistics().node_eliminations, 2);
        assert_eq!(solver.statistics().arc_eliminations, 2);

        let assignment = solver.search(&FillOptions::default()).unwrap();
        assert_eq!(solver.phase(), Phase::Solved);
        assert!(solver.assignment_complete(&assignment));
        assert!(solver.consistent(&assignment));
    }

    #[test]
    fn test_propagation_failure_skips_search() {
        let puzzle = tee_puzzle();
        let words = WordList::from_words(["cat", "dog"]);
        let mut solver = Solver::new(&puzzle, &words);

        assert!(!solver.propagate());
        assert_eq!(solver.phase(), Phase::Failed);
        assert_eq!(solver.search(&FillOptions::default()), Err(FillFailure::HardFailure));
        assert_eq!(solver.phase(), Phase::Failed);
        assert_eq!(solver.statistics().states, 0);
    }

    #[test]
    fn test_empty_domain_fails_before_arc_consistency() {
        let puzzle = Puzzle::from_template_str("_____").unwrap();
        let words = WordList::from_words(["cat", "dog"]);
        let mut solver = Solver::new(&puzzle, &words);

        assert!(!solver.propagate());
        assert_eq!(solver.phase(), Phase::Failed);
        assert!(solver.domains().is_empty(0));
    }

    #[test]
    fn test_search_without_propagation_reports_unsatisfiable() {
        let puzzle = tee_puzzle();
        let words = WordList::from_words(["cat", "dog"]);
        let mut solver = Solver::new(&puzzle, &words);
        solver.enforce_node_consistency();

        assert_eq!(solver.search(&FillOptions::default()), Err(FillFailure::HardFailure));
        assert_eq!(solver.phase(), Phase::Unsatisfiable);
        assert_eq!(solver.statistics().backtracks, 3);
    }

    #[test]
    fn test_search_limit_aborts() {
        let puzzle = tee_puzzle();
        let words = WordList::from_words(["cat", "dog"]);
        let mut solver = Solver::new(&puzzle, &words);
        solver.enforce_node_consistency();

        let options = FillOptions { max_backtracks: Some(2), ..FillOptions::default() };
        assert_eq!(solver.search(&options), Err(FillFailure::ExceededBacktrackLimit(2)));
        assert_eq!(solver.phase(), Phase::Aborted);
    }

    #[test]
    fn test_step_by_step_engine() {
        let puzzle = tee_puzzle();
        let words = WordList::from_words(["ace", "art", "cat"]);
        let mut solver = Solver::new(&puzzle, &words);
        solver.enforce_node_consistency();

        let across = puzzle.slot_id(&Slot::new(0, 0, Direction::Across, 3)).unwrap();
        let down = puzzle.slot_id(&Slot::new(0, 1, Direction::Down, 3)).unwrap();

        // ART needs a down word starting with R.
        assert!(solver.revise(across, down));
        assert_eq!(solver.statistics().arc_eliminations, 1);
        assert!(solver.ac3(Some(&[(down, across)][..])));

        let assignment = Assignment::new(puzzle.slot_count());
        let next = solver.select_unassigned_variable(&assignment).unwrap();
        assert!(!solver.order_domain_values(next).is_empty());
    }

    #[test]
    fn test_find_fill() {
        let puzzle = tee_puzzle();
        let words = WordList::from_words(["art", "cat"]);

        let result = find_fill(&puzzle, &words, &FillOptions::default()).unwrap();

        assert_eq!(result.assignment.word(&words, 0).unwrap().string, "CAT");
        assert_eq!(result.assignment.word(&words, 1).unwrap().string, "ART");
        assert_eq!(result.statistics.states, 2);
    }

    #[test]
    fn test_find_fill_failure_carries_statistics() {
        let puzzle = tee_puzzle();
        let words = WordList::from_words(["cat", "dog", "to"]);

        let error = find_fill(&puzzle, &words, &FillOptions::default()).unwrap_err();

        assert_eq!(error.failure, FillFailure::HardFailure);
        assert_eq!(error.statistics.node_eliminations, 2);
        assert_eq!(error.statistics.states, 0);
        assert_eq!(error.to_string(), "no solution");
    }

    #[test]
    fn test_aborted_solve_carries_search_statistics() {
        let puzzle = Puzzle::from_template_str("___\n###\n___").unwrap();
        let options = FillOptions {
            distinct_words: true,
            max_backtracks: Some(1),
            ..FillOptions::default()
        };

        // Both slots can only take CAT, which distinct mode allows once.
        let words = WordList::from_words(["cat"]);
        let error = find_fill(&puzzle, &words, &options).unwrap_err();

        assert_eq!(error.failure, FillFailure::ExceededBacktrackLimit(1));
        assert_eq!(error.statistics.backtracks, 1);
        assert_eq!(error.statistics.states, 2);
    }
}
