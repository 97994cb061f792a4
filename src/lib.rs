pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod errors;
pub mod log;
pub mod puzzle;
pub mod render;
pub mod solver;
pub mod word_list;

pub use backtracking_search::{Assignment, FillFailure, FillOptions, Statistics};
pub use domains::Domains;
pub use errors::{ParseError, RenderError};
pub use puzzle::{Crossing, Direction, Overlap, Puzzle, Slot};
pub use render::{letter_grid, render_grid, render_image};
pub use solver::{find_fill, FillError, FillSuccess, Phase, Solver};
pub use word_list::{Word, WordList};

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given slot, based on its index in the Puzzle's `slots` field, which also
/// corresponds to an index in the domain store and in an `Assignment`.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the `WordList`.
pub type WordId = usize;

/// Zero-indexed (row, col) coords for a cell in the grid, where row = 0 is the top row.
pub type GridCoord = (usize, usize);

/// An ordered pair of crossing slots, as processed by AC-3.
pub type Arc = (SlotId, SlotId);
