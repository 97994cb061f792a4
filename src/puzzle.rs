//! The static structure of a puzzle: its occupancy grid, the slots derived from it, and the
//! overlap relation between crossing slots. A `Puzzle` is immutable once constructed.

use std::collections::HashMap;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use smallvec::SmallVec;

use crate::errors::ParseError;
use crate::{Arc, GridCoord, SlotId, MAX_SLOT_LENGTH};

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A maximal run of fillable cells in one direction, to be filled by exactly one word. Slots are
/// identified purely by their structural parameters, so two slots with the same start cell,
/// direction and length are the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    row: usize,
    col: usize,
    direction: Direction,
    length: usize,
}

impl Slot {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Slot {
        Slot { row, col, direction, length }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate the coords for each cell of this slot.
    pub fn cells(&self) -> SmallVec<[GridCoord; MAX_SLOT_LENGTH]> {
        (0..self.length).map(|cell_idx| {
            match self.direction {
                Direction::Across => (self.row, self.col + cell_idx),
                Direction::Down => (self.row + cell_idx, self.col),
            }
        }).collect()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {} : {}", self.row, self.col, self.direction, self.length)
    }
}

/// The location of the cell shared by two crossing slots: `first` is the character index within
/// the first slot's word and `second` the index within the second slot's word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Overlap {
    pub first: usize,
    pub second: usize,
}

impl Overlap {
    /// The same overlap, seen from the other slot.
    pub fn swapped(self) -> Overlap {
        Overlap { first: self.second, second: self.first }
    }
}

/// A crossing between one slot and another, referencing the other slot's id and where the two
/// slots meet. `overlap.first` indexes into the owning slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub overlap: Overlap,
}

pub struct Puzzle {
    width: usize,
    height: usize,
    structure: Vec<Vec<bool>>,
    slots: Vec<Slot>,
    slot_ids: HashMap<Slot, SlotId>,
    crossings: Vec<SmallVec<[Crossing; MAX_SLOT_LENGTH]>>,
}

impl Debug for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Puzzle")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("slots", &self.slots)
            .field("arcs", &self.arcs().len())
            .finish()
    }
}

/// Find every maximal run of at least two open cells, scanning row-major and checking across
/// before down at each cell.
fn find_slots(structure: &[Vec<bool>], width: usize, height: usize) -> Vec<Slot> {
    let mut result = vec![];

    for row in 0..height {
        for col in 0..width {
            if !structure[row][col] {
                continue;
            }

            if col == 0 || !structure[row][col - 1] {
                let length = (col..width).take_while(|&c| structure[row][c]).count();
                if length > 1 {
                    result.push(Slot::new(row, col, Direction::Across, length));
                }
            }

            if row == 0 || !structure[row - 1][col] {
                let length = (row..height).take_while(|&r| structure[r][col]).count();
                if length > 1 {
                    result.push(Slot::new(row, col, Direction::Down, length));
                }
            }
        }
    }

    result
}

impl Puzzle {
    /// Build a puzzle from an occupancy grid, where `true` marks a fillable cell. Rows shorter
    /// than the widest row are padded with walls.
    pub fn new(mut structure: Vec<Vec<bool>>) -> Result<Puzzle, ParseError> {
        let height = structure.len();
        let width = structure.iter().map(Vec::len).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(ParseError::EmptyStructure);
        }

        for row in &mut structure {
            row.resize(width, false);
        }

        let slots = find_slots(&structure, width, height);
        let slot_ids: HashMap<Slot, SlotId> =
            slots.iter().enumerate().map(|(slot_id, &slot)| (slot, slot_id)).collect();

        // Build a map from cell location to the slots passing through it, which we can then use
        // to calculate crossings. Each cell belongs to at most one across and one down slot.
        let mut slots_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();
        for (slot_id, slot) in slots.iter().enumerate() {
            for (cell_idx, loc) in slot.cells().into_iter().enumerate() {
                slots_by_loc.entry(loc).or_default().push((slot_id, cell_idx));
            }
        }

        let crossings = slots.iter().enumerate().map(|(slot_id, slot)| {
            slot.cells().iter().enumerate().flat_map(|(cell_idx, loc)| {
                slots_by_loc[loc].iter()
                    .filter(|&&(other_slot_id, _)| other_slot_id != slot_id)
                    .map(move |&(other_slot_id, other_cell_idx)| Crossing {
                        other_slot_id,
                        overlap: Overlap { first: cell_idx, second: other_cell_idx },
                    })
                    .collect::<SmallVec<[Crossing; 1]>>()
            }).collect()
        }).collect();

        Ok(Puzzle { width, height, structure, slots, slot_ids, crossings })
    }

    /// Parse a puzzle from a text template with one row per line, where `_` or `.` marks an open
    /// cell and any other character is a wall. Lines are trimmed and blank lines are skipped, so
    /// walls must be written with a visible character such as `#`.
    pub fn from_template_str(template: &str) -> Result<Puzzle, ParseError> {
        let structure: Vec<Vec<bool>> = template.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(line.chars().map(|c| c == '_' || c == '.').collect())
            }
        }).collect();

        Puzzle::new(structure)
    }

    /// Read and parse a structure file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Puzzle, ParseError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Puzzle::from_template_str(&contents)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Is the cell at the given location fillable? Out-of-bounds cells are treated as walls.
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.structure.get(row).and_then(|cells| cells.get(col)).copied().unwrap_or(false)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, slot_id: SlotId) -> Slot {
        self.slots[slot_id]
    }

    pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
        self.slot_ids.get(slot).copied()
    }

    pub fn crossings(&self, slot_id: SlotId) -> &[Crossing] {
        &self.crossings[slot_id]
    }

    /// Where do slots `x` and `y` cross, if they do? The result is oriented so that `first`
    /// indexes into `x`.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<Overlap> {
        self.crossings[x].iter()
            .find(|crossing| crossing.other_slot_id == y)
            .map(|crossing| crossing.overlap)
    }

    /// Like `overlap`, but looked up by slot identity. Unknown slots have no overlap.
    pub fn overlap_between(&self, x: &Slot, y: &Slot) -> Option<Overlap> {
        self.overlap(self.slot_id(x)?, self.slot_id(y)?)
    }

    /// All other slots that cross the given slot.
    pub fn neighbors(&self, slot_id: SlotId) -> impl Iterator<Item = SlotId> + '_ {
        self.crossings[slot_id].iter().map(|crossing| crossing.other_slot_id)
    }

    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.crossings[slot_id].len()
    }

    /// Every ordered pair of crossing slots. Both orientations of each crossing are included.
    pub fn arcs(&self) -> Vec<Arc> {
        self.crossings.iter().enumerate().flat_map(|(slot_id, crossings)| {
            crossings.iter().map(move |crossing| (slot_id, crossing.other_slot_id))
        }).collect()
    }
}
