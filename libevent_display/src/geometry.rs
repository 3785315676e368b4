// The detector is a row of FERS boards. Every board shares the same intrinsic layout
// (channel -> local (x, y)), and a tiling strategy decides where each board lands in
// the global grid:
// [board, channel] -> local (x, y) -> global (x + horizontal shift, y + vertical shift)
// The horizontal coordinate can optionally wrap around the grid width.
//
// Nothing here checks that two channels do not land on the same cell. That is a
// property of the strategy, and GlobalMapping::find_collisions is there for whoever
// wants to ask. Building does reject strategies that cannot be placed at all: a board
// listed twice, a shift that does not fit in an i32, or a grid too large to allocate.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::constants::*;
use super::error::GeometryError;

const ENTRIES_PER_LINE: usize = 3; //Number of elements in a single row in the CSV file (channel, x, y)

/// Load the default geometry for windows
#[cfg(target_family = "windows")]
fn load_default_geometry() -> String {
    String::from(include_str!("data\\fers_geometry.csv"))
}

/// Load the default geometry for macos and linux
#[cfg(target_family = "unix")]
fn load_default_geometry() -> String {
    String::from(include_str!("data/fers_geometry.csv"))
}

/// A single readout channel on a given board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardChannel {
    pub board: u32,
    pub channel: u32,
}

impl BoardChannel {
    pub fn new(board: u32, channel: u32) -> Self {
        Self { board, channel }
    }
}

/// A cell in either the local board layout or the global grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive bounding box of a set of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

fn span(min: i32, max: i32) -> u64 {
    (i64::from(max) - i64::from(min) + 1) as u64
}

impl Extent {
    pub fn width(&self) -> usize {
        span(self.x_min, self.x_max) as usize
    }

    pub fn height(&self) -> usize {
        span(self.y_min, self.y_max) as usize
    }

    fn include(&mut self, cell: &Cell) {
        self.x_min = self.x_min.min(cell.x);
        self.x_max = self.x_max.max(cell.x);
        self.y_min = self.y_min.min(cell.y);
        self.y_max = self.y_max.max(cell.y);
    }
}

/// LocalGeometry is the intrinsic channel layout of one board type.
///
/// The layout is read from a CSV file where each row contains 3 elements: the channel, the
/// local x, and the local y. If no file is given the bundled FERS layout is used, which
/// places the 64 channels row-major in a block 4 cells wide and 16 cells tall.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalGeometry {
    positions: BTreeMap<u32, Cell>,
}

impl LocalGeometry {
    /// Create a new LocalGeometry
    /// If the path is None, we load the default that is bundled with the library
    pub fn new(path: Option<&Path>) -> Result<Self, GeometryError> {
        let mut contents = String::new();
        if let Some(p) = path {
            let mut file = File::open(p)?;
            file.read_to_string(&mut contents)?;
        } else {
            contents = load_default_geometry();
        }
        Self::parse(&contents)
    }

    /// Parse the CSV text of a geometry table. The first line is a header.
    pub fn parse(contents: &str) -> Result<Self, GeometryError> {
        let mut geometry = LocalGeometry::default();

        let mut lines = contents.lines();
        lines.next(); // Skip the header
        for line in lines {
            if line.is_empty() {
                continue;
            }
            let entries: Vec<&str> = line.split_terminator(",").collect();
            if entries.len() != ENTRIES_PER_LINE {
                return Err(GeometryError::BadFileFormat);
            }

            let channel: u32 = entries[0].parse()?;
            let cell = Cell::new(entries[1].parse()?, entries[2].parse()?);
            if geometry.positions.insert(channel, cell).is_some() {
                return Err(GeometryError::DuplicateChannel(channel));
            }
        }

        Ok(geometry)
    }

    /// Build a geometry directly from (channel, local cell) pairs
    pub fn from_positions(positions: impl IntoIterator<Item = (u32, Cell)>) -> Self {
        Self {
            positions: positions.into_iter().collect(),
        }
    }

    pub fn position(&self, channel: u32) -> Option<Cell> {
        self.positions.get(&channel).copied()
    }

    /// Iterate over the channels in ascending order
    pub fn channels(&self) -> impl Iterator<Item = (u32, Cell)> + '_ {
        self.positions.iter().map(|(ch, cell)| (*ch, *cell))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// How the horizontal shift of a board is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShiftRule {
    /// shift = step * (position + offset), where position is the index in the board list
    Step { step: i32, offset: i32 },
    /// An explicit shift for each board; boards not listed are not shifted
    PerBoard { shifts: BTreeMap<u32, i32> },
}

impl ShiftRule {
    /// None if the shift does not fit in an i32
    fn shift(&self, position: usize, board: u32) -> Option<i32> {
        match self {
            Self::Step { step, offset } => i32::try_from(position)
                .ok()?
                .checked_add(*offset)?
                .checked_mul(*step),
            Self::PerBoard { shifts } => Some(shifts.get(&board).copied().unwrap_or(0)),
        }
    }
}

/// TilingStrategy describes how every board's local geometry is placed in the global grid.
///
/// Boards are visited in the order of `boards`. A strategy with `wrap` set reduces the global x
/// coordinate modulo the wrap width; a wrap that is not positive is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilingStrategy {
    pub boards: Vec<u32>,
    pub horizontal: ShiftRule,
    #[serde(default)]
    pub wrap: Option<i32>,
    #[serde(default)]
    pub vertical_shifts: BTreeMap<u32, i32>,
}

impl Default for TilingStrategy {
    fn default() -> Self {
        Self::sequential()
    }
}

impl TilingStrategy {
    /// Boards 1-5 side by side, each shifted one board width from the last.
    ///
    /// This is the layout for stores holding either scalar or array readings; the storage
    /// shape has no effect on the geometry.
    pub fn sequential() -> Self {
        Self {
            boards: (1..=5).collect(),
            horizontal: ShiftRule::Step {
                step: BOARD_WIDTH,
                offset: 0,
            },
            wrap: None,
            vertical_shifts: BTreeMap::new(),
        }
    }

    /// Boards 4 to 0, shifted by one board width per position starting from the second slot and
    /// wrapped around the grid width. Board 3 is moved down into its own row band.
    pub fn wrapped() -> Self {
        Self {
            boards: vec![4, 3, 2, 1, 0],
            horizontal: ShiftRule::Step {
                step: BOARD_WIDTH,
                offset: 1,
            },
            wrap: Some(GRID_WIDTH),
            vertical_shifts: BTreeMap::from([(WRAPPED_SHIFTED_BOARD, WRAPPED_VERTICAL_SHIFT)]),
        }
    }

    fn reduce(&self, x: i32) -> i32 {
        match self.wrap {
            Some(width) if width > 0 => x.rem_euclid(width),
            _ => x,
        }
    }

    /// The horizontal shift of the board at the given position in the board list.
    /// None if the shift overflows
    pub fn horizontal_shift(&self, position: usize, board: u32) -> Option<i32> {
        self.horizontal
            .shift(position, board)
            .map(|shift| self.reduce(shift))
    }

    pub fn vertical_shift(&self, board: u32) -> i32 {
        self.vertical_shifts.get(&board).copied().unwrap_or(0)
    }

    fn place(&self, local: Cell, position: usize, board: u32) -> Option<Cell> {
        let x = local.x.checked_add(self.horizontal_shift(position, board)?)?;
        let y = local.y.checked_add(self.vertical_shift(board))?;
        Some(Cell::new(self.reduce(x), y))
    }
}

/// GlobalMapping contains the resolved (board, channel) -> global cell assignment.
///
/// Entries are kept in the order they were built (board order of the strategy, then ascending
/// channel), so iterating a mapping is deterministic.
#[derive(Debug, Clone, Default)]
pub struct GlobalMapping {
    entries: Vec<(BoardChannel, Cell)>,
    index: FxHashMap<BoardChannel, usize>,
}

impl PartialEq for GlobalMapping {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl GlobalMapping {
    /// Place every channel of every board in the strategy into the global grid.
    ///
    /// Every (board, channel) gets exactly one cell, so a board listed twice is an error, as is
    /// a placement that overflows or a bounding box wider or taller than MAX_GRID_SPAN.
    pub fn build(
        geometry: &LocalGeometry,
        strategy: &TilingStrategy,
    ) -> Result<Self, GeometryError> {
        let mut mapping = GlobalMapping::default();
        let mut seen: FxHashSet<u32> = FxHashSet::default();
        for (position, board) in strategy.boards.iter().enumerate() {
            if !seen.insert(*board) {
                return Err(GeometryError::DuplicateBoard(*board));
            }
            for (channel, local) in geometry.channels() {
                let key = BoardChannel::new(*board, channel);
                let cell = strategy
                    .place(local, position, *board)
                    .ok_or(GeometryError::PlacementOverflow {
                        board: *board,
                        channel,
                    })?;
                mapping.index.insert(key, mapping.entries.len());
                mapping.entries.push((key, cell));
            }
        }

        if let Some(extent) = mapping.extent() {
            let width = span(extent.x_min, extent.x_max);
            let height = span(extent.y_min, extent.y_max);
            if width > MAX_GRID_SPAN || height > MAX_GRID_SPAN {
                return Err(GeometryError::ExtentTooLarge {
                    width,
                    height,
                    max: MAX_GRID_SPAN,
                });
            }
        }
        Ok(mapping)
    }

    /// Get the global cell of a channel.
    ///
    /// If returns None the channel is not part of the mapping
    pub fn get(&self, board: u32, channel: u32) -> Option<Cell> {
        self.index
            .get(&BoardChannel::new(board, channel))
            .map(|idx| self.entries[*idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(BoardChannel, Cell)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bounding box of every cell in the mapping. None if the mapping is empty.
    pub fn extent(&self) -> Option<Extent> {
        let mut cells = self.entries.iter().map(|(_, cell)| cell);
        let first = cells.next()?;
        let mut extent = Extent {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };
        cells.for_each(|cell| extent.include(cell));
        Some(extent)
    }

    /// Find every cell that more than one channel resolves to.
    ///
    /// The result is sorted by cell; an injective mapping returns an empty list.
    pub fn find_collisions(&self) -> Vec<(Cell, Vec<BoardChannel>)> {
        let mut occupants: FxHashMap<Cell, Vec<BoardChannel>> = FxHashMap::default();
        for (key, cell) in self.entries.iter() {
            occupants.entry(*cell).or_default().push(*key);
        }
        let mut collisions: Vec<(Cell, Vec<BoardChannel>)> = occupants
            .into_iter()
            .filter(|(_, keys)| keys.len() > 1)
            .collect();
        collisions.sort_by_key(|(cell, _)| *cell);
        collisions
    }
}
