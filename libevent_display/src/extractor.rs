use serde::{Deserialize, Serialize};

use super::constants::{DEFAULT_BOARD_PREFIX, DEFAULT_QUANTITY};
use super::error::ExtractError;
use super::event_store::EventRecord;

/// The naming convention of the reading fields in an event record.
///
/// With the defaults, board 2 channel 5 is read from the scalar field `FERS_Board2_energyHG_5`,
/// or from index 5 of the array field `FERS_Board2_energyHG`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNaming {
    pub board_prefix: String,
    pub quantity: String,
}

impl Default for FieldNaming {
    fn default() -> Self {
        Self {
            board_prefix: String::from(DEFAULT_BOARD_PREFIX),
            quantity: String::from(DEFAULT_QUANTITY),
        }
    }
}

impl FieldNaming {
    /// Name of the field holding a single channel's reading
    pub fn scalar_field(&self, board: u32, channel: u32) -> String {
        format!("{}{}_{}_{}", self.board_prefix, board, self.quantity, channel)
    }

    /// Name of the field holding every reading of a board
    pub fn array_field(&self, board: u32) -> String {
        format!("{}{}_{}", self.board_prefix, board, self.quantity)
    }
}

/// ReadingExtractor reads raw channel values out of a located EventRecord.
///
/// The storage shape is decided for every (board, channel) on its own: a scalar field for the
/// channel wins, otherwise the board's array field is indexed by channel. Records may mix the
/// two shapes across boards.
#[derive(Debug, Clone)]
pub struct ReadingExtractor<'a> {
    record: &'a EventRecord,
    naming: &'a FieldNaming,
}

impl<'a> ReadingExtractor<'a> {
    pub fn new(record: &'a EventRecord, naming: &'a FieldNaming) -> Self {
        Self { record, naming }
    }

    /// Get the raw reading of a channel
    pub fn read(&self, board: u32, channel: u32) -> Result<i64, ExtractError> {
        if let Some(value) = self.record.scalar(&self.naming.scalar_field(board, channel)) {
            return Ok(value);
        }
        self.record
            .array(&self.naming.array_field(board))
            .and_then(|values| values.get(channel as usize))
            .copied()
            .ok_or(ExtractError::MissingColumn { board, channel })
    }
}
