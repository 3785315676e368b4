use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("LocalGeometry failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("LocalGeometry failed to parse an integer: {0}")]
    ParsingError(#[from] std::num::ParseIntError),
    #[error("LocalGeometry was given a file with the incorrect format; most likely the number of columns is incorrect")]
    BadFileFormat,
    #[error("LocalGeometry found channel {0} more than once")]
    DuplicateChannel(u32),
    #[error("TilingStrategy lists board {0} more than once")]
    DuplicateBoard(u32),
    #[error("TilingStrategy places board {board} channel {channel} outside of the representable grid")]
    PlacementOverflow { board: u32, channel: u32 },
    #[error("TilingStrategy produces a grid of {width} x {height} cells; each axis is limited to {max} cells")]
    ExtentTooLarge { width: u64, height: u64, max: u64 },
}

#[derive(Debug, Error)]
pub enum NoiseTableError {
    #[error("Could not open noise file because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("NoiseTable failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("NoiseTable failed to parse the noise document: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("Could not open event store because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("EventStore failed due to HDF5 error: {0}")]
    HDF5Error(#[from] hdf5::Error),
    #[error("EventStore does not contain the event table {0}")]
    MissingTable(String),
    #[error("EventStore is missing the entry {0}")]
    MissingEntry(String),
    #[error("EventStore record {index} has no scalar event identifier field {field}")]
    MissingEventId { index: usize, field: String },
    #[error("EventStore has no record at index {0}")]
    IndexOutOfRange(usize),
}

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Event {0} was not found in the event store")]
    NotFound(i64),
    #[error("EventLocator failed due to EventStore error: {0}")]
    StoreError(#[from] EventStoreError),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No reading found for board {board} channel {channel}; neither a scalar field nor an array field is present")]
    MissingColumn { board: u32, channel: u32 },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Renderer failed due to HDF5 error: {0}")]
    HDF5Error(#[from] hdf5::Error),
    #[error("Renderer failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Renderer could not store the title {0:?}")]
    BadTitle(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to LocalGeometry error: {0}")]
    GeometryError(#[from] GeometryError),
    #[error("Processor failed due to NoiseTable error: {0}")]
    NoiseError(#[from] NoiseTableError),
    #[error("Processor failed due to EventStore error: {0}")]
    StoreError(#[from] EventStoreError),
    #[error("Processor failed due to EventLocator error: {0}")]
    LocatorError(#[from] LocatorError),
    #[error("Processor failed due to ReadingExtractor error: {0}")]
    ExtractError(#[from] ExtractError),
    #[error("Processor failed due to Renderer error: {0}")]
    RenderError(#[from] RenderError),
}
