use std::path::{Path, PathBuf};

use super::config::Config;
use super::error::ProcessorError;
use super::event_store::EventStore;
use super::extractor::ReadingExtractor;
use super::geometry::{GlobalMapping, LocalGeometry};
use super::grid::{aggregate, Grid};
use super::hdf_store::Hdf5EventStore;
use super::locator::EventLocator;
use super::noise_table::NoiseTable;
use super::render::render_to_file;

/// Build the global mapping for the configured geometry and tiling.
///
/// Collisions are not fatal, but every one of them is reported since the channels sharing a cell
/// will be summed in the grid.
pub fn build_mapping(config: &Config) -> Result<GlobalMapping, ProcessorError> {
    let geometry = LocalGeometry::new(config.geometry_path.as_deref())?;
    let mapping = GlobalMapping::build(&geometry, &config.tiling)?;
    for (cell, channels) in mapping.find_collisions() {
        spdlog::warn!(
            "Cell ({}, {}) is shared by {} channels: {:?}",
            cell.x,
            cell.y,
            channels.len(),
            channels
        );
    }
    Ok(mapping)
}

/// Load the noise table.
///
/// A configured calibration file must exist. Only a config that explicitly sets no noise path
/// gets an empty table.
pub fn load_noise(config: &Config) -> Result<NoiseTable, ProcessorError> {
    if !config.has_noise_path() {
        spdlog::warn!("Noise calibration disabled; all baselines are 0");
    }
    let noise = NoiseTable::new(config.noise_path.as_deref())?;
    spdlog::info!("Loaded {} noise baselines", noise.len());
    Ok(noise)
}

/// Reconstruct the grid of one event from any EventStore.
///
/// Locates the event, reads every mapped channel and folds the noise corrected readings into a
/// new Grid.
pub fn reconstruct_event<S: EventStore + ?Sized>(
    store: &S,
    event: i64,
    mapping: &GlobalMapping,
    noise: &NoiseTable,
    config: &Config,
) -> Result<Grid, ProcessorError> {
    let record = EventLocator::new(config.locate_strategy).locate(store, event)?;
    let extractor = ReadingExtractor::new(&record, &config.fields);
    let grid = aggregate(mapping, noise, &extractor)?;
    if let Some(extent) = grid.extent() {
        spdlog::info!(
            "Reconstructed event {event} on x: [{}, {}] y: [{}, {}]",
            extent.x_min,
            extent.x_max,
            extent.y_min,
            extent.y_max
        );
    }
    Ok(grid)
}

/// The main entry point of the event display.
///
/// Reconstructs the requested event from the HDF5 store at store_path and hands the grid to the
/// configured renderer. Returns the path of the artifact. Nothing is written if any step fails.
pub fn display_event(
    config: &Config,
    store_path: &Path,
    event: i64,
) -> Result<PathBuf, ProcessorError> {
    let renderer = config.output_format.renderer(config.z_range);
    let output_path = config.get_output_file_name(event, renderer.extension())?;

    let mapping = build_mapping(config)?;
    let noise = load_noise(config)?;

    let grid = {
        // The store is closed as soon as the event has been read
        let store = Hdf5EventStore::open(store_path, &config.event_table, &config.event_id_field)?;
        spdlog::info!(
            "Searching {} records of {} for event {event}",
            store.len(),
            store.file_name()
        );
        reconstruct_event(&store, event, &mapping, &noise, config)?
    };

    render_to_file(
        renderer.as_ref(),
        &grid,
        &format!("Event {event}"),
        &output_path,
    )?;
    spdlog::info!("Wrote event display to {}", output_path.to_string_lossy());
    Ok(output_path)
}
