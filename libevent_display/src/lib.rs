//! # event_display
//!
//! event_display reconstructs a single FERS readout event as a calibrated 2-D grid for
//! visualization. The detector is a row of FERS boards, each exposing 64 readout channels,
//! and every channel is assigned a cell in a shared spatial layout. For the requested event
//! the display finds the event's record in an HDF5 event store, reads every channel,
//! subtracts the per-channel noise baseline, and places the corrected value in the grid.
//!
//! ## Building & Install
//!
//! HDF5 must be installed before building. See the hdf5-rust documentation for how to point
//! the build at a custom install location (`HDF5_DIR`).
//!
//! To build and install the CLI use `cargo install --path ./event_display_cli` from the top
//! level repository.
//!
//! ## Use
//!
//! ```bash
//! event_display_cli <event-store-path> <event-number> [-c config.yml] [-n fers_noises.json]
//! ```
//!
//! A template configuration can be made with `event_display_cli new -p config.yml`.
//!
//! ## Configuration
//!
//! The YAML format of a configuration file is as follows:
//!
//! ```yml
//! noise_path: fers_noises.json
//! geometry_path: null
//! output_path: .
//! output_format: hdf5
//! tiling:
//!   boards: [1, 2, 3, 4, 5]
//!   horizontal:
//!     kind: step
//!     step: 4
//!     offset: 0
//!   wrap: null
//!   vertical_shifts: {}
//! locate_strategy: scan
//! event_table: EventTree
//! event_id_field: event_n
//! fields:
//!   board_prefix: FERS_Board
//!   quantity: energyHG
//! z_range: [0.0, 8000.0]
//! ```
//!
//! When `noise_path` is left out, `fers_noises.json` in the working directory is used, and a
//! missing calibration file is an error. Setting `noise_path: null` (or passing `--no-noise` to
//! the CLI) turns the subtraction off. If `geometry_path` is `null` the bundled FERS layout is used
//! (64 channels, 4 cells wide and 16 cells tall).
//!
//! The bundled layout makes the output grid taller than the historical 20 x 8 display: with
//! five boards side by side it spans x in [0, 19] and y in [0, 15] (y in [-4, 15] for the wrapped
//! layout). Sixty-four channels per board do not fit in an 8 row band without two channels
//! sharing a cell.
//!
//! A tiling that lists a board twice, shifts a board past the range of an i32, or spans more
//! than 4096 cells along an axis is rejected when the mapping is built.
//!
//! ### Tiling
//!
//! Boards are visited in the order of `boards`. The horizontal shift of a board is either
//! `step * (position + offset)` (`kind: step`) or taken from a per-board table
//! (`kind: per_board`, with `shifts: {board: shift}`). With `wrap` set, x is reduced modulo the
//! wrap width. `vertical_shifts` moves single boards up or down. The wrapped layout used by the
//! reordered boards 4-0 is
//!
//! ```yml
//! tiling:
//!   boards: [4, 3, 2, 1, 0]
//!   horizontal:
//!     kind: step
//!     step: 4
//!     offset: 1
//!   wrap: 20
//!   vertical_shifts:
//!     3: -4
//! ```
//!
//! ### Noise Format
//!
//! The noise file is a flat JSON (or YAML) map of `board<B>_ch<C>` keys to baselines:
//!
//! ```json
//! {"board1_ch0": 50.2, "board1_ch1": 48.9}
//! ```
//!
//! Channels without an entry have a baseline of 0.
//!
//! ### Geometry Format
//!
//! A custom geometry is a CSV file with *no* whitespaces and a header line:
//!
//! ```csv
//! channel,x,y
//! ```
//!
//! ## Event Store Format
//!
//! ```text
//! store.h5
//! EventTree - n_events
//! |---- event_#
//! |    |---- event_n(dset)
//! |    |---- FERS_Board<B>_energyHG_<C>(scalar dset)
//! |    |---- FERS_Board<B>_energyHG(1-D dset)
//! ```
//!
//! A board's readings can be stored either as one scalar per channel or as one array per
//! board. When both are present the scalar wins.
//!
//! ## Output
//!
//! The grid is written to `<output_path>/event_display_<event>.h5` (dataset `grid` with axis
//! bounds, z range and title attributes) or, with `output_format: text`, to a plain text table
//! `event_display_<event>.txt`. The CLI also writes a log file `event_display.log`.
pub mod config;
pub mod constants;
pub mod error;
pub mod event_store;
pub mod extractor;
pub mod geometry;
pub mod grid;
pub mod hdf_store;
pub mod hdf_writer;
pub mod locator;
pub mod noise_table;
pub mod process;
pub mod render;
