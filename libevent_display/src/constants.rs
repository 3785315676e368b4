/// Number of readout channels on a single FERS board
pub const CHANNELS_PER_BOARD: u32 = 64;

// Tiling used by the horizontal layout of boards 1-5
pub const BOARD_WIDTH: i32 = 4;
pub const GRID_WIDTH: i32 = 20;

/// Board placed in its own row band by the wrapped layout
pub const WRAPPED_SHIFTED_BOARD: u32 = 3;
pub const WRAPPED_VERTICAL_SHIFT: i32 = -4;

/// Largest span of the global grid along either axis
pub const MAX_GRID_SPAN: u64 = 4096;

/// Calibration file looked up when the configuration names none
pub const DEFAULT_NOISE_FILE: &str = "fers_noises.json";

// Default names in the event store
pub const DEFAULT_EVENT_TABLE: &str = "EventTree";
pub const DEFAULT_EVENT_ID_FIELD: &str = "event_n";
pub const DEFAULT_BOARD_PREFIX: &str = "FERS_Board";
pub const DEFAULT_QUANTITY: &str = "energyHG";

/// Attribute on the event table holding the number of records
pub const N_EVENTS_ATTR: &str = "n_events";

// Display range used for the colour scale of the rendered grid
pub const DEFAULT_Z_MIN: f64 = 0.0;
pub const DEFAULT_Z_MAX: f64 = 8000.0;
