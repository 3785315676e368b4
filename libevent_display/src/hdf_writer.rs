use hdf5::types::VarLenUnicode;
use hdf5::File;
use std::path::Path;
use std::str::FromStr;

use super::error::RenderError;
use super::grid::Grid;
use super::render::GridRenderer;

const GRID_NAME: &str = "grid";
/// This is the version of the output format
const FORMAT_VERSION: &str = "1.0";

/// A simple struct which wraps around the hdf5-rust library.
///
/// Writes a reconstructed event grid so that it can be drawn by any plotting tool. The value
/// matrix is stored with rows along y and columns along x.
///
/// ```text
/// event_display_#.h5
/// grid(dset) - x_min, x_max, y_min, y_max, z_min, z_max, title, version
/// ```
///
/// The axis attributes are only written for a non-empty grid, and the z range only when one was
/// configured.
#[derive(Debug, Clone, Default)]
pub struct HDFGridWriter {
    z_range: Option<(f64, f64)>,
}

impl HDFGridWriter {
    pub fn new(z_range: Option<(f64, f64)>) -> Self {
        Self { z_range }
    }
}

fn to_unicode(s: &str) -> Result<VarLenUnicode, RenderError> {
    VarLenUnicode::from_str(s).map_err(|_| RenderError::BadTitle(s.to_string()))
}

impl GridRenderer for HDFGridWriter {
    fn extension(&self) -> &'static str {
        "h5"
    }

    fn render(&self, grid: &Grid, title: &str, path: &Path) -> Result<(), RenderError> {
        let file_handle = File::create(path)?;
        let version = format!("{}:{}", env!("CARGO_PKG_NAME"), FORMAT_VERSION);

        let grid_dset = file_handle
            .new_dataset_builder()
            .with_data(grid.values())
            .create(GRID_NAME)?;

        if let Some(extent) = grid.extent() {
            grid_dset
                .new_attr::<i32>()
                .create("x_min")?
                .write_scalar(&extent.x_min)?;
            grid_dset
                .new_attr::<i32>()
                .create("x_max")?
                .write_scalar(&extent.x_max)?;
            grid_dset
                .new_attr::<i32>()
                .create("y_min")?
                .write_scalar(&extent.y_min)?;
            grid_dset
                .new_attr::<i32>()
                .create("y_max")?
                .write_scalar(&extent.y_max)?;
        }
        if let Some((z_min, z_max)) = self.z_range {
            grid_dset
                .new_attr::<f64>()
                .create("z_min")?
                .write_scalar(&z_min)?;
            grid_dset
                .new_attr::<f64>()
                .create("z_max")?
                .write_scalar(&z_max)?;
        }
        grid_dset
            .new_attr::<VarLenUnicode>()
            .create("title")?
            .write_scalar(&to_unicode(title)?)?;
        grid_dset
            .new_attr::<VarLenUnicode>()
            .create("version")?
            .write_scalar(&to_unicode(&version)?)?;
        Ok(())
    }
}
