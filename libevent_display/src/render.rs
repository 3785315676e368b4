use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::error::RenderError;
use super::grid::Grid;
use super::hdf_writer::HDFGridWriter;

/// A GridRenderer turns a finished grid into an artifact on disk.
///
/// Renderers are handed the value matrix with its axis bounds (both carried by the Grid) and a
/// human readable title.
pub trait GridRenderer {
    /// File extension of the artifact, without the dot
    fn extension(&self) -> &'static str;

    fn render(&self, grid: &Grid, title: &str, path: &Path) -> Result<(), RenderError>;
}

/// The available artifact formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Hdf5,
    Text,
}

impl OutputFormat {
    pub fn renderer(&self, z_range: Option<(f64, f64)>) -> Box<dyn GridRenderer> {
        match self {
            Self::Hdf5 => Box::new(HDFGridWriter::new(z_range)),
            Self::Text => Box::new(TextGridWriter::new(z_range)),
        }
    }
}

const PARTIAL_SUFFIX: &str = ".partial";

fn remove_partial(partial: &Path) {
    if partial.exists() {
        if let Err(e) = std::fs::remove_file(partial) {
            spdlog::warn!(
                "Could not remove incomplete artifact {}: {e}",
                partial.to_string_lossy()
            );
        }
    }
}

/// Render the grid to path through a sibling `.partial` file.
///
/// The artifact only appears at path once the renderer has finished. If rendering fails the
/// partial file is removed and nothing is left behind.
pub fn render_to_file(
    renderer: &dyn GridRenderer,
    grid: &Grid,
    title: &str,
    path: &Path,
) -> Result<(), RenderError> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(PARTIAL_SUFFIX);
    let partial = PathBuf::from(partial);

    if let Err(e) = renderer.render(grid, title, &partial) {
        remove_partial(&partial);
        return Err(e);
    }
    if let Err(e) = std::fs::rename(&partial, path) {
        remove_partial(&partial);
        return Err(e.into());
    }
    Ok(())
}

const CELL_WIDTH: usize = 9;

/// Writes the grid as a plain text table, one row per y with the highest y on top, each cell
/// annotated with its value.
#[derive(Debug, Clone, Default)]
pub struct TextGridWriter {
    z_range: Option<(f64, f64)>,
}

impl TextGridWriter {
    pub fn new(z_range: Option<(f64, f64)>) -> Self {
        Self { z_range }
    }
}

impl GridRenderer for TextGridWriter {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, grid: &Grid, title: &str, path: &Path) -> Result<(), RenderError> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{title}")?;
        if let Some((z_min, z_max)) = self.z_range {
            writeln!(out, "z range: {z_min} - {z_max}")?;
        }

        let extent = match grid.extent() {
            Some(e) => e,
            None => {
                writeln!(out, "(empty grid)")?;
                out.flush()?;
                return Ok(());
            }
        };

        let values = grid.values();
        for row in (0..values.nrows()).rev() {
            let y = extent.y_min + row as i32;
            write!(out, "{y:>4} |")?;
            for value in values.row(row) {
                write!(out, "{value:>CELL_WIDTH$.1}")?;
            }
            writeln!(out)?;
        }
        writeln!(out, "     +{}", "-".repeat(values.ncols() * CELL_WIDTH))?;
        write!(out, "   x  ")?;
        for x in extent.x_min..=extent.x_max {
            write!(out, "{x:>CELL_WIDTH$}")?;
        }
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}
