use std::io::BufRead;

use error_stack::ResultExt;

use crate::cursor::{is_delimiter, LineCursor};
use crate::error::DResult;
use crate::field::Repeated;

use super::{read_header, Section, SectionKind};

const LEVEL_COUNT_TEMPLATE: &str = "    #                NUMZGRID        number of vertical levels\n";
const LEVEL_TEMPLATE: &str = "    #            LEVEL           height of level (upper boundary)\n";

/// Lines in a nested grid section: the header and the seven geometry lines
const NESTED_SECTION_LINES: usize = 8;
const NESTED_HEADER_NAME: &str = "OUTGRID_NEST";

scalar_fields! {
    /// Horizontal extent of an output grid
    pub struct GridGeometry {
        /// Longitude of the lower left corner
        outlon_left: f64 => "   #            OUTLONLEFT      geograhical longitude of lower left corner of output grid\n",
        /// Latitude of the lower left corner
        outlat_lower: f64 => "    #              OUTLATLOWER     geographical latitude of lower left corner of output grid\n",
        numxgrid: i64 => "    #               NUMXGRID        number of grid points in x direction (= # of cells )\n",
        numygrid: i64 => "    #               NUMYGRID        number of grid points in y direction (= # of cells )\n",
        /// 0 if `dxout`/`dyout` are grid distances, 1 if they are the upper right corner
        outgriddef: i64 => "    #                OUTGRIDDEF      outgrid defined 0=using grid distance, 1=upperright corner coordinate\n",
        dxout: f64 => "    #           DXOUTLON        grid distance in x direction or upper right corner of output grid\n",
        dyout: f64 => "    #           DYOUTLON        grid distance in y direction or upper right corner of output grid\n",
    }
}

/// The main output grid: its geometry and the heights of its levels
#[derive(Debug, Clone, PartialEq)]
pub struct OutputGrid {
    pub geometry: GridGeometry,
    pub levels: Repeated<f64>,
}

impl Default for OutputGrid {
    fn default() -> Self {
        Self { geometry: GridGeometry::default(), levels: Repeated::new(LEVEL_COUNT_TEMPLATE, LEVEL_TEMPLATE) }
    }
}

impl Section for OutputGrid {
    const KIND: SectionKind = SectionKind::OutputGrid;

    fn read_body<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        read_header(cursor, Self::KIND)?;
        self.geometry.read_fields(cursor)?;
        self.levels.read(cursor).attach_printable("output levels")
    }

    fn push_lines(&self, lines: &mut Vec<String>) -> DResult<()> {
        lines.push(Self::KIND.header().to_string());
        self.geometry.push_field_lines(lines)?;
        lines.extend(self.levels.lines());
        Ok(())
    }
}

/// The optional nested output grid. It has no levels of its own.
///
/// The section is absent from files that do not use nested output; `geometry`
/// is `None` then and nothing is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedOutputGrid {
    pub geometry: Option<GridGeometry>,
}

impl NestedOutputGrid {
    pub fn is_present(&self) -> bool {
        self.geometry.is_some()
    }

    /// Decide whether the section starts at the cursor: either its header
    /// names the nested grid, or the line just past it is the next section's
    /// header.
    ///
    /// A receptor section with exactly two receptors has the same shape, so a
    /// cursor sitting on the receptor header never counts as a nested grid.
    pub fn is_in_file<B: BufRead>(cursor: &mut LineCursor<B>) -> DResult<bool> {
        let (at_receptors, named) = match cursor.peek_line()? {
            Some(line) => (line.trim_end() == SectionKind::Receptors.header().trim_end(), line.contains(NESTED_HEADER_NAME)),
            None => (false, false),
        };
        let present = !at_receptors && (named || cursor.peek_nth(NESTED_SECTION_LINES)?
            .map(is_delimiter)
            .unwrap_or(false));
        log::debug!("nested output grid {} at line {}", if present { "found" } else { "not found" }, cursor.line_number());
        Ok(present)
    }
}

impl Section for NestedOutputGrid {
    const KIND: SectionKind = SectionKind::NestedOutputGrid;

    fn read_body<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        if !Self::is_in_file(cursor)? {
            self.geometry = None;
            return Ok(());
        }

        read_header(cursor, Self::KIND)?;
        let mut geometry = GridGeometry::default();
        geometry.read_fields(cursor)?;
        self.geometry = Some(geometry);
        Ok(())
    }

    fn push_lines(&self, lines: &mut Vec<String>) -> DResult<()> {
        if let Some(geometry) = &self.geometry {
            lines.push(Self::KIND.header().to_string());
            geometry.push_field_lines(lines)?;
        }
        Ok(())
    }
}
