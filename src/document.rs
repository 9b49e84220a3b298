//! The whole run descriptor: eight sections read from and written to one file.
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use error_stack::ResultExt;

use crate::cursor::LineCursor;
use crate::error::{DResult, DescriptorError};
use crate::sections::{
    AgeClasses, Command, NestedOutputGrid, OutputGrid, Pathnames, Receptors, Releases, Section, Species,
};

/// A `flexwrf.input` file.
///
/// A new document has every field unset and every list empty. Reading fills
/// the sections in file order; if a section fails, the sections before it
/// keep what they read.
///
/// ```no_run
/// # use flexwrf_input::FlexwrfInput;
/// let mut input = FlexwrfInput::from_path("flexwrf.input")?;
/// input.command.start.set_datetime("20100801 000000")?;
/// input.releases.add_copy(0)?;
/// input.write("flexwrf.input.new")?;
/// # Ok::<(), error_stack::Report<flexwrf_input::error::DescriptorError>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlexwrfInput {
    pub pathnames: Pathnames,
    pub command: Command,
    pub age_classes: AgeClasses,
    pub output_grid: OutputGrid,
    pub nested_output_grid: NestedOutputGrid,
    pub receptors: Receptors,
    pub species: Species,
    pub releases: Releases,
}

impl FlexwrfInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a document from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> DResult<Self> {
        let mut input = Self::new();
        input.read(path)?;
        Ok(input)
    }

    /// Read a document from any buffered reader.
    pub fn from_reader<B: BufRead>(reader: B) -> DResult<Self> {
        let mut input = Self::new();
        input.read_from(reader)?;
        Ok(input)
    }

    /// Fill this document from a file.
    pub fn read<P: AsRef<Path>>(&mut self, path: P) -> DResult<()> {
        let path = path.as_ref();
        let file = File::open(path)
            .change_context(DescriptorError::Io)
            .attach_printable_lazy(|| format!("opening {}", path.display()))?;
        let n = self.read_from(BufReader::new(file))
            .attach_printable_lazy(|| format!("reading {}", path.display()))?;
        log::info!("read {n} lines from {}", path.display());
        Ok(())
    }

    /// Fill this document from a reader, returning the number of lines read.
    pub fn read_from<B: BufRead>(&mut self, reader: B) -> DResult<usize> {
        let mut cursor = LineCursor::new(reader);
        self.pathnames.read(&mut cursor)?;
        self.command.read(&mut cursor)?;
        self.age_classes.read(&mut cursor)?;
        self.output_grid.read(&mut cursor)?;
        self.nested_output_grid.read(&mut cursor)?;
        self.receptors.read(&mut cursor)?;
        self.species.read(&mut cursor)?;
        self.releases.read(&mut cursor)?;
        Ok(cursor.line_number() - 1)
    }

    /// Every line of the document, each with its line terminator
    pub fn lines(&self) -> DResult<Vec<String>> {
        let mut lines = vec![];
        lines.extend(self.pathnames.lines()?);
        lines.extend(self.command.lines()?);
        lines.extend(self.age_classes.lines()?);
        lines.extend(self.output_grid.lines()?);
        lines.extend(self.nested_output_grid.lines()?);
        lines.extend(self.receptors.lines()?);
        lines.extend(self.species.lines()?);
        lines.extend(self.releases.lines()?);
        Ok(lines)
    }

    /// The document as one string
    pub fn render(&self) -> DResult<String> {
        Ok(self.lines()?.concat())
    }

    /// Write the document to a file, replacing it if it exists.
    ///
    /// The document is rendered before the file is created, so a document
    /// that cannot be rendered leaves no file behind.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> DResult<()> {
        let path = path.as_ref();
        let lines = self.lines()?;
        let file = File::create(path)
            .change_context(DescriptorError::Io)
            .attach_printable_lazy(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_lines(&mut writer, &lines)
            .attach_printable_lazy(|| format!("writing {}", path.display()))?;
        log::info!("wrote {} lines to {}", lines.len(), path.display());
        Ok(())
    }

    /// Write the document to any writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> DResult<()> {
        let lines = self.lines()?;
        write_lines(writer, &lines)
    }
}

fn write_lines<W: Write>(writer: &mut W, lines: &[String]) -> DResult<()> {
    for line in lines {
        writer.write_all(line.as_bytes())
            .change_context(DescriptorError::Io)?;
    }
    writer.flush()
        .change_context(DescriptorError::Io)
}
