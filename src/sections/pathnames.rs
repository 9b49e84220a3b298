use std::io::BufRead;
use std::path::PathBuf;

use error_stack::{Report, ResultExt};

use crate::cursor::{is_delimiter, LineCursor};
use crate::error::{DResult, DescriptorError, LineNumber};
use crate::field::{read_value, render_template, Field, Record};
use crate::value::FieldValue;

use super::{read_header, Section, SectionKind};

const FOOTER: &str = "=============================================================\n";
const OUTPUT_TEMPLATE: &str = "#/\n";
const INPUT_TEMPLATE: &str = "#/\n";
const AVAILABLE_TEMPLATE: &str = "#\n";

/// A directory of meteorological input files and the AVAILABLE file listing them
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeteoSource {
    pub input: PathBuf,
    pub available: PathBuf,
}

impl MeteoSource {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, available: Q) -> Self {
        Self { input: input.into().normalized(), available: available.into().normalized() }
    }
}

impl Record for MeteoSource {
    type Context = ();

    fn read_record<B: BufRead>(cursor: &mut LineCursor<B>, _ctx: &()) -> DResult<Self> {
        let input: PathBuf = read_value(cursor)?;

        let number = cursor.line_number();
        match cursor.peek_line()? {
            Some(line) if !is_delimiter(line) => {},
            _ => {
                return Err(Report::new(DescriptorError::structural(format!(
                    "input path {} is not followed by an AVAILABLE path", input.display()
                ))).attach_printable(LineNumber(number)));
            }
        }

        let available: PathBuf = read_value(cursor)?;
        Ok(Self { input, available })
    }

    fn push_record_lines(&self, _ctx: &(), lines: &mut Vec<String>) -> DResult<()> {
        lines.push(render_template(INPUT_TEMPLATE, &self.input.token()?));
        lines.push(render_template(AVAILABLE_TEMPLATE, &self.available.token()?));
        Ok(())
    }
}

/// Where output goes and where the meteorological input comes from
#[derive(Debug, Clone, PartialEq)]
pub struct Pathnames {
    pub output: Field<PathBuf>,
    pub sources: Vec<MeteoSource>,
}

impl Default for Pathnames {
    fn default() -> Self {
        Self { output: Field::new(OUTPUT_TEMPLATE), sources: vec![] }
    }
}

impl Section for Pathnames {
    const KIND: SectionKind = SectionKind::Pathnames;

    fn read_body<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        read_header(cursor, Self::KIND)?;
        self.output.read(cursor).attach_printable("output path")?;

        let mut sources = vec![];
        loop {
            let number = cursor.line_number();
            match cursor.peek_line()? {
                None => {
                    return Err(Report::new(DescriptorError::structural("input ended before the PATHNAMES footer"))
                        .attach_printable(LineNumber(number)));
                },
                Some(line) if is_delimiter(line) => break,
                Some(_) => sources.push(MeteoSource::read_record(cursor, &())?),
            }
        }
        self.sources = sources;

        cursor.expect_delimiter("PATHNAMES footer")
    }

    fn push_lines(&self, lines: &mut Vec<String>) -> DResult<()> {
        lines.push(Self::KIND.header().to_string());
        lines.push(self.output.line().attach_printable("output path")?);
        for source in self.sources.iter() {
            source.push_record_lines(&(), lines)?;
        }
        lines.push(FOOTER.to_string());
        Ok(())
    }
}
