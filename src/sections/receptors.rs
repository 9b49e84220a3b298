use std::io::BufRead;

use error_stack::ResultExt;

use crate::cursor::LineCursor;
use crate::error::DResult;
use crate::field::{read_value, render_template, Block, Record};
use crate::value::FieldValue;

use super::{read_header, Section, SectionKind};

const COUNT_TEMPLATE: &str = "    #                NUMRECEPTOR     number of receptors\n";
const NAME_TEMPLATE: &str = "    #             RECEPTOR\n";
const X_TEMPLATE: &str = "    #             X\n";
const Y_TEMPLATE: &str = "    #             y\n";

/// A named receptor point
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Receptor {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl Record for Receptor {
    type Context = ();

    fn read_record<B: BufRead>(cursor: &mut LineCursor<B>, _ctx: &()) -> DResult<Self> {
        let name: String = read_value(cursor).attach_printable("receptor name")?;
        let x: f64 = read_value(cursor).attach_printable("receptor x")?;
        let y: f64 = read_value(cursor).attach_printable("receptor y")?;
        Ok(Self { name, x, y })
    }

    fn push_record_lines(&self, _ctx: &(), lines: &mut Vec<String>) -> DResult<()> {
        lines.push(render_template(NAME_TEMPLATE, &self.name.token()?));
        lines.push(render_template(X_TEMPLATE, &self.x.encode()));
        lines.push(render_template(Y_TEMPLATE, &self.y.encode()));
        Ok(())
    }
}

/// Receptor points for concentration output
#[derive(Debug, Clone, PartialEq)]
pub struct Receptors {
    pub receptors: Block<Receptor>,
}

impl Default for Receptors {
    fn default() -> Self {
        Self { receptors: Block::new(COUNT_TEMPLATE) }
    }
}

impl Section for Receptors {
    const KIND: SectionKind = SectionKind::Receptors;

    fn read_body<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        read_header(cursor, Self::KIND)?;
        self.receptors.read_count(cursor)?;
        self.receptors.read_records(cursor, &())
    }

    fn push_lines(&self, lines: &mut Vec<String>) -> DResult<()> {
        lines.push(Self::KIND.header().to_string());
        lines.push(self.receptors.specifier_line());
        self.receptors.push_record_lines(&(), lines)
    }
}
