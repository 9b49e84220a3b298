use std::io::BufRead;

use error_stack::ResultExt;

use crate::cursor::LineCursor;
use crate::error::DResult;
use crate::field::Repeated;

use super::{read_header, Section, SectionKind};

const COUNT_TEMPLATE: &str = "    #                NAGECLASS        number of age classes\n";
const CLASS_TEMPLATE: &str = "    #             SSSSSS  (int)    age class in SSSSS seconds\n";

/// Upper limits of the age classes, in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct AgeClasses {
    pub classes: Repeated<i64>,
}

impl Default for AgeClasses {
    fn default() -> Self {
        Self { classes: Repeated::new(COUNT_TEMPLATE, CLASS_TEMPLATE) }
    }
}

impl Section for AgeClasses {
    const KIND: SectionKind = SectionKind::AgeClasses;

    fn read_body<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        read_header(cursor, Self::KIND)?;
        self.classes.read(cursor).attach_printable("age classes")
    }

    fn push_lines(&self, lines: &mut Vec<String>) -> DResult<()> {
        lines.push(Self::KIND.header().to_string());
        lines.extend(self.classes.lines());
        Ok(())
    }
}
