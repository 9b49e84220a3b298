//! The eight sections of a descriptor, in file order.
//!
//! Each section reads exactly its own lines from a shared
//! [`LineCursor`](crate::cursor::LineCursor) and renders them back with
//! [`Section::lines`]. Headers, footers and the species legend are constants
//! and are written back as-is.
use std::fmt::Display;
use std::io::BufRead;

use error_stack::ResultExt;

use crate::cursor::LineCursor;
use crate::error::DResult;

/// Declare a section (or part of one) made of single-line scalar fields.
///
/// Each entry gives the field name, its value type and its template line.
/// The generated struct has one public [`Field`](crate::field::Field) per
/// entry, plus helpers to read and render them in order and to get or set
/// them by name.
macro_rules! scalar_fields {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $ty:ty => $template:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $crate::field::Field<$ty>,
            )+
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $field: $crate::field::Field::new($template), )+
                }
            }
        }

        impl $name {
            /// Names of the fields, in file order
            pub const FIELD_NAMES: &'static [&'static str] = &[ $( stringify!($field), )+ ];

            pub(crate) fn read_fields<B: std::io::BufRead>(
                &mut self,
                cursor: &mut $crate::cursor::LineCursor<B>
            ) -> $crate::error::DResult<()> {
                use error_stack::ResultExt;
                $(
                    self.$field.read(cursor)
                        .attach_printable(concat!("field '", stringify!($field), "'"))?;
                )+
                Ok(())
            }

            pub(crate) fn push_field_lines(&self, lines: &mut Vec<String>) -> $crate::error::DResult<()> {
                use error_stack::ResultExt;
                $(
                    lines.push(
                        self.$field.line()
                            .attach_printable(concat!("field '", stringify!($field), "'"))?
                    );
                )+
                Ok(())
            }

            /// The template line of the named field
            pub fn template(&self, name: &str) -> Option<&'static str> {
                match name {
                    $( stringify!($field) => Some(self.$field.template()), )+
                    _ => None,
                }
            }

            /// The value of the named field, `None` if it is unset or there is no such field.
            pub fn get(&self, name: &str) -> Option<$crate::value::Value> {
                use $crate::value::FieldValue;
                match name {
                    $( stringify!($field) => self.$field.value().map(FieldValue::to_value), )+
                    _ => None,
                }
            }

            /// Set the named field. The value must be of the field's kind,
            /// except that integers are accepted for real fields.
            pub fn set(&mut self, name: &str, value: $crate::value::Value) -> $crate::error::DResult<()> {
                use error_stack::ResultExt;
                match name {
                    $(
                        stringify!($field) => self.$field.set_value(value)
                            .attach_printable(concat!("field '", stringify!($field), "'")),
                    )+
                    _ => Err(error_stack::Report::new(
                        $crate::error::DescriptorError::UnknownField(name.to_string())
                    )),
                }
            }
        }
    };
}

mod age_classes;
mod command;
mod output_grid;
mod pathnames;
mod receptors;
mod releases;
mod species;

pub use age_classes::AgeClasses;
pub use command::Command;
pub use output_grid::{GridGeometry, NestedOutputGrid, OutputGrid};
pub use pathnames::{MeteoSource, Pathnames};
pub use receptors::{Receptor, Receptors};
pub use releases::{CyclePeriod, EmissionCycle, FactorRow, FactorTable, ReleasePoint, Releases, SpeciesRelease};
pub use species::{Species, SpeciesProperties};

/// Identifies a section, e.g. in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Pathnames,
    Command,
    AgeClasses,
    OutputGrid,
    NestedOutputGrid,
    Receptors,
    Species,
    Releases,
}

impl SectionKind {
    /// All sections in file order
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Pathnames,
        SectionKind::Command,
        SectionKind::AgeClasses,
        SectionKind::OutputGrid,
        SectionKind::NestedOutputGrid,
        SectionKind::Receptors,
        SectionKind::Species,
        SectionKind::Releases,
    ];

    /// The header line written at the top of the section
    pub fn header(&self) -> &'static str {
        match self {
            SectionKind::Pathnames => "=====================FORMER PATHNAMES FILE===================\n",
            SectionKind::Command => "=====================FORMER COMMAND FILE=====================\n",
            SectionKind::AgeClasses => "=====================FORMER AGECLASESS FILE==================\n",
            SectionKind::OutputGrid => "=====================FORMER OUTGRID FILE=====================\n",
            SectionKind::NestedOutputGrid => "================OUTGRID_NEST==========================\n",
            SectionKind::Receptors => "=====================FORMER RECEPTOR FILE====================\n",
            SectionKind::Species => "=====================FORMER SPECIES FILE=====================\n",
            SectionKind::Releases => "=====================FORMER RELEEASES FILE===================\n",
        }
    }
}

impl Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SectionKind::Pathnames => "PATHNAMES",
            SectionKind::Command => "COMMAND",
            SectionKind::AgeClasses => "AGECLASSES",
            SectionKind::OutputGrid => "OUTGRID",
            SectionKind::NestedOutputGrid => "OUTGRID_NEST",
            SectionKind::Receptors => "RECEPTORS",
            SectionKind::Species => "SPECIES",
            SectionKind::Releases => "RELEASES",
        };
        write!(f, "{s}")
    }
}

/// One section of the descriptor
pub trait Section {
    const KIND: SectionKind;

    /// Read the section's lines, starting at its header.
    fn read_body<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()>;

    /// Append the section's lines, header included.
    fn push_lines(&self, lines: &mut Vec<String>) -> DResult<()>;

    /// Check where the cursor stopped after [`Section::read_body`]. By default
    /// the next line must be the following section's header.
    fn expect_end<B: BufRead>(cursor: &mut LineCursor<B>) -> DResult<()> {
        cursor.expect_section_end()
    }

    /// Read the section and check that it used exactly its own lines.
    ///
    /// Errors carry the [`SectionKind`] as an attachment.
    fn read<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        let first = cursor.line_number();
        log::debug!("reading {} section from line {first}", Self::KIND);
        self.read_body(cursor)
            .and_then(|_| Self::expect_end(cursor))
            .attach_printable(Self::KIND)?;
        log::debug!("{} section used {} lines", Self::KIND, cursor.line_number() - first);
        Ok(())
    }

    fn lines(&self) -> DResult<Vec<String>> {
        let mut lines = vec![];
        self.push_lines(&mut lines).attach_printable(Self::KIND)?;
        Ok(lines)
    }
}

/// Consume a section header.
pub(crate) fn read_header<B: BufRead>(cursor: &mut LineCursor<B>, kind: SectionKind) -> DResult<()> {
    cursor.expect_delimiter(&format!("{kind} header"))
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::io::BufReader;

    use stringreader::StringReader;

    use crate::cursor::LineCursor;

    pub(crate) fn cursor(s: &str) -> LineCursor<BufReader<StringReader<'_>>> {
        LineCursor::new(BufReader::new(StringReader::new(s)))
    }

    /// The header line of the section after the one under test
    pub(crate) const NEXT_HEADER: &str = "=====================NEXT SECTION=====================\n";
}
