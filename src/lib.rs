//! Read, edit and write FLEXPART-WRF `flexwrf.input` run descriptors.
//!
//! A descriptor is a line-oriented text file of eight sections. Values sit at
//! the start of a line followed by a comment, counts say how many lines or
//! records follow, and two kinds of tables use fixed columns. Reading a file
//! gives a [`FlexwrfInput`] whose sections expose typed fields; writing it
//! back reproduces every line the crate did not change.
//!
//! ```no_run
//! let mut input = flexwrf_input::read_input("flexwrf.input")?;
//! input.age_classes.classes.push(86400);
//! input.species.name.set(0, Some("CO".to_string()))?;
//! input.write("flexwrf.input")?;
//! # Ok::<(), error_stack::Report<flexwrf_input::error::DescriptorError>>(())
//! ```
//!
//! Errors are [`error_stack::Report`]s of [`error::DescriptorError`]; see the
//! [`error`] module for what is attached to them.
extern crate pest;
#[macro_use]
extern crate pest_derive;

pub mod cursor;
pub mod datetime;
pub mod document;
pub mod error;
pub mod field;
pub mod format_specs;
pub mod sections;
pub mod ser;
pub mod value;

use std::path::Path;

pub use datetime::DateTime;
pub use document::FlexwrfInput;
pub use error::{DResult, DescriptorError, LineNumber};
pub use sections::SectionKind;
pub use value::{Value, ValueKind};

/// Read a descriptor file.
pub fn read_input<P: AsRef<Path>>(path: P) -> DResult<FlexwrfInput> {
    FlexwrfInput::from_path(path)
}
