//! Represent fixed-column table layouts as Rust types.
//!
//! Tables in the descriptor (the species table and the emission factor tables)
//! are declared with a Fortran-style format string such as `"(4x,a10,f10.1)"`.
//! Parsing one gives a [`TableLayout`] that knows the character range and
//! formatter of every column:
//!
//! ```
//! # use flexwrf_input::format_specs::{TableLayout, ColumnSpec};
//! let layout = TableLayout::parse("(4x,a10,f10.1)").unwrap();
//! let name = layout.column(0).unwrap();
//! assert_eq!((name.start, name.end), (4, 14));
//! assert_eq!(name.spec, ColumnSpec::Char { width: 10 });
//! ```
use std::fmt::Display;

use pest::{Parser, iterators::Pair, RuleType};

use crate::value::ValueKind;

pub type PResult<T> = std::result::Result<T, PError>;

/// Represents an error in parsing a layout string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PError(String);

impl PError {
    fn new<S: Into<String>>(msg: S) -> Self {
        Self(msg.into())
    }
}

impl <R: RuleType> From<pest::error::Error<R>> for PError {
    fn from(value: pest::error::Error<R>) -> Self {
        Self(value.to_string())
    }
}

impl Display for PError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Format parsing error: {}", self.0)
    }
}

impl std::error::Error for PError {}

#[derive(Parser)]
#[grammar = "fort.pest"]
pub(crate) struct LayoutParser;

/// One entry in a layout string, i.e. one `a`, `i`, `f`, `e` or `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSpec {
    /// A character column, written left aligned. "a" without a width is 1 character wide.
    Char{width: u32},

    /// An integer column, written right aligned.
    Integer{width: u32},

    /// A real column written with a fixed number of decimals, e.g. "f7.3".
    Fixed{width: u32, precision: u32},

    /// A real column written in scientific notation, e.g. "e11.1" gives `    1.0E-04`.
    Exp{width: u32, precision: u32},

    /// A single blank space.
    Skip
}

impl ColumnSpec {
    /// Number of characters this entry occupies in a row
    pub fn width(&self) -> u32 {
        match self {
            ColumnSpec::Char { width } => *width,
            ColumnSpec::Integer { width } => *width,
            ColumnSpec::Fixed { width, precision: _ } => *width,
            ColumnSpec::Exp { width, precision: _ } => *width,
            ColumnSpec::Skip => 1,
        }
    }

    /// `true` for `x` entries
    pub fn is_skip(&self) -> bool {
        matches!(self, ColumnSpec::Skip)
    }

    /// The kind of value a column holds, `None` for skips.
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            ColumnSpec::Char { width: _ } => Some(ValueKind::Str),
            ColumnSpec::Integer { width: _ } => Some(ValueKind::Int),
            ColumnSpec::Fixed { width: _, precision: _ } => Some(ValueKind::Float),
            ColumnSpec::Exp { width: _, precision: _ } => Some(ValueKind::Float),
            ColumnSpec::Skip => None,
        }
    }
}

impl Display for ColumnSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnSpec::Char { width } => write!(f, "a{width}"),
            ColumnSpec::Integer { width } => write!(f, "i{width}"),
            ColumnSpec::Fixed { width, precision } => write!(f, "f{width}.{precision}"),
            ColumnSpec::Exp { width, precision } => write!(f, "e{width}.{precision}"),
            ColumnSpec::Skip => write!(f, "x"),
        }
    }
}

/// A value-carrying column of a table: the half-open character range
/// `start..end` of every row plus the formatter for that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub start: usize,
    pub end: usize,
    pub spec: ColumnSpec,
}

impl Column {
    pub fn width(&self) -> usize {
        self.end - self.start
    }
}

/// A parsed layout string.
///
/// The layout string must include the opening and closing parentheses. Entries
/// may be separated by commas or whitespace and preceded by a repeat count
/// (`"3x"`, `"2f8.2"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    specs: Vec<ColumnSpec>,
    columns: Vec<Column>,
}

impl TableLayout {
    /// Parse a layout string and compute the character range of each column.
    ///
    /// Returns an error if the string has invalid syntax or contains a
    /// zero-width entry.
    pub fn parse(fmt_str: &str) -> PResult<Self> {
        let tree = LayoutParser::parse(Rule::format, fmt_str)?
            .next()
            .ok_or_else(|| PError::new(format!("'{fmt_str}' produced no parse tree")))?;

        let mut specs = vec![];
        for element in tree.into_inner() {
            match element.as_rule() {
                Rule::EOI => break,
                Rule::element => {
                    let mut repeat: usize = 1;
                    for pair in element.into_inner() {
                        let spec = match pair.as_rule() {
                            Rule::repeat => {
                                repeat = parse_digits(pair.as_str())? as usize;
                                continue;
                            },
                            Rule::skip => ColumnSpec::Skip,
                            Rule::char => ColumnSpec::Char { width: consume_width_from_pair(pair)?.unwrap_or(1) },
                            Rule::integer => {
                                let width = consume_width_from_pair(pair)?
                                    .ok_or_else(|| PError::new("integer entry requires a width"))?;
                                ColumnSpec::Integer { width }
                            },
                            Rule::real => {
                                let (width, precision) = consume_width_and_prec_from_pair(pair, "f")?;
                                ColumnSpec::Fixed { width, precision }
                            },
                            Rule::exponential => {
                                let (width, precision) = consume_width_and_prec_from_pair(pair, "e")?;
                                ColumnSpec::Exp { width, precision }
                            },
                            r => return Err(PError::new(format!("unexpected rule {r:?} inside an element"))),
                        };

                        if spec.width() == 0 {
                            return Err(PError::new(format!("entry '{spec}' has zero width")));
                        }

                        for _ in 0..repeat {
                            specs.push(spec);
                        }
                    }
                },
                r => return Err(PError::new(format!("unexpected rule {r:?} at the top level"))),
            }
        }

        let mut columns = vec![];
        let mut offset = 0;
        for spec in specs.iter() {
            let width = spec.width() as usize;
            if !spec.is_skip() {
                columns.push(Column { start: offset, end: offset + width, spec: *spec });
            }
            offset += width;
        }

        Ok(Self { specs, columns })
    }

    /// All entries, including skips
    pub fn specs(&self) -> &[ColumnSpec] {
        &self.specs
    }

    /// The value-carrying columns in order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Return the `index`-th value-carrying column (skips are not counted).
    pub fn column(&self, index: usize) -> Option<Column> {
        self.columns.get(index).copied()
    }

    /// Total number of characters in a row
    pub fn row_width(&self) -> usize {
        self.specs.iter().map(|s| s.width() as usize).sum()
    }

    /// Join already rendered cells into one row, inserting a blank for each skip.
    ///
    /// Returns an error if the number of cells differs from the number of columns.
    pub fn render_row<S: AsRef<str>>(&self, cells: &[S]) -> PResult<String> {
        if cells.len() != self.columns.len() {
            return Err(PError::new(format!(
                "layout has {} columns but {} cells were given", self.columns.len(), cells.len()
            )));
        }

        let mut row = String::with_capacity(self.row_width());
        let mut cells = cells.iter();
        for spec in self.specs.iter() {
            if spec.is_skip() {
                row.push(' ');
            } else if let Some(cell) = cells.next() {
                row.push_str(cell.as_ref());
            }
        }
        Ok(row)
    }
}

fn parse_digits(s: &str) -> PResult<u32> {
    s.parse().map_err(|_| PError::new(format!("'{s}' is not a valid width")))
}

fn consume_width_from_pair(pair: Pair<Rule>) -> PResult<Option<u32>> {
    let mut stack: Vec<_> = pair.into_inner().rev().collect();
    consume_width(&mut stack)
}

fn consume_width(stack: &mut Vec<Pair<Rule>>) -> PResult<Option<u32>> {
    match stack.last() {
        Some(p) if p.as_rule() == Rule::width => {
            let w = parse_digits(p.as_str())?;
            stack.pop();
            Ok(Some(w))
        },
        _ => Ok(None)
    }
}

fn consume_prec(stack: &mut Vec<Pair<Rule>>) -> PResult<Option<u32>> {
    match stack.last() {
        Some(p) if p.as_rule() == Rule::prec => {
            let v = parse_digits(p.as_str())?;
            stack.pop();
            Ok(Some(v))
        },
        _ => Ok(None)
    }
}

fn consume_width_and_prec_from_pair(pair: Pair<Rule>, kind: &str) -> PResult<(u32, u32)> {
    let mut stack: Vec<_> = pair.into_inner().rev().collect();
    let width = consume_width(&mut stack)?
        .ok_or_else(|| PError::new(format!("{kind} entry requires a width")))?;
    let prec = consume_prec(&mut stack)?
        .ok_or_else(|| PError::new(format!("{kind} entry requires a precision")))?;
    Ok((width, prec))
}
