//! Typed building blocks that sections are assembled from.
//!
//! Every value line in the descriptor is produced from a template ("dummy
//! line") containing a `#` marker: the first `#` is replaced by the value's
//! text and the rest of the template is kept as written. The types here bind
//! templates to values:
//!
//! - [`Field`]: one scalar on one line.
//! - [`Specifier`]: a count line that says how many lines or records follow.
//! - [`Repeated`]: a specifier and one scalar line per value.
//! - [`Block`]: a specifier and one multi-line [`Record`] per entry.
//! - [`ColumnField`]: one column of a fixed-column table.
//!
//! Containers with a specifier keep the count equal to their length after
//! every mutation, so the count can never disagree with what is written.
use std::io::BufRead;

use error_stack::{Report, ResultExt};

use crate::cursor::{is_delimiter, LineCursor};
use crate::datetime::{DateTime, IntoDateTime};
use crate::error::{DResult, DescriptorError, LineNumber};
use crate::format_specs::Column;
use crate::ser::render_column;
use crate::value::{FieldValue, Value};

/// The substitution marker in templates
pub const MARKER: char = '#';

/// Replace the first marker in `template` with `token`.
pub fn render_template(template: &str, token: &str) -> String {
    template.replacen(MARKER, token, 1)
}

/// Consume one line and decode the value at its start.
///
/// Running into a delimiter line means the count that led here disagrees
/// with the file, which is a structural error rather than a parse error.
pub(crate) fn read_value<T: FieldValue, B: BufRead>(cursor: &mut LineCursor<B>) -> DResult<T> {
    let number = cursor.line_number();
    let line = cursor.next_line()?;
    if is_delimiter(line) {
        return Err(Report::new(DescriptorError::structural(format!(
            "expected a {} value, found the delimiter {:?}", T::KIND, line.trim_end()
        ))).attach_printable(LineNumber(number)));
    }
    T::decode_line(line).attach_printable(LineNumber(number))
}

fn out_of_range(index: usize, len: usize) -> Report<DescriptorError> {
    Report::new(DescriptorError::structural(format!(
        "index {index} is out of range for a list of length {len}"
    )))
}

/// One scalar bound to its template line
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    template: &'static str,
    value: Option<T>,
}

impl<T: FieldValue> Field<T> {
    pub const fn new(template: &'static str) -> Self {
        Self { template, value: None }
    }

    pub fn template(&self) -> &'static str {
        self.template
    }

    /// The current value, `None` until the field is read or set
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn set<V: Into<T>>(&mut self, value: V) {
        self.value = Some(value.into().normalized());
    }

    /// Set from a [`Value`], checking that its kind matches the field.
    pub fn set_value(&mut self, value: Value) -> DResult<()> {
        self.value = Some(T::try_from_value(value)?);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Consume one line and store its value.
    pub fn read<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        self.value = Some(read_value(cursor)?);
        Ok(())
    }

    /// Render the template with the current value. An unset field cannot be rendered.
    pub fn line(&self) -> DResult<String> {
        let value = self.value.as_ref()
            .ok_or_else(|| Report::new(DescriptorError::serialization("field has no value")))
            .attach_printable_lazy(|| format!("template: {:?}", self.template))?;
        let token = value.token()
            .attach_printable_lazy(|| format!("template: {:?}", self.template))?;
        Ok(render_template(self.template, &token))
    }
}

impl Field<DateTime> {
    /// Set from a `"YYYYMMDD HHMMSS"` string, a `time` date-time or a unix timestamp.
    pub fn set_datetime<V: IntoDateTime>(&mut self, value: V) -> DResult<()> {
        self.value = Some(value.into_datetime()?);
        Ok(())
    }
}

/// A count line. Its value comes from the file and is afterwards kept equal
/// to the length of whatever it counts; it cannot be set directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Specifier {
    template: &'static str,
    value: Option<usize>,
}

impl Specifier {
    pub const fn new(template: &'static str) -> Self {
        Self { template, value: None }
    }

    /// The count, `None` if it was never read
    pub fn value(&self) -> Option<usize> {
        self.value
    }

    /// The count, treating a never-read specifier as zero
    pub fn count(&self) -> usize {
        self.value.unwrap_or(0)
    }

    /// Consume one line holding a non-negative count.
    pub fn read<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<usize> {
        let number = cursor.line_number();
        let raw: i64 = read_value(cursor)?;
        let count = usize::try_from(raw)
            .map_err(|_| Report::new(DescriptorError::structural(format!("count {raw} is negative"))))
            .attach_printable(LineNumber(number))?;
        self.value = Some(count);
        Ok(count)
    }

    pub(crate) fn sync(&mut self, len: usize) {
        self.value = Some(len);
    }

    pub fn line(&self) -> String {
        render_template(self.template, &self.count().to_string())
    }
}

/// A specifier followed by one scalar line per value
#[derive(Debug, Clone, PartialEq)]
pub struct Repeated<T> {
    specifier: Specifier,
    template: &'static str,
    values: Vec<T>,
}

impl<T: FieldValue> Repeated<T> {
    pub const fn new(specifier_template: &'static str, template: &'static str) -> Self {
        Self { specifier: Specifier::new(specifier_template), template, values: vec![] }
    }

    pub fn specifier(&self) -> &Specifier {
        &self.specifier
    }

    pub fn count(&self) -> usize {
        self.specifier.count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Replace one value in place.
    pub fn set<V: Into<T>>(&mut self, index: usize, value: V) -> DResult<()> {
        let len = self.values.len();
        let slot = self.values.get_mut(index).ok_or_else(|| out_of_range(index, len))?;
        *slot = value.into().normalized();
        Ok(())
    }

    pub fn push<V: Into<T>>(&mut self, value: V) {
        self.values.push(value.into().normalized());
        self.resync();
    }

    pub fn remove(&mut self, index: usize) -> DResult<T> {
        if index >= self.values.len() {
            return Err(out_of_range(index, self.values.len()));
        }
        let value = self.values.remove(index);
        self.resync();
        Ok(value)
    }

    pub fn set_values<I: IntoIterator<Item = T>>(&mut self, values: I) {
        self.values = values.into_iter().map(T::normalized).collect();
        self.resync();
    }

    /// Read the count line.
    pub fn read_count<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<usize> {
        self.specifier.read(cursor)
    }

    /// Read exactly as many value lines as the count says, replacing the current values.
    pub fn read_values<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        let n = self.specifier.count();
        let mut values = Vec::with_capacity(n);
        for i in 0..n {
            let v = read_value(cursor)
                .attach_printable_lazy(|| format!("value {} of {n}", i + 1))?;
            values.push(v);
        }
        self.values = values;
        self.resync();
        Ok(())
    }

    /// Read the count line followed by the values.
    pub fn read<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        self.read_count(cursor)?;
        self.read_values(cursor)
    }

    pub fn specifier_line(&self) -> String {
        self.specifier.line()
    }

    pub fn value_lines(&self) -> Vec<String> {
        self.values.iter()
            .map(|v| render_template(self.template, &v.encode()))
            .collect()
    }

    /// The count line followed by the value lines
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.values.len() + 1);
        lines.push(self.specifier_line());
        lines.extend(self.value_lines());
        lines
    }

    fn resync(&mut self) {
        self.specifier.sync(self.values.len());
        debug_assert_eq!(self.specifier.count(), self.values.len());
    }
}

/// A multi-line entry of a [`Block`] or of any other list of records.
///
/// `Context` carries what the record needs from elsewhere in the document to
/// know its own shape, e.g. the number of species for a release point.
pub trait Record: Sized {
    type Context: ?Sized;

    fn read_record<B: BufRead>(cursor: &mut LineCursor<B>, ctx: &Self::Context) -> DResult<Self>;

    fn push_record_lines(&self, ctx: &Self::Context, lines: &mut Vec<String>) -> DResult<()>;
}

/// A specifier followed by that many records
#[derive(Debug, Clone, PartialEq)]
pub struct Block<R> {
    specifier: Specifier,
    records: Vec<R>,
}

impl<R: Record> Block<R> {
    pub const fn new(specifier_template: &'static str) -> Self {
        Self { specifier: Specifier::new(specifier_template), records: vec![] }
    }

    pub fn specifier(&self) -> &Specifier {
        &self.specifier
    }

    pub fn count(&self) -> usize {
        self.specifier.count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    /// Mutable access to one record's fields. The number of records cannot change through it.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut R> {
        self.records.get_mut(index)
    }

    pub(crate) fn records_mut(&mut self) -> &mut [R] {
        &mut self.records
    }

    pub fn push(&mut self, record: R) {
        self.records.push(record);
        self.resync();
    }

    pub fn remove(&mut self, index: usize) -> DResult<R> {
        if index >= self.records.len() {
            return Err(out_of_range(index, self.records.len()));
        }
        let record = self.records.remove(index);
        self.resync();
        Ok(record)
    }

    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
        self.resync();
    }

    /// Read the count line.
    pub fn read_count<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<usize> {
        self.specifier.read(cursor)
    }

    /// Read exactly as many records as the count says, replacing the current records.
    pub fn read_records<B: BufRead>(&mut self, cursor: &mut LineCursor<B>, ctx: &R::Context) -> DResult<()> {
        let n = self.specifier.count();
        let mut records = Vec::with_capacity(n);
        for i in 0..n {
            log::trace!("reading record {} of {n} from line {}", i + 1, cursor.line_number());
            let r = R::read_record(cursor, ctx)
                .attach_printable_lazy(|| format!("record {} of {n}", i + 1))?;
            records.push(r);
        }
        self.records = records;
        self.resync();
        Ok(())
    }

    pub fn specifier_line(&self) -> String {
        self.specifier.line()
    }

    pub fn push_record_lines(&self, ctx: &R::Context, lines: &mut Vec<String>) -> DResult<()> {
        for (i, r) in self.records.iter().enumerate() {
            r.push_record_lines(ctx, lines)
                .attach_printable_lazy(|| format!("record {} of {}", i + 1, self.records.len()))?;
        }
        Ok(())
    }

    fn resync(&mut self) {
        self.specifier.sync(self.records.len());
        debug_assert_eq!(self.specifier.count(), self.records.len());
    }
}

impl<R: Record + Clone> Block<R> {
    /// Append a copy of the record at `index`.
    pub fn duplicate(&mut self, index: usize) -> DResult<()> {
        let record = self.records.get(index)
            .cloned()
            .ok_or_else(|| out_of_range(index, self.records.len()))?;
        self.push(record);
        Ok(())
    }
}

/// One column of a fixed-column table: the same character range of every row.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnField<T> {
    column: Column,
    values: Vec<Option<T>>,
}

impl<T: FieldValue> ColumnField<T> {
    pub fn new(column: Column) -> Self {
        debug_assert_eq!(column.spec.value_kind(), Some(T::KIND));
        Self { column, values: vec![] }
    }

    pub fn column(&self) -> Column {
        self.column
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<T>] {
        &self.values
    }

    /// The value in row `index`; `None` for a blank cell or a missing row
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Replace one cell. `None` blanks it.
    pub fn set(&mut self, index: usize, value: Option<T>) -> DResult<()> {
        let len = self.values.len();
        let slot = self.values.get_mut(index).ok_or_else(|| out_of_range(index, len))?;
        *slot = value.map(T::normalized);
        Ok(())
    }

    pub(crate) fn push(&mut self, value: Option<T>) {
        self.values.push(value.map(T::normalized));
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        self.values.remove(index)
    }

    /// Read this column from the next `rows` lines, then rewind so sibling
    /// columns can read the same rows.
    pub fn read<B: BufRead>(&mut self, cursor: &mut LineCursor<B>, rows: usize) -> DResult<()> {
        let mark = cursor.mark();
        let mut values = Vec::with_capacity(rows);
        for _ in 0..rows {
            let number = cursor.line_number();
            let line = cursor.next_line()?;
            if is_delimiter(line) {
                return Err(Report::new(DescriptorError::structural(format!(
                    "expected a table row, found the delimiter {:?}", line.trim_end()
                ))).attach_printable(LineNumber(number)));
            }
            let cell = slice_columns(line, self.column.start, self.column.end);
            let cell = cell.trim();
            let value = if cell.is_empty() {
                None
            } else {
                let v = T::decode(cell)
                    .attach_printable(LineNumber(number))
                    .attach_printable_lazy(|| format!("columns {}..{}", self.column.start, self.column.end))?;
                Some(v)
            };
            values.push(value);
        }
        cursor.rewind(mark);
        self.values = values;
        Ok(())
    }

    /// Render every cell at the column width.
    pub fn as_strings(&self) -> DResult<Vec<String>> {
        self.values.iter()
            .enumerate()
            .map(|(i, v)| {
                render_column(&self.column.spec, v.as_ref().map(FieldValue::to_value).as_ref())
                    .attach_printable_lazy(|| format!("row {}", i + 1))
            })
            .collect()
    }
}

/// Characters `start..end` of a line without its terminator, clamped to the line length
fn slice_columns(line: &str, start: usize, end: usize) -> String {
    line.trim_end_matches(['\n', '\r'])
        .chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
