//! A line cursor shared by every section reader.
//!
//! The descriptor is read strictly in order, but a few places need to look
//! ahead (is the nested output grid present?) or read the same rows more than
//! once (each column of a fixed-column table). [`LineCursor`] buffers lines as
//! they are pulled from the underlying reader so it can hand out a [`Mark`]
//! and later rewind to it.
use std::io::BufRead;

use error_stack::{Report, ResultExt};

use crate::error::{DResult, DescriptorError, LineNumber};

/// Substring that identifies section headers, footers and other delimiter lines
pub const DELIMITER_MARKER: &str = "==";

/// `true` if the line is a section delimiter
pub fn is_delimiter(line: &str) -> bool {
    line.contains(DELIMITER_MARKER)
}

/// A position in the input that a cursor can be rewound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

pub struct LineCursor<R> {
    reader: R,
    lines: Vec<String>,
    pos: usize,
    exhausted: bool,
}

impl<R: BufRead> LineCursor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, lines: vec![], pos: 0, exhausted: false }
    }

    /// Buffer lines until `lines[index]` exists. Returns `false` if the input ends first.
    fn fill_to(&mut self, index: usize) -> DResult<bool> {
        while self.lines.len() <= index {
            if self.exhausted {
                return Ok(false);
            }

            let mut buf = String::new();
            let n = self.reader.read_line(&mut buf)
                .change_context(DescriptorError::Io)
                .attach_printable_lazy(|| LineNumber(self.lines.len() + 1))?;
            if n == 0 {
                self.exhausted = true;
            } else {
                self.lines.push(buf);
            }
        }
        Ok(true)
    }

    /// 1-based number of the line the next call to [`LineCursor::next_line`] returns
    pub fn line_number(&self) -> usize {
        self.pos + 1
    }

    /// Consume and return the next line, including its terminator.
    ///
    /// Running out of input is a structural error.
    pub fn next_line(&mut self) -> DResult<&str> {
        if !self.fill_to(self.pos)? {
            return Err(Report::new(DescriptorError::structural("unexpected end of input"))
                .attach_printable(LineNumber(self.line_number())));
        }
        self.pos += 1;
        Ok(&self.lines[self.pos - 1])
    }

    /// Look at the next line without consuming it. `None` at end of input.
    pub fn peek_line(&mut self) -> DResult<Option<&str>> {
        self.peek_nth(0)
    }

    /// Look `n` lines past the next one without consuming anything; `peek_nth(0)` is the next line.
    pub fn peek_nth(&mut self, n: usize) -> DResult<Option<&str>> {
        let index = self.pos + n;
        if self.fill_to(index)? {
            Ok(Some(&self.lines[index]))
        } else {
            Ok(None)
        }
    }

    /// Consume `n` lines, failing if the input ends first.
    pub fn skip_lines(&mut self, n: usize) -> DResult<()> {
        for _ in 0..n {
            self.next_line()?;
        }
        Ok(())
    }

    /// `true` if every line has been consumed
    pub fn at_end(&mut self) -> DResult<bool> {
        Ok(self.peek_line()?.is_none())
    }

    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    /// Return to a previously taken mark, so the lines after it are read again.
    pub fn rewind(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    /// Consume a header or footer line, which must contain the delimiter marker.
    pub fn expect_delimiter(&mut self, what: &str) -> DResult<()> {
        let number = self.line_number();
        let line = self.next_line()?;
        if is_delimiter(line) {
            Ok(())
        } else {
            Err(Report::new(DescriptorError::structural(format!(
                "expected the {what} line, found {:?}", line.trim_end()
            ))).attach_printable(LineNumber(number)))
        }
    }

    /// Check that a section consumed all of its lines: the next line must be
    /// the following section's header, or the input must have ended.
    pub fn expect_section_end(&mut self) -> DResult<()> {
        let number = self.line_number();
        match self.peek_line()? {
            None => Ok(()),
            Some(line) if is_delimiter(line) => Ok(()),
            Some(line) => Err(Report::new(DescriptorError::structural(format!(
                "unexpected line {:?} before the next section header", line.trim_end()
            ))).attach_printable(LineNumber(number))),
        }
    }

    /// Check that every line has been consumed.
    pub fn expect_end_of_input(&mut self) -> DResult<()> {
        let number = self.line_number();
        match self.peek_line()? {
            None => Ok(()),
            Some(line) => Err(Report::new(DescriptorError::structural(format!(
                "unexpected line {:?} after the last section", line.trim_end()
            ))).attach_printable(LineNumber(number))),
        }
    }
}
