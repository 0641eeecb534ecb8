//! Field rendering and parsing.
//!
//! [`render`] turns one value into exactly `spec.width` characters.
//! [`FieldWriter`] and [`FieldReader`] walk a whole [`RecordLayout`] in column
//! order and are what the record codec is built on.

use crate::amount::Amount;
use crate::error::{CodecError, Result};
use crate::layout::{Align, FieldKind, FieldSpec, RecordLayout, Transform};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

/// Date format of every date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of the header system timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A value to be rendered into a column.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(u64),
    Amount(Amount),
    Blank,
}

/// What to do with a text value longer than its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextOverflow {
    /// Keep the first `width` characters.
    #[default]
    Truncate,
    /// Fail with [`CodecError::TextOverflow`].
    Reject,
}

/// Renders `value` into a string of exactly `spec.width` characters.
///
/// Numeric overflow is always an error; text overflow follows `overflow`.
/// Text must be printable ASCII, so the rendering is also `spec.width` bytes.
pub fn render(spec: &FieldSpec, value: FieldValue<'_>, overflow: TextOverflow) -> Result<String> {
    let mut out = String::with_capacity(spec.width);
    render_into(&mut out, spec, value, overflow)?;
    Ok(out)
}

/// Appends the rendering of `value` to `out`.
pub fn render_into(
    out: &mut String,
    spec: &FieldSpec,
    value: FieldValue<'_>,
    overflow: TextOverflow,
) -> Result<()> {
    match (spec.kind, value) {
        (FieldKind::Filler, FieldValue::Blank) => {
            push_fill(out, spec.fill, spec.width);
            Ok(())
        }
        (FieldKind::Text, FieldValue::Text(text)) => render_text(out, spec, text, overflow),
        (FieldKind::Numeric, FieldValue::Number(n)) if spec.transform == Transform::Identity => {
            render_digits(out, spec, &n.to_string())
        }
        (FieldKind::Numeric, FieldValue::Amount(a)) if spec.transform == Transform::MinorUnits => {
            render_digits(out, spec, &a.minor_units().to_string())
        }
        (_, other) => Err(CodecError::InvalidField {
            field: spec.name,
            message: format!("{:?} does not fit a {:?} column", other, spec.kind),
        }),
    }
}

fn render_text(out: &mut String, spec: &FieldSpec, text: &str, overflow: TextOverflow) -> Result<()> {
    // Control characters would split the line, and non-ASCII would break
    // byte-exact column offsets.
    if let Some(bad) = text.chars().find(|c| !is_printable_ascii(*c)) {
        return Err(CodecError::InvalidField {
            field: spec.name,
            message: format!("{:?} is not printable ASCII", bad),
        });
    }

    // Printable ASCII only, so byte length is the character count.
    let len = text.len();
    if len > spec.width {
        if overflow == TextOverflow::Reject {
            return Err(CodecError::TextOverflow {
                field: spec.name,
                width: spec.width,
                len,
            });
        }
        debug!(
            "Truncating {} from {} to {} characters",
            spec.name, len, spec.width
        );
        out.push_str(&text[..spec.width]);
        return Ok(());
    }

    pad(out, spec, text, len);
    Ok(())
}

fn is_printable_ascii(c: char) -> bool {
    c == ' ' || c.is_ascii_graphic()
}

fn render_digits(out: &mut String, spec: &FieldSpec, digits: &str) -> Result<()> {
    // Digits are ASCII, so byte length is the character count.
    if digits.len() > spec.width {
        return Err(CodecError::FieldOverflow {
            field: spec.name,
            width: spec.width,
            len: digits.len(),
        });
    }
    pad(out, spec, digits, digits.len());
    Ok(())
}

fn pad(out: &mut String, spec: &FieldSpec, value: &str, len: usize) {
    let padding = spec.width - len;
    match spec.align {
        Align::Left => {
            out.push_str(value);
            push_fill(out, spec.fill, padding);
        }
        Align::Right => {
            push_fill(out, spec.fill, padding);
            out.push_str(value);
        }
    }
}

fn push_fill(out: &mut String, fill: char, count: usize) {
    out.extend(std::iter::repeat(fill).take(count));
}

/// Renders the columns of a layout in order into one terminated line.
///
/// # Examples
///
/// ```
/// use flatfile_records::field::FieldWriter;
/// use flatfile_records::layout::{TRAILER_LAYOUT, LINE_WIDTH};
/// use flatfile_records::{Amount, TextOverflow};
///
/// let mut w = FieldWriter::new(&TRAILER_LAYOUT, TextOverflow::Truncate);
/// w.text("T01").unwrap();
/// w.number(0).unwrap();
/// w.amount(Amount::ZERO).unwrap();
/// w.amount(Amount::ZERO).unwrap();
/// w.amount(Amount::ZERO).unwrap();
/// w.filler().unwrap();
/// let line = w.finish().unwrap();
/// assert_eq!(line.len(), LINE_WIDTH + 1);
/// ```
pub struct FieldWriter {
    layout: &'static RecordLayout,
    overflow: TextOverflow,
    next: usize,
    line: String,
}

impl FieldWriter {
    pub fn new(layout: &'static RecordLayout, overflow: TextOverflow) -> Self {
        FieldWriter {
            layout,
            overflow,
            next: 0,
            line: String::with_capacity(layout.width() + 1),
        }
    }

    fn put(&mut self, value: FieldValue<'_>) -> Result<()> {
        let spec = self.layout.fields.get(self.next).ok_or_else(|| {
            CodecError::InvalidField {
                field: "Filler",
                message: format!("{} layout has no more columns", self.layout.kind.name()),
            }
        })?;
        render_into(&mut self.line, spec, value, self.overflow)?;
        self.next += 1;
        Ok(())
    }

    pub fn text(&mut self, value: &str) -> Result<()> {
        self.put(FieldValue::Text(value))
    }

    pub fn number(&mut self, value: u64) -> Result<()> {
        self.put(FieldValue::Number(value))
    }

    pub fn amount(&mut self, value: Amount) -> Result<()> {
        self.put(FieldValue::Amount(value))
    }

    pub fn date(&mut self, value: NaiveDate) -> Result<()> {
        let formatted = value.format(DATE_FORMAT).to_string();
        self.text(&formatted)
    }

    pub fn timestamp(&mut self, value: NaiveDateTime) -> Result<()> {
        let formatted = value.format(TIMESTAMP_FORMAT).to_string();
        self.text(&formatted)
    }

    pub fn flag(&mut self, value: bool) -> Result<()> {
        self.text(if value { "Y" } else { "N" })
    }

    pub fn filler(&mut self) -> Result<()> {
        self.put(FieldValue::Blank)
    }

    /// Returns the finished line with a trailing `\n`.
    ///
    /// Fails if any column of the layout was left unrendered.
    pub fn finish(mut self) -> Result<String> {
        if let Some(spec) = self.layout.fields.get(self.next) {
            return Err(CodecError::InvalidField {
                field: spec.name,
                message: "column was never written".to_string(),
            });
        }
        self.line.push('\n');
        Ok(self.line)
    }
}

/// Splits a line by a layout and parses its columns in order.
pub struct FieldReader<'a> {
    layout: &'static RecordLayout,
    rest: &'a str,
    next: usize,
}

impl<'a> FieldReader<'a> {
    /// Checks the line width and prepares to read the first column.
    ///
    /// A trailing `\n` or `\r\n` is ignored.
    pub fn new(line: &'a str, layout: &'static RecordLayout) -> Result<Self> {
        let line = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(line);
        let actual = line.chars().count();
        if actual != layout.width() {
            return Err(CodecError::LineLength {
                kind: layout.kind.name(),
                expected: layout.width(),
                actual,
            });
        }
        Ok(FieldReader {
            layout,
            rest: line,
            next: 0,
        })
    }

    fn take(&mut self, kind: FieldKind) -> Result<(&'static FieldSpec, &'a str)> {
        let spec = self.layout.fields.get(self.next).ok_or_else(|| {
            CodecError::InvalidField {
                field: "Filler",
                message: format!("{} layout has no more columns", self.layout.kind.name()),
            }
        })?;
        if spec.kind != kind {
            return Err(CodecError::InvalidField {
                field: spec.name,
                message: format!("read as {:?} but column is {:?}", kind, spec.kind),
            });
        }

        let split = self
            .rest
            .char_indices()
            .nth(spec.width)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (raw, rest) = self.rest.split_at(split);
        self.rest = rest;
        self.next += 1;
        Ok((spec, raw))
    }

    /// Reads a text column with its fill padding removed.
    pub fn text(&mut self) -> Result<&'a str> {
        let (spec, raw) = self.take(FieldKind::Text)?;
        Ok(match spec.align {
            Align::Left => raw.trim_end_matches(spec.fill),
            Align::Right => raw.trim_start_matches(spec.fill),
        })
    }

    /// Reads a zero-filled integer column.
    pub fn number(&mut self) -> Result<u64> {
        let (spec, raw) = self.take(FieldKind::Numeric)?;
        parse_digits(spec, raw)
    }

    /// Reads a minor-units amount column.
    pub fn amount(&mut self) -> Result<Amount> {
        let (spec, raw) = self.take(FieldKind::Numeric)?;
        if spec.transform != Transform::MinorUnits {
            return Err(CodecError::InvalidField {
                field: spec.name,
                message: "column does not hold an amount".to_string(),
            });
        }
        parse_digits(spec, raw).map(Amount::from_minor_units)
    }

    pub fn date(&mut self) -> Result<NaiveDate> {
        let name = self.current_name();
        let raw = self.text()?;
        NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| CodecError::InvalidField {
            field: name,
            message: format!("{:?}: {}", raw, e),
        })
    }

    pub fn timestamp(&mut self) -> Result<NaiveDateTime> {
        let name = self.current_name();
        let raw = self.text()?;
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|e| {
            CodecError::InvalidField {
                field: name,
                message: format!("{:?}: {}", raw, e),
            }
        })
    }

    pub fn flag(&mut self) -> Result<bool> {
        let name = self.current_name();
        match self.text()? {
            "Y" => Ok(true),
            "N" => Ok(false),
            other => Err(CodecError::InvalidField {
                field: name,
                message: format!("expected Y or N, found {:?}", other),
            }),
        }
    }

    /// Skips a filler column.
    pub fn filler(&mut self) -> Result<()> {
        self.take(FieldKind::Filler).map(|_| ())
    }

    fn current_name(&self) -> &'static str {
        self.layout
            .fields
            .get(self.next)
            .map(|spec| spec.name)
            .unwrap_or("Filler")
    }
}

fn parse_digits(spec: &FieldSpec, raw: &str) -> Result<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::InvalidField {
            field: spec.name,
            message: format!("expected digits, found {:?}", raw),
        });
    }
    raw.parse::<u64>().map_err(|e| CodecError::InvalidField {
        field: spec.name,
        message: e.to_string(),
    })
}
