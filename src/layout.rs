//! Column tables for the three record kinds.
//!
//! Every record kind is exactly [`LINE_WIDTH`] characters wide, excluding the
//! line terminator. The widths are checked at compile time.

/// Fixed width of every record line, excluding the terminator.
pub const LINE_WIDTH: usize = 550;

/// Record type tag of the header line.
pub const HEADER_TAG: &str = "H01";

/// Record type tag of the trailer line.
pub const TRAILER_TAG: &str = "T01";

/// Column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// What a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Numeric,
    Filler,
}

/// Conversion applied to a value before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Identity,
    /// Amount rendered as integer minor units (value x 100).
    MinorUnits,
}

/// A single column of a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: usize,
    pub align: Align,
    pub fill: char,
    pub kind: FieldKind,
    pub transform: Transform,
}

impl FieldSpec {
    /// Left-aligned, space-filled text column.
    pub const fn text(name: &'static str, width: usize) -> Self {
        FieldSpec {
            name,
            width,
            align: Align::Left,
            fill: ' ',
            kind: FieldKind::Text,
            transform: Transform::Identity,
        }
    }

    /// Right-aligned, zero-filled integer column.
    pub const fn numeric(name: &'static str, width: usize) -> Self {
        FieldSpec {
            name,
            width,
            align: Align::Right,
            fill: '0',
            kind: FieldKind::Numeric,
            transform: Transform::Identity,
        }
    }

    /// Right-aligned, zero-filled amount column in minor units.
    pub const fn amount(name: &'static str, width: usize) -> Self {
        FieldSpec {
            transform: Transform::MinorUnits,
            ..Self::numeric(name, width)
        }
    }

    /// Reserved region of spaces.
    pub const fn filler(width: usize) -> Self {
        FieldSpec {
            name: "Filler",
            width,
            align: Align::Left,
            fill: ' ',
            kind: FieldKind::Filler,
            transform: Transform::Identity,
        }
    }
}

/// The three kinds of record in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Header,
    Detail,
    Trailer,
}

impl RecordKind {
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Header => "header",
            RecordKind::Detail => "detail",
            RecordKind::Trailer => "trailer",
        }
    }
}

/// Ordered, immutable column table for one record kind.
#[derive(Debug)]
pub struct RecordLayout {
    pub kind: RecordKind,
    pub fields: &'static [FieldSpec],
}

impl RecordLayout {
    /// Total line width: the sum of all column widths.
    pub const fn width(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].width;
            i += 1;
        }
        total
    }

    /// Returns the character offset and spec of the named column.
    pub fn offset_of(&self, name: &str) -> Option<(usize, &'static FieldSpec)> {
        let mut offset = 0;
        for spec in self.fields {
            if spec.name == name {
                return Some((offset, spec));
            }
            offset += spec.width;
        }
        None
    }

    pub fn for_kind(kind: RecordKind) -> &'static RecordLayout {
        match kind {
            RecordKind::Header => &HEADER_LAYOUT,
            RecordKind::Detail => &DETAIL_LAYOUT,
            RecordKind::Trailer => &TRAILER_LAYOUT,
        }
    }
}

pub const HEADER_LAYOUT: RecordLayout = RecordLayout {
    kind: RecordKind::Header,
    fields: &[
        FieldSpec::text("RecType", 3),
        FieldSpec::text("SysDt", 33),
        FieldSpec::text("BusinessDt", 10),
        FieldSpec::text("SrcAppId", 5),
        FieldSpec::text("FileType", 8),
        FieldSpec::numeric("FileSeqNum", 6),
        FieldSpec::filler(485),
    ],
};

pub const DETAIL_LAYOUT: RecordLayout = RecordLayout {
    kind: RecordKind::Detail,
    fields: &[
        FieldSpec::text("SrcUID", 40),
        FieldSpec::text("RqUID", 47),
        FieldSpec::text("OperationType", 2),
        FieldSpec::text("OperationCode", 2),
        FieldSpec::text("SubOperationCode", 4),
        FieldSpec::text("UserId", 8),
        FieldSpec::text("TerminalId", 8),
        FieldSpec::text("ValueDt", 10),
        FieldSpec::text("Concept1", 45),
        FieldSpec::text("Concept2", 55),
        FieldSpec::numeric("AcctId", 10),
        FieldSpec::amount("TrnAmt", 18),
        FieldSpec::amount("FeeAmt", 18),
        FieldSpec::text("SvcBranchId", 4),
        FieldSpec::text("AuthUserId", 15),
        FieldSpec::text("AuthLevel", 3),
        FieldSpec::text("ExtAcctDt", 10),
        FieldSpec::text("UseSvcBranch", 1),
        FieldSpec::text("ICA", 3),
        FieldSpec::filler(247),
    ],
};

pub const TRAILER_LAYOUT: RecordLayout = RecordLayout {
    kind: RecordKind::Trailer,
    fields: &[
        FieldSpec::text("RecType", 3),
        FieldSpec::numeric("TotalRec", 15),
        FieldSpec::amount("TotalSum", 18),
        FieldSpec::amount("TotalDebitSum", 18),
        FieldSpec::amount("TotalCreditSum", 18),
        FieldSpec::filler(478),
    ],
};

const _: () = assert!(HEADER_LAYOUT.width() == LINE_WIDTH);
const _: () = assert!(DETAIL_LAYOUT.width() == LINE_WIDTH);
const _: () = assert!(TRAILER_LAYOUT.width() == LINE_WIDTH);
