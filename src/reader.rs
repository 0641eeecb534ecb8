//! Reading and reconciling whole files.
//!
//! The first line is the header, the last line is the trailer, and every line
//! in between is a detail. Details carry no tag, so position is what tells
//! them apart.

use crate::assembler::Totals;
use crate::codec::{decode_detail, decode_header, decode_trailer};
use crate::error::{CodecError, Result};
use crate::record::{DetailRecord, HeaderRecord, TrailerRecord};
use log::debug;
use std::io::BufRead;

/// A fully decoded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFile {
    pub header: HeaderRecord,
    pub details: Vec<DetailRecord>,
    pub trailer: TrailerRecord,
}

impl FlatFile {
    /// Checks the trailer against the details.
    pub fn reconcile(&self) -> Result<()> {
        let mut totals = Totals::new();
        for detail in &self.details {
            totals.record(detail.operation_type, detail.transaction_amount)?;
        }
        reconcile(&totals, &self.trailer)
    }
}

/// Decodes a file, keeping every detail in memory.
pub fn read_file<R: BufRead>(reader: R) -> Result<FlatFile> {
    let mut details = Vec::new();
    let (header, trailer) = scan(reader, |detail| {
        details.push(detail);
        Ok(())
    })?;
    Ok(FlatFile {
        header,
        details,
        trailer,
    })
}

/// Decodes a file and reconciles its trailer without keeping the details.
pub fn verify<R: BufRead>(reader: R) -> Result<TrailerRecord> {
    let mut totals = Totals::new();
    let (_, trailer) = scan(reader, |detail| {
        totals.record(detail.operation_type, detail.transaction_amount)
    })?;
    reconcile(&totals, &trailer)?;
    Ok(trailer)
}

/// Streams a file, handing each detail to `on_detail` in order.
///
/// Returns the header and trailer. Decoding errors carry the 1-based line
/// number they occurred on.
pub fn scan<R, F>(reader: R, mut on_detail: F) -> Result<(HeaderRecord, TrailerRecord)>
where
    R: BufRead,
    F: FnMut(DetailRecord) -> Result<()>,
{
    let mut lines = reader.lines();

    let first = lines
        .next()
        .ok_or_else(|| CodecError::MalformedFile("file is empty".to_string()))??;
    let header = decode_header(&first).map_err(|e| e.at_line(1))?;

    // The last line seen is held back until we know it is not the trailer.
    let mut pending: Option<(usize, String)> = None;
    for (idx, line) in lines.enumerate() {
        let line = line?;
        if let Some((line_no, previous)) = pending.replace((idx + 2, line)) {
            let detail = decode_detail(&previous).map_err(|e| e.at_line(line_no))?;
            on_detail(detail).map_err(|e| e.at_line(line_no))?;
        }
    }

    let (line_no, last) = pending
        .ok_or_else(|| CodecError::MalformedFile("missing trailer".to_string()))?;
    let trailer = decode_trailer(&last).map_err(|e| e.at_line(line_no))?;
    debug!("Scanned {} lines", line_no);

    Ok((header, trailer))
}

/// Compares computed totals against a trailer.
pub fn reconcile(totals: &Totals, trailer: &TrailerRecord) -> Result<()> {
    let declared = TrailerRecord::from_totals(
        trailer.total_records,
        trailer.total_debit,
        trailer.total_credit,
    )?;
    check("TotalSum", declared.total_sum, trailer.total_sum)?;
    check("TotalRec", totals.records(), trailer.total_records)?;
    check("TotalDebitSum", totals.debit(), trailer.total_debit)?;
    check("TotalCreditSum", totals.credit(), trailer.total_credit)?;
    Ok(())
}

fn check<T: PartialEq + ToString>(field: &'static str, expected: T, found: T) -> Result<()> {
    if expected != found {
        return Err(CodecError::Reconcile {
            field,
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::assembler::assemble;
    use crate::codec::RecordEncoder;
    use crate::record::OperationType;
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn detail(op: OperationType, minor: u64) -> DetailRecord {
        DetailRecord {
            source_uid: "src".to_string(),
            request_uid: "req".to_string(),
            operation_type: op,
            operation_code: "01".to_string(),
            sub_operation_code: "0001".to_string(),
            user_id: "K0999999".to_string(),
            terminal_id: "A04CIS01".to_string(),
            value_date: date(),
            concept1: "c1".to_string(),
            concept2: "c2".to_string(),
            account_id: 42,
            transaction_amount: Amount::from_minor_units(minor),
            fee_amount: Amount::from_minor_units(100),
            service_branch_id: "9180".to_string(),
            auth_user_id: "KB1".to_string(),
            auth_level: "001".to_string(),
            ext_account_date: date(),
            uses_service_branch: true,
            ica: "001".to_string(),
        }
    }

    fn build(details: Vec<DetailRecord>) -> String {
        let header = HeaderRecord::new(date().and_hms_opt(12, 0, 0).unwrap());
        let mut out = Vec::new();
        assemble(&mut out, RecordEncoder::new(), &header, details).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_read_file_round_trip() {
        let details = vec![
            detail(OperationType::Debit, 150000),
            detail(OperationType::Credit, 80000),
        ];
        let text = build(details.clone());

        let file = read_file(Cursor::new(text)).unwrap();
        assert_eq!(file.details, details);
        assert_eq!(file.trailer.total_records, 2);
        file.reconcile().unwrap();
    }

    #[test]
    fn test_verify_empty_detail_set() {
        let trailer = verify(Cursor::new(build(Vec::new()))).unwrap();
        assert_eq!(trailer.total_records, 0);
    }

    #[test]
    fn test_verify_detects_tampered_amount() {
        let text = build(vec![detail(OperationType::Debit, 150000)]);
        let mut lines: Vec<String> = text.lines().map(String::from).collect();
        lines[1].replace_range(231..249, "000000000000150001");
        let tampered = lines.join("\n");

        match verify(Cursor::new(tampered)) {
            Err(CodecError::Reconcile { field, expected, found }) => {
                assert_eq!(field, "TotalDebitSum");
                assert_eq!(expected, "1500.01");
                assert_eq!(found, "1500.00");
            }
            other => panic!("Expected Reconcile, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_detects_missing_detail() {
        let text = build(vec![
            detail(OperationType::Credit, 1),
            detail(OperationType::Credit, 2),
        ]);
        let mut lines: Vec<&str> = text.lines().collect();
        lines.remove(1);

        assert!(matches!(
            verify(Cursor::new(lines.join("\n"))),
            Err(CodecError::Reconcile { field: "TotalRec", .. })
        ));
    }

    #[test]
    fn test_verify_detects_inconsistent_trailer_sum() {
        let text = build(vec![detail(OperationType::Debit, 500)]);
        let mut lines: Vec<String> = text.lines().map(String::from).collect();
        lines[2].replace_range(18..36, "000000000000000499");

        assert!(matches!(
            verify(Cursor::new(lines.join("\n"))),
            Err(CodecError::Reconcile { field: "TotalSum", .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            read_file(Cursor::new("")),
            Err(CodecError::MalformedFile(_))
        ));
    }

    #[test]
    fn test_header_only() {
        let text = build(Vec::new());
        let header_only = text.lines().next().unwrap().to_string();
        assert!(matches!(
            read_file(Cursor::new(header_only)),
            Err(CodecError::MalformedFile(_))
        ));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let text = build(vec![detail(OperationType::Debit, 1)]);
        let mut lines: Vec<String> = text.lines().map(String::from).collect();
        lines[1].truncate(100);

        match read_file(Cursor::new(lines.join("\n"))) {
            Err(CodecError::AtLine { line, source }) => {
                assert_eq!(line, 2);
                assert!(matches!(*source, CodecError::LineLength { .. }));
            }
            other => panic!("Expected AtLine, got {:?}", other),
        }
    }
}
