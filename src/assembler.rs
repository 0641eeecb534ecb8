//! File assembly: header, details, trailer.
//!
//! The assembler owns the running totals for one file. Every detail amount is
//! converted to minor units before it is added, so the trailer always equals
//! the exact sum of the amounts that were rendered into the detail lines.

use crate::amount::Amount;
use crate::codec::RecordEncoder;
use crate::error::{CodecError, Result};
use crate::record::{DetailRecord, HeaderRecord, OperationType, TrailerRecord};
use log::{debug, info};
use serde::Serialize;
use std::io::Write;

/// Running record count and debit/credit sums in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    records: u64,
    debit_minor: u64,
    credit_minor: u64,
}

impl Totals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one detail's amount to the debit or credit sum.
    pub fn record(&mut self, operation: OperationType, amount: Amount) -> Result<()> {
        let units = amount.minor_units();
        match operation {
            OperationType::Debit => {
                self.debit_minor = self
                    .debit_minor
                    .checked_add(units)
                    .ok_or(CodecError::TotalOverflow {
                        field: "TotalDebitSum",
                    })?;
            }
            OperationType::Credit => {
                self.credit_minor = self
                    .credit_minor
                    .checked_add(units)
                    .ok_or(CodecError::TotalOverflow {
                        field: "TotalCreditSum",
                    })?;
            }
        }
        self.records += 1;
        Ok(())
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn debit(&self) -> Amount {
        Amount::from_minor_units(self.debit_minor)
    }

    pub fn credit(&self) -> Amount {
        Amount::from_minor_units(self.credit_minor)
    }

    /// Builds the trailer for the details seen so far.
    pub fn trailer(&self) -> Result<TrailerRecord> {
        TrailerRecord::from_totals(self.records, self.debit(), self.credit())
    }
}

/// Reconciliation figures of one finished file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub file: String,
    pub records: u64,
    pub total: Amount,
    pub debit: Amount,
    pub credit: Amount,
}

impl FileSummary {
    pub fn from_trailer(file: impl Into<String>, trailer: &TrailerRecord) -> Self {
        FileSummary {
            file: file.into(),
            records: trailer.total_records,
            total: trailer.total_sum,
            debit: trailer.total_debit,
            credit: trailer.total_credit,
        }
    }
}

/// Writes a file line by line: one header, any number of details, one trailer.
///
/// Dropping the assembler without calling [`FileAssembler::finish`] leaves a
/// file with no trailer.
pub struct FileAssembler<W: Write> {
    writer: W,
    encoder: RecordEncoder,
    totals: Totals,
}

impl<W: Write> FileAssembler<W> {
    /// Writes the header line and returns an assembler ready for details.
    pub fn start(mut writer: W, encoder: RecordEncoder, header: &HeaderRecord) -> Result<Self> {
        let line = encoder.encode_header(header)?;
        writer.write_all(line.as_bytes())?;
        debug!(
            "Wrote header for business date {} (sequence {})",
            header.business_date, header.file_sequence
        );
        Ok(FileAssembler {
            writer,
            encoder,
            totals: Totals::new(),
        })
    }

    /// Encodes and writes one detail, then adds its amount to the totals.
    ///
    /// Nothing is written unless both encoding and the totals update succeed,
    /// and totals are only committed once the line has been written.
    pub fn push(&mut self, detail: &DetailRecord) -> Result<()> {
        let line = self.encoder.encode_detail(detail)?;
        let mut totals = self.totals;
        totals.record(detail.operation_type, detail.transaction_amount)?;
        self.writer.write_all(line.as_bytes())?;
        self.totals = totals;
        debug!(
            "Detail {}: {} {}",
            self.totals.records(),
            detail.operation_type,
            detail.transaction_amount
        );
        Ok(())
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Writes the trailer, flushes, and hands back the writer.
    pub fn finish(mut self) -> Result<(W, TrailerRecord)> {
        let trailer = self.totals.trailer()?;
        let line = self.encoder.encode_trailer(&trailer)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        info!(
            "Wrote {} details: debit {}, credit {}, total {}",
            trailer.total_records, trailer.total_debit, trailer.total_credit, trailer.total_sum
        );
        Ok((self.writer, trailer))
    }
}

/// Writes a complete file from a header and a sequence of details.
pub fn assemble<W, I>(
    writer: W,
    encoder: RecordEncoder,
    header: &HeaderRecord,
    details: I,
) -> Result<TrailerRecord>
where
    W: Write,
    I: IntoIterator<Item = DetailRecord>,
{
    let mut assembler = FileAssembler::start(writer, encoder, header)?;
    for detail in details {
        assembler.push(&detail)?;
    }
    let (_, trailer) = assembler.finish()?;
    Ok(trailer)
}

/// Writes file summaries as CSV.
pub fn write_summary<W: Write>(writer: W, summaries: &[FileSummary]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for summary in summaries {
        csv_writer.serialize(summary)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_detail, decode_header, decode_trailer};
    use crate::layout::LINE_WIDTH;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn header() -> HeaderRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        HeaderRecord::new(ts)
    }

    fn detail(op: OperationType, amount: &str, fee: &str) -> DetailRecord {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        DetailRecord {
            source_uid: "500022223455123_5hu12e21000".to_string(),
            request_uid: "494_20240131_100000".to_string(),
            operation_type: op,
            operation_code: "01".to_string(),
            sub_operation_code: "0001".to_string(),
            user_id: "K0999999".to_string(),
            terminal_id: "A04CIS01".to_string(),
            value_date: date,
            concept1: "Transaction for testing".to_string(),
            concept2: "TEST1000".to_string(),
            account_id: 1000000000,
            transaction_amount: Amount::from_str(amount).unwrap(),
            fee_amount: Amount::from_str(fee).unwrap(),
            service_branch_id: "9180".to_string(),
            auth_user_id: "KB100000".to_string(),
            auth_level: "001".to_string(),
            ext_account_date: date,
            uses_service_branch: false,
            ica: "001".to_string(),
        }
    }

    fn assemble_to_string(details: Vec<DetailRecord>) -> (String, TrailerRecord) {
        let mut out = Vec::new();
        let trailer = assemble(&mut out, RecordEncoder::new(), &header(), details).unwrap();
        (String::from_utf8(out).unwrap(), trailer)
    }

    #[test]
    fn test_debit_and_credit_totals() {
        let (output, trailer) = assemble_to_string(vec![
            detail(OperationType::Debit, "1500.00", "25.00"),
            detail(OperationType::Credit, "800.00", "10.00"),
        ]);

        assert_eq!(trailer.total_records, 2);
        assert_eq!(trailer.total_debit.minor_units(), 150000);
        assert_eq!(trailer.total_credit.minor_units(), 80000);
        assert_eq!(trailer.total_sum.minor_units(), 230000);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.len() == LINE_WIDTH));
        assert_eq!(&lines[3][3..18], "000000000000002");
        assert_eq!(decode_trailer(lines[3]).unwrap(), trailer);
    }

    #[test]
    fn test_fees_are_not_part_of_totals() {
        let (_, trailer) =
            assemble_to_string(vec![detail(OperationType::Debit, "10.00", "49.99")]);
        assert_eq!(trailer.total_sum.minor_units(), 1000);
    }

    #[test]
    fn test_zero_details() {
        let (output, trailer) = assemble_to_string(Vec::new());

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(decode_header(lines[0]).unwrap(), header());
        assert_eq!(trailer.total_records, 0);
        assert!(trailer.total_sum.is_zero());
        assert_eq!(&lines[1][..72], format!("T01{}", "0".repeat(69)));
    }

    #[test]
    fn test_round_then_sum() {
        // Each 1000.005 renders as 100001 minor units; the trailer must match
        // the sum of what was rendered, not a rounded aggregate (300001.5).
        let (output, trailer) = assemble_to_string(vec![
            detail(OperationType::Debit, "1000.005", "10"),
            detail(OperationType::Debit, "1000.005", "10"),
            detail(OperationType::Credit, "1000.005", "10"),
        ]);

        let rendered: u64 = output
            .lines()
            .skip(1)
            .take(3)
            .map(|l| decode_detail(l).unwrap().transaction_amount.minor_units())
            .sum();
        assert_eq!(rendered, 300003);
        assert_eq!(trailer.total_sum.minor_units(), 300003);
        assert_eq!(trailer.total_debit.minor_units(), 200002);
    }

    #[test]
    fn test_every_line_is_terminated() {
        let (output, _) = assemble_to_string(vec![detail(OperationType::Credit, "1", "1")]);
        assert!(output.ends_with('\n'));
        assert_eq!(output.len(), 3 * (LINE_WIDTH + 1));
    }

    #[test]
    fn test_failed_detail_aborts() {
        let mut bad = detail(OperationType::Debit, "1", "1");
        bad.account_id = u64::MAX;

        let mut out = Vec::new();
        let mut assembler = FileAssembler::start(&mut out, RecordEncoder::new(), &header()).unwrap();
        assert!(assembler.push(&bad).is_err());
        assert_eq!(assembler.totals().records(), 0);
    }

    #[test]
    fn test_total_overflow_writes_nothing() {
        let mut out = Vec::new();
        {
            let mut assembler =
                FileAssembler::start(&mut out, RecordEncoder::new(), &header()).unwrap();
            assembler.totals = Totals {
                records: 1,
                debit_minor: u64::MAX,
                credit_minor: 0,
            };

            let result = assembler.push(&detail(OperationType::Debit, "0.01", "0"));
            assert!(matches!(
                result,
                Err(CodecError::TotalOverflow {
                    field: "TotalDebitSum"
                })
            ));
            assert_eq!(assembler.totals().records(), 1);
        }

        // Only the header reached the writer.
        assert_eq!(out.len(), LINE_WIDTH + 1);
    }

    #[test]
    fn test_totals_overflow() {
        let mut totals = Totals::new();
        totals
            .record(OperationType::Credit, Amount::from_minor_units(u64::MAX))
            .unwrap();
        assert!(matches!(
            totals.record(OperationType::Credit, Amount::from_minor_units(1)),
            Err(CodecError::TotalOverflow {
                field: "TotalCreditSum"
            })
        ));
    }

    #[test]
    fn test_summary_csv() {
        let trailer = TrailerRecord::from_totals(
            2,
            Amount::from_minor_units(150000),
            Amount::from_minor_units(80000),
        )
        .unwrap();
        let summary = FileSummary::from_trailer("out.dat", &trailer);

        let mut output = Vec::new();
        write_summary(&mut output, &[summary]).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("file,records,total,debit,credit"));
        assert!(output_str.contains("out.dat,2,2300.00,1500.00,800.00"));
    }
}
