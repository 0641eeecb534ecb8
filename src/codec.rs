//! Record encoder and decoder.
//!
//! Encoding is a pure function of the record: fields are rendered in column
//! order with no separators and the line is terminated with `\n`. Decoding
//! is the inverse and is mostly used to check files after the fact.

use crate::error::{CodecError, Result};
use crate::field::{FieldReader, FieldWriter, TextOverflow};
use crate::layout::{DETAIL_LAYOUT, HEADER_LAYOUT, HEADER_TAG, TRAILER_LAYOUT, TRAILER_TAG};
use crate::record::{DetailRecord, HeaderRecord, TrailerRecord};

/// Encodes records into fixed-width lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordEncoder {
    text_overflow: TextOverflow,
}

impl RecordEncoder {
    /// Creates an encoder that truncates oversized text fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy for text values longer than their column.
    pub fn with_text_overflow(mut self, policy: TextOverflow) -> Self {
        self.text_overflow = policy;
        self
    }

    pub fn encode_header(&self, header: &HeaderRecord) -> Result<String> {
        let mut w = FieldWriter::new(&HEADER_LAYOUT, self.text_overflow);
        w.text(HEADER_TAG)?;
        w.timestamp(header.system_timestamp)?;
        w.date(header.business_date)?;
        w.text(&header.source_app_id)?;
        w.text(&header.file_type)?;
        w.number(u64::from(header.file_sequence))?;
        w.filler()?;
        w.finish()
    }

    pub fn encode_detail(&self, detail: &DetailRecord) -> Result<String> {
        let mut w = FieldWriter::new(&DETAIL_LAYOUT, self.text_overflow);
        w.text(&detail.source_uid)?;
        w.text(&detail.request_uid)?;
        w.text(detail.operation_type.code())?;
        w.text(&detail.operation_code)?;
        w.text(&detail.sub_operation_code)?;
        w.text(&detail.user_id)?;
        w.text(&detail.terminal_id)?;
        w.date(detail.value_date)?;
        w.text(&detail.concept1)?;
        w.text(&detail.concept2)?;
        w.number(detail.account_id)?;
        w.amount(detail.transaction_amount)?;
        w.amount(detail.fee_amount)?;
        w.text(&detail.service_branch_id)?;
        w.text(&detail.auth_user_id)?;
        w.text(&detail.auth_level)?;
        w.date(detail.ext_account_date)?;
        w.flag(detail.uses_service_branch)?;
        w.text(&detail.ica)?;
        w.filler()?;
        w.finish()
    }

    pub fn encode_trailer(&self, trailer: &TrailerRecord) -> Result<String> {
        let mut w = FieldWriter::new(&TRAILER_LAYOUT, self.text_overflow);
        w.text(TRAILER_TAG)?;
        w.number(trailer.total_records)?;
        w.amount(trailer.total_sum)?;
        w.amount(trailer.total_debit)?;
        w.amount(trailer.total_credit)?;
        w.filler()?;
        w.finish()
    }
}

fn expect_tag(found: &str, expected: &'static str) -> Result<()> {
    if found != expected {
        return Err(CodecError::UnexpectedTag {
            expected,
            found: found.to_string(),
        });
    }
    Ok(())
}

/// Decodes a header line.
pub fn decode_header(line: &str) -> Result<HeaderRecord> {
    let mut r = FieldReader::new(line, &HEADER_LAYOUT)?;
    expect_tag(r.text()?, HEADER_TAG)?;
    let system_timestamp = r.timestamp()?;
    let business_date = r.date()?;
    let source_app_id = r.text()?.to_string();
    let file_type = r.text()?.to_string();
    let file_sequence = r.number()?;
    r.filler()?;

    let file_sequence = u32::try_from(file_sequence).map_err(|_| CodecError::InvalidField {
        field: "FileSeqNum",
        message: format!("{} is out of range", file_sequence),
    })?;

    Ok(HeaderRecord {
        system_timestamp,
        business_date,
        source_app_id,
        file_type,
        file_sequence,
    })
}

/// Decodes a detail line.
///
/// Details carry no tag, so any line of the right width is accepted.
pub fn decode_detail(line: &str) -> Result<DetailRecord> {
    let mut r = FieldReader::new(line, &DETAIL_LAYOUT)?;
    let detail = DetailRecord {
        source_uid: r.text()?.to_string(),
        request_uid: r.text()?.to_string(),
        operation_type: r.text()?.parse()?,
        operation_code: r.text()?.to_string(),
        sub_operation_code: r.text()?.to_string(),
        user_id: r.text()?.to_string(),
        terminal_id: r.text()?.to_string(),
        value_date: r.date()?,
        concept1: r.text()?.to_string(),
        concept2: r.text()?.to_string(),
        account_id: r.number()?,
        transaction_amount: r.amount()?,
        fee_amount: r.amount()?,
        service_branch_id: r.text()?.to_string(),
        auth_user_id: r.text()?.to_string(),
        auth_level: r.text()?.to_string(),
        ext_account_date: r.date()?,
        uses_service_branch: r.flag()?,
        ica: r.text()?.to_string(),
    };
    r.filler()?;
    Ok(detail)
}

/// Decodes a trailer line.
pub fn decode_trailer(line: &str) -> Result<TrailerRecord> {
    let mut r = FieldReader::new(line, &TRAILER_LAYOUT)?;
    expect_tag(r.text()?, TRAILER_TAG)?;
    let trailer = TrailerRecord {
        total_records: r.number()?,
        total_sum: r.amount()?,
        total_debit: r.amount()?,
        total_credit: r.amount()?,
    };
    r.filler()?;
    Ok(trailer)
}
