//! Typed header, detail, and trailer records.

use crate::amount::Amount;
use crate::error::{CodecError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

/// Direction of a detail transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// Rendered as `DR`.
    Debit,
    /// Rendered as `CR`.
    Credit,
}

impl OperationType {
    /// The two-character code written to the file.
    pub fn code(&self) -> &'static str {
        match self {
            OperationType::Debit => "DR",
            OperationType::Credit => "CR",
        }
    }
}

impl FromStr for OperationType {
    type Err = CodecError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "DR" => Ok(OperationType::Debit),
            "CR" => Ok(OperationType::Credit),
            other => Err(CodecError::InvalidField {
                field: "OperationType",
                message: format!("expected DR or CR, found {:?}", other),
            }),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// First line of a file: run metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    pub system_timestamp: NaiveDateTime,
    pub business_date: NaiveDate,
    pub source_app_id: String,
    pub file_type: String,
    pub file_sequence: u32,
}

impl HeaderRecord {
    /// Source application id written by default.
    pub const DEFAULT_SOURCE_APP_ID: &'static str = "494";

    /// File type written by default.
    pub const DEFAULT_FILE_TYPE: &'static str = "AcctInf";

    /// Creates a header for a run started at `timestamp`.
    ///
    /// The business date is the timestamp's date; the sequence number is 1.
    pub fn new(timestamp: NaiveDateTime) -> Self {
        HeaderRecord {
            system_timestamp: timestamp,
            business_date: timestamp.date(),
            source_app_id: Self::DEFAULT_SOURCE_APP_ID.to_string(),
            file_type: Self::DEFAULT_FILE_TYPE.to_string(),
            file_sequence: 1,
        }
    }
}

/// One transaction line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub source_uid: String,
    pub request_uid: String,
    pub operation_type: OperationType,
    pub operation_code: String,
    pub sub_operation_code: String,
    pub user_id: String,
    pub terminal_id: String,
    pub value_date: NaiveDate,
    pub concept1: String,
    pub concept2: String,
    pub account_id: u64,
    pub transaction_amount: Amount,
    pub fee_amount: Amount,
    pub service_branch_id: String,
    pub auth_user_id: String,
    pub auth_level: String,
    pub ext_account_date: NaiveDate,
    pub uses_service_branch: bool,
    pub ica: String,
}

/// Last line of a file: aggregate count and sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailerRecord {
    pub total_records: u64,
    pub total_sum: Amount,
    pub total_debit: Amount,
    pub total_credit: Amount,
}

impl TrailerRecord {
    /// Builds a trailer whose total is `debit + credit`.
    pub fn from_totals(total_records: u64, total_debit: Amount, total_credit: Amount) -> Result<Self> {
        let total_sum = total_debit
            .checked_add(total_credit)
            .ok_or(CodecError::TotalOverflow { field: "TotalSum" })?;
        Ok(TrailerRecord {
            total_records,
            total_sum,
            total_debit,
            total_credit,
        })
    }
}
