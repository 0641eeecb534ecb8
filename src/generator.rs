//! Random test-data generation.
//!
//! The randomness lives here and nowhere else: the codec and assembler are
//! pure. The RNG is passed in, so a seeded `StdRng` gives reproducible files.

use crate::amount::Amount;
use crate::assembler::FileAssembler;
use crate::codec::RecordEncoder;
use crate::error::{CodecError, Result};
use crate::record::{DetailRecord, HeaderRecord, OperationType, TrailerRecord};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use rand::Rng;
use std::io::Write;

/// File name prefix used for generated files.
pub const FILE_NAME_PREFIX: &str = "SHARC.EDCMP.FCS3D01.RETAIL.DEBIT.TCB_";

/// Returns the conventional file name for a file of `count` details.
pub fn default_file_name(count: u64) -> String {
    format!("{}{}", FILE_NAME_PREFIX, count)
}

/// Knobs for the detail generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Probability that a detail is a debit.
    pub debit_ratio: f64,
    /// Transaction amounts are drawn from `[0.5, 1.5] x base_amount`.
    pub base_amount: Amount,
    pub fee_min: Amount,
    pub fee_max: Amount,
    pub source_app_id: String,
    pub file_type: String,
    pub file_sequence: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            debit_ratio: 0.6,
            base_amount: Amount::from_minor_units(100_000),
            fee_min: Amount::from_minor_units(1_000),
            fee_max: Amount::from_minor_units(5_000),
            source_app_id: HeaderRecord::DEFAULT_SOURCE_APP_ID.to_string(),
            file_type: HeaderRecord::DEFAULT_FILE_TYPE.to_string(),
            file_sequence: 1,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.debit_ratio) {
            return Err(CodecError::InvalidConfig(format!(
                "debit ratio {} is outside [0, 1]",
                self.debit_ratio
            )));
        }
        if self.fee_min > self.fee_max {
            return Err(CodecError::InvalidConfig(format!(
                "fee range {}..{} is inverted",
                self.fee_min, self.fee_max
            )));
        }
        if self.base_amount.minor_units().checked_mul(3).is_none() {
            return Err(CodecError::InvalidConfig(format!(
                "base amount {} is too large",
                self.base_amount
            )));
        }
        Ok(())
    }

    /// Builds the header for a file generated at `timestamp`.
    pub fn header(&self, timestamp: NaiveDateTime) -> HeaderRecord {
        HeaderRecord {
            source_app_id: self.source_app_id.clone(),
            file_type: self.file_type.clone(),
            file_sequence: self.file_sequence,
            ..HeaderRecord::new(timestamp)
        }
    }

    /// Inclusive transaction amount range in minor units.
    fn amount_range(&self) -> (u64, u64) {
        let base = self.base_amount.minor_units();
        (base / 2, base / 2 * 3 + base % 2)
    }
}

/// Produces random details shaped like production records.
pub struct DetailGenerator<R: Rng> {
    rng: R,
    config: GeneratorConfig,
    business_date: NaiveDate,
}

impl<R: Rng> DetailGenerator<R> {
    pub fn new(rng: R, config: GeneratorConfig, business_date: NaiveDate) -> Result<Self> {
        config.validate()?;
        Ok(DetailGenerator {
            rng,
            config,
            business_date,
        })
    }

    /// Draws the next detail record.
    pub fn next_detail(&mut self) -> DetailRecord {
        let operation_type = if self.rng.gen_bool(self.config.debit_ratio) {
            OperationType::Debit
        } else {
            OperationType::Credit
        };

        let (low, high) = self.config.amount_range();
        let transaction_amount = Amount::from_minor_units(self.rng.gen_range(low..=high));
        let fee_amount = Amount::from_minor_units(self.rng.gen_range(
            self.config.fee_min.minor_units()..=self.config.fee_max.minor_units(),
        ));

        DetailRecord {
            source_uid: format!("500022223455123_5hu12e2{}", self.rng.gen_range(1000..=9999)),
            request_uid: format!(
                "{}_{}_{}",
                self.config.source_app_id,
                self.business_date.format("%Y%m%d"),
                self.rng.gen_range(100_000..=999_999)
            ),
            operation_type,
            operation_code: "01".to_string(),
            sub_operation_code: "0001".to_string(),
            user_id: "K0999999".to_string(),
            terminal_id: "A04CIS01".to_string(),
            value_date: self.business_date,
            concept1: "Transaction for testing".to_string(),
            concept2: format!("TEST{}", self.rng.gen_range(1000..=9999)),
            account_id: self.rng.gen_range(1_000_000_000..=9_999_999_999),
            transaction_amount,
            fee_amount,
            service_branch_id: "9180".to_string(),
            auth_user_id: format!("KB{}", self.rng.gen_range(100_000..=999_999)),
            auth_level: "001".to_string(),
            ext_account_date: self.business_date,
            uses_service_branch: false,
            ica: "001".to_string(),
        }
    }
}

impl<R: Rng> Iterator for DetailGenerator<R> {
    type Item = DetailRecord;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_detail())
    }
}

/// Generates a complete file of `count` random details into `writer`.
pub fn generate_file<W: Write, R: Rng>(
    writer: W,
    rng: R,
    config: &GeneratorConfig,
    encoder: RecordEncoder,
    timestamp: NaiveDateTime,
    count: u64,
) -> Result<TrailerRecord> {
    let header = config.header(timestamp);
    let mut generator = DetailGenerator::new(rng, config.clone(), header.business_date)?;
    let mut assembler = FileAssembler::start(writer, encoder, &header)?;

    for _ in 0..count {
        let detail = generator.next_detail();
        assembler.push(&detail)?;
    }

    let (_, trailer) = assembler.finish()?;
    info!("Generated {} details for {}", count, header.business_date);
    Ok(trailer)
}
