//! # Flat-File Records
//!
//! A positional codec for bank-style fixed-width files, plus a seeded
//! generator of realistic test files.
//!
//! A file is one header line, any number of detail (transaction) lines, and
//! one trailer line carrying the record count and debit/credit sums.
//!
//! ## Design Principles
//!
//! - **Fixed columns**: every line is exactly [`LINE_WIDTH`] characters, no separators
//! - **Integer money**: amounts are rounded once and summed in minor units
//! - **Loud numeric overflow**: numbers never lose digits; text truncation is a policy
//! - **Injected randomness**: the generator takes any `rand::Rng`
//!
//! ## Example
//!
//! ```
//! use flatfile_records::{generate_file, verify, GeneratorConfig, RecordEncoder};
//! use chrono::NaiveDate;
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::io::Cursor;
//!
//! let ts = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap();
//! let mut out = Vec::new();
//! let trailer = generate_file(
//!     &mut out,
//!     StdRng::seed_from_u64(1),
//!     &GeneratorConfig::default(),
//!     RecordEncoder::new(),
//!     ts,
//!     10,
//! )
//! .unwrap();
//!
//! assert_eq!(verify(Cursor::new(out)).unwrap(), trailer);
//! ```

pub mod amount;
pub mod assembler;
pub mod codec;
pub mod error;
pub mod field;
pub mod generator;
pub mod layout;
pub mod reader;
pub mod record;

pub use amount::Amount;
pub use assembler::{assemble, write_summary, FileAssembler, FileSummary, Totals};
pub use codec::{decode_detail, decode_header, decode_trailer, RecordEncoder};
pub use error::{CodecError, Result};
pub use field::{render, FieldValue, TextOverflow};
pub use generator::{default_file_name, generate_file, DetailGenerator, GeneratorConfig};
pub use layout::{FieldSpec, RecordKind, RecordLayout, LINE_WIDTH};
pub use reader::{read_file, verify, FlatFile};
pub use record::{DetailRecord, HeaderRecord, OperationType, TrailerRecord};
