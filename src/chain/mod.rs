//! Market data model for options analysis.
//!
//! Provides:
//! - Option contract snapshots with quotes, IV, and Greeks
//! - Chain construction with symbol/duplicate-leg invariants

pub mod types;

pub use types::{ChainError, OptionContract, OptionType, OptionsChain};
