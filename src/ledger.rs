//! Ledger data model: transactions as exported from the bank or cash book.

pub mod amount;
pub mod transaction;

pub use amount::{Amount, AmountBucket, Direction};
pub use transaction::{Priority, TextField, TrainingExample, TransactionRecord, normalize_account};
