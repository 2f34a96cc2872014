// Submission, confirmation polling and status lookup

mod client;
mod status;

pub use client::{ChainClient, ConfirmOptions, DEFAULT_INTERVAL_MS, DEFAULT_MAX_ATTEMPTS};
pub use status::{status_message, TransactionStatus};
