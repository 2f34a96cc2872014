// Transactions and their canonical encoding

mod transaction;
mod payload;
pub mod codec;
mod serialize;

pub use transaction::*;
pub use payload::TxPayload;
pub use codec::{pack_version, TxCore};
pub use serialize::{Serializable, WireType};
