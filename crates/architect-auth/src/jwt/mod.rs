//! Token encoding, verification, and one-shot redemption tracking.

pub mod claims;
pub mod decoder;
pub mod encoder;
pub mod ledger;

pub use claims::{Claims, TokenType};
pub use decoder::TokenVerifier;
pub use encoder::TokenSigner;
pub use ledger::SpentTokenLedger;
