//! Constants used throughout the cards core crate.

/// Prefix of every generated card id (`card_1`, `card_2`, ...).
pub const CARD_ID_PREFIX: &str = "card_";

/// Sequence number given to the first card created in a process.
pub const FIRST_CARD_SEQUENCE: u64 = 1;
