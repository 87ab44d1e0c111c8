//! Serial transmit encoding
//!
//! Turns pixel rows, register values and row selections into bus word
//! sequences with the driver latch commands in the right slots.

pub mod transmit;
pub mod word;

pub use transmit::{row_pattern_word, send_register, send_row_select, RowEncoder};
pub use word::{BusWord, Latch, LE_MASK, SER_MASK, SLOTS};

/// Switch register value with every output enabled
pub const OUTPUTS_ON: u16 = 0xFFFF;

/// Switch register value with every output disabled
pub const OUTPUTS_OFF: u16 = 0x0000;
