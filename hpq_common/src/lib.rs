mod fen;
pub mod helpers;
pub mod op;

pub use fen::{Fen, FenConversionError, CURRENCY_CODE, FEN_PER_YUAN};
