mod satoshis;

pub mod helpers;
pub mod op;
mod secret;

pub use satoshis::{Satoshis, SatoshisConversionError, BTC_CURRENCY_CODE, BTC_CURRENCY_CODE_LOWER};
pub use secret::Secret;
