//! Infrastructure error conversions

mod conversions;

pub use conversions::IntoTunequizError;
