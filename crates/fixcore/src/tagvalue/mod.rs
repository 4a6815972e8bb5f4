//! Tag-value (classic FIX) encoding: the [`decoder::Decoder`] (parser)
//! and [`encoder::Encoder`] (serializer).

pub mod decoder;
pub mod encoder;

pub use decoder::Decoder;
pub use encoder::Encoder;
