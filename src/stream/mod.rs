//! Stream adapters over packet sources

mod decode;

pub use decode::{DecodeExt, Decoding};
