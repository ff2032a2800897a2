//! Decode engine for cellular baseband diagnostic log packets.
//!
//! Modems emit binary diagnostic packets keyed by an opcode (a "log code").
//! This crate turns one framed payload at a time into a structured
//! [`Record`], or into a [`FallbackResult`] when the opcode, the embedded
//! format version, or the payload shape is not understood. Decoding never
//! fails and never panics on payload content.
//!
//! # Features
//!
//! - **Data-driven dispatch**: opcode families and their version layouts are tables
//! - **Graceful degradation**: unknown input produces a tagged fallback and a trace
//! - **Exact conversions**: signal levels, BCD network identifiers, neighbor lists
//! - **Shareable**: the dispatch table is read-only after construction
//!
//! # Quick Start
//!
//! ```rust
//! use modemlog::{Dispatcher, Opcode, RadioId, Record};
//! use std::time::SystemTime;
//!
//! let payload = [
//!     0x03, 0x00, 0x00, 0x00, 0x50, 0x01, 0xc0, 0xac, 0x05, 0x00, 0x9a, 0x00, 0x00, 0x3f,
//! ];
//! let decoded = Dispatcher::standard().decode(Opcode(0xB822), &payload, SystemTime::now(), RadioId(0));
//!
//! match decoded.record() {
//!     Record::NrServingCell(cell) => assert_eq!(cell.pci, 336),
//!     other => panic!("unexpected record {:?}", other),
//! }
//! ```
//!
//! ## Example (packet stream)
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use modemlog::{DecodeExt, RawPacket};
//!
//! # async fn run(packets: impl futures::Stream<Item = RawPacket> + Unpin) {
//! let mut decoded = packets.decoded();
//! while let Some(item) = decoded.next().await {
//!     println!("{}: {:?}", item.opcode, item.record());
//! }
//! # }
//! ```

// Core types and error handling
pub mod config;
pub mod convert;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;
pub mod wire;

// Decode engine
pub mod decoders;
pub mod dispatch;
pub mod fallback;

// Stream adapters
pub mod stream;

// Core exports
pub use error::*;
pub use types::*;

pub use config::DecoderConfig;
pub use convert::Plmn;
pub use decoders::Family;
pub use dispatch::{DispatchTable, Dispatcher};
pub use fallback::{FallbackReason, FallbackResult};
pub use stream::{DecodeExt, Decoding};
