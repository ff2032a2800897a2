//! Opcode dispatch
//!
//! [`DispatchTable`] maps every registered opcode onto its decoder family. It
//! is built once from a [`DecoderConfig`] and never changes afterwards, so a
//! [`Dispatcher`] can be shared across threads and tasks without locking.
//!
//! ```rust
//! use modemlog::{Dispatcher, FallbackReason, Opcode, RadioId};
//! use std::time::SystemTime;
//!
//! let dispatcher = Dispatcher::standard();
//! let decoded = dispatcher.decode(Opcode(0x1234), &[0xde, 0xad], SystemTime::now(), RadioId(0));
//!
//! assert!(decoded.record().is_empty());
//! assert_eq!(decoded.fallback().map(|f| f.reason), Some(FallbackReason::UnknownOpcode));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;
use tracing::{debug, trace, warn};

use crate::config::DecoderConfig;
use crate::decoders::{self, Family};
use crate::fallback::{self, FallbackReason};
use crate::types::{DecodeOutcome, Decoded, Opcode, RadioId, RawPacket};

/// Read-only mapping from opcode to decoder family.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    families: HashMap<Opcode, Family>,
    hexdump_limit: usize,
    quiet_stubs: bool,
}

impl DispatchTable {
    /// Process-wide table built from the default configuration.
    pub fn standard() -> &'static DispatchTable {
        Self::standard_shared()
    }

    fn standard_shared() -> &'static Arc<DispatchTable> {
        static STANDARD: OnceLock<Arc<DispatchTable>> = OnceLock::new();
        STANDARD.get_or_init(|| Arc::new(DispatchTable::with_config(&DecoderConfig::default())))
    }

    /// Build a table honoring `config`.
    pub fn with_config(config: &DecoderConfig) -> Self {
        let families: HashMap<Opcode, Family> = decoders::catalogue()
            .into_iter()
            .filter(|(opcode, _)| !config.disabled_opcodes.contains(&opcode.value()))
            .collect();

        debug!(
            registered = families.len(),
            disabled = config.disabled_opcodes.len(),
            "Built dispatch table"
        );

        Self { families, hexdump_limit: config.hexdump_limit, quiet_stubs: config.quiet_stubs }
    }

    /// Family registered for `opcode`, if any.
    pub fn lookup(&self, opcode: Opcode) -> Option<&Family> {
        self.families.get(&opcode)
    }

    /// Number of registered opcodes.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Returns true when no opcode is registered.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Registered opcodes in ascending order.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut opcodes: Vec<Opcode> = self.families.keys().copied().collect();
        opcodes.sort_unstable();
        opcodes
    }

    pub fn hexdump_limit(&self) -> usize {
        self.hexdump_limit
    }
}

/// Decodes packets against a [`DispatchTable`].
///
/// Decoding never fails: every problem with a payload ends up as a
/// [`FallbackResult`](crate::FallbackResult) inside the returned [`Decoded`].
///
/// Cloning a dispatcher shares its table.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<DispatchTable>,
}

impl Dispatcher {
    pub fn new(table: DispatchTable) -> Self {
        Self { table: Arc::new(table) }
    }

    /// Shared dispatcher over [`DispatchTable::standard`].
    pub fn standard() -> &'static Dispatcher {
        static STANDARD: OnceLock<Dispatcher> = OnceLock::new();
        STANDARD.get_or_init(|| Dispatcher {
            table: Arc::clone(DispatchTable::standard_shared()),
        })
    }

    /// Owned handle on [`Dispatcher::standard`], for tasks and streams.
    pub fn shared() -> Arc<Dispatcher> {
        static SHARED: OnceLock<Arc<Dispatcher>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::standard().clone())))
    }

    pub fn with_config(config: &DecoderConfig) -> Self {
        Self::new(DispatchTable::with_config(config))
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Decode one payload.
    ///
    /// `timestamp` and `radio_id` are carried into the result untouched; they
    /// never influence how the payload is read.
    pub fn decode(
        &self,
        opcode: Opcode,
        payload: &[u8],
        timestamp: SystemTime,
        radio_id: RadioId,
    ) -> Decoded {
        trace!(opcode = %opcode, radio_id = %radio_id, len = payload.len(), "Decoding packet");
        let limit = self.table.hexdump_limit;

        let outcome = match self.table.lookup(opcode) {
            None => DecodeOutcome::Fallback(fallback::handle(
                opcode,
                payload,
                FallbackReason::UnknownOpcode,
                limit,
            )),
            Some(family) => match family.decode(opcode, payload) {
                Ok(record) => {
                    if family.is_stub() {
                        self.trace_stub(opcode, family, payload);
                    }
                    DecodeOutcome::Record(record)
                }
                Err(error) => DecodeOutcome::Fallback(fallback::from_error(
                    opcode,
                    payload,
                    family.peek_version(payload),
                    error,
                    limit,
                )),
            },
        };

        trace!(opcode = %opcode, record = matches!(outcome, DecodeOutcome::Record(_)), "Decoded packet");
        Decoded { opcode, timestamp, radio_id, outcome }
    }

    /// Decode a framed packet.
    pub fn decode_packet(&self, packet: &RawPacket) -> Decoded {
        self.decode(packet.opcode, &packet.payload, packet.timestamp, packet.radio_id)
    }

    fn trace_stub(&self, opcode: Opcode, family: &Family, payload: &[u8]) {
        let hexdump = fallback::hexdump(payload, self.table.hexdump_limit);
        if self.table.quiet_stubs || !family.is_noisy_stub() {
            debug!(opcode = %opcode, family = family.name(), %hexdump, "Undecoded opcode");
        } else {
            warn!(opcode = %opcode, family = family.name(), %hexdump, "Undecoded opcode");
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::standard().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{captures, unhex};
    use crate::types::Record;
    use proptest::prelude::*;

    fn decode(dispatcher: &Dispatcher, opcode: u32, payload: &[u8]) -> Decoded {
        dispatcher.decode(Opcode(opcode), payload, SystemTime::UNIX_EPOCH, RadioId(1))
    }

    proptest! {
        #[test]
        fn prop_unregistered_opcodes_fall_back(
            opcode in 0x1_0000u32..,
            payload in prop::collection::vec(any::<u8>(), 0..64)
        ) {
            let decoded = decode(Dispatcher::standard(), opcode, &payload);
            prop_assert_eq!(decoded.fallback().map(|f| f.reason), Some(FallbackReason::UnknownOpcode));
            prop_assert!(decoded.record().is_empty());
        }

        #[test]
        fn prop_registered_opcodes_never_panic(
            index in any::<prop::sample::Index>(),
            payload in prop::collection::vec(any::<u8>(), 0..160)
        ) {
            let opcodes = DispatchTable::standard().opcodes();
            let opcode = opcodes[index.index(opcodes.len())];
            let first = decode(Dispatcher::standard(), opcode.value(), &payload);
            let second = decode(Dispatcher::standard(), opcode.value(), &payload);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn standard_table_is_sorted_and_complete() {
        let table = DispatchTable::standard();
        let opcodes = table.opcodes();

        assert_eq!(opcodes.len(), table.len());
        assert!(opcodes.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(opcodes.first(), Some(&Opcode(0x0300)));
        assert_eq!(opcodes.last(), Some(&Opcode(0xB9A3)));
        assert!(matches!(table.lookup(Opcode(0xB821)), Some(Family::NrRrcOta)));
    }

    #[test]
    fn disabled_opcodes_take_unknown_opcode_path() {
        let config = DecoderConfig { disabled_opcodes: vec![0xB822], ..DecoderConfig::default() };
        let dispatcher = Dispatcher::with_config(&config);

        assert!(dispatcher.table().lookup(Opcode(0xB822)).is_none());
        assert_eq!(dispatcher.table().len(), DispatchTable::standard().len() - 1);

        let decoded = decode(&dispatcher, 0xB822, &[3, 0, 0, 0, 0x50, 0x01, 0xc0, 0xac, 0x05, 0, 0, 0, 0, 0]);
        assert_eq!(decoded.fallback().map(|f| f.reason), Some(FallbackReason::UnknownOpcode));
    }

    #[test]
    fn context_is_carried_through() {
        let timestamp = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        let decoded = Dispatcher::standard().decode(Opcode(0xB840), &[1, 2], timestamp, RadioId(2));

        assert_eq!(decoded.opcode, Opcode(0xB840));
        assert_eq!(decoded.timestamp, timestamp);
        assert_eq!(decoded.radio_id, RadioId(2));
        assert!(matches!(decoded.record(), Record::Opaque(_)));
    }

    #[test]
    fn short_version_prefix_is_malformed() {
        let decoded = decode(Dispatcher::standard(), 0xB821, &[9, 0]);
        let fallback = decoded.fallback().unwrap();
        assert_eq!(fallback.reason, FallbackReason::MalformedLength);
        assert_eq!(fallback.version, None);
    }

    #[test]
    fn hexdump_limit_applies_to_fallbacks() {
        let config = DecoderConfig { hexdump_limit: 2, ..DecoderConfig::default() };
        let dispatcher = Dispatcher::with_config(&config);

        let decoded = decode(&dispatcher, 0x7777, &[1, 2, 3, 4, 5]);
        assert_eq!(decoded.fallback().unwrap().hexdump, "01 02 …(+3 bytes)");
    }

    #[test]
    fn standard_table_is_built_once() {
        let first = Dispatcher::standard();
        let second = Dispatcher::default();
        let owned = Dispatcher::shared();

        assert!(Arc::ptr_eq(&first.table, &second.table));
        assert!(Arc::ptr_eq(&first.table, &owned.table));
        assert!(Arc::ptr_eq(&owned, &Dispatcher::shared()));
        assert!(std::ptr::eq(first.table(), DispatchTable::standard()));
    }

    #[test]
    fn edge_short_measurement_reports_no_version() {
        let capture = unhex(captures::EDGE_MEAS_8);
        let decoded = decode(Dispatcher::standard(), 0x0305, &capture[..19]);
        let fallback = decoded.fallback().unwrap();
        assert_eq!(fallback.reason, FallbackReason::MalformedLength);
        assert_eq!(fallback.version, None);
    }

    #[test]
    fn shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dispatcher>();
        assert_send_sync::<DispatchTable>();

        let dispatcher = Dispatcher::standard();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8u8)
                .map(|radio| {
                    scope.spawn(move || {
                        let payload = [5, 0, 0, 0, 1, 1, 12, 0xc0, 0xac, 0x05, 0, 0, 0];
                        dispatcher.decode(Opcode(0xB824), &payload, SystemTime::UNIX_EPOCH, RadioId(radio))
                    })
                })
                .collect();

            for handle in handles {
                let decoded = handle.join().unwrap();
                assert!(decoded.is_record());
                assert!(matches!(decoded.record(), Record::NrRrcCarrier(c) if c.nr_arfcn == 371_904));
            }
        });
    }
}
