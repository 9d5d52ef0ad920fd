//! EMV Card - Smart card reading and EMV protocol implementation
//!
//! This crate drives the APDU exchange with an EMV payment card to locate
//! its payment application, sweep its records for Track 2 Equivalent Data
//! and derive the PAN and expiry. PC/SC access sits behind the `Transport`
//! and `CardChannel` traits so the protocol can run against any channel.

pub mod apdu;
pub mod error;
pub mod monitor;
pub mod protocol;
pub mod reader;
pub mod transport;

pub use apdu::{ApduCommand, ApduResponse};
pub use error::{ScanError, TransportError};
pub use monitor::{CardEvent, CardMonitor, PresenceTracker};
pub use protocol::{read_card_pan, scan_card, EmvCard};
pub use reader::{PcscCard, PcscTransport};
pub use transport::{CardChannel, ReaderSelection, Transport};

pub use emv_common::{Expiry, PanRecord, Track2, Track2Error};
