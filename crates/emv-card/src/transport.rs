//! Seam between the record scanner and whatever carries APDUs to the card

use crate::apdu::{ApduCommand, ApduResponse};
use crate::error::TransportError;

/// A connected card: one command in, one response out
pub trait CardChannel {
    fn transmit(&mut self, command: &ApduCommand) -> Result<ApduResponse, TransportError>;
}

impl<C: CardChannel + ?Sized> CardChannel for &mut C {
    fn transmit(&mut self, command: &ApduCommand) -> Result<ApduResponse, TransportError> {
        (**self).transmit(command)
    }
}

/// Reader subsystem that hands out card channels
///
/// Sessions and channels release their resources when dropped.
pub trait Transport {
    type Session;
    type Channel: CardChannel;

    fn establish_session(&self) -> Result<Self::Session, TransportError>;

    /// Reader names in enumeration order
    fn list_readers(&self, session: &Self::Session) -> Result<Vec<String>, TransportError>;

    fn open_card_channel(
        &self,
        session: &Self::Session,
        reader_name: &str,
    ) -> Result<Self::Channel, TransportError>;
}

/// Which enumerated reader to scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReaderSelection {
    /// First reader in enumeration order
    #[default]
    First,
    /// Reader with exactly this name
    Named(String),
}

impl ReaderSelection {
    pub fn from_name(name: Option<String>) -> Self {
        name.map_or(Self::First, Self::Named)
    }

    /// Pick a reader out of `readers`
    pub fn choose<'a>(&self, readers: &'a [String]) -> Option<&'a str> {
        match self {
            Self::First => readers.first(),
            Self::Named(name) => readers.iter().find(|r| *r == name),
        }
        .map(String::as_str)
    }
}
