//! PC/SC card reader management

use std::ffi::CString;

use pcsc::{Card, Context, Protocols, Scope, ShareMode, MAX_BUFFER_SIZE};
use tracing::trace;

use crate::apdu::{ApduCommand, ApduResponse};
use crate::error::TransportError;
use crate::transport::{CardChannel, Transport};

/// `Transport` backed by the system PC/SC service
#[derive(Debug, Clone, Copy, Default)]
pub struct PcscTransport;

impl PcscTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for PcscTransport {
    type Session = Context;
    type Channel = PcscCard;

    fn establish_session(&self) -> Result<Context, TransportError> {
        Ok(Context::establish(Scope::User)?)
    }

    fn list_readers(&self, context: &Context) -> Result<Vec<String>, TransportError> {
        let mut readers_buf = [0; 2048];
        let readers = match context.list_readers(&mut readers_buf) {
            Ok(readers) => readers,
            Err(pcsc::Error::NoReadersAvailable) => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        Ok(readers
            .map(|r| r.to_string_lossy().into_owned())
            .collect())
    }

    fn open_card_channel(
        &self,
        context: &Context,
        reader_name: &str,
    ) -> Result<PcscCard, TransportError> {
        let reader = CString::new(reader_name)
            .map_err(|_| TransportError::InvalidReaderName(reader_name.to_string()))?;
        let card = context.connect(&reader, ShareMode::Shared, Protocols::ANY)?;
        Ok(PcscCard { card })
    }
}

/// Card connected through PC/SC, disconnected on drop
pub struct PcscCard {
    card: Card,
}

impl CardChannel for PcscCard {
    fn transmit(&mut self, command: &ApduCommand) -> Result<ApduResponse, TransportError> {
        send_apdu(&self.card, &command.build())
    }
}

/// Send raw APDU bytes to the card and return the response
pub fn send_apdu(card: &Card, apdu: &[u8]) -> Result<ApduResponse, TransportError> {
    let mut rapdu_buf = [0; MAX_BUFFER_SIZE];
    let rapdu = card.transmit(apdu, &mut rapdu_buf)?;
    trace!(
        command = %hex::encode_upper(apdu),
        response = %hex::encode_upper(rapdu),
        "PC/SC transmit"
    );

    ApduResponse::from_bytes(rapdu)
}
