//! EMV protocol implementation

use emv_common::{find_tlv, get_tag_name, tags, PanRecord, Track2, Track2Error};
use tracing::{debug, info};

use crate::apdu::{commands, ApduCommand, ApduResponse};
use crate::error::{ScanError, TransportError};
use crate::transport::{CardChannel, ReaderSelection, Transport};

/// Known EMV Application Identifiers (AIDs)
pub mod aids {
    /// PSE (Payment System Environment)
    pub const PSE: &[u8] = b"1PAY.SYS.DDF01";
}

/// Short File Identifiers swept by `find_track2`
pub const SFI_RANGE: std::ops::RangeInclusive<u8> = 1..=10;
/// Record numbers read within each SFI
pub const RECORD_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// EMV card interface over a single card channel
pub struct EmvCard<C> {
    channel: C,
}

impl<C: CardChannel> EmvCard<C> {
    /// Create a new EMV card interface
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    fn exchange(&mut self, command: &ApduCommand) -> Result<ApduResponse, TransportError> {
        let response = self.channel.transmit(command)?;
        debug!(
            command = %hex::encode_upper(command.build()),
            status = %response.status_string(),
            len = response.data.len(),
            "APDU exchange"
        );
        Ok(response)
    }

    /// Send `command` and collect every byte the card announces via 61xx
    pub fn transmit_chained(&mut self, command: &ApduCommand) -> Result<Vec<u8>, TransportError> {
        let mut response = self.exchange(command)?;
        let mut data = std::mem::take(&mut response.data);

        while let Some(pending) = response.more_data() {
            response = self.exchange(&commands::get_response(pending))?;
            data.append(&mut response.data);
        }

        Ok(data)
    }

    /// Select the Payment System Environment and return its directory data
    pub fn select_pse(&mut self) -> Result<Vec<u8>, TransportError> {
        self.transmit_chained(&commands::select(aids::PSE))
    }

    /// Select an EMV application by AID
    pub fn select(&mut self, aid: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.transmit_chained(&commands::select(aid))
    }

    /// Read a single record, resending once with the card's Le on 6Cxx
    pub fn read_record(
        &mut self,
        record_number: u8,
        sfi: u8,
    ) -> Result<ApduResponse, TransportError> {
        let command = commands::read_record(record_number, sfi);
        let response = self.exchange(&command)?;

        match response.wrong_length() {
            Some(le) => self.exchange(&command.le(le)),
            None => Ok(response),
        }
    }

    /// Sweep SFI 1-10, records 1-10, stopping at the first usable Track 2
    ///
    /// Records without tag 57, or whose Track 2 has no separator, are
    /// skipped. A Track 2 with a truncated expiry ends the sweep with
    /// `ScanError::Decode`.
    pub fn find_track2(&mut self) -> Result<Option<Track2>, ScanError> {
        let tag = tags::TRACK_2_EQUIVALENT_DATA;

        for sfi in SFI_RANGE {
            for record_number in RECORD_RANGE {
                let response = self.read_record(record_number, sfi)?;
                if !response.is_success() {
                    continue;
                }

                let Some(raw) = find_tlv(&response.data, tag) else {
                    debug!(sfi, record = record_number, tag = get_tag_name(tag), "Tag absent");
                    continue;
                };

                match Track2::parse(raw) {
                    Ok(track2) => {
                        info!(
                            sfi,
                            record = record_number,
                            service_code = track2.service_code().unwrap_or("-"),
                            "Track 2 found"
                        );
                        return Ok(Some(track2));
                    }
                    Err(Track2Error::NoSeparator) => {
                        debug!(sfi, record = record_number, "No separator in Track 2, skipping");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        Ok(None)
    }

    /// Run the full sequence: PSE, application select, record sweep
    pub fn read_pan(&mut self) -> Result<PanRecord, ScanError> {
        let pse = self.select_pse()?;
        let tag = tags::APPLICATION_IDENTIFIER;
        let aid = find_tlv(&pse, tag).ok_or(ScanError::AidNotFound)?.to_vec();
        debug!(
            tag = get_tag_name(tag),
            aid = %hex::encode_upper(&aid),
            "Selecting application"
        );

        self.select(&aid)?;

        self.find_track2()?
            .map(Track2::into_pan_record)
            .ok_or(ScanError::Track2NotFound)
    }
}

/// Open a session on `transport`, connect to the selected reader and read the PAN
///
/// The session and channel are dropped before returning on every path.
pub fn scan_card<T: Transport>(
    transport: &T,
    selection: &ReaderSelection,
) -> Result<PanRecord, ScanError> {
    let session = transport.establish_session()?;
    let readers = transport.list_readers(&session)?;

    if readers.is_empty() {
        return Err(ScanError::NoReader);
    }

    let reader_name = selection.choose(&readers).ok_or_else(|| match selection {
        ReaderSelection::Named(name) => ScanError::ReaderNotFound(name.clone()),
        ReaderSelection::First => ScanError::NoReader,
    })?;
    debug!(reader = %reader_name, "Connecting to card");

    let channel = transport.open_card_channel(&session, reader_name)?;
    EmvCard::new(channel).read_pan()
}

/// `scan_card` rendered to the user-facing message
pub fn read_card_pan<T: Transport>(transport: &T, selection: &ReaderSelection) -> String {
    match scan_card(transport, selection) {
        Ok(record) => record.to_string(),
        Err(err) => err.to_string(),
    }
}
