//! APDU (Application Protocol Data Unit) command handling

use crate::error::TransportError;

/// SW1 value for normal completion
pub const SW1_SUCCESS: u8 = 0x90;
/// SW1 value announcing SW2 bytes waiting for GET RESPONSE
pub const SW1_MORE_DATA: u8 = 0x61;
/// SW1 value rejecting Le, SW2 carries the correct length
pub const SW1_WRONG_LENGTH: u8 = 0x6C;

/// APDU response containing data and status word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduResponse {
    /// Response data (without status word)
    pub data: Vec<u8>,
    /// Status word SW1
    pub sw1: u8,
    /// Status word SW2
    pub sw2: u8,
}

impl ApduResponse {
    pub fn new(data: Vec<u8>, sw1: u8, sw2: u8) -> Self {
        Self { data, sw1, sw2 }
    }

    /// Split a raw response into data and the trailing status word
    pub fn from_bytes(rapdu: &[u8]) -> Result<Self, TransportError> {
        if rapdu.len() < 2 {
            return Err(TransportError::ShortResponse(rapdu.len()));
        }

        let (data, sw) = rapdu.split_at(rapdu.len() - 2);
        Ok(Self {
            data: data.to_vec(),
            sw1: sw[0],
            sw2: sw[1],
        })
    }

    /// Check if the response indicates success (SW1 = 90)
    pub fn is_success(&self) -> bool {
        self.sw1 == SW1_SUCCESS
    }

    /// Number of bytes the card holds for GET RESPONSE (SW1 = 61)
    pub fn more_data(&self) -> Option<u8> {
        (self.sw1 == SW1_MORE_DATA).then_some(self.sw2)
    }

    /// Le the card expects instead of the one sent (SW1 = 6C)
    pub fn wrong_length(&self) -> Option<u8> {
        (self.sw1 == SW1_WRONG_LENGTH).then_some(self.sw2)
    }

    /// Get the full status word as a 16-bit value
    pub fn status_word(&self) -> u16 {
        ((self.sw1 as u16) << 8) | (self.sw2 as u16)
    }

    /// Get status word as hex string (e.g., "9000")
    pub fn status_string(&self) -> String {
        format!("{:02X}{:02X}", self.sw1, self.sw2)
    }
}

/// APDU command builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduCommand {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
    pub le: Option<u8>,
}

impl ApduCommand {
    /// Create a new APDU command
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Vec::new(),
            le: None,
        }
    }

    /// Set command data
    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Set expected response length
    pub fn le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Build the APDU command bytes
    pub fn build(&self) -> Vec<u8> {
        let mut apdu = vec![self.cla, self.ins, self.p1, self.p2];

        if !self.data.is_empty() {
            apdu.push(self.data.len() as u8);
            apdu.extend_from_slice(&self.data);
        }

        if let Some(le) = self.le {
            apdu.push(le);
        }

        apdu
    }
}

/// Commands issued while scanning for Track 2
pub mod commands {
    use super::ApduCommand;

    pub const INS_SELECT: u8 = 0xA4;
    pub const INS_GET_RESPONSE: u8 = 0xC0;
    pub const INS_READ_RECORD: u8 = 0xB2;

    /// SELECT command (by name/AID), ISO case 3
    pub fn select(name: &[u8]) -> ApduCommand {
        ApduCommand::new(0x00, INS_SELECT, 0x04, 0x00).data(name.to_vec())
    }

    /// GET RESPONSE for bytes announced by a 61xx status
    pub fn get_response(le: u8) -> ApduCommand {
        ApduCommand::new(0x00, INS_GET_RESPONSE, 0x00, 0x00).le(le)
    }

    /// READ RECORD command by absolute record number within an SFI
    pub fn read_record(record_number: u8, sfi: u8) -> ApduCommand {
        let p2 = (sfi << 3) | 0x04;
        ApduCommand::new(0x00, INS_READ_RECORD, record_number, p2).le(0x00)
    }
}
