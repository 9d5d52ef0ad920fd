//! Track 2 Equivalent Data (tag 57) decoding
//!
//! Track 2 is a nibble string of the form
//! `<PAN>D<YYMM><service code><discretionary data>`, optionally padded with a
//! trailing `F` nibble.

use std::fmt;

/// Field separator nibble between the PAN and the expiry date
pub const SEPARATOR: char = 'D';

/// Card expiry as the two-digit year and month taken from Track 2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiry {
    pub year: String,
    pub month: String,
}

impl fmt::Display for Expiry {
    /// Years are assumed to fall in 2000-2099
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "20{}/{}", self.year, self.month)
    }
}

/// PAN and expiry extracted from a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanRecord {
    /// PAN digits as read, including any `F` padding nibble
    pub pan: String,
    pub expiry: Expiry,
}

impl fmt::Display for PanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PAN: {}, Expiry: {}", self.pan, self.expiry)
    }
}

/// Decoded Track 2 Equivalent Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track2 {
    pub pan: String,
    pub expiry: Expiry,
    /// Everything after the expiry: service code, discretionary data, padding
    pub remainder: String,
}

/// Why a tag 57 value could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Track2Error {
    #[error("Track 2 has no field separator")]
    NoSeparator,
    #[error("Track 2 expiry field too short: {0:?}")]
    ShortExpiry(String),
}

impl Track2 {
    /// Parse the raw value of tag 57.
    ///
    /// The expiry is the first four nibbles of the field between the first
    /// and second `D`; a shorter field is rejected.
    pub fn parse(raw: &[u8]) -> Result<Self, Track2Error> {
        let hex_str = hex::encode_upper(raw);
        let (pan, rest) = hex_str
            .split_once(SEPARATOR)
            .ok_or(Track2Error::NoSeparator)?;

        let field = rest.split(SEPARATOR).next().unwrap_or_default();
        let yymm = field
            .get(..4)
            .ok_or_else(|| Track2Error::ShortExpiry(field.to_string()))?;

        Ok(Self {
            pan: pan.to_string(),
            expiry: Expiry {
                year: yymm[..2].to_string(),
                month: yymm[2..].to_string(),
            },
            remainder: rest[4..].to_string(),
        })
    }

    /// Three-digit service code, when present
    pub fn service_code(&self) -> Option<&str> {
        self.remainder.get(..3)
    }

    pub fn into_pan_record(self) -> PanRecord {
        PanRecord {
            pan: self.pan,
            expiry: self.expiry,
        }
    }
}
