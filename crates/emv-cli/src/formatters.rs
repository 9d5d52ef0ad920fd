//! Output formatting for scan results

use clap::ValueEnum;
use emv_card::{PanRecord, ScanError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatMode {
    /// Full PAN, as read from the card
    Plain,
    /// PAN with all but the first six and last four digits hidden
    Masked,
}

impl FormatMode {
    pub fn description(&self) -> &'static str {
        match self {
            FormatMode::Plain => "Plain",
            FormatMode::Masked => "Masked",
        }
    }
}

/// Render a scan outcome as a single line
pub fn format_result(result: &Result<PanRecord, ScanError>, mode: FormatMode) -> String {
    match result {
        Ok(record) if mode == FormatMode::Masked => {
            format!("PAN: {}, Expiry: {}", mask_pan(&record.pan), record.expiry)
        }
        Ok(record) => record.to_string(),
        Err(err) => err.to_string(),
    }
}

/// Mask the middle of a PAN, keeping the BIN and the last four digits
pub fn mask_pan(pan: &str) -> String {
    if pan.len() <= 10 {
        return "*".repeat(pan.len());
    }

    let (head, rest) = pan.split_at(6);
    let (middle, tail) = rest.split_at(rest.len() - 4);
    format!("{}{}{}", head, "*".repeat(middle.len()), tail)
}
