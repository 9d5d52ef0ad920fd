use emv_card::{scan_card, PcscTransport, ReaderSelection};
use tracing::debug;

use crate::formatters::{format_result, FormatMode};

/// Read the card in the selected reader once and print the result
pub fn cmd_read(selection: &ReaderSelection, format_mode: FormatMode) -> bool {
    debug!(?selection, mode = format_mode.description(), "Reading card");

    let result = scan_card(&PcscTransport::new(), selection);
    println!("{}", format_result(&result, format_mode));
    result.is_ok()
}
