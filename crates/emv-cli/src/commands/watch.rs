use std::time::Duration;

use emv_card::{scan_card, CardEvent, CardMonitor, PcscTransport, ReaderSelection, Transport};
use tracing::info;

use crate::formatters::{format_result, FormatMode};

/// Scan every card inserted into the watched readers until interrupted
pub fn cmd_watch(selection: &ReaderSelection, format_mode: FormatMode, poll: Duration) -> bool {
    let transport = PcscTransport::new();
    let readers = match transport
        .establish_session()
        .and_then(|context| transport.list_readers(&context))
    {
        Ok(readers) => readers,
        Err(err) => {
            eprintln!("Failed to establish PC/SC context: {}", err);
            return false;
        }
    };

    let watched: Vec<String> = match selection {
        ReaderSelection::First => readers,
        ReaderSelection::Named(name) => readers.into_iter().filter(|r| r == name).collect(),
    };
    if watched.is_empty() {
        println!("No smart card readers found.");
        return false;
    }

    let (mut monitor, events) = match CardMonitor::spawn(&watched, poll) {
        Ok(monitor) => monitor,
        Err(err) => {
            eprintln!("Failed to start card monitor: {}", err);
            return false;
        }
    };

    println!("Waiting for cards on {} reader(s)...", watched.len());
    for event in events {
        match event {
            CardEvent::Present(reader_name) => {
                info!(reader = %reader_name, "Card inserted");
                let selection = ReaderSelection::Named(reader_name.clone());
                let result = scan_card(&transport, &selection);
                println!("[{}] {}", reader_name, format_result(&result, format_mode));
            }
            CardEvent::Absent(reader_name) => {
                info!(reader = %reader_name, "Card removed");
            }
        }
    }

    // The event channel closes once the monitor thread exits
    match monitor.stop() {
        Ok(()) => true,
        Err(err) => {
            eprintln!("Card monitor stopped: {}", err);
            false
        }
    }
}
