use emv_card::{PcscTransport, Transport, TransportError};

fn list_readers() -> Result<Vec<String>, TransportError> {
    let transport = PcscTransport::new();
    let context = transport.establish_session()?;
    transport.list_readers(&context)
}

pub fn cmd_readers() -> bool {
    match list_readers() {
        Ok(readers) if readers.is_empty() => {
            println!("No smart card readers found.");
            false
        }
        Ok(readers) => {
            for reader in readers {
                println!("{}", reader);
            }
            true
        }
        Err(err) => {
            eprintln!("Failed to list readers: {}", err);
            false
        }
    }
}
