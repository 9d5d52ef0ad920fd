//! In-memory card and reader doubles for driving the scanner without hardware

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use emv_card::apdu::commands::{INS_READ_RECORD, INS_SELECT};
use emv_card::protocol::aids;
use emv_card::{ApduCommand, ApduResponse, CardChannel, Transport, TransportError};

pub type Responder = Box<dyn FnMut(&ApduCommand) -> Result<ApduResponse, TransportError>>;
pub type CommandLog = Rc<RefCell<Vec<ApduCommand>>>;
pub type DropCount = Rc<Cell<usize>>;

pub const VISA_AID: [u8; 7] = [0xA0, 0x00, 0x00, 0x00, 0x03, 0x10, 0x10];
pub const VISA_TRACK2: &str = "4111111111111111D25121010000000F";

pub fn ok(data: Vec<u8>) -> ApduResponse {
    ApduResponse::new(data, 0x90, 0x00)
}

pub fn record_not_found() -> ApduResponse {
    ApduResponse::new(Vec::new(), 0x6A, 0x83)
}

pub fn tlv(tag: u8, value: &[u8]) -> Vec<u8> {
    let mut out = vec![tag, value.len() as u8];
    out.extend_from_slice(value);
    out
}

/// Card that answers through a closure and logs every command it receives
pub struct ScriptedCard {
    respond: Responder,
    log: CommandLog,
    dropped: DropCount,
}

impl ScriptedCard {
    pub fn new(respond: Responder) -> Self {
        Self {
            respond,
            log: CommandLog::default(),
            dropped: DropCount::default(),
        }
    }

    /// Answer commands with `responses` in order
    pub fn sequence(responses: Vec<ApduResponse>) -> Self {
        let mut queue = VecDeque::from(responses);
        Self::new(Box::new(move |_: &ApduCommand| {
            queue
                .pop_front()
                .ok_or_else(|| TransportError::Io("script exhausted".into()))
        }))
    }

    pub fn log(&self) -> CommandLog {
        Rc::clone(&self.log)
    }
}

impl Drop for ScriptedCard {
    fn drop(&mut self) {
        self.dropped.set(self.dropped.get() + 1);
    }
}

impl CardChannel for ScriptedCard {
    fn transmit(&mut self, command: &ApduCommand) -> Result<ApduResponse, TransportError> {
        self.log.borrow_mut().push(command.clone());
        (self.respond)(command)
    }
}

/// Payment card exposing one application and, optionally, one Track 2 record
pub fn payment_card(aid: Vec<u8>, track2_at: Option<(u8, u8, Vec<u8>)>) -> Responder {
    Box::new(move |cmd: &ApduCommand| {
        Ok(match cmd.ins {
            INS_SELECT if cmd.data == aids::PSE => {
                let mut data = tlv(0x50, b"VISA CREDIT");
                data.extend(tlv(0x4F, &aid));
                ok(data)
            }
            INS_SELECT => ok(tlv(0x6F, &tlv(0x84, &cmd.data))),
            INS_READ_RECORD => match &track2_at {
                Some((sfi, record, data)) if cmd.p2 >> 3 == *sfi && cmd.p1 == *record => {
                    ok(tlv(0x57, data))
                }
                _ => record_not_found(),
            },
            _ => ApduResponse::new(Vec::new(), 0x6D, 0x00),
        })
    })
}

/// Session handle that counts its own release
pub struct FakeSession {
    dropped: DropCount,
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.dropped.set(self.dropped.get() + 1);
    }
}

/// Reader subsystem with a fixed reader list and a single card behind it
pub struct FakeTransport {
    readers: Vec<String>,
    establish_error: Option<String>,
    card: RefCell<Option<Responder>>,
    log: CommandLog,
    pub opened: RefCell<Vec<String>>,
    pub sessions_established: Cell<usize>,
    pub sessions_dropped: DropCount,
    pub channels_dropped: DropCount,
}

impl FakeTransport {
    pub fn new(readers: &[&str], card: Responder) -> Self {
        Self {
            readers: readers.iter().map(|r| r.to_string()).collect(),
            establish_error: None,
            card: RefCell::new(Some(card)),
            log: CommandLog::default(),
            opened: RefCell::new(Vec::new()),
            sessions_established: Cell::new(0),
            sessions_dropped: DropCount::default(),
            channels_dropped: DropCount::default(),
        }
    }

    pub fn with_card(card: Responder) -> Self {
        Self::new(&["Test Reader 00 00"], card)
    }

    pub fn failing(message: &str) -> Self {
        let mut transport = Self::with_card(payment_card(VISA_AID.to_vec(), None));
        transport.establish_error = Some(message.to_string());
        transport
    }

    pub fn commands(&self) -> Vec<ApduCommand> {
        self.log.borrow().clone()
    }

    /// Panic unless every session and channel handed out has been dropped
    pub fn assert_released(&self, channels: usize) {
        assert_eq!(self.sessions_established.get(), 1);
        assert_eq!(self.sessions_dropped.get(), 1);
        assert_eq!(self.channels_dropped.get(), channels);
    }
}

impl Transport for FakeTransport {
    type Session = FakeSession;
    type Channel = ScriptedCard;

    fn establish_session(&self) -> Result<FakeSession, TransportError> {
        if let Some(message) = &self.establish_error {
            return Err(TransportError::Io(message.clone()));
        }

        self.sessions_established.set(self.sessions_established.get() + 1);
        Ok(FakeSession {
            dropped: Rc::clone(&self.sessions_dropped),
        })
    }

    fn list_readers(&self, _session: &FakeSession) -> Result<Vec<String>, TransportError> {
        Ok(self.readers.clone())
    }

    fn open_card_channel(
        &self,
        _session: &FakeSession,
        reader_name: &str,
    ) -> Result<ScriptedCard, TransportError> {
        self.opened.borrow_mut().push(reader_name.to_string());
        let respond = self
            .card
            .borrow_mut()
            .take()
            .ok_or_else(|| TransportError::Io("card already opened".into()))?;

        Ok(ScriptedCard {
            respond,
            log: Rc::clone(&self.log),
            dropped: Rc::clone(&self.channels_dropped),
        })
    }
}
