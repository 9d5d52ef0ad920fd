//! Card insertion and removal notifications

use std::collections::HashMap;
use std::ffi::CString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pcsc::{Context, ReaderState, Scope, State};
use tracing::{debug, info, warn};

use crate::error::TransportError;

/// Presence change on one reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardEvent {
    /// A card was inserted into the named reader
    Present(String),
    /// The card was removed from the named reader
    Absent(String),
}

/// Turns per-reader presence observations into transition events
#[derive(Debug, Default)]
pub struct PresenceTracker {
    present: HashMap<String, bool>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current state of `reader`, returning an event if it changed.
    ///
    /// A reader first seen empty produces no event.
    pub fn observe(&mut self, reader: &str, present: bool) -> Option<CardEvent> {
        let was_present = self.present.insert(reader.to_string(), present).unwrap_or(false);

        match (was_present, present) {
            (false, true) => Some(CardEvent::Present(reader.to_string())),
            (true, false) => Some(CardEvent::Absent(reader.to_string())),
            _ => None,
        }
    }

    pub fn is_present(&self, reader: &str) -> bool {
        self.present.get(reader).copied().unwrap_or(false)
    }
}

/// Background thread watching a fixed set of PC/SC readers
pub struct CardMonitor {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<Result<(), pcsc::Error>>>,
}

impl CardMonitor {
    /// Start watching `readers`, waking at least every `poll` to check for stop
    pub fn spawn(
        readers: &[String],
        poll: Duration,
    ) -> Result<(Self, Receiver<CardEvent>), TransportError> {
        let context = Context::establish(Scope::User)?;
        let names = readers
            .iter()
            .map(|name| {
                CString::new(name.as_str())
                    .map_err(|_| TransportError::InvalidReaderName(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (event_tx, event_rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let mut states: Vec<ReaderState> = names
                .into_iter()
                .map(|name| ReaderState::new(name, State::UNAWARE))
                .collect();
            run(&context, &mut states, poll, &thread_stop, &event_tx)
        });

        Ok((
            Self {
                stop,
                handle: Some(handle),
            },
            event_rx,
        ))
    }

    /// Ask the thread to exit and wait for it
    ///
    /// Returns the PC/SC error that stopped the thread early, if any.
    pub fn stop(&mut self) -> Result<(), TransportError> {
        self.stop.store(true, Ordering::Relaxed);
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        match handle.join() {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!("Card monitor thread panicked");
                Err(TransportError::Io("card monitor thread panicked".into()))
            }
        }
    }
}

impl Drop for CardMonitor {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            debug!(error = %err, "Card monitor ended with error");
        }
    }
}

fn run(
    context: &Context,
    states: &mut [ReaderState],
    poll: Duration,
    stop: &AtomicBool,
    event_tx: &Sender<CardEvent>,
) -> Result<(), pcsc::Error> {
    info!(readers = states.len(), "Card monitor started");
    let mut tracker = PresenceTracker::new();

    while !stop.load(Ordering::Relaxed) {
        match context.get_status_change(poll, states) {
            Ok(()) => {}
            Err(pcsc::Error::Timeout) => continue,
            Err(err) => {
                warn!(error = %err, "Card monitor stopped on PC/SC error");
                return Err(err);
            }
        }

        for state in states.iter_mut() {
            let reader = state.name().to_string_lossy().into_owned();
            let present = state.event_state().contains(State::PRESENT);
            state.sync_current_state();

            if let Some(event) = tracker.observe(&reader, present) {
                debug!(?event, "Card presence changed");
                if event_tx.send(event).is_err() {
                    debug!("Event receiver dropped");
                    return Ok(());
                }
            }
        }
    }

    info!("Card monitor stopped");
    Ok(())
}
