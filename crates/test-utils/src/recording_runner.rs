use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assetpipe::dag::Unit;
use assetpipe::engine::{UnitFuture, UnitRunner};
use assetpipe::errors::AssetpipeError;

/// Something the runner observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start(Unit),
    End(Unit),
}

/// A fake runner that:
/// - records when every unit starts and ends
/// - optionally sleeps or fails for selected units
///
/// It never touches the filesystem.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    events: Arc<Mutex<Vec<Event>>>,
    delays: HashMap<Unit, Duration>,
    failures: Vec<Unit>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, unit: Unit, delay: Duration) -> Self {
        self.delays.insert(unit, delay);
        self
    }

    pub fn fail(mut self, unit: Unit) -> Self {
        self.failures.push(unit);
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<Unit> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Start(u) => Some(u),
                Event::End(_) => None,
            })
            .collect()
    }

    /// Index of the `nth` occurrence of `event`.
    pub fn position(&self, event: Event, nth: usize) -> Option<usize> {
        self.events()
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == event)
            .nth(nth)
            .map(|(i, _)| i)
    }

    pub fn count(&self, event: Event) -> usize {
        self.events().iter().filter(|e| **e == event).count()
    }
}

impl UnitRunner for RecordingRunner {
    fn run(&self, unit: Unit) -> UnitFuture {
        let events = Arc::clone(&self.events);
        let delay = self.delays.get(&unit).copied();
        let fail = self.failures.contains(&unit);

        Box::pin(async move {
            events.lock().unwrap().push(Event::Start(unit));
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if fail {
                return Err(AssetpipeError::ConfigError(format!("{unit} failed on purpose")));
            }
            events.lock().unwrap().push(Event::End(unit));
            Ok(())
        })
    }
}
