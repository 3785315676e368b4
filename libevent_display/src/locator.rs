use serde::{Deserialize, Serialize};

use super::error::LocatorError;
use super::event_store::{EventRecord, EventStore};

/// How the EventLocator searches a store. Both give the same record for the same store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateStrategy {
    /// Walk the records in store order and stop at the first match
    #[default]
    Scan,
    /// Evaluate the identifier of every record, count the matches, and take the first
    Filter,
}

/// EventLocator finds the record of a requested event in an EventStore.
///
/// Identifiers are not checked for uniqueness; when several records share an identifier the one
/// earliest in store order is returned.
#[derive(Debug, Clone, Default)]
pub struct EventLocator {
    strategy: LocateStrategy,
}

impl EventLocator {
    pub fn new(strategy: LocateStrategy) -> Self {
        Self { strategy }
    }

    /// Find the index of the record with the given event identifier
    pub fn find_index<S: EventStore + ?Sized>(
        &self,
        store: &S,
        event: i64,
    ) -> Result<usize, LocatorError> {
        match self.strategy {
            LocateStrategy::Scan => {
                for index in 0..store.len() {
                    if store.event_number(index)? == event {
                        return Ok(index);
                    }
                }
                Err(LocatorError::NotFound(event))
            }
            LocateStrategy::Filter => {
                let mut matches = Vec::new();
                for index in 0..store.len() {
                    if store.event_number(index)? == event {
                        matches.push(index);
                    }
                }
                if matches.len() > 1 {
                    spdlog::debug!(
                        "Event {event} matched {} records; using the first",
                        matches.len()
                    );
                }
                matches
                    .first()
                    .copied()
                    .ok_or(LocatorError::NotFound(event))
            }
        }
    }

    /// Find and read the record with the given event identifier
    pub fn locate<S: EventStore + ?Sized>(
        &self,
        store: &S,
        event: i64,
    ) -> Result<EventRecord, LocatorError> {
        let index = self.find_index(store, event)?;
        spdlog::info!("Found event {event} at store index {index}");
        Ok(store.read_record(index)?)
    }
}
