use hdf5::types::TypeDescriptor;
use hdf5::{Dataset, File, Group};
use std::path::Path;

use super::constants::N_EVENTS_ATTR;
use super::error::EventStoreError;
use super::event_store::{EventRecord, EventStore};

/// An EventStore backed by an HDF5 file.
///
/// The event table is a group holding one subgroup per record. Store order is the index in the
/// subgroup name, and the number of records is an attribute on the table.
///
/// ```text
/// store.h5
/// EventTree - n_events
/// |---- event_#
/// |    |---- event_n(dset)
/// |    |---- FERS_Board<B>_energyHG_<C>(scalar dset)
/// |    |---- FERS_Board<B>_energyHG(1-D dset)
/// ```
///
/// Only integer datasets are fields of a record. Anything else stored alongside the readings
/// (run tags, compound metadata) is skipped.
///
/// Dropping the store closes the file.
#[derive(Debug)]
pub struct Hdf5EventStore {
    file_handle: File,
    table: Group,
    table_name: String,
    id_field: String,
    n_events: usize,
}

impl Hdf5EventStore {
    /// Open the store at path and check that the event table exists
    pub fn open(path: &Path, table_name: &str, id_field: &str) -> Result<Self, EventStoreError> {
        if !path.exists() {
            return Err(EventStoreError::BadFilePath(path.to_path_buf()));
        }
        let file_handle = File::open(path)?;
        if let Ok(meta) = path.metadata() {
            spdlog::info!(
                "Opened event store {} with size {}",
                path.to_string_lossy(),
                human_bytes::human_bytes(meta.len() as f64)
            );
        }

        if !file_handle.link_exists(table_name) {
            return Err(EventStoreError::MissingTable(table_name.to_string()));
        }
        let table = file_handle
            .group(table_name)
            .map_err(|_| EventStoreError::MissingTable(table_name.to_string()))?;
        let n_events = table
            .attr(N_EVENTS_ATTR)
            .map_err(|_| EventStoreError::MissingEntry(format!("{table_name}:{N_EVENTS_ATTR}")))?
            .read_scalar::<u64>()? as usize;
        spdlog::debug!("Event table {table_name} holds {n_events} records");

        Ok(Self {
            file_handle,
            table,
            table_name: table_name.to_string(),
            id_field: id_field.to_string(),
            n_events,
        })
    }

    pub fn file_name(&self) -> String {
        self.file_handle.filename()
    }

    fn event_group(&self, index: usize) -> Result<Group, EventStoreError> {
        if index >= self.n_events {
            return Err(EventStoreError::IndexOutOfRange(index));
        }
        let name = format!("event_{index}");
        if !self.table.link_exists(&name) {
            return Err(EventStoreError::MissingEntry(format!(
                "{}/{}",
                self.table_name, name
            )));
        }
        Ok(self.table.group(&name)?)
    }
}

/// Identifiers and readings are always integers
fn is_integer(dset: &Dataset) -> bool {
    matches!(
        dset.dtype().and_then(|dtype| dtype.to_descriptor()),
        Ok(TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_))
    )
}

impl EventStore for Hdf5EventStore {
    fn len(&self) -> usize {
        self.n_events
    }

    fn event_number(&self, index: usize) -> Result<i64, EventStoreError> {
        let missing = || EventStoreError::MissingEventId {
            index,
            field: self.id_field.clone(),
        };
        let group = self.event_group(index)?;
        if !group.link_exists(&self.id_field) {
            return Err(missing());
        }
        let dset = group.dataset(&self.id_field).map_err(|_| missing())?;
        if !dset.is_scalar() || !is_integer(&dset) {
            return Err(missing());
        }
        Ok(dset.read_scalar::<i64>()?)
    }

    fn read_record(&self, index: usize) -> Result<EventRecord, EventStoreError> {
        let group = self.event_group(index)?;
        let mut record = EventRecord::new();
        for name in group.member_names()? {
            // Anything that is not a dataset is not a field
            let dset = match group.dataset(&name) {
                Ok(d) => d,
                Err(_) => continue,
            };
            if !is_integer(&dset) {
                spdlog::debug!("Skipping non-integer dataset {name} in record {index}");
                continue;
            }
            if dset.is_scalar() {
                record.insert_scalar(&name, dset.read_scalar::<i64>()?);
            } else {
                record.insert_array(&name, dset.read_raw::<i64>()?);
            }
        }
        Ok(record)
    }
}
