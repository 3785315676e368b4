use fxhash::FxHashMap;

use super::constants::DEFAULT_EVENT_ID_FIELD;
use super::error::EventStoreError;

/// The value of a single field in an event record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(i64),
    Array(Vec<i64>),
}

/// EventRecord is one located event, fully read into memory.
///
/// A record is a bag of named fields. Depending on how the store was written, a board's readings
/// are either one scalar field per channel or a single array field per board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    fields: FxHashMap<String, FieldValue>,
}

impl EventRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn insert_scalar(&mut self, name: &str, value: i64) {
        self.insert(name, FieldValue::Scalar(value));
    }

    pub fn insert_array(&mut self, name: &str, values: Vec<i64>) {
        self.insert(name, FieldValue::Array(values));
    }

    /// Get a scalar field. Returns None if the field is absent or is not a scalar
    pub fn scalar(&self, name: &str) -> Option<i64> {
        match self.fields.get(name) {
            Some(FieldValue::Scalar(value)) => Some(*value),
            _ => None,
        }
    }

    /// Get an array field. Returns None if the field is absent or is not an array
    pub fn array(&self, name: &str) -> Option<&[i64]> {
        match self.fields.get(name) {
            Some(FieldValue::Array(values)) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// EventStore is the narrow view of an event file needed to find and read one event.
///
/// Records are addressed by their index in store order, which must be the order the records were
/// written in.
pub trait EventStore {
    /// Number of records in the store
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The event identifier of the record at index
    fn event_number(&self, index: usize) -> Result<i64, EventStoreError>;

    /// Read the complete record at index
    fn read_record(&self, index: usize) -> Result<EventRecord, EventStoreError>;
}

/// An EventStore held entirely in memory, in insertion order.
///
/// Used as the store in unit tests of the locator and the reconstruction, and by callers that
/// assemble records themselves rather than reading them from a file.
#[derive(Debug, Clone)]
pub struct MemoryEventStore {
    id_field: String,
    records: Vec<EventRecord>,
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_ID_FIELD)
    }
}

impl MemoryEventStore {
    pub fn new(id_field: &str) -> Self {
        Self {
            id_field: id_field.to_string(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: EventRecord) {
        self.records.push(record);
    }
}

impl EventStore for MemoryEventStore {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn event_number(&self, index: usize) -> Result<i64, EventStoreError> {
        self.records
            .get(index)
            .ok_or(EventStoreError::IndexOutOfRange(index))?
            .scalar(&self.id_field)
            .ok_or_else(|| EventStoreError::MissingEventId {
                index,
                field: self.id_field.clone(),
            })
    }

    fn read_record(&self, index: usize) -> Result<EventRecord, EventStoreError> {
        self.records
            .get(index)
            .cloned()
            .ok_or(EventStoreError::IndexOutOfRange(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_shapes() {
        let mut record = EventRecord::new();
        record.insert_scalar("event_n", 4);
        record.insert_array("FERS_Board1_energyHG", vec![1, 2, 3]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.scalar("event_n"), Some(4));
        assert_eq!(record.array("event_n"), None);
        assert_eq!(record.array("FERS_Board1_energyHG"), Some(&[1, 2, 3][..]));
        assert_eq!(record.scalar("FERS_Board1_energyHG"), None);
        assert_eq!(record.array("FERS_Board2_energyHG"), None);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryEventStore::default();
        let mut record = EventRecord::new();
        record.insert_scalar("event_n", 17);
        store.push(record.clone());
        store.push(EventRecord::new());

        assert_eq!(store.len(), 2);
        assert_eq!(store.event_number(0).expect("has id"), 17);
        assert!(matches!(
            store.event_number(1),
            Err(EventStoreError::MissingEventId { index: 1, .. })
        ));
        assert!(matches!(
            store.read_record(2),
            Err(EventStoreError::IndexOutOfRange(2))
        ));
        assert_eq!(store.read_record(0).expect("in range"), record);
    }
}
