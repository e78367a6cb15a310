// Bounded record buffer - most recent records in arrival order
use super::telemetry::TelemetryRecord;
use std::collections::VecDeque;

pub const DEFAULT_MAX_RECORDS: usize = 20;

#[derive(Debug, Clone)]
pub struct RecordBuffer {
    records: VecDeque<TelemetryRecord>,
    capacity: usize,
}

impl RecordBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, dropping the oldest ones once the buffer is full
    pub fn push(&mut self, record: TelemetryRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TelemetryRecord> + Clone {
        self.records.iter()
    }

    pub fn to_vec(&self) -> Vec<TelemetryRecord> {
        self.iter().cloned().collect()
    }
}

impl Default for RecordBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECORDS)
    }
}
