use crate::entry::Entry;
use crate::error::{Error, Result};

/// Fixed-capacity ring of committed entries, addressable both as a flat byte stream
/// (`locate_by_absolute`) and by (logical index, byte offset) pairs (`locate_by_index`).
///
/// Eviction is deterministic FIFO: appending to a full ring overwrites the logically
/// oldest entry, which is handed back to the caller to drop.
#[derive(Debug)]
pub struct CircularLog {
    slots: Vec<Option<Entry>>,
    capacity: usize,
    /// index of the next slot to write
    write: usize,
    /// index of the logically-oldest slot
    read: usize,
    full: bool,
    total_bytes: u64,
}

impl CircularLog {
    /// Builds an empty ring holding at most `capacity` entries. `capacity` must be non-zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "circular log capacity must be non-zero");
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            capacity,
            write: 0,
            read: 0,
            full: false,
            total_bytes: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of currently resident entries.
    pub fn len(&self) -> usize {
        if self.full {
            self.capacity
        } else {
            (self.write + self.capacity - self.read) % self.capacity
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of lengths of all currently resident entries.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Appends `entry` to the ring. If the ring was full, the previous occupant of the
    /// overwritten slot is returned for the caller to release (simply dropping it is
    /// sufficient in Rust).
    pub fn append(&mut self, entry: Entry) -> Option<Entry> {
        let new_len = entry.len() as u64;
        let evicted = self.slots[self.write].take();
        let evicted_len = evicted.as_ref().map(|e| e.len() as u64).unwrap_or(0);

        self.slots[self.write] = Some(entry);
        if self.full {
            self.read = (self.read + 1) % self.capacity;
        }
        self.write = (self.write + 1) % self.capacity;
        self.full = self.write == self.read;
        self.total_bytes = self.total_bytes + new_len - evicted_len;

        evicted
    }

    /// Maps a slot index in `[0, capacity)` to its logical index, given it is resident.
    fn slot_for_logical(&self, index: usize) -> usize {
        (self.read + index) % self.capacity
    }

    /// Resident entries in logical order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        (0..self.len()).map(move |i| {
            self.slots[self.slot_for_logical(i)]
                .as_ref()
                .expect("resident slot must be occupied")
        })
    }

    /// Locates the entry containing absolute byte position `pos`, returning the entry and
    /// the residual byte offset within it. Returns `None` once `pos >= total_bytes()`
    /// (end of stream). A `pos` landing exactly on an entry boundary belongs to the entry
    /// that starts there.
    pub fn locate_by_absolute(&self, pos: u64) -> Option<(&Entry, u64)> {
        if pos >= self.total_bytes {
            return None;
        }
        let mut remaining = pos;
        for entry in self.iter() {
            let len = entry.len() as u64;
            if remaining < len {
                return Some((entry, remaining));
            }
            remaining -= len;
        }
        None
    }

    /// Translates a (logical entry index, byte offset) pair into an absolute byte
    /// position. Fails if the index is out of range, the target slot is unoccupied, or
    /// the offset exceeds the target entry's length.
    pub fn locate_by_index(&self, index: u64, byte_offset: u64) -> Result<u64> {
        let count = self.len();
        let index_usize = usize::try_from(index)
            .map_err(|_| Error::InvalidArgument(format!("entry index {index} out of range")))?;
        if index_usize >= count {
            return Err(Error::InvalidArgument(format!(
                "entry index {index} out of range (have {count} resident entries)"
            )));
        }

        let mut pos: u64 = 0;
        for i in 0..index_usize {
            let slot = self.slot_for_logical(i);
            let entry = self.slots[slot]
                .as_ref()
                .ok_or_else(|| Error::InvalidArgument(format!("slot {slot} unoccupied")))?;
            pos += entry.len() as u64;
        }

        let target_slot = self.slot_for_logical(index_usize);
        let target = self.slots[target_slot]
            .as_ref()
            .ok_or_else(|| Error::InvalidArgument(format!("slot {target_slot} unoccupied")))?;
        if byte_offset >= target.len() as u64 {
            return Err(Error::InvalidArgument(format!(
                "byte offset {byte_offset} out of range for entry {index} (len {})",
                target.len()
            )));
        }

        Ok(pos + byte_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(s: &str) -> Entry {
        Entry::new(s.as_bytes().to_vec())
    }

    #[test]
    fn append_tracks_total_bytes() {
        let mut log = CircularLog::new(4);
        assert_eq!(log.total_bytes(), 0);
        log.append(entry("aa\n"));
        assert_eq!(log.total_bytes(), 3);
        log.append(entry("bbbb\n"));
        assert_eq!(log.total_bytes(), 8);
    }

    #[test]
    fn eviction_is_fifo() {
        let mut log = CircularLog::new(3);
        log.append(entry("a\n"));
        log.append(entry("b\n"));
        log.append(entry("c\n"));
        assert!(log.is_empty() == false && log.len() == 3);

        let evicted = log.append(entry("d\n"));
        assert_eq!(evicted.unwrap().bytes().as_ref(), b"a\n");
        let resident: Vec<_> = log
            .iter()
            .map(|e| String::from_utf8(e.bytes().to_vec()).unwrap())
            .collect();
        assert_eq!(resident, vec!["b\n", "c\n", "d\n"]);
    }

    #[test]
    fn eviction_after_n_plus_k_appends_keeps_last_n() {
        let n = 10;
        let mut log = CircularLog::new(n);
        for i in 0..(n + 5) {
            log.append(entry(&format!("e{i:02}\n")));
        }
        assert_eq!(log.len(), n);
        let resident: Vec<_> = log
            .iter()
            .map(|e| String::from_utf8(e.bytes().to_vec()).unwrap())
            .collect();
        let expected: Vec<_> = (5..(n + 5)).map(|i| format!("e{i:02}\n")).collect();
        assert_eq!(resident, expected);
    }

    #[test]
    fn locate_by_absolute_boundary_and_eof() {
        let mut log = CircularLog::new(4);
        log.append(entry("aa\n"));
        log.append(entry("bbbb\n"));
        let total = log.total_bytes();

        let (e, off) = log.locate_by_absolute(total - 1).unwrap();
        assert_eq!(e.bytes().as_ref(), b"bbbb\n");
        assert_eq!(off, e.len() as u64 - 1);

        assert!(log.locate_by_absolute(total).is_none());

        // boundary: position 3 is the first byte of the second entry, not the last of the first.
        let (e, off) = log.locate_by_absolute(3).unwrap();
        assert_eq!(e.bytes().as_ref(), b"bbbb\n");
        assert_eq!(off, 0);
    }

    #[test]
    fn locate_round_trips_with_locate_by_index() {
        let mut log = CircularLog::new(4);
        log.append(entry("aa\n"));
        log.append(entry("bbbb\n"));
        log.append(entry("c\n"));

        for (i, e) in log.iter().enumerate() {
            for o in 0..e.len() as u64 {
                let abs = log.locate_by_index(i as u64, o).unwrap();
                let (found, off) = log.locate_by_absolute(abs).unwrap();
                assert_eq!(found.bytes(), e.bytes());
                assert_eq!(off, o);
            }
        }
    }

    #[test]
    fn locate_by_index_rejects_out_of_range() {
        let mut log = CircularLog::new(4);
        log.append(entry("aa\n"));
        assert!(log.locate_by_index(5, 0).is_err());
        assert!(log.locate_by_index(0, 10).is_err());
    }
}
