//! Durable append-only journal for queue state.
//!
//! The journal records every queue mutation as a framed record. On open,
//! the queue replays the journal to rebuild its in-memory state; replay
//! stops at the first unreadable frame and the torn tail is discarded,
//! so a crash mid-append loses at most the write that was in flight.

mod record;
mod store;

pub use record::{compute_crc32, decode_frame, JournalRecord, HEADER_SIZE};
pub use store::{FileStore, JournalStore, MemoryStore};

use crate::error::QueueResult;
use parking_lot::Mutex;

/// The outcome of replaying a journal.
#[derive(Debug)]
pub struct Replay {
    /// Records in append order.
    pub records: Vec<JournalRecord>,
    /// Length of the readable prefix.
    pub valid_len: u64,
    /// True if unreadable bytes followed the valid prefix.
    pub torn_tail: bool,
}

/// Manages framed writes and replay over a [`JournalStore`].
pub struct Journal {
    store: Mutex<Box<dyn JournalStore>>,
    sync_on_write: bool,
}

impl Journal {
    /// Creates a journal over the given store.
    ///
    /// With `sync_on_write` set, every append is flushed before it is
    /// reported written; the queue uses this for file-backed stores.
    pub fn new(store: Box<dyn JournalStore>, sync_on_write: bool) -> Self {
        Self {
            store: Mutex::new(store),
            sync_on_write,
        }
    }

    /// Appends one record, returning the offset it was written at.
    pub fn append(&self, record: &JournalRecord) -> QueueResult<u64> {
        let frame = record.encode_frame()?;

        let mut store = self.store.lock();
        let offset = store.append(&frame)?;
        if self.sync_on_write {
            store.flush()?;
        }
        Ok(offset)
    }

    /// Reads all records from the start of the journal.
    ///
    /// The whole journal is read into memory; queue journals only hold
    /// pending mutations and are kept small by compaction.
    pub fn replay(&self) -> QueueResult<Replay> {
        let mut store = self.store.lock();
        let size = store.size()?;
        let bytes = store.read_at(0, size as usize)?;

        let mut records = Vec::new();
        let mut pos = 0usize;
        while pos < bytes.len() {
            match decode_frame(&bytes[pos..]) {
                Some((record, frame_len)) => {
                    records.push(record);
                    pos += frame_len;
                }
                None => break,
            }
        }

        Ok(Replay {
            records,
            valid_len: pos as u64,
            torn_tail: (pos as u64) < size,
        })
    }

    /// Truncates the journal to `len` bytes.
    pub fn truncate(&self, len: u64) -> QueueResult<()> {
        let mut store = self.store.lock();
        store.truncate(len)?;
        store.flush()?;
        Ok(())
    }

    /// Replaces the journal contents with the given records.
    ///
    /// Used by compaction: the caller passes one `Upsert` per live item.
    pub fn rewrite<'a>(
        &self,
        records: impl IntoIterator<Item = &'a JournalRecord>,
    ) -> QueueResult<()> {
        let mut frames = Vec::new();
        for record in records {
            frames.push(record.encode_frame()?);
        }

        let mut store = self.store.lock();
        store.truncate(0)?;
        for frame in &frames {
            store.append(frame)?;
        }
        store.flush()?;
        Ok(())
    }

    /// Current journal size in bytes.
    pub fn size(&self) -> QueueResult<u64> {
        Ok(self.store.lock().size()?)
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("sync_on_write", &self.sync_on_write)
            .finish_non_exhaustive()
    }
}
