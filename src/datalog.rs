// AccelLog — On-device Data Logging Store
//
// RAM-backed store of fixed-size record sessions.  Each session collects
// items of `item_size` bytes under a tag.  Logged items are handed to the
// phone link in chunks, oldest session first, and leave the store once the
// chunk is committed; a finished session is dropped after its last chunk.
// A store-wide byte budget bounds memory use.

use core::fmt;
use std::collections::VecDeque;

use crate::services::DataLogging;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    ByteArray,
    Uint,
    Int,
}

/// Opaque handle to a logging session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionRef(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLoggingResult {
    /// The store has no room left for the items.
    Full,
    /// No session with this handle exists.
    NotFound,
    /// The session was already finished.
    Closed,
    /// Item size or count did not match the session.
    InvalidParams,
}

impl fmt::Display for DataLoggingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Full => "data log full",
            Self::NotFound => "no such logging session",
            Self::Closed => "logging session already finished",
            Self::InvalidParams => "invalid logging parameters",
        };
        f.write_str(text)
    }
}

impl std::error::Error for DataLoggingResult {}

#[derive(Debug)]
struct Session {
    id: SessionRef,
    tag: u32,
    item_type: ItemType,
    item_size: usize,
    open: bool,
    data: VecDeque<u8>,
}

/// Next piece of logged data waiting for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogChunk {
    /// Whole items from the front of a session.
    Items {
        session: SessionRef,
        tag: u32,
        item_size: usize,
        data: Vec<u8>,
    },
    /// A finished session with nothing left to send.
    Finished { session: SessionRef, tag: u32 },
}

impl LogChunk {
    pub fn session(&self) -> SessionRef {
        match self {
            Self::Items { session, .. } | Self::Finished { session, .. } => *session,
        }
    }
}

#[derive(Debug)]
pub struct RecordStore {
    capacity_bytes: usize,
    next_id: u32,
    sessions: Vec<Session>,
}

impl RecordStore {
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            capacity_bytes,
            next_id: 1,
            sessions: Vec::new(),
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.sessions.iter().map(|s| s.data.len()).sum()
    }

    pub fn is_open(&self, session: SessionRef) -> bool {
        self.find(session).is_some_and(|s| s.open)
    }

    /// Number of items logged so far in `session`.
    pub fn item_count(&self, session: SessionRef) -> Option<usize> {
        self.find(session).map(|s| s.data.len() / s.item_size)
    }

    fn find(&self, session: SessionRef) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session)
    }
}

impl DataLogging for RecordStore {
    fn create(
        &mut self,
        tag: u32,
        item_type: ItemType,
        item_size: usize,
        resume: bool,
    ) -> Result<SessionRef, DataLoggingResult> {
        if item_size == 0 {
            return Err(DataLoggingResult::InvalidParams);
        }

        if resume {
            if let Some(existing) = self.sessions.iter().find(|s| {
                s.open && s.tag == tag && s.item_type == item_type && s.item_size == item_size
            }) {
                log::debug!("Resuming data log session {:?} (tag {})", existing.id, tag);
                return Ok(existing.id);
            }
        }

        let id = SessionRef(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.sessions.push(Session {
            id,
            tag,
            item_type,
            item_size,
            open: true,
            data: VecDeque::new(),
        });
        log::info!("Data log session {:?} created (tag {}, {} B items)", id, tag, item_size);
        Ok(id)
    }

    fn log(&mut self, session: SessionRef, data: &[u8], num_items: usize) -> Result<(), DataLoggingResult> {
        let used = self.used_bytes();
        let capacity = self.capacity_bytes;
        let entry = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session)
            .ok_or(DataLoggingResult::NotFound)?;

        if !entry.open {
            return Err(DataLoggingResult::Closed);
        }
        if num_items == 0 || data.len() != entry.item_size * num_items {
            return Err(DataLoggingResult::InvalidParams);
        }
        if used + data.len() > capacity {
            return Err(DataLoggingResult::Full);
        }

        entry.data.extend(data.iter().copied());
        Ok(())
    }

    fn finish(&mut self, session: SessionRef) {
        match self.sessions.iter_mut().find(|s| s.id == session) {
            Some(entry) if entry.open => {
                entry.open = false;
                log::info!(
                    "Data log session {:?} finished ({} items awaiting upload)",
                    session,
                    entry.data.len() / entry.item_size
                );
            }
            Some(_) => log::warn!("Data log session {:?} already finished", session),
            None => log::warn!("Data log session {:?} not found", session),
        }
    }

    fn pending_chunk(&self, max_items: usize) -> Option<LogChunk> {
        self.sessions.iter().find_map(|s| {
            let items = (s.data.len() / s.item_size).min(max_items);
            if items > 0 {
                Some(LogChunk::Items {
                    session: s.id,
                    tag: s.tag,
                    item_size: s.item_size,
                    data: s.data.iter().take(items * s.item_size).copied().collect(),
                })
            } else if !s.open {
                Some(LogChunk::Finished { session: s.id, tag: s.tag })
            } else {
                None
            }
        })
    }

    fn commit_chunk(&mut self, chunk: &LogChunk) {
        let Some(index) = self.sessions.iter().position(|s| s.id == chunk.session()) else {
            log::warn!("Data log session {:?} vanished before commit", chunk.session());
            return;
        };
        match chunk {
            LogChunk::Items { data, .. } => {
                let entry = &mut self.sessions[index];
                let n = data.len().min(entry.data.len());
                entry.data.drain(..n);
            }
            LogChunk::Finished { session, .. } => {
                self.sessions.remove(index);
                log::info!("Data log session {:?} uploaded", session);
            }
        }
    }
}
