// AccelLog — Host Service Interfaces
//
// The application only talks to the watch through these traits.  The
// firmware binary implements them on top of the ESP-IDF drivers; the unit
// tests implement them with in-memory fakes.

use embedded_graphics::text::Alignment;

use crate::datalog::{DataLoggingResult, ItemType, LogChunk, SessionRef};
use crate::events::{ChargeState, LinkEvent, Sample};
use crate::message::{AppMessageResult, Dictionary};

pub use crate::accel::{SampleBatch, SamplingRate};

/// Text display with a single full-screen text layer.
pub trait TextDisplay {
    /// Replace the visible text.
    fn set_text(&mut self, text: &str);
    fn set_alignment(&mut self, alignment: Alignment);
    /// Blank the screen and release display resources.
    fn clear(&mut self);
}

pub trait Accelerometer {
    /// Read the instantaneous sample, outside of any subscription.
    fn peek(&mut self) -> anyhow::Result<Sample>;
    fn subscribe(&mut self, samples_per_update: u32);
    fn set_sampling_rate(&mut self, rate: SamplingRate);
    fn unsubscribe(&mut self);
    /// Batch of samples due at `now_ms`, if the subscription produced one.
    fn poll(&mut self, now_ms: u64) -> Option<SampleBatch>;
}

pub trait Battery {
    fn peek(&mut self) -> ChargeState;
}

/// Bidirectional message channel to the phone.
pub trait MessageChannel {
    fn open(&mut self, inbox_size: usize, outbox_size: usize) -> Result<(), AppMessageResult>;
    /// Queue a dictionary for delivery.  Delivery outcome is reported later
    /// through [`MessageChannel::poll`].
    fn send(&mut self, dict: &Dictionary) -> Result<(), AppMessageResult>;
    fn poll(&mut self) -> Option<LinkEvent>;
}

pub trait DataLogging {
    fn create(
        &mut self,
        tag: u32,
        item_type: ItemType,
        item_size: usize,
        resume: bool,
    ) -> Result<SessionRef, DataLoggingResult>;
    fn log(&mut self, session: SessionRef, data: &[u8], num_items: usize) -> Result<(), DataLoggingResult>;
    fn finish(&mut self, session: SessionRef);
    /// Oldest logged data not yet uploaded, at most `max_items` items.
    /// The store keeps it until [`DataLogging::commit_chunk`].
    fn pending_chunk(&self, max_items: usize) -> Option<LogChunk>;
    /// Drop a chunk returned by `pending_chunk` once the phone link took it.
    fn commit_chunk(&mut self, chunk: &LogChunk);
}
