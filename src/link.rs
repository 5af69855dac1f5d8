// AccelLog — Phone Link
//
// Dictionaries travel over a byte transport (UART on the watch) as frames:
//
//   0x55 | len: u8 | payload[len]
//
// Outbound delivery results and inbound messages are queued as `LinkEvent`s
// and handed to the application one at a time from `poll`.

use heapless::{Deque, Vec};

use crate::config::*;
use crate::events::LinkEvent;
use crate::message::{AppMessageResult, Dictionary};
use crate::services::MessageChannel;

/// Largest payload a frame can describe.
pub const MAX_FRAME_PAYLOAD: usize = u8::MAX as usize;

const PENDING_EVENTS: usize = 8;
const READ_CHUNK: usize = 32;

/// Raw byte transport underneath the link.
pub trait Transport {
    fn write_all(&mut self, bytes: &[u8]) -> anyhow::Result<()>;
    /// Non-blocking read; returns 0 when nothing is pending.
    fn read(&mut self, buf: &mut [u8]) -> anyhow::Result<usize>;
}

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Payload(Vec<u8, MAX_FRAME_PAYLOAD>),
    /// Announced length exceeded the inbox; payload was skipped.
    Oversized(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    WaitStart,
    WaitLen,
    Payload(usize),
    Skip { announced: usize, remaining: usize },
}

#[derive(Debug)]
pub struct FrameDecoder {
    max_payload: usize,
    state: DecodeState,
    buf: Vec<u8, MAX_FRAME_PAYLOAD>,
}

impl FrameDecoder {
    pub fn new(max_payload: usize) -> Self {
        Self {
            max_payload: max_payload.min(MAX_FRAME_PAYLOAD),
            state: DecodeState::WaitStart,
            buf: Vec::new(),
        }
    }

    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            DecodeState::WaitStart => {
                if byte == LINK_FRAME_START {
                    self.state = DecodeState::WaitLen;
                }
                None
            }
            DecodeState::WaitLen => {
                let len = usize::from(byte);
                self.buf.clear();
                if len == 0 {
                    self.state = DecodeState::WaitStart;
                    Some(Frame::Payload(Vec::new()))
                } else if len > self.max_payload {
                    self.state = DecodeState::Skip { announced: len, remaining: len };
                    None
                } else {
                    self.state = DecodeState::Payload(len);
                    None
                }
            }
            DecodeState::Payload(len) => {
                // len <= max_payload <= capacity
                let _ = self.buf.push(byte);
                if self.buf.len() == len {
                    self.state = DecodeState::WaitStart;
                    Some(Frame::Payload(core::mem::take(&mut self.buf)))
                } else {
                    None
                }
            }
            DecodeState::Skip { announced, remaining } => {
                if remaining == 1 {
                    self.state = DecodeState::WaitStart;
                    Some(Frame::Oversized(announced))
                } else {
                    self.state = DecodeState::Skip { announced, remaining: remaining - 1 };
                    None
                }
            }
        }
    }
}

/// Write `payload` as one frame.
pub fn write_frame<T: Transport>(transport: &mut T, payload: &[u8]) -> anyhow::Result<()> {
    let len = u8::try_from(payload.len())
        .map_err(|_| anyhow::anyhow!("frame payload of {} bytes too large", payload.len()))?;
    transport.write_all(&[LINK_FRAME_START, len])?;
    transport.write_all(payload)
}

// ---------------------------------------------------------------------------
// Framed message channel
// ---------------------------------------------------------------------------

pub struct FramedLink<T> {
    transport: T,
    open: bool,
    outbox_size: usize,
    decoder: FrameDecoder,
    pending: Deque<LinkEvent, PENDING_EVENTS>,
}

impl<T: Transport> FramedLink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            open: false,
            outbox_size: 0,
            decoder: FrameDecoder::new(0),
            pending: Deque::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn queue(&mut self, event: LinkEvent) {
        if let Err(event) = self.pending.push_back(event) {
            log::warn!("Link event queue full — dropping {:?}", event);
        }
    }

    fn pump_inbound(&mut self) {
        let mut chunk = [0u8; READ_CHUNK];
        let n = match self.transport.read(&mut chunk) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("Link read error: {}", e);
                return;
            }
        };

        for &byte in &chunk[..n] {
            let event = match self.decoder.push(byte) {
                None => continue,
                Some(Frame::Oversized(len)) => {
                    log::debug!("Inbound frame of {} bytes exceeds inbox", len);
                    LinkEvent::InboxDropped(AppMessageResult::BufferOverflow)
                }
                Some(Frame::Payload(payload)) => match Dictionary::deserialize(&payload) {
                    Ok(dict) => LinkEvent::InboxReceived(Box::new(dict)),
                    Err(e) => {
                        log::debug!("Inbound frame rejected: {}", e);
                        LinkEvent::InboxDropped(e.into())
                    }
                },
            };
            self.queue(event);
        }
    }
}

impl<T: Transport> MessageChannel for FramedLink<T> {
    fn open(&mut self, inbox_size: usize, outbox_size: usize) -> Result<(), AppMessageResult> {
        if self.open {
            return Err(AppMessageResult::Busy);
        }
        if inbox_size > MAX_FRAME_PAYLOAD || outbox_size > MAX_FRAME_PAYLOAD {
            return Err(AppMessageResult::InvalidArgs);
        }
        self.decoder = FrameDecoder::new(inbox_size);
        self.outbox_size = outbox_size;
        self.open = true;
        log::info!("Phone link open (inbox {} B, outbox {} B)", inbox_size, outbox_size);
        Ok(())
    }

    fn send(&mut self, dict: &Dictionary) -> Result<(), AppMessageResult> {
        if !self.open {
            return Err(AppMessageResult::Closed);
        }

        let mut buf = [0u8; MAX_FRAME_PAYLOAD];
        let n = dict.serialize(&mut buf[..self.outbox_size])?;

        let event = match write_frame(&mut self.transport, &buf[..n]) {
            Ok(()) => LinkEvent::OutboxSent,
            Err(e) => {
                log::warn!("Link write error: {}", e);
                LinkEvent::OutboxFailed(AppMessageResult::NotConnected)
            }
        };
        self.queue(event);
        Ok(())
    }

    fn poll(&mut self) -> Option<LinkEvent> {
        if self.open && self.pending.is_empty() {
            self.pump_inbound();
        }
        self.pending.pop_front()
    }
}
