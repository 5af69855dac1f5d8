// AccelLog — Application Controller
//
// Owns every piece of mutable application state and the host services.
// The event loop hands it one event at a time; each handler runs to
// completion before the next is dispatched.

use core::fmt::Write;

use embedded_graphics::text::Alignment;
use heapless::{String, Vec};

use crate::accel::SamplingRate;
use crate::clock;
use crate::config::*;
use crate::datalog::{ItemType, LogChunk, SessionRef};
use crate::events::{AppEvent, Button, LinkEvent, Sample};
use crate::message::{AppMessageResult, Dictionary, OutboundMessage, LOG_RECORDS_PER_MESSAGE};
use crate::services::{Accelerometer, Battery, DataLogging, MessageChannel, TextDisplay};

const RECORD_BUFFER_SIZE: usize = ACCEL_MAX_BATCH * Sample::RECORD_SIZE;

pub struct App<D, A, B, M, L> {
    display: D,
    accel: A,
    battery: B,
    link: M,
    datalog: L,

    is_logging: bool,
    count: u32,
    // Kept after `finish` so late batches hit the finished session.
    session: Option<SessionRef>,
}

impl<D, A, B, M, L> App<D, A, B, M, L>
where
    D: TextDisplay,
    A: Accelerometer,
    B: Battery,
    M: MessageChannel,
    L: DataLogging,
{
    pub fn new(display: D, accel: A, battery: B, link: M, datalog: L) -> Self {
        Self {
            display,
            accel,
            battery,
            link,
            datalog,
            is_logging: false,
            count: 0,
            session: None,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Show the title screen and open the phone link.
    pub fn init(&mut self) {
        self.display.set_alignment(Alignment::Center);
        self.display.set_text(TITLE_TEXT);

        if let Err(e) = self.link.open(INBOX_SIZE, OUTBOX_SIZE) {
            log::error!("Failed to open phone link: {}", e);
        }
        log::info!("AccelLog ready");
    }

    pub fn deinit(&mut self) {
        if self.is_logging {
            log::warn!("Exiting with logging active — session left unfinished");
        }
        self.display.clear();
        log::info!("AccelLog stopped");
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Click(button) => self.on_click(button),
            AppEvent::Link(event) => self.on_link_event(event),
        }
    }

    /// Deliver whatever the accelerometer subscription and the phone link
    /// have pending at `now_ms`, and upload one chunk of logged records.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(batch) = self.accel.poll(now_ms) {
            self.on_accel_data(&batch);
        }
        self.upload_log();
        while let Some(event) = self.link.poll() {
            self.on_link_event(event);
        }
    }

    pub fn on_click(&mut self, button: Button) {
        match button {
            Button::Select => self.on_select(),
            Button::Up => self.on_up(),
            Button::Down => self.on_down(),
        }
    }

    // -----------------------------------------------------------------------
    // Logging toggle
    // -----------------------------------------------------------------------

    pub fn toggle_logging(&mut self) {
        if self.is_logging {
            self.is_logging = false;

            let power = self.battery.peek();
            self.send(OutboundMessage::StopLogging {
                battery_percent: i16::from(power.charge_percent),
            });

            self.display.set_text("Not logging");
            self.accel.unsubscribe();
            if let Some(session) = self.session {
                self.datalog.finish(session);
            }
            log::info!("Logging stopped after {} batches", self.count);
        } else {
            self.is_logging = true;

            let power = self.battery.peek();
            self.send(OutboundMessage::StartLogging {
                sampling_rate: ANNOUNCED_SAMPLING_RATE,
                battery_percent: i16::from(power.charge_percent),
            });

            self.session = match self
                .datalog
                .create(DATA_LOG_TAG, ItemType::ByteArray, Sample::RECORD_SIZE, true)
            {
                Ok(session) => Some(session),
                Err(e) => {
                    log::error!("Failed to create data log session: {}", e);
                    None
                }
            };
            self.count = 0;

            self.accel.subscribe(ACCEL_SAMPLES_PER_UPDATE);
            self.accel.set_sampling_rate(SamplingRate::Hz25);
            self.display.set_text("Logging...");
            log::info!("Logging started");
        }
    }

    // -----------------------------------------------------------------------
    // Sample handler
    // -----------------------------------------------------------------------

    pub fn on_accel_data(&mut self, samples: &[Sample]) {
        let Some(first) = samples.first().copied() else {
            return;
        };

        self.append_to_log(samples);
        self.count += 1;

        let time = clock::format_hms(first.timestamp);
        let mut text: String<TEXT_BUFFER_SIZE> = String::new();
        let _ = write!(
            text,
            "Time: {} \n Count: {} \n x: {} mG \n y: {} mG \n z: {} mG",
            time, self.count, first.x, first.y, first.z
        );
        self.display.set_text(&text);
    }

    /// Written whether or not the session is still open; the store reports
    /// the failure.
    fn append_to_log(&mut self, samples: &[Sample]) {
        let Some(session) = self.session else {
            log::warn!("Sample batch with no data log session");
            return;
        };

        let mut records: Vec<u8, RECORD_BUFFER_SIZE> = Vec::new();
        let mut logged = 0;
        for sample in samples {
            if records.extend_from_slice(&sample.to_record()).is_err() {
                log::warn!("Sample batch larger than {} — truncating", ACCEL_MAX_BATCH);
                break;
            }
            logged += 1;
        }

        if let Err(e) = self.datalog.log(session, &records, logged) {
            log::warn!("Data log write failed: {}", e);
        }
    }

    // -----------------------------------------------------------------------
    // Log upload
    // -----------------------------------------------------------------------

    /// Send the oldest logged records to the phone.  The store only drops
    /// them once the link has accepted the message.
    fn upload_log(&mut self) {
        let Some(chunk) = self.datalog.pending_chunk(LOG_RECORDS_PER_MESSAGE) else {
            return;
        };

        let message = match &chunk {
            LogChunk::Items { tag, data, .. } => OutboundMessage::LogRecords {
                tag: i16::try_from(*tag).unwrap_or(i16::MAX),
                records: data,
            },
            LogChunk::Finished { tag, .. } => OutboundMessage::LogFinished {
                tag: i16::try_from(*tag).unwrap_or(i16::MAX),
            },
        };
        let dict = match message.to_dictionary() {
            Ok(dict) => dict,
            Err(e) => {
                log::error!("Failed to build message {}: {}", message.message_type(), e);
                return;
            }
        };

        match self.link.send(&dict) {
            Ok(()) => self.datalog.commit_chunk(&chunk),
            // Retried on the next tick.
            Err(e) => log::debug!("Log upload deferred: {}", e),
        }
    }

    // -----------------------------------------------------------------------
    // Buttons
    // -----------------------------------------------------------------------

    fn on_select(&mut self) {
        let data = match self.accel.peek() {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Accelerometer peek failed: {}", e);
                return;
            }
        };

        let mut text: String<TEXT_BUFFER_SIZE> = String::new();
        let _ = write!(text, "Select\n\nSample: ({}, {}, {})", data.x, data.y, data.z);
        self.display.set_text(&text);

        self.send(OutboundMessage::SelectSample {
            x: data.x,
            y: data.y,
            z: data.z,
        });
    }

    fn on_up(&mut self) {
        self.display.set_text("Up");
        self.toggle_logging();
    }

    fn on_down(&mut self) {
        let power = self.battery.peek();
        let mut text: String<TEXT_BUFFER_SIZE> = String::new();
        let _ = write!(text, "Power: {}%", power.charge_percent);
        self.display.set_text(&text);
    }

    // -----------------------------------------------------------------------
    // Phone link
    // -----------------------------------------------------------------------

    fn send(&mut self, message: OutboundMessage<'_>) {
        let dict = match message.to_dictionary() {
            Ok(dict) => dict,
            Err(e) => {
                log::error!("Failed to build message {}: {}", message.message_type(), e);
                return;
            }
        };
        if let Err(e) = self.link.send(&dict) {
            log::warn!("Message {} not sent: {}", message.message_type(), e);
        }
    }

    pub fn on_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::OutboxSent => self.on_outbox_sent(),
            LinkEvent::OutboxFailed(reason) => self.on_outbox_failed(reason),
            LinkEvent::InboxReceived(dict) => self.on_inbox_received(&dict),
            LinkEvent::InboxDropped(reason) => self.on_inbox_dropped(reason),
        }
    }

    fn on_outbox_sent(&mut self) {
        log::debug!("Outgoing message delivered");
    }

    fn on_outbox_failed(&mut self, reason: AppMessageResult) {
        log::debug!("Outgoing message failed: {}", reason);
    }

    fn on_inbox_received(&mut self, dict: &Dictionary) {
        log::debug!("Incoming message received ({} tuples)", dict.len());
    }

    fn on_inbox_dropped(&mut self, reason: AppMessageResult) {
        log::debug!("Incoming message dropped: {}", reason);
    }

    // -----------------------------------------------------------------------
    // State accessors
    // -----------------------------------------------------------------------

    pub fn is_logging(&self) -> bool {
        self.is_logging
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn session(&self) -> Option<SessionRef> {
        self.session
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn accel_mut(&mut self) -> &mut A {
        &mut self.accel
    }

    pub fn battery_mut(&mut self) -> &mut B {
        &mut self.battery
    }

    pub fn link(&self) -> &M {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut M {
        &mut self.link
    }

    pub fn datalog(&self) -> &L {
        &self.datalog
    }

    pub fn datalog_mut(&mut self) -> &mut L {
        &mut self.datalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::{SampleBatch, SampleScheduler};
    use crate::datalog::{DataLoggingResult, RecordStore};
    use crate::display::{Panel, TextLayer};
    use crate::events::ChargeState;
    use crate::link::{FramedLink, Transport};
    use crate::message::Value;

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct FakeDisplay {
        text: std::string::String,
        history: std::vec::Vec<std::string::String>,
        alignment: Option<Alignment>,
        cleared: bool,
    }

    impl TextDisplay for FakeDisplay {
        fn set_text(&mut self, text: &str) {
            self.text = text.to_owned();
            self.history.push(text.to_owned());
        }

        fn set_alignment(&mut self, alignment: Alignment) {
            self.alignment = Some(alignment);
        }

        fn clear(&mut self) {
            self.text.clear();
            self.cleared = true;
        }
    }

    #[derive(Default)]
    struct FakeAccel {
        current: Sample,
        fail_peek: bool,
        scheduler: SampleScheduler,
        queued: Option<SampleBatch>,
    }

    impl Accelerometer for FakeAccel {
        fn peek(&mut self) -> anyhow::Result<Sample> {
            if self.fail_peek {
                anyhow::bail!("i2c nack");
            }
            Ok(self.current)
        }

        fn subscribe(&mut self, samples_per_update: u32) {
            self.scheduler.subscribe(samples_per_update);
        }

        fn set_sampling_rate(&mut self, rate: SamplingRate) {
            self.scheduler.set_sampling_rate(rate);
        }

        fn unsubscribe(&mut self) {
            self.scheduler.unsubscribe();
        }

        fn poll(&mut self, now_ms: u64) -> Option<SampleBatch> {
            if self.scheduler.is_due(now_ms) {
                let current = self.current;
                return self.scheduler.push(current, now_ms);
            }
            self.queued.take()
        }
    }

    struct FakeBattery(u8);

    impl Battery for FakeBattery {
        fn peek(&mut self) -> ChargeState {
            ChargeState {
                charge_percent: self.0,
                ..ChargeState::default()
            }
        }
    }

    #[derive(Default)]
    struct FakeLink {
        opened: Option<(usize, usize)>,
        closed: bool,
        sent: std::vec::Vec<Dictionary>,
        inbound: std::collections::VecDeque<LinkEvent>,
    }

    impl MessageChannel for FakeLink {
        fn open(&mut self, inbox_size: usize, outbox_size: usize) -> Result<(), AppMessageResult> {
            self.opened = Some((inbox_size, outbox_size));
            Ok(())
        }

        fn send(&mut self, dict: &Dictionary) -> Result<(), AppMessageResult> {
            if self.closed {
                return Err(AppMessageResult::Closed);
            }
            self.sent.push(dict.clone());
            self.inbound.push_back(LinkEvent::OutboxSent);
            Ok(())
        }

        fn poll(&mut self) -> Option<LinkEvent> {
            self.inbound.pop_front()
        }
    }

    type TestApp = App<FakeDisplay, FakeAccel, FakeBattery, FakeLink, RecordStore>;

    fn app() -> TestApp {
        let mut app = App::new(
            FakeDisplay::default(),
            FakeAccel::default(),
            FakeBattery(80),
            FakeLink::default(),
            RecordStore::new(DATA_LOG_CAPACITY_BYTES),
        );
        app.init();
        app
    }

    fn int_field(dict: &Dictionary, key: u32) -> Option<i32> {
        dict.find(key).and_then(Value::as_i32)
    }

    fn sample(x: i16, y: i16, z: i16, timestamp: u64) -> Sample {
        Sample { x, y, z, did_vibrate: false, timestamp }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    #[test]
    fn test_init_shows_title_and_opens_link() {
        let app = app();
        assert_eq!(app.display().text, TITLE_TEXT);
        assert_eq!(app.display().alignment, Some(Alignment::Center));
        assert_eq!(app.link().opened, Some((64, 64)));
        assert!(!app.is_logging());
    }

    #[test]
    fn test_deinit_clears_display() {
        let mut app = app();
        app.on_click(Button::Up);
        app.deinit();
        assert!(app.display().cleared);
        // Exiting while logging leaves the session open.
        let session = app.session().unwrap();
        assert!(app.datalog().is_open(session));
    }

    // -------------------------------------------------------------------------
    // Logging toggle
    // -------------------------------------------------------------------------

    #[test]
    fn test_start_logging() {
        let mut app = app();
        app.on_accel_data(&[sample(1, 2, 3, 0)]);
        assert_eq!(app.count(), 1);

        app.toggle_logging();

        assert!(app.is_logging());
        assert_eq!(app.count(), 0, "counter resets on start");
        assert_eq!(app.display().text, "Logging...");

        let start = app.link().sent.last().unwrap();
        assert_eq!(int_field(start, MSG_KEY_TYPE), Some(5001));
        assert_eq!(int_field(start, MSG_KEY_FIELD_1), Some(10));
        assert_eq!(int_field(start, MSG_KEY_FIELD_2), Some(80));

        let session = app.session().expect("session opened");
        assert!(app.datalog().is_open(session));
        assert_eq!(app.accel_mut().scheduler.rate(), SamplingRate::Hz25);
        assert!(app.accel_mut().scheduler.is_subscribed());
    }

    #[test]
    fn test_stop_logging() {
        let mut app = app();
        app.toggle_logging();
        app.battery_mut().0 = 70;
        app.toggle_logging();

        assert!(!app.is_logging());
        assert_eq!(app.display().text, "Not logging");

        let stop = app.link().sent.last().unwrap();
        assert_eq!(int_field(stop, MSG_KEY_TYPE), Some(5002));
        assert_eq!(int_field(stop, MSG_KEY_FIELD_1), Some(70));
        assert_eq!(stop.len(), 2);

        let session = app.session().unwrap();
        assert!(!app.datalog().is_open(session));
        assert!(!app.accel_mut().scheduler.is_subscribed());
    }

    #[test]
    fn test_up_button_shows_up_then_toggles() {
        let mut app = app();
        app.on_click(Button::Up);
        let history = &app.display().history;
        assert_eq!(&history[history.len() - 2..], &["Up", "Logging..."]);
        assert!(app.is_logging());
    }

    // -------------------------------------------------------------------------
    // Sample handler
    // -------------------------------------------------------------------------

    #[test]
    fn test_batch_counts_once_and_renders_first_sample() {
        let mut app = app();
        app.toggle_logging();

        let batch = [
            sample(-15, 20, 1003, 1_700_000_000_000),
            sample(99, 99, 99, 1_700_000_000_040),
            sample(98, 98, 98, 1_700_000_000_080),
        ];
        app.on_accel_data(&batch);

        assert_eq!(app.count(), 1, "one increment per batch");
        assert_eq!(
            app.display().text,
            "Time: 22:13:20 \n Count: 1 \n x: -15 mG \n y: 20 mG \n z: 1003 mG"
        );

        let session = app.session().unwrap();
        assert_eq!(app.datalog().item_count(session), Some(3), "whole batch is logged");
    }

    #[test]
    fn test_logged_records_match_samples() {
        let mut app = app();
        app.toggle_logging();
        let s = sample(7, -8, 9, 123_456);
        app.on_accel_data(&[s]);
        app.toggle_logging();

        let (item_size, data) = match app.datalog().pending_chunk(LOG_RECORDS_PER_MESSAGE) {
            Some(LogChunk::Items { item_size, data, .. }) => (item_size, data),
            other => panic!("expected logged items, got {:?}", other),
        };
        assert_eq!(item_size, Sample::RECORD_SIZE);
        let record: [u8; Sample::RECORD_SIZE] = data[..].try_into().unwrap();
        assert_eq!(Sample::from_record(&record), s);
    }

    #[test]
    fn test_logged_session_is_uploaded_and_freed() {
        let mut app = app();
        app.toggle_logging();
        let session = app.session().unwrap();
        let batch = [sample(1, 2, 3, 10), sample(4, 5, 6, 50), sample(7, 8, 9, 90)];
        app.on_accel_data(&batch);
        app.toggle_logging();

        for now in 0..4 {
            app.tick(now);
        }

        let sent = &app.link().sent;
        let uploads: std::vec::Vec<&Dictionary> = sent
            .iter()
            .filter(|d| int_field(d, MSG_KEY_TYPE) == Some(i32::from(MSG_TYPE_LOG_RECORDS)))
            .collect();
        assert_eq!(uploads.len(), 2, "three records in chunks of two");

        let mut uploaded = std::vec::Vec::new();
        for dict in &uploads {
            assert_eq!(int_field(dict, MSG_KEY_FIELD_1), Some(DATA_LOG_TAG as i32));
            let Some(Value::Bytes(records)) = dict.find(MSG_KEY_RECORDS) else {
                panic!("upload without records");
            };
            for raw in records.chunks_exact(Sample::RECORD_SIZE) {
                uploaded.push(Sample::from_record(raw.try_into().unwrap()));
            }
        }
        assert_eq!(uploaded, batch);

        let last = sent.last().unwrap();
        assert_eq!(int_field(last, MSG_KEY_TYPE), Some(i32::from(MSG_TYPE_LOG_FINISHED)));
        assert_eq!(app.datalog().item_count(session), None, "uploaded session is released");
        assert_eq!(app.datalog().used_bytes(), 0);
    }

    #[test]
    fn test_upload_waits_for_link() {
        let mut app = app();
        app.toggle_logging();
        let session = app.session().unwrap();

        app.link_mut().closed = true;
        app.tick(0);
        assert_eq!(app.datalog().item_count(session), Some(1), "kept while the link is down");

        app.link_mut().closed = false;
        app.tick(1);
        assert_eq!(app.datalog().item_count(session), Some(0));
        assert!(app.datalog().is_open(session), "open session keeps logging");
    }

    #[test]
    fn test_long_logging_run_never_fills_store() {
        let mut app = app();
        app.toggle_logging();
        let session = app.session().unwrap();

        // Five minutes at 25 Hz, past the store's raw capacity.
        let samples = 5 * 60 * 25;
        assert!(samples * Sample::RECORD_SIZE > DATA_LOG_CAPACITY_BYTES);
        for now in (0..samples as u64).map(|i| i * 40) {
            app.tick(now);
        }

        assert_eq!(app.count(), samples as u32);
        assert_eq!(app.datalog().item_count(session), Some(0));
    }

    #[test]
    fn test_late_batch_after_stop_still_counts() {
        let mut app = app();
        app.toggle_logging();
        app.toggle_logging();
        let session = app.session().unwrap();

        app.on_accel_data(&[sample(1, 1, 1, 0)]);

        assert_eq!(app.count(), 1);
        assert_eq!(app.datalog().item_count(session), Some(0));
        assert_eq!(
            app.datalog_mut().log(session, &[0; Sample::RECORD_SIZE], 1),
            Err(DataLoggingResult::Closed)
        );
    }

    #[test]
    fn test_empty_batch_is_ignored() {
        let mut app = app();
        app.toggle_logging();
        app.on_accel_data(&[]);
        assert_eq!(app.count(), 0);
        assert_eq!(app.display().text, "Logging...");
    }

    #[test]
    fn test_tick_delivers_subscribed_samples() {
        let mut app = app();
        app.accel_mut().current = sample(4, 5, 6, 0);
        app.tick(0);
        assert_eq!(app.count(), 0, "nothing is delivered before subscribing");

        app.toggle_logging();
        app.tick(0);
        app.tick(20);
        app.tick(40);
        assert_eq!(app.count(), 2);
        assert!(app.display().text.contains("x: 4 mG"));
    }

    #[test]
    fn test_tick_drains_link_events() {
        let mut app = app();
        app.on_click(Button::Select);
        assert_eq!(app.link().inbound.len(), 1);
        app.tick(0);
        assert!(app.link().inbound.is_empty());
    }

    // -------------------------------------------------------------------------
    // Buttons
    // -------------------------------------------------------------------------

    #[test]
    fn test_select_sends_current_sample() {
        let mut app = app();
        app.accel_mut().current = sample(12, -34, 980, 0);
        app.on_click(Button::Select);

        assert_eq!(app.display().text, "Select\n\nSample: (12, -34, 980)");
        let msg = app.link().sent.last().unwrap();
        assert_eq!(int_field(msg, MSG_KEY_TYPE), Some(5000));
        assert_eq!(int_field(msg, MSG_KEY_FIELD_1), Some(12));
        assert_eq!(int_field(msg, MSG_KEY_FIELD_2), Some(-34));
        assert_eq!(int_field(msg, MSG_KEY_FIELD_3), Some(980));
    }

    #[test]
    fn test_select_while_logging() {
        let mut app = app();
        app.toggle_logging();
        app.accel_mut().current = sample(1, 2, 3, 0);
        app.on_click(Button::Select);

        let msg = app.link().sent.last().unwrap();
        assert_eq!(int_field(msg, MSG_KEY_TYPE), Some(5000));
        assert!(app.is_logging(), "select does not affect logging");
    }

    #[test]
    fn test_select_peek_failure_sends_nothing() {
        let mut app = app();
        app.accel_mut().fail_peek = true;
        app.on_click(Button::Select);
        assert!(app.link().sent.is_empty());
    }

    #[test]
    fn test_down_shows_battery() {
        let mut app = app();
        app.battery_mut().0 = 40;
        app.on_click(Button::Down);
        assert_eq!(app.display().text, "Power: 40%");
    }

    // -------------------------------------------------------------------------
    // Footprint
    // -------------------------------------------------------------------------

    struct NullPanel;

    impl Panel for NullPanel {
        fn flush(&mut self, _frame: &[u8; DISPLAY_BUFFER_SIZE]) -> anyhow::Result<()> {
            Ok(())
        }
        fn turn_off(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct NullTransport;

    impl Transport for NullTransport {
        fn write_all(&mut self, _bytes: &[u8]) -> anyhow::Result<()> {
            Ok(())
        }
        fn read(&mut self, _buf: &mut [u8]) -> anyhow::Result<usize> {
            Ok(0)
        }
    }

    /// Same services as the watch build, with the hardware stubbed out.
    type WatchApp = App<TextLayer<NullPanel>, FakeAccel, FakeBattery, FramedLink<NullTransport>, RecordStore>;

    #[test]
    fn test_app_state_fits_the_app_thread_stack() {
        use core::mem::size_of;

        assert!(size_of::<LinkEvent>() <= 2 * size_of::<usize>(), "inbound dictionaries are boxed");
        assert!(size_of::<FramedLink<NullTransport>>() < 1024);
        assert!(
            size_of::<WatchApp>() <= STACK_MAIN_LOOP / 4,
            "app state is {} B against a {} B stack",
            size_of::<WatchApp>(),
            STACK_MAIN_LOOP
        );
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    #[test]
    fn test_handle_routes_events() {
        let mut app = app();
        app.handle(AppEvent::Click(Button::Down));
        assert_eq!(app.display().text, "Power: 80%");

        // Link callbacks only observe; state is unchanged.
        app.handle(AppEvent::Link(LinkEvent::OutboxFailed(AppMessageResult::NotConnected)));
        app.handle(AppEvent::Link(LinkEvent::InboxDropped(AppMessageResult::BufferOverflow)));
        app.handle(AppEvent::Link(LinkEvent::InboxReceived(Box::default())));
        assert_eq!(app.display().text, "Power: 80%");
        assert!(!app.is_logging());
    }
}
