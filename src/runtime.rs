// AccelLog — Event Loop
//
// Single-threaded and cooperative: each pass polls the buttons, then lets the
// application drain its accelerometer subscription and phone link.  One
// handler runs at a time, so application state needs no locking.

use heapless::Vec;

use crate::app::App;
use crate::events::{AppEvent, Button};
use crate::services::{Accelerometer, Battery, DataLogging, MessageChannel, TextDisplay};

/// Platform hooks the event loop needs besides the application services.
pub trait EventSource {
    /// Monotonic milliseconds.
    fn now_ms(&mut self) -> u64;
    /// Buttons clicked since the previous call.
    fn poll_clicks(&mut self, now_ms: u64) -> Vec<Button, 3>;
    fn should_exit(&mut self) -> bool;
    /// Yield until the next pass.
    fn idle(&mut self);
}

/// Run the application: init, event loop until the source asks to exit,
/// deinit.
pub fn run<D, A, B, M, L, S>(app: &mut App<D, A, B, M, L>, source: &mut S)
where
    D: TextDisplay,
    A: Accelerometer,
    B: Battery,
    M: MessageChannel,
    L: DataLogging,
    S: EventSource,
{
    app.init();

    while !source.should_exit() {
        let now = source.now_ms();
        for button in source.poll_clicks(now) {
            app.handle(AppEvent::Click(button));
        }
        app.tick(now);
        source.idle();
    }

    app.deinit();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::{SampleBatch, SampleScheduler, SamplingRate};
    use crate::config::*;
    use crate::datalog::RecordStore;
    use crate::events::{ChargeState, LinkEvent, Sample};
    use crate::message::{AppMessageResult, Dictionary, Value};
    use embedded_graphics::text::Alignment;

    #[derive(Default)]
    struct Screen(std::string::String, bool);

    impl TextDisplay for Screen {
        fn set_text(&mut self, text: &str) {
            self.0 = text.to_owned();
        }
        fn set_alignment(&mut self, _alignment: Alignment) {}
        fn clear(&mut self) {
            self.1 = true;
        }
    }

    #[derive(Default)]
    struct Accel(SampleScheduler);

    impl Accelerometer for Accel {
        fn peek(&mut self) -> anyhow::Result<Sample> {
            Ok(Sample::default())
        }
        fn subscribe(&mut self, samples_per_update: u32) {
            self.0.subscribe(samples_per_update);
        }
        fn set_sampling_rate(&mut self, rate: SamplingRate) {
            self.0.set_sampling_rate(rate);
        }
        fn unsubscribe(&mut self) {
            self.0.unsubscribe();
        }
        fn poll(&mut self, now_ms: u64) -> Option<SampleBatch> {
            if self.0.is_due(now_ms) {
                return self.0.push(Sample { x: 1, y: 2, z: 3, did_vibrate: false, timestamp: now_ms }, now_ms);
            }
            None
        }
    }

    struct Full;

    impl Battery for Full {
        fn peek(&mut self) -> ChargeState {
            ChargeState { charge_percent: 100, ..ChargeState::default() }
        }
    }

    /// Records the message type of every send.
    #[derive(Default)]
    struct Link(std::vec::Vec<i32>);

    impl MessageChannel for Link {
        fn open(&mut self, _inbox: usize, _outbox: usize) -> Result<(), AppMessageResult> {
            Ok(())
        }
        fn send(&mut self, dict: &Dictionary) -> Result<(), AppMessageResult> {
            self.0.push(dict.find(MSG_KEY_TYPE).and_then(Value::as_i32).unwrap_or(-1));
            Ok(())
        }
        fn poll(&mut self) -> Option<LinkEvent> {
            None
        }
    }

    /// Presses Up at 100 ms, Up again at 400 ms, exits at 500 ms.
    struct Script {
        now: u64,
    }

    impl EventSource for Script {
        fn now_ms(&mut self) -> u64 {
            self.now
        }
        fn poll_clicks(&mut self, now_ms: u64) -> Vec<Button, 3> {
            let mut clicks = Vec::new();
            if now_ms == 100 || now_ms == 400 {
                let _ = clicks.push(Button::Up);
            }
            clicks
        }
        fn should_exit(&mut self) -> bool {
            self.now >= 500
        }
        fn idle(&mut self) {
            self.now += EVENT_LOOP_INTERVAL_MS * 4;
        }
    }

    #[test]
    fn test_run_logs_between_two_up_clicks() {
        let mut app = App::new(
            Screen::default(),
            Accel::default(),
            Full,
            Link::default(),
            RecordStore::new(DATA_LOG_CAPACITY_BYTES),
        );
        run(&mut app, &mut Script { now: 0 });

        assert!(!app.is_logging());
        assert!(app.display().1, "deinit clears the display");

        // 25 Hz from 100 ms until 400 ms: samples at 100, 140, …, 380, each
        // uploaded on the pass that sampled it.
        assert_eq!(app.count(), 8);
        let mut expected = vec![5001];
        expected.extend([5003; 8]);
        expected.extend([5002, 5004]);
        assert_eq!(app.link().0, expected);

        let session = app.session().unwrap();
        assert_eq!(app.datalog().item_count(session), None, "uploaded session is released");
    }
}
