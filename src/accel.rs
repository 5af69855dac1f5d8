// AccelLog — Accelerometer Subscription Scheduling
//
// Tracks whether sample delivery is active, when the next sample is due, and
// groups samples into batches of `samples_per_update` before they are handed
// to the application.  Driver-agnostic: the firmware feeds it MPU6050
// readings, the tests feed it synthetic ones.

use crate::config::*;
use crate::events::Sample;

pub type SampleBatch = heapless::Vec<Sample, ACCEL_MAX_BATCH>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingRate {
    Hz10,
    #[default]
    Hz25,
    Hz50,
    Hz100,
}

impl SamplingRate {
    pub const fn hz(self) -> u32 {
        match self {
            Self::Hz10 => 10,
            Self::Hz25 => 25,
            Self::Hz50 => 50,
            Self::Hz100 => 100,
        }
    }

    pub const fn interval_ms(self) -> u64 {
        1000 / self.hz() as u64
    }
}

/// Convert a raw ±8 g reading to milli-g.
pub fn raw_to_milli_g(raw: i16) -> i16 {
    let mg = f32::from(raw) / ACCEL_SCALE_8G * 1000.0;
    mg.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

#[derive(Debug, Default)]
pub struct SampleScheduler {
    subscribed: bool,
    samples_per_update: usize,
    rate: SamplingRate,
    next_due_ms: Option<u64>,
    batch: SampleBatch,
}

impl SampleScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, samples_per_update: u32) {
        self.subscribed = true;
        self.samples_per_update = (samples_per_update as usize).clamp(1, ACCEL_MAX_BATCH);
        self.next_due_ms = None;
        self.batch.clear();
    }

    pub fn set_sampling_rate(&mut self, rate: SamplingRate) {
        self.rate = rate;
    }

    pub fn unsubscribe(&mut self) {
        self.subscribed = false;
        self.next_due_ms = None;
        self.batch.clear();
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn rate(&self) -> SamplingRate {
        self.rate
    }

    /// Whether a new reading should be taken at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.subscribed && self.next_due_ms.map_or(true, |due| now_ms >= due)
    }

    /// Record a reading taken at `now_ms`.  Returns the batch once it holds
    /// `samples_per_update` samples.
    pub fn push(&mut self, sample: Sample, now_ms: u64) -> Option<SampleBatch> {
        if !self.subscribed {
            return None;
        }

        let interval = self.rate.interval_ms();
        self.next_due_ms = Some(match self.next_due_ms {
            // Keep the cadence unless we fell more than a full interval behind.
            Some(due) if now_ms < due + interval => due + interval,
            _ => now_ms + interval,
        });

        // Batch is never full here: it is drained at samples_per_update <= capacity.
        let _ = self.batch.push(sample);
        if self.batch.len() >= self.samples_per_update {
            Some(core::mem::take(&mut self.batch))
        } else {
            None
        }
    }
}
