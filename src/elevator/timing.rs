/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::TimingConfig;

/**
 * Converts floor distances into phase durations.
 *
 * # Fields
 * - `unit_travel`:         Time to cover one floor of distance.
 * - `door`:                Duration of each door phase (opening, open, closing).
 * - `dispatch_latency`:    Delay between a car becoming idle and queued work being committed to it.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingModel {
    pub unit_travel: Duration,
    pub door: Duration,
    pub dispatch_latency: Duration,
}

impl TimingModel {
    pub fn new(config: &TimingConfig) -> TimingModel {
        TimingModel {
            unit_travel: config.unit_travel(),
            door: config.door(),
            dispatch_latency: config.dispatch_latency(),
        }
    }

    pub fn travel_duration(&self, from: u8, to: u8) -> Duration {
        self.unit_travel * u32::from(from.abs_diff(to))
    }

    /// Time from commit until the car is idle again at `to`. A car whose
    /// doors are open at commit time spends one extra door phase closing them.
    pub fn cycle_duration(&self, from: u8, to: u8, doors_open: bool) -> Duration {
        let closing = if doors_open { self.door } else { Duration::ZERO };
        closing + self.travel_duration(from, to) + self.door * 3
    }
}

impl Default for TimingModel {
    fn default() -> Self {
        TimingModel::new(&TimingConfig::default())
    }
}
