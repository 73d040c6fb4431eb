/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::debug;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::TimingModel;
use crate::shared::{CarSnapshot, CommitError, Direction, Phase, Request};

/// Identifies one scheduled continuation of a car. A car owns exactly one
/// live token; replacing it cancels every timer carrying the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CancelToken(u64);

/// Hands out tokens that are never reused, also across pool rebuilds.
#[derive(Debug, Default)]
pub struct TokenSource {
    next: u64,
}

impl TokenSource {
    pub fn issue(&mut self) -> CancelToken {
        let token = CancelToken(self.next);
        self.next += 1;
        token
    }
}

/// The next continuation a car wants: fire `after` from now, and only if the
/// car still holds `token` and is still in `phase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub phase: Phase,
    pub after: Duration,
    pub token: CancelToken,
}

/**
 * Motion and door state machine for one car.
 *
 * The FSM never schedules anything itself. `commit` and `on_timer` move the car
 * to its next phase and return the `Step` the owner has to schedule. The owner
 * must hand back the timer only while the token and phase in the `Step` still
 * match, which is what makes stale continuations harmless.
 *
 * # Fields
 * - `index`:               Position of the car in its pool. Fixed for the car's lifetime.
 * - `current_floor`:       Last floor the car came to rest at.
 * - `target_floor`:        Destination of the committed trip, if any.
 * - `phase`:               Current phase of the door/motion cycle.
 * - `travel_duration`:     Length of the current travel. Zero outside `Moving`.
 * - `phase_started_at`:    Simulation time the current phase began.
 * - `request`:             The hall call this trip serves.
 * - `token`:               Cancellation token of the outstanding continuation.
 */
#[derive(Debug, Clone)]
pub struct CarFSM {
    index: usize,
    current_floor: u8,
    target_floor: Option<u8>,
    phase: Phase,
    travel_duration: Duration,
    phase_started_at: Duration,
    request: Option<Request>,
    token: CancelToken,
}

impl CarFSM {
    pub fn new(index: usize, token: CancelToken) -> CarFSM {
        CarFSM {
            index,
            current_floor: 0,
            target_floor: None,
            phase: Phase::Idle,
            travel_duration: Duration::ZERO,
            phase_started_at: Duration::ZERO,
            request: None,
            token,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_floor(&self) -> u8 {
        self.current_floor
    }

    pub fn target_floor(&self) -> Option<u8> {
        self.target_floor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn travel_duration(&self) -> Duration {
        self.travel_duration
    }

    pub fn request(&self) -> Option<Request> {
        self.request
    }

    pub fn token(&self) -> CancelToken {
        self.token
    }

    pub fn is_eligible(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn distance_to(&self, floor: u8) -> u8 {
        self.current_floor.abs_diff(floor)
    }

    /// Commits the car to serve `request`. Idle cars leave straight away,
    /// cars with open doors close them first. The fresh `token` replaces the
    /// current one, so any continuation scheduled before this call goes stale.
    pub fn commit(
        &mut self,
        request: Request,
        timing: &TimingModel,
        now: Duration,
        token: CancelToken,
    ) -> Result<Step, CommitError> {
        if self.phase.is_committed() {
            return Err(CommitError::Busy {
                index: self.index,
                phase: self.phase,
            });
        }

        let doors_open = self.phase.doors_open();
        self.target_floor = Some(request.floor);
        self.request = Some(request);
        self.token = token;

        if doors_open {
            self.enter(Phase::DoorClosing, now);
            Ok(self.step(timing.door))
        } else {
            Ok(self.start_travel(timing, now))
        }
    }

    /// Advances the car after the continuation for its current phase fired.
    /// Returns the next step, or `None` once the car is idle again.
    pub fn on_timer(&mut self, timing: &TimingModel, now: Duration) -> Option<Step> {
        match self.phase {
            Phase::DoorClosing => Some(self.start_travel(timing, now)),
            Phase::Moving => {
                if let Some(target) = self.target_floor {
                    self.current_floor = target;
                }
                self.travel_duration = Duration::ZERO;
                self.enter(Phase::DoorOpening, now);
                Some(self.step(timing.door))
            }
            Phase::DoorOpening => {
                self.enter(Phase::DoorOpen, now);
                Some(self.step(timing.door))
            }
            Phase::DoorOpen => {
                self.enter(Phase::DoorClosingAfterArrival, now);
                Some(self.step(timing.door))
            }
            Phase::DoorClosingAfterArrival => {
                self.target_floor = None;
                self.request = None;
                self.enter(Phase::Idle, now);
                None
            }
            Phase::Idle => None,
        }
    }

    /// Takes the car out of service. Returns the request it had not finished
    /// delivering, if any. Cars already at their destination have delivered.
    pub fn abandon(self) -> Option<Request> {
        match self.phase {
            Phase::DoorClosing | Phase::Moving => self.request,
            _ => None,
        }
    }

    pub fn snapshot(&self) -> CarSnapshot {
        CarSnapshot {
            index: self.index,
            current_floor: self.current_floor,
            target_floor: self.target_floor,
            phase: self.phase,
            travel_duration_secs: self.travel_duration.as_secs_f64(),
            phase_started_at_secs: self.phase_started_at.as_secs_f64(),
            request_direction: self.request_direction(),
        }
    }

    pub fn request_direction(&self) -> Option<Direction> {
        self.request.map(|r| r.direction)
    }

    fn start_travel(&mut self, timing: &TimingModel, now: Duration) -> Step {
        let target = self.target_floor.unwrap_or(self.current_floor);
        self.travel_duration = timing.travel_duration(self.current_floor, target);
        self.enter(Phase::Moving, now);
        self.step(self.travel_duration)
    }

    fn enter(&mut self, phase: Phase, now: Duration) {
        debug!(
            "Car {} {:?} -> {:?} at {:.1}s (floor {})",
            self.index,
            self.phase,
            phase,
            now.as_secs_f64(),
            self.current_floor
        );
        self.phase = phase;
        self.phase_started_at = now;
    }

    fn step(&self, after: Duration) -> Step {
        Step {
            phase: self.phase,
            after,
            token: self.token,
        }
    }
}
