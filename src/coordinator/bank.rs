/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, warn};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::Config;
use crate::coordinator::dispatcher::select_car;
use crate::coordinator::pool::CarPool;
use crate::coordinator::queue::RequestQueue;
use crate::coordinator::timers::{Timer, TimerQueue};
use crate::elevator::{CarFSM, Step, TimingModel, TokenSource};
use crate::shared::{BankError, BankSnapshot, CommitError, Request};

/// What happened to a request handed to `Bank::request_service`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOutcome {
    Dispatched { car: usize },
    Queued { queue_length: usize },
}

/**
 * The dispatch engine of a lift bank.
 *
 * `Bank` owns every piece of mutable simulation state: the car pool, the
 * request queue and the timers driving the cars. It has no clock of its own.
 * Time only moves when the owner calls `advance_to`, which fires due timers
 * in deadline order. Every mutation bumps `revision`.
 *
 * # Fields
 * - `floor_count`:         Number of floors; valid requests are `0..floor_count`.
 * - `max_cars`:            Upper bound on the pool size.
 * - `requeue_abandoned`:   Whether trips lost in a pool rebuild go back into the queue.
 * - `timing`:              Phase durations.
 * - `pool`:                The cars.
 * - `queue`:               Requests waiting for a car.
 * - `timers`:              Pending car continuations and queue retries.
 * - `tokens`:              Source of cancellation tokens.
 * - `now`:                 Current simulation time.
 * - `drain_scheduled`:     A queue retry is already pending.
 * - `revision`:            Bumped on every state change.
 * - `stale_timers`:        Continuations dropped because their car moved on.
 */
#[derive(Debug)]
pub struct Bank {
    floor_count: u8,
    max_cars: usize,
    requeue_abandoned: bool,
    timing: TimingModel,
    pool: CarPool,
    queue: RequestQueue,
    timers: TimerQueue,
    tokens: TokenSource,
    now: Duration,
    drain_scheduled: bool,
    revision: u64,
    stale_timers: u64,
}

impl Bank {
    pub fn new(config: &Config) -> Bank {
        let mut tokens = TokenSource::default();
        let max_cars = config.building.max_cars;
        let car_count = clamp_car_count(config.building.car_count, max_cars);

        Bank {
            floor_count: config.building.floor_count,
            max_cars,
            requeue_abandoned: config.controller.requeue_abandoned,
            timing: TimingModel::new(&config.timing),
            pool: CarPool::new(car_count, &mut tokens),
            queue: RequestQueue::new(),
            timers: TimerQueue::new(),
            tokens,
            now: Duration::ZERO,
            drain_scheduled: false,
            revision: 0,
            stale_timers: 0,
        }
    }

    /// Applies a new building layout. Any change rebuilds the whole pool, which
    /// cancels every car continuation. Returns the car count actually used.
    pub fn configure(&mut self, floor_count: u8, car_count: usize) -> usize {
        let car_count = clamp_car_count(car_count, self.max_cars);
        if floor_count == self.floor_count && car_count == self.pool.len() {
            return car_count;
        }

        let cancelled = self.timers.cancel_phase_timers();
        debug!("Cancelled {} pending car timer(s)", cancelled);

        let abandoned = self.pool.resize(car_count, &mut self.tokens);
        self.floor_count = floor_count;

        if self.requeue_abandoned {
            let requeued: Vec<Request> = abandoned
                .into_iter()
                .filter(|request| request.floor < floor_count)
                .collect();
            if !requeued.is_empty() {
                info!("Requeued {} abandoned trip(s)", requeued.len());
            }
            self.queue.requeue_front(requeued);
        } else if !abandoned.is_empty() {
            info!("Dropped {} abandoned trip(s)", abandoned.len());
        }

        let dropped = self.queue.retain_floors_below(floor_count);
        for request in dropped {
            warn!("Dropped queued request for {}: floor no longer exists", request);
        }

        info!("Configured {} floor(s), {} car(s)", floor_count, car_count);
        self.touch();
        self.schedule_drain();
        car_count
    }

    /// Hands a hall call to the nearest idle car, or queues it.
    pub fn request_service(&mut self, request: Request) -> Result<ServiceOutcome, BankError> {
        if request.floor >= self.floor_count {
            warn!("Rejected request for {}", request);
            return Err(BankError::InvalidRequest {
                floor: request.floor,
                floor_count: self.floor_count,
            });
        }

        // Earlier calls keep their turn: an idle car waits for the queue retry
        if !self.queue.is_empty() {
            self.queue.enqueue(request);
            self.touch();
            info!(
                "{} queued behind earlier calls (queue length {})",
                request,
                self.queue.len()
            );
            if self.pool.cars().iter().any(CarFSM::is_eligible) {
                self.schedule_drain();
            }
            return Ok(ServiceOutcome::Queued {
                queue_length: self.queue.len(),
            });
        }

        if let Some(index) = select_car(request.floor, self.pool.cars()) {
            self.commit(index, request)?;
            return Ok(ServiceOutcome::Dispatched { car: index });
        }

        self.queue.enqueue(request);
        self.touch();
        info!(
            "No car available for {}, queued (queue length {})",
            request,
            self.queue.len()
        );
        self.drain();

        Ok(ServiceOutcome::Queued {
            queue_length: self.queue.len(),
        })
    }

    /// Moves simulation time forward to `now`, firing every timer due by then.
    /// Returns the number of timers fired. Time never moves backwards.
    pub fn advance_to(&mut self, now: Duration) -> usize {
        let mut fired = 0;
        while self.fire_next(now) {
            fired += 1;
        }
        self.now = self.now.max(now);
        fired
    }

    /// Fires the earliest timer due at `now`, if any. Lets the owner observe
    /// the state between two timers that fall in the same catch-up.
    pub fn fire_next(&mut self, now: Duration) -> bool {
        let Some((deadline, timer)) = self.timers.pop_due(now) else {
            return false;
        };
        self.now = self.now.max(deadline);
        self.fire(timer);
        true
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn snapshot(&self) -> BankSnapshot {
        BankSnapshot {
            revision: self.revision,
            floor_count: self.floor_count,
            cars: self.pool.snapshot(),
            queue_length: self.queue.len(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn floor_count(&self) -> u8 {
        self.floor_count
    }

    pub fn car(&self, index: usize) -> Option<&CarFSM> {
        self.pool.get(index)
    }

    pub fn cars(&self) -> &[CarFSM] {
        self.pool.cars()
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn stale_timers(&self) -> u64 {
        self.stale_timers
    }

    #[cfg(test)]
    pub fn test_schedule(&mut self, deadline: Duration, timer: Timer) {
        self.timers.schedule(deadline, timer);
    }

    fn commit(&mut self, index: usize, request: Request) -> Result<(), CommitError> {
        let token = self.tokens.issue();
        let car = self
            .pool
            .get_mut(index)
            .ok_or(CommitError::UnknownCar { index })?;
        let from = car.current_floor();
        let doors_open = car.phase().doors_open();
        let step = car.commit(request, &self.timing, self.now, token)?;

        info!(
            "Dispatched car {} from floor {} to {}, back in service in {:.1}s",
            index,
            from,
            request,
            self.timing
                .cycle_duration(from, request.floor, doors_open)
                .as_secs_f64()
        );
        self.schedule_step(index, step);
        self.touch();
        Ok(())
    }

    /// Serves queued requests in order until the head finds no idle car.
    fn drain(&mut self) -> usize {
        let mut dispatched = 0;

        while let Some(&request) = self.queue.head() {
            let Some(index) = select_car(request.floor, self.pool.cars()) else {
                break;
            };
            self.queue.pop_head();
            if let Err(e) = self.commit(index, request) {
                warn!("Could not commit queued {}: {}", request, e);
                self.queue.requeue_front(vec![request]);
                break;
            }
            dispatched += 1;
        }

        if dispatched > 0 {
            info!(
                "Dispatched {} queued request(s), {} still waiting",
                dispatched,
                self.queue.len()
            );
        }
        dispatched
    }

    fn schedule_drain(&mut self) {
        if self.drain_scheduled || self.queue.is_empty() || self.pool.is_empty() {
            return;
        }
        self.drain_scheduled = true;
        self.timers
            .schedule(self.now + self.timing.dispatch_latency, Timer::Drain);
    }

    fn schedule_step(&mut self, index: usize, step: Step) {
        self.timers.schedule(
            self.now + step.after,
            Timer::Phase {
                car: index,
                phase: step.phase,
                token: step.token,
            },
        );
    }

    fn fire(&mut self, timer: Timer) {
        match timer {
            Timer::Drain => {
                self.drain_scheduled = false;
                self.drain();
            }
            Timer::Phase { car, phase, token } => {
                let Some(fsm) = self.pool.get_mut(car) else {
                    self.drop_stale(car);
                    return;
                };
                if fsm.token() != token || fsm.phase() != phase {
                    self.drop_stale(car);
                    return;
                }

                let next = fsm.on_timer(&self.timing, self.now);
                let floor = fsm.current_floor();
                self.touch();

                match next {
                    Some(step) => self.schedule_step(car, step),
                    None => {
                        info!("Car {} idle at floor {}", car, floor);
                        self.schedule_drain();
                    }
                }
            }
        }
    }

    // Pool rebuilds purge car timers and only idle cars take commits, so a
    // mismatch here means a timer outlived the car state it was scheduled for.
    fn drop_stale(&mut self, car: usize) {
        self.stale_timers += 1;
        debug!("Dropped stale timer for car slot {}", car);
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

fn clamp_car_count(requested: usize, max_cars: usize) -> usize {
    if requested > max_cars {
        warn!(
            "Requested {} cars but the layout fits {}, using {}",
            requested, max_cars, max_cars
        );
        max_cars
    } else {
        requested
    }
}
