/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::Config;
use crate::coordinator::bank::{Bank, ServiceOutcome};
use crate::shared::{BankSnapshot, Request};

/***************************************/
/*               Enums                 */
/***************************************/
/// Messages the shell sends to the coordinator thread.
#[derive(Debug, Clone)]
pub enum Command {
    Configure { floor_count: u8, car_count: usize },
    RequestService(Request),
    /// Ask for the current snapshot on a reply channel.
    Snapshot(cbc::Sender<BankSnapshot>),
}

enum Event {
    Command(Command),
    TimerDue,
    Terminate,
}

/***************************************/
/*             Public API              */
/***************************************/
/**
 * Runs a `Bank` against wall-clock time.
 *
 * The coordinator owns the bank on its own thread. It waits for commands from
 * the shell and, between commands, sleeps exactly until the next car timer is
 * due. It publishes a snapshot after every fired timer and every event that
 * changed anything.
 *
 * # Fields
 * - `bank`:                The engine.
 * - `started`:             Wall-clock origin of the simulation timeline.
 * - `idle_poll`:           Longest time to wait when no timer is pending.
 * - `published_revision`:  Revision of the last snapshot sent on `snapshot_tx`.
 * - `command_rx`:          Receives commands from the shell.
 * - `snapshot_tx`:         Publishes snapshots to the shell.
 * - `terminate_rx`:        Stops the coordinator.
 */
pub struct Coordinator {
    // Private fields
    bank: Bank,
    started: Instant,
    idle_poll: Duration,
    published_revision: Option<u64>,

    // Shell channels
    command_rx: cbc::Receiver<Command>,
    snapshot_tx: cbc::Sender<BankSnapshot>,
    terminate_rx: cbc::Receiver<()>,
}

impl Coordinator {
    pub fn new(
        config: &Config,
        command_rx: cbc::Receiver<Command>,
        snapshot_tx: cbc::Sender<BankSnapshot>,
        terminate_rx: cbc::Receiver<()>,
    ) -> Coordinator {
        Coordinator {
            bank: Bank::new(config),
            started: Instant::now(),
            idle_poll: Duration::from_millis(config.controller.idle_poll_ms),
            published_revision: None,
            command_rx,
            snapshot_tx,
            terminate_rx,
        }
    }

    pub fn run(mut self) {
        info!(
            "Coordinator started with {} car(s) over {} floor(s)",
            self.bank.cars().len(),
            self.bank.floor_count()
        );
        self.publish();

        // Main loop
        loop {
            let event = self.wait_for_event();
            if !self.handle_event(event) {
                break;
            }
            self.publish();
        }

        info!("Coordinator terminated");
    }

    fn handle_event(&mut self, event: Event) -> bool {
        // Catch up on timers before looking at the event
        self.catch_up(self.started.elapsed());

        match event {
            Event::Command(Command::Configure {
                floor_count,
                car_count,
            }) => {
                self.bank.configure(floor_count, car_count);
            }

            Event::Command(Command::RequestService(request)) => {
                match self.bank.request_service(request) {
                    Ok(ServiceOutcome::Dispatched { car }) => {
                        debug!("{} served by car {}", request, car);
                    }
                    Ok(ServiceOutcome::Queued { queue_length }) => {
                        debug!("{} queued, {} waiting", request, queue_length);
                    }
                    Err(e) => warn!("Ignoring request: {}", e),
                }
            }

            Event::Command(Command::Snapshot(reply_tx)) => {
                if reply_tx.send(self.bank.snapshot()).is_err() {
                    debug!("Snapshot requester went away");
                }
            }

            Event::TimerDue => {}

            Event::Terminate => return false,
        }

        true
    }

    // Publishes after every fired timer so no phase is skipped in a late wake-up.
    fn catch_up(&mut self, now: Duration) {
        while self.bank.fire_next(now) {
            self.publish();
        }
        self.bank.advance_to(now);
    }

    fn wait_for_event(&self) -> Event {
        cbc::select! {
            // Handling shell commands
            recv(self.command_rx) -> command => {
                match command {
                    Ok(command) => Event::Command(command),
                    Err(e) => {
                        warn!("Command channel closed: {}", e);
                        Event::Terminate
                    }
                }
            },

            recv(self.terminate_rx) -> _ => Event::Terminate,

            default(self.time_until_next_timer()) => Event::TimerDue,
        }
    }

    fn time_until_next_timer(&self) -> Duration {
        match self.bank.next_deadline() {
            Some(deadline) => deadline
                .saturating_sub(self.started.elapsed())
                .min(self.idle_poll),
            None => self.idle_poll,
        }
    }

    fn publish(&mut self) {
        let revision = self.bank.revision();
        if self.published_revision == Some(revision) {
            return;
        }
        self.published_revision = Some(revision);

        if self.snapshot_tx.send(self.bank.snapshot()).is_err() {
            debug!("No snapshot subscriber listening");
        }
    }

    #[cfg(test)]
    pub fn test_get_bank(&self) -> &Bank {
        &self.bank
    }

    #[cfg(test)]
    pub fn test_get_bank_mut(&mut self) -> &mut Bank {
        &mut self.bank
    }

    #[cfg(test)]
    pub fn test_catch_up(&mut self, now: Duration) {
        self.catch_up(now);
    }
}
