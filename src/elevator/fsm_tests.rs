/*
 * Unit tests for the car state machine
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 *  - test_fsm_init
 *  - test_fsm_idle_commit_starts_moving
 *  - test_fsm_full_cycle_from_idle
 *  - test_fsm_commit_with_doors_open
 *  - test_fsm_commit_rejected_while_committed
 *  - test_fsm_same_floor_trip
 *  - test_fsm_abandon
 *  - test_timing_model
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod fsm_tests {
    use crate::elevator::{CarFSM, Step, TimingModel, TokenSource};
    use crate::shared::Direction::{Down, Up};
    use crate::shared::Phase::{
        DoorClosing, DoorClosingAfterArrival, DoorOpen, DoorOpening, Idle, Moving,
    };
    use crate::shared::{CommitError, Phase, Request};
    use std::time::Duration;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn setup_fsm() -> (CarFSM, TimingModel, TokenSource) {
        let mut tokens = TokenSource::default();
        let car = CarFSM::new(0, tokens.issue());
        (car, TimingModel::default(), tokens)
    }

    // Feeds the car its own continuations until it is idle again.
    // Returns the phases visited (after the starting one) and the time it went idle.
    fn run_to_idle(
        car: &mut CarFSM,
        timing: &TimingModel,
        first: Step,
        start: Duration,
    ) -> (Vec<Phase>, Duration) {
        let mut phases = vec![car.phase()];
        let mut now = start + first.after;
        let mut next = Some(first);

        while let Some(step) = next {
            assert_eq!(step.phase, car.phase());
            assert_eq!(step.token, car.token());
            next = car.on_timer(timing, now);
            phases.push(car.phase());
            if let Some(step) = next {
                now += step.after;
            }
        }

        (phases, now)
    }

    #[test]
    fn test_fsm_init() {
        // Purpose: Verify that a fresh car rests idle at the ground floor

        // Arrange
        let (car, _timing, _tokens) = setup_fsm();

        // Assert
        assert_eq!(car.phase(), Idle);
        assert_eq!(car.current_floor(), 0);
        assert_eq!(car.target_floor(), None);
        assert_eq!(car.travel_duration(), Duration::ZERO);
        assert!(car.is_eligible());
    }

    #[test]
    fn test_fsm_idle_commit_starts_moving() {
        // Purpose: Verify the fast path, an idle car leaves without a door phase

        // Arrange
        let (mut car, timing, mut tokens) = setup_fsm();
        let token = tokens.issue();

        // Act
        let step = car
            .commit(Request::new(3, Up), &timing, Duration::ZERO, token)
            .unwrap();

        // Assert
        assert_eq!(car.phase(), Moving);
        assert_eq!(car.target_floor(), Some(3));
        assert_eq!(car.travel_duration(), secs(7.5));
        assert_eq!(car.request_direction(), Some(Up));
        assert_eq!(step, Step { phase: Moving, after: secs(7.5), token });
        assert!(!car.is_eligible());
    }

    #[test]
    fn test_fsm_full_cycle_from_idle() {
        // Purpose: Verify every phase is visited once and the car ends idle at the target

        // Arrange
        let (mut car, timing, mut tokens) = setup_fsm();
        let first = car
            .commit(Request::new(3, Up), &timing, Duration::ZERO, tokens.issue())
            .unwrap();

        // Act
        let (phases, idle_at) = run_to_idle(&mut car, &timing, first, Duration::ZERO);

        // Assert
        assert_eq!(
            phases,
            vec![Moving, DoorOpening, DoorOpen, DoorClosingAfterArrival, Idle]
        );
        assert_eq!(idle_at, timing.cycle_duration(0, 3, false));
        assert_eq!(idle_at, secs(3.0 * 2.5 + 3.0 * 2.5));
        assert_eq!(car.current_floor(), 3);
        assert_eq!(car.target_floor(), None);
        assert_eq!(car.request(), None);
    }

    #[test]
    fn test_fsm_commit_with_doors_open() {
        // Purpose: Verify a car with open doors closes them before travelling

        // Arrange
        let (mut car, timing, mut tokens) = setup_fsm();
        let first = car
            .commit(Request::new(2, Up), &timing, Duration::ZERO, tokens.issue())
            .unwrap();
        let arrived_at = first.after;
        car.on_timer(&timing, arrived_at).unwrap();
        let opened = car.on_timer(&timing, arrived_at + timing.door).unwrap();
        assert_eq!(car.phase(), DoorOpen);
        let stale_token = opened.token;

        // Act
        let now = arrived_at + timing.door;
        let fresh = tokens.issue();
        let closing = car.commit(Request::new(0, Down), &timing, now, fresh).unwrap();

        // Assert
        assert_eq!(car.phase(), DoorClosing);
        assert_ne!(closing.token, stale_token);
        assert_eq!(closing.after, timing.door);

        let (phases, idle_at) = run_to_idle(&mut car, &timing, closing, now);
        assert_eq!(
            phases,
            vec![DoorClosing, Moving, DoorOpening, DoorOpen, DoorClosingAfterArrival, Idle]
        );
        assert_eq!(idle_at - now, timing.cycle_duration(2, 0, true));
        assert_eq!(car.current_floor(), 0);
    }

    #[test]
    fn test_fsm_commit_rejected_while_committed() {
        // Purpose: Verify a moving car cannot be redirected

        // Arrange
        let (mut car, timing, mut tokens) = setup_fsm();
        let first = car
            .commit(Request::new(4, Up), &timing, Duration::ZERO, tokens.issue())
            .unwrap();

        // Act
        let result = car.commit(Request::new(1, Down), &timing, secs(1.0), tokens.issue());

        // Assert
        assert_eq!(result, Err(CommitError::Busy { index: 0, phase: Moving }));
        assert_eq!(car.target_floor(), Some(4));
        assert_eq!(car.token(), first.token);
    }

    #[test]
    fn test_fsm_same_floor_trip() {
        // Purpose: Verify a request at the car's own floor only runs the door cycle

        // Arrange
        let (mut car, timing, mut tokens) = setup_fsm();

        // Act
        let first = car
            .commit(Request::new(0, Up), &timing, Duration::ZERO, tokens.issue())
            .unwrap();
        let (phases, idle_at) = run_to_idle(&mut car, &timing, first, Duration::ZERO);

        // Assert
        assert_eq!(first.after, Duration::ZERO);
        assert_eq!(phases.len(), 5);
        assert_eq!(idle_at, timing.door * 3);
    }

    #[test]
    fn test_fsm_abandon() {
        // Purpose: Verify only undelivered trips are handed back on abandon

        // Arrange
        let (mut car, timing, mut tokens) = setup_fsm();
        let request = Request::new(2, Up);
        let first = car.commit(request, &timing, Duration::ZERO, tokens.issue()).unwrap();
        let moving = car.clone();
        car.on_timer(&timing, first.after);

        // Act / Assert
        assert_eq!(moving.abandon(), Some(request));
        assert_eq!(car.phase(), DoorOpening);
        assert_eq!(car.abandon(), None);
    }

    #[test]
    fn test_timing_model() {
        // Purpose: Verify distance is converted to duration symmetrically

        // Arrange
        let timing = TimingModel::default();

        // Assert
        assert_eq!(timing.travel_duration(0, 3), secs(7.5));
        assert_eq!(timing.travel_duration(3, 0), secs(7.5));
        assert_eq!(timing.travel_duration(2, 2), Duration::ZERO);
        assert_eq!(timing.cycle_duration(1, 2, true), secs(2.5 + 2.5 + 7.5));
    }
}
