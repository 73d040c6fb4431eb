/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::ParseError;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "doorClosing")]
    DoorClosing,
    #[serde(rename = "moving")]
    Moving,
    #[serde(rename = "doorOpening")]
    DoorOpening,
    #[serde(rename = "doorOpen")]
    DoorOpen,
    #[serde(rename = "doorClosingAfterArrival")]
    DoorClosingAfterArrival,
}

impl Phase {
    /// Doors are at least partly open and no trip is committed.
    pub fn doors_open(&self) -> bool {
        matches!(
            self,
            Phase::DoorOpening | Phase::DoorOpen | Phase::DoorClosingAfterArrival
        )
    }

    /// The car has a trip it will not give up.
    pub fn is_committed(&self) -> bool {
        matches!(self, Phase::DoorClosing | Phase::Moving)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            _ => Err(ParseError::Direction(s.to_string())),
        }
    }
}

/// A hall call: somebody at `floor` wants to travel in `direction`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub floor: u8,
    pub direction: Direction,
}

impl Request {
    pub fn new(floor: u8, direction: Direction) -> Request {
        Request { floor, direction }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "floor {} {}", self.floor, self.direction)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarSnapshot {
    pub index: usize,
    #[serde(rename = "currentFloor")]
    pub current_floor: u8,
    #[serde(rename = "targetFloor")]
    pub target_floor: Option<u8>,
    pub phase: Phase,
    #[serde(rename = "travelDurationSeconds")]
    pub travel_duration_secs: f64,
    #[serde(rename = "phaseStartedAtSeconds")]
    pub phase_started_at_secs: f64,
    #[serde(rename = "requestDirection")]
    pub request_direction: Option<Direction>,
}

impl CarSnapshot {
    /// Fraction of the current trip covered at time `at`, from 0.0 at
    /// `current_floor` to 1.0 at `target_floor`.
    pub fn progress(&self, at: Duration) -> f64 {
        match self.phase {
            Phase::Idle | Phase::DoorClosing => 0.0,
            Phase::Moving => {
                if self.travel_duration_secs <= 0.0 {
                    return 1.0;
                }
                let elapsed = at.as_secs_f64() - self.phase_started_at_secs;
                (elapsed / self.travel_duration_secs).clamp(0.0, 1.0)
            }
            Phase::DoorOpening | Phase::DoorOpen | Phase::DoorClosingAfterArrival => 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BankSnapshot {
    pub revision: u64,
    #[serde(rename = "floorCount")]
    pub floor_count: u8,
    pub cars: Vec<CarSnapshot>,
    #[serde(rename = "queueLength")]
    pub queue_length: usize,
}
