/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::str::FromStr;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::coordinator::Command;
use crate::shared::{Direction, ParseError, Request};

pub const HELP: &str = "\
commands:
  floors N            rebuild the building with N floors
  cars N              rebuild the bank with N cars
  call FLOOR up|down  press a hall button (floors count from 0)
  status              print the current snapshot
  quit                stop the simulation";

/// What the terminal loop should do with one line of input.
#[derive(Debug, Clone)]
pub enum Action {
    Send(Command),
    Status,
    Help,
    Quit,
    Nothing,
}

/// Line-oriented stand-in for the button panel. Remembers the layout so that
/// `floors` and `cars` can each change one half of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    floor_count: u8,
    car_count: usize,
}

impl Shell {
    pub fn new(floor_count: u8, car_count: usize) -> Shell {
        Shell {
            floor_count,
            car_count,
        }
    }

    pub fn interpret(&mut self, line: &str) -> Result<Action, ParseError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&keyword, args)) = words.split_first() else {
            return Ok(Action::Nothing);
        };

        match keyword.to_ascii_lowercase().as_str() {
            "floors" => {
                expect_args(keyword, args, 1)?;
                self.floor_count = parse_number(args[0])?;
                Ok(self.configure())
            }
            "cars" => {
                expect_args(keyword, args, 1)?;
                self.car_count = parse_number(args[0])?;
                Ok(self.configure())
            }
            "call" => {
                expect_args(keyword, args, 2)?;
                let floor: u8 = parse_number(args[0])?;
                let direction = Direction::from_str(args[1])?;
                if floor == 0 && direction == Direction::Up {
                    return Err(ParseError::UpFromGround);
                }
                Ok(Action::Send(Command::RequestService(Request::new(
                    floor, direction,
                ))))
            }
            "status" => Ok(Action::Status),
            "help" | "?" => Ok(Action::Help),
            "quit" | "exit" => Ok(Action::Quit),
            _ => Err(ParseError::UnknownCommand(keyword.to_string())),
        }
    }

    fn configure(&self) -> Action {
        Action::Send(Command::Configure {
            floor_count: self.floor_count,
            car_count: self.car_count,
        })
    }
}

fn expect_args(keyword: &str, args: &[&str], count: usize) -> Result<(), ParseError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(ParseError::Arity(keyword.to_string(), count))
    }
}

fn parse_number<T: FromStr>(word: &str) -> Result<T, ParseError> {
    word.parse()
        .map_err(|_| ParseError::Number(word.to_string()))
}
