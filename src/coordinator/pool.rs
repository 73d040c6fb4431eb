/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::info;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::{CarFSM, TokenSource};
use crate::shared::{CarSnapshot, Request};

/**
 * Owns the cars of the bank.
 *
 * The collection is only ever replaced as a whole. Individual cars are reached
 * by index through `get_mut`, so no two parts of the engine hold a car at once.
 */
#[derive(Debug, Default)]
pub struct CarPool {
    cars: Vec<CarFSM>,
}

impl CarPool {
    pub fn new(count: usize, tokens: &mut TokenSource) -> CarPool {
        CarPool {
            cars: fresh_cars(count, tokens),
        }
    }

    /// Replaces every car with a fresh idle car at floor 0. Returns the
    /// requests the discarded cars were still travelling to, in car order.
    pub fn resize(&mut self, count: usize, tokens: &mut TokenSource) -> Vec<Request> {
        let previous = std::mem::replace(&mut self.cars, fresh_cars(count, tokens));
        let previous_count = previous.len();
        let abandoned: Vec<Request> = previous.into_iter().filter_map(CarFSM::abandon).collect();

        info!(
            "Car pool rebuilt: {} -> {} cars, {} trip(s) abandoned",
            previous_count,
            count,
            abandoned.len()
        );
        abandoned
    }

    pub fn cars(&self) -> &[CarFSM] {
        &self.cars
    }

    pub fn get(&self, index: usize) -> Option<&CarFSM> {
        self.cars.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CarFSM> {
        self.cars.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    pub fn snapshot(&self) -> Vec<CarSnapshot> {
        self.cars.iter().map(CarFSM::snapshot).collect()
    }
}

fn fresh_cars(count: usize, tokens: &mut TokenSource) -> Vec<CarFSM> {
    (0..count).map(|index| CarFSM::new(index, tokens.issue())).collect()
}
