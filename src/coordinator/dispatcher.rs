use crate::elevator::CarFSM;

/// Picks the idle car closest to `requested_floor`.
///
/// Ties go to the lowest index: a later car has to be strictly closer to win.
/// Direction is not considered, any idle car may serve any call.
pub fn select_car(requested_floor: u8, cars: &[CarFSM]) -> Option<usize> {
    let mut best: Option<(usize, u8)> = None;

    for car in cars.iter().filter(|car| car.is_eligible()) {
        let distance = car.distance_to(requested_floor);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((car.index(), distance)),
        }
    }

    best.map(|(index, _)| index)
}
