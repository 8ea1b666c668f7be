use {
    super::StateVector,
    std::ops::RangeInclusive,
};

/// Length of the flattened [`TorcsObservation`].
pub const STATE_DIM: usize = 29;

/// Wheel spin velocities are divided by this before entering the state.
pub const WHEEL_SPIN_SCALE: f64 = 100.0;

/// Steering, then throttle.
pub const ACTION_DOMAIN: [RangeInclusive<f64>; 2] = [-1.0..=1.0, 0.0..=1.0];
pub const ACTION_NAMES: [&str; 2] = ["Steer", "Accel"];

/// The sensor readings of the car, as reported by the simulator.
///
/// # Fields
///
/// * `angle` - Angle between the car and the track axis.
/// * `track` - The 19 range finders along the track edges.
/// * `track_pos` - Distance from the track axis.
/// * `speed_x`, `speed_y`, `speed_z` - Velocity components.
/// * `wheel_spin_vel` - Spin velocity of the four wheels.
/// * `rpm` - Engine revolutions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TorcsObservation {
    pub angle: f64,
    pub track: Vec<f64>,
    pub track_pos: f64,
    pub speed_x: f64,
    pub speed_y: f64,
    pub speed_z: f64,
    pub wheel_spin_vel: Vec<f64>,
    pub rpm: f64,
}

impl StateVector for TorcsObservation {
    fn to_state(&self) -> Vec<f64> {
        let mut state = Vec::with_capacity(STATE_DIM);
        state.push(self.angle);
        state.extend_from_slice(&self.track);
        state.push(self.track_pos);
        state.extend([self.speed_x, self.speed_y, self.speed_z]);
        state.extend(self.wheel_spin_vel.iter().map(|w| w / WHEEL_SPIN_SCALE));
        state.push(self.rpm);
        state
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_in_sensor_order() {
        let observation = TorcsObservation {
            angle: 0.1,
            track: (0..19).map(|i| i as f64).collect(),
            track_pos: -0.3,
            speed_x: 1.0,
            speed_y: 2.0,
            speed_z: 3.0,
            wheel_spin_vel: vec![100.0, 200.0, 300.0, 400.0],
            rpm: 0.5,
        };
        let state = observation.to_state();

        assert_eq!(state.len(), STATE_DIM);
        assert_eq!(state[0], 0.1);
        assert_eq!(&state[1..20], &(0..19).map(|i| i as f64).collect::<Vec<_>>()[..]);
        assert_eq!(state[20], -0.3);
        assert_eq!(&state[21..24], &[1.0, 2.0, 3.0]);
        assert_eq!(&state[24..28], &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(state[28], 0.5);
    }
}
