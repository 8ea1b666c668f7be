mod observation;
#[cfg(feature = "torcs")]
mod torcs;
#[cfg(test)]
pub mod mock;

use {
    anyhow::Result,
    std::{
        collections::HashMap,
        ops::RangeInclusive,
    },
};

pub use observation::{
    TorcsObservation,
    ACTION_DOMAIN,
    ACTION_NAMES,
    STATE_DIM,
    WHEEL_SPIN_SCALE,
};
#[cfg(feature = "torcs")]
pub use torcs::{
    TorcsConfig,
    TorcsEnv,
};


/// A raw observation that can be flattened into the state vector the
/// networks consume.
pub trait StateVector {
    fn to_state(&self) -> Vec<f64>;
}

#[derive(Debug)]
pub struct Step<O> {
    pub observation: O,
    pub reward: f64,
    pub terminal: bool,
    pub info: HashMap<String, String>,
}

pub trait Environment {
    type Observation: StateVector;

    /// Start a new episode, relaunching the simulator process first if asked.
    fn reset(
        &mut self,
        relaunch: bool,
    ) -> Result<Self::Observation>;
    fn step(
        &mut self,
        action: &[f64],
    ) -> Result<Step<Self::Observation>>;
    /// Release the simulator.
    fn end(&mut self) -> Result<()>;
    /// The valid range of every action dimension.
    fn action_domain(&self) -> Vec<RangeInclusive<f64>>;
    /// The length of the flattened state vector.
    fn observation_space(&self) -> usize;

    fn action_names(&self) -> Vec<String> {
        (0..self.action_domain().len())
            .map(|i| format!("action {i}"))
            .collect()
    }
}
