use serde::{
    Serialize,
    Deserialize,
};


/// Options of the episode driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    // The total number of episodes.
    pub max_episodes: usize,
    // Hard ceiling on the number of steps in one episode.
    pub max_steps: usize,
    // Training starts once the replay buffer holds more transitions than this.
    pub warmup: usize,
    // Relaunch the simulator on every n-th episode, starting with the first.
    pub relaunch_every: Option<usize>,
    // Emit step telemetry every n global steps.
    pub telemetry_interval: u64,
    // Scale the noise by a factor decaying linearly to zero over this many steps.
    pub exploration_decay: Option<u64>,
    // Hard ceiling on the number of steps of an evaluation rollout.
    pub eval_max_steps: usize,
    // Seed for the replay buffer and the noise processes.
    pub seed: Option<u64>,
}
impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_episodes: 200,
            max_steps: 2000,
            warmup: 1500,
            relaunch_every: Some(3),
            telemetry_interval: 10,
            exploration_decay: None,
            eval_max_steps: 100_000,
            seed: None,
        }
    }
}
impl TrainConfig {
    /// Whether the simulator should be relaunched at the start of `episode`.
    pub fn relaunch(
        &self,
        episode: usize,
    ) -> bool {
        match self.relaunch_every {
            Some(0) | None => false,
            Some(n) => episode % n == 0,
        }
    }
}
