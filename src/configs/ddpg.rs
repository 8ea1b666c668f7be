use serde::{
    Serialize,
    Deserialize,
};


/// Parameters of one Ornstein-Uhlenbeck process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OuConfig {
    // The state the process starts in.
    pub x0: f64,
    // The long-run mean.
    pub mu: f64,
    // The speed of mean reversion.
    pub theta: f64,
    // The volatility.
    pub sigma: f64,
    // The step size.
    pub dt: f64,
}
impl Default for OuConfig {
    fn default() -> Self {
        Self {
            x0: 0.0,
            mu: 0.0,
            theta: 0.6,
            sigma: 0.1,
            dt: 0.01,
        }
    }
}


#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DDPG_Config {
    // The learning rates for the Actor and Critic networks
    pub actor_learning_rate: f64,
    pub critic_learning_rate: f64,
    // The impact of the q value of the next state on the current state's q value.
    pub gamma: f64,
    // The weight for updating the target networks.
    pub tau: f64,
    // The number of neurons in the hidden layers of the Actor and Critic networks.
    pub hidden_1_size: usize,
    pub hidden_2_size: usize,
    // The capacity of the replay buffer used for sampling training data.
    pub replay_buffer_capacity: usize,
    // The training batch size for each training iteration.
    pub training_batch_size: usize,
    // One Ornstein-Uhlenbeck process per action dimension (steering, throttle).
    pub ou_noise: Vec<OuConfig>,
}
impl Default for DDPG_Config {
    fn default() -> Self {
        Self {
            actor_learning_rate: 0.001,
            critic_learning_rate: 0.0001,
            gamma: 0.99,
            tau: 0.001,
            hidden_1_size: 300,
            hidden_2_size: 600,
            replay_buffer_capacity: 100_000,
            training_batch_size: 64,
            ou_noise: vec![OuConfig::default(), OuConfig::default()],
        }
    }
}
