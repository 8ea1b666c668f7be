//! # Components
//!
//! This module contains the components that the [`crate::agents::DDPG`]
//! trainer and the [`crate::engine`] driver are built from.
//!
//! ## Noise
//!
//! The [`OuNoise`] struct implements a scalar Ornstein-Uhlenbeck process. The
//! driver owns one instance per action dimension and adds its samples to the
//! actions of the actor during training.
//!
//! ## Replay Buffer
//!
//! The [`ReplayBuffer`] struct stores [`Transition`]s in a bounded FIFO and
//! hands out uniformly sampled [`Batch`]es for the off-policy updates.

mod ou_noise;
mod replay_buffer;

pub use ou_noise::OuNoise;
pub use replay_buffer::{
    Batch,
    ReplayBuffer,
    Transition,
};
