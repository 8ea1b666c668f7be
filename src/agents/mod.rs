mod ddpg;
pub mod networks;

pub use ddpg::{
    bootstrap,
    smooth_l1_loss,
    TrainStats,
    DDPG,
};
pub use networks::{
    Actor,
    ActorNetwork,
    Approximator,
    Critic,
    CriticNetwork,
    Learner,
};


use {
    candle_core::Result,
    std::path::Path,
};


/// Persist and restore model parameters as `<path>/<name>.safetensors`.
pub trait Checkpoint {
    fn save<P: AsRef<Path> + ?Sized>(
        &self,
        path: &P,
        name: &str,
    ) -> Result<()>;

    fn load<P: AsRef<Path> + ?Sized>(
        &mut self,
        path: &P,
        name: &str,
    ) -> Result<()>;
}
