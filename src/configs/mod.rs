mod ddpg;
mod run;
mod train;

pub use ddpg::{
    DDPG_Config,
    OuConfig,
};
pub use run::RunConfig;
pub use train::TrainConfig;
