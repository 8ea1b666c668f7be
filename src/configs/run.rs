use {
    super::{
        DDPG_Config,
        TrainConfig,
    },
    serde::{
        Serialize,
        Deserialize,
    },
};


/// Everything a run needs, as read from a single `--config` file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub algorithm: DDPG_Config,
    pub training: TrainConfig,
}
