pub mod logging;
pub mod util;

pub mod configs;
pub mod components;
pub mod agents;
pub mod envs;
pub mod telemetry;

pub mod cli;
pub mod engine;


use {
    clap::ValueEnum,
    std::fmt::Display,
};


/// Training learns from noisy rollouts, evaluation only replays the policy.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Train,
    Evaluate,
}
impl Display for RunMode {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            RunMode::Train => write!(f, "train"),
            RunMode::Evaluate => write!(f, "evaluate"),
        }
    }
}
