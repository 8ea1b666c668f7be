use {
    crate::{
        configs::RunConfig,
        util::read_config,
        RunMode,
    },
    anyhow::Result,
    clap::{
        Parser,
        ValueEnum,
    },
    std::path::PathBuf,
    tracing::Level,
};


#[derive(ValueEnum, Debug, Clone, PartialEq)]
pub enum Loglevel {
    Error, // put these only during active debugging and then downgrade later
    Warn,  // main events in the program
    Info,  // all the little details
    None,  // don't log anything
}
impl Loglevel {
    pub fn level(&self) -> Option<Level> {
        match self {
            Loglevel::Error => Some(Level::ERROR),
            Loglevel::Warn => Some(Level::WARN),
            Loglevel::Info => Some(Level::INFO),
            Loglevel::None => None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Train a new policy or evaluate a stored one.
    #[arg(long, value_enum, default_value_t=RunMode::Train)]
    pub mode: RunMode,

    /// Setup logging
    #[arg(long, value_enum, default_value_t=Loglevel::Warn)]
    pub log: Loglevel,

    /// RON file with the algorithm and training options.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the configs, telemetry, log and checkpoint of a run.
    #[arg(long, default_value = "data/torcs")]
    pub output: PathBuf,

    /// Name of the actor checkpoint inside the output directory.
    #[arg(long, default_value = "actor")]
    pub checkpoint: String,

    /// Seed the replay buffer and the noise processes.
    #[arg(long)]
    pub seed: Option<u64>,
}
impl Args {
    /// The config file if one was given, else the defaults. `--seed`
    /// overrides the seed of the file.
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => RunConfig::default(),
        };
        if self.seed.is_some() {
            config.training.seed = self.seed;
        }
        Ok(config)
    }

    pub fn log_file(&self) -> PathBuf {
        self.output.join(format!("{}.log", self.mode))
    }
}


#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::util::write_config,
    };

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["torcs_ddpg"]).unwrap();
        assert_eq!(args.mode, RunMode::Train);
        assert_eq!(args.log, Loglevel::Warn);
        assert_eq!(args.output, PathBuf::from("data/torcs"));
        assert_eq!(args.checkpoint, "actor");
        assert_eq!(args.run_config().unwrap(), RunConfig::default());
        assert_eq!(args.log_file(), PathBuf::from("data/torcs/train.log"));
    }

    #[test]
    fn evaluate_mode() {
        let args = Args::try_parse_from(["torcs_ddpg", "--mode", "evaluate", "--log", "none"]).unwrap();
        assert_eq!(args.mode, RunMode::Evaluate);
        assert_eq!(args.log.level(), None);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Args::try_parse_from(["torcs_ddpg", "--mode", "test"]).is_err());
    }

    #[test]
    fn seed_overrides_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.ron");
        let mut config = RunConfig::default();
        config.training.seed = Some(1);
        config.training.max_episodes = 5;
        write_config(&config, &path).unwrap();

        let args = Args::try_parse_from([
            "torcs_ddpg",
            "--config",
            path.to_str().unwrap(),
            "--seed",
            "42",
        ])
        .unwrap();
        let read = args.run_config().unwrap();
        assert_eq!(read.training.max_episodes, 5);
        assert_eq!(read.training.seed, Some(42));
    }
}
