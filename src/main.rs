use {
    anyhow::Result,
    clap::Parser,
    torcs_ddpg::{
        cli::Args,
        logging::setup_logging,
    },
    tracing::warn,
};


#[cfg(feature = "torcs")]
fn run(args: &Args) -> Result<()> {
    use {
        candle_core::Device,
        torcs_ddpg::{
            engine::{
                run_evaluation,
                run_training,
            },
            envs::TorcsEnv,
            RunMode,
        },
    };

    let config = args.run_config()?;
    let device = Device::Cpu;
    let mut env = TorcsEnv::new(Default::default())?;

    match args.mode {
        RunMode::Train => {
            let report = run_training(
                &args.output,
                &args.checkpoint,
                &mut env,
                &config.algorithm,
                &config.training,
                &device,
            )?;
            warn!(
                "Finished {} episodes in {} steps with {} updates",
                report.returns.len(),
                report.total_steps,
                report.updates,
            );
        }
        RunMode::Evaluate => {
            let score = run_evaluation(
                &args.output,
                &args.checkpoint,
                &mut env,
                &config.algorithm,
                &config.training,
                &device,
            )?;
            warn!("Evaluation score {score}");
        }
    }
    Ok(())
}

#[cfg(not(feature = "torcs"))]
fn run(_args: &Args) -> Result<()> {
    Err(anyhow::anyhow!(
        "built without the `torcs` feature, rebuild with `--features torcs` to drive the simulator",
    ))
}


fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_file(), args.log.level())?;
    warn!("Running in {} mode, output in {}", args.mode, args.output.display());
    run(&args)
}
