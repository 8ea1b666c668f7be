//! The episode driver.
//!
//! [`train`] and [`evaluate`] are the two execution modes. Both talk to the
//! simulator through [`Environment`]; only [`train`] injects noise, stores
//! transitions and updates the networks.
use {
    crate::{
        agents::{
            networks::act,
            Actor,
            ActorNetwork,
            Checkpoint,
            CriticNetwork,
            TrainStats,
            DDPG,
        },
        components::OuNoise,
        configs::{
            DDPG_Config,
            OuConfig,
            TrainConfig,
        },
        envs::{
            Environment,
            StateVector,
        },
        telemetry::{
            ParquetTelemetry,
            Telemetry,
        },
        util::write_config,
    },
    anyhow::{
        anyhow,
        Result,
    },
    candle_core::Device,
    std::{
        fs::create_dir_all,
        ops::RangeInclusive,
        path::Path,
        time::Instant,
    },
    tracing::{
        info,
        warn,
    },
};


/// Clamp every component of `action` onto its range in `domain`.
pub fn clip_action(
    action: &mut [f64],
    domain: &[RangeInclusive<f64>],
) {
    for (a, range) in action.iter_mut().zip(domain) {
        *a = a.clamp(*range.start(), *range.end());
    }
}

/// Correlated exploration noise, one Ornstein-Uhlenbeck process per action
/// dimension, optionally faded out by a linearly decaying epsilon.
pub struct Exploration {
    noise: Vec<OuNoise>,
    epsilon: f64,
    decay: Option<u64>,
}
impl Exploration {
    pub fn new(
        noise: Vec<OuNoise>,
        decay: Option<u64>,
    ) -> Self {
        Self {
            noise,
            epsilon: 1.0,
            decay,
        }
    }

    /// Build the processes from their configs. Process `i` is seeded with
    /// `seed + i` when a seed is given.
    pub fn from_config(
        configs: &[OuConfig],
        decay: Option<u64>,
        seed: Option<u64>,
    ) -> Self {
        let noise = configs
            .iter()
            .enumerate()
            .map(|(i, c)| match seed {
                Some(seed) => OuNoise::with_seed(c.x0, c.mu, c.theta, c.sigma, c.dt, seed.wrapping_add(i as u64)),
                None => OuNoise::new(c.x0, c.mu, c.theta, c.sigma, c.dt),
            })
            .collect();
        Self::new(noise, decay)
    }

    pub fn len(&self) -> usize {
        self.noise.len()
    }

    pub fn is_empty(&self) -> bool {
        self.noise.is_empty()
    }

    /// Draw one sample per dimension. Advances the epsilon schedule by a step.
    pub fn sample(&mut self) -> Vec<f64> {
        let scale = match self.decay {
            Some(explore) => {
                self.epsilon -= 1.0 / explore.max(1) as f64;
                self.epsilon.max(0.0)
            }
            None => 1.0,
        };
        self.noise.iter_mut().map(|n| scale * n.sample()).collect()
    }

    /// Add noise to `action` and clip the result onto `domain`. Returns the
    /// noise that was added.
    pub fn perturb(
        &mut self,
        action: &mut [f64],
        domain: &[RangeInclusive<f64>],
    ) -> Vec<f64> {
        let noise = self.sample();
        for (a, n) in action.iter_mut().zip(&noise) {
            *a += n;
        }
        clip_action(action, domain);
        noise
    }
}

/// What happened during a training run.
#[derive(Clone, Debug, Default)]
pub struct TrainReport {
    /// Total reward of every episode.
    pub returns: Vec<f64>,
    /// Number of environment steps of every episode.
    pub episode_steps: Vec<usize>,
    /// Value of the global step counter at the end of the run.
    pub total_steps: u64,
    /// Number of training steps performed.
    pub updates: u64,
}

fn write_q_values<A, C, T>(
    agent: &DDPG<A, C>,
    state: &[f64],
    telemetry: &mut T,
    prefix: &str,
    step: u64,
) -> Result<()>
where
    A: ActorNetwork,
    C: CriticNetwork,
    T: Telemetry,
{
    telemetry.scalar(&format!("{prefix} Q value"), agent.q_value(state)?, step)?;
    telemetry.scalar(&format!("{prefix} target Q value"), agent.target_q_value(state)?, step)
}

fn write_train_stats<T: Telemetry>(
    stats: &TrainStats,
    telemetry: &mut T,
    step: u64,
) -> Result<()> {
    telemetry.scalar("reward", stats.reward, step)?;
    telemetry.scalar("critic_loss", stats.critic_loss, step)?;
    telemetry.scalar("actor_loss", stats.actor_loss, step)
}

/// Train `agent` on `env` for `config.max_episodes` episodes.
///
/// Every step the noisy, clipped action of the actor is applied and the
/// transition stored. Once the replay buffer holds more than
/// `config.warmup` transitions, every step also trains on one batch and
/// updates the target networks. The environment is ended afterwards.
pub fn train<Env, A, C, T>(
    env: &mut Env,
    agent: &mut DDPG<A, C>,
    exploration: &mut Exploration,
    config: &TrainConfig,
    telemetry: &mut T,
) -> Result<TrainReport>
where
    Env: Environment,
    A: ActorNetwork,
    C: CriticNetwork,
    T: Telemetry,
{
    let domain = env.action_domain();
    if exploration.len() != domain.len() {
        Err(anyhow!(
            "{} noise processes for {} action dimensions",
            exploration.len(),
            domain.len(),
        ))?
    }
    let noise_names: Vec<String> = env
        .action_names()
        .iter()
        .map(|name| format!("{name} noise"))
        .collect();

    warn!("action space: {domain:?}");
    warn!("observation space: {:?}", env.observation_space());

    let start = Instant::now();
    let mut report = TrainReport::default();
    let mut step: u64 = 0;

    for episode in 0..config.max_episodes {
        warn!("Episode {episode}, replay buffer {}", agent.replay_buffer().size());

        let mut state = env.reset(config.relaunch(episode))?.to_state();
        write_q_values(agent, &state, telemetry, "Episode Start", step)?;

        let mut total_reward = 0.0;
        let mut steps_taken = 0;

        for _ in 0..config.max_steps {
            let mut action = agent.act(&state)?;
            let noise = exploration.perturb(&mut action, &domain);
            let log_step = step % config.telemetry_interval.max(1) == 0;
            if log_step {
                for (name, n) in noise_names.iter().zip(&noise) {
                    telemetry.scalar(name, *n, step)?;
                }
            }

            let outcome = env.step(&action)?;
            total_reward += outcome.reward;
            steps_taken += 1;

            let next_state = outcome.observation.to_state();
            agent.remember(&state, &action, outcome.reward, &next_state, outcome.terminal)?;

            let size = agent.replay_buffer().size();
            if size > config.warmup && size >= agent.batch_size() {
                let stats = agent.train()?;
                report.updates += 1;
                if log_step {
                    write_train_stats(&stats, telemetry, step)?;
                }
            }

            step += 1;

            if outcome.terminal {
                write_q_values(agent, &state, telemetry, "Episode End", step)?;
                break;
            }
            state = next_state;
        }

        warn!("TOTAL REWARD @ {episode}-th Episode : Reward {total_reward}");
        warn!("Total Step: {steps_taken}");
        report.returns.push(total_reward);
        report.episode_steps.push(steps_taken);
    }

    env.end()?;
    report.total_steps = step;
    warn!(
        "Total step {} and time spent {:.2}s",
        step,
        start.elapsed().as_secs_f64(),
    );
    Ok(report)
}

/// Roll out `actor` greedily for one episode and return its total reward.
///
/// No noise, no replay buffer, no learning. The environment is ended
/// afterwards.
pub fn evaluate<Env, A>(
    env: &mut Env,
    actor: &A,
    max_steps: usize,
    device: &Device,
) -> Result<f64>
where
    Env: Environment,
    A: ActorNetwork,
{
    let mut state = env.reset(false)?.to_state();
    let mut score = 0.0;

    for n_step in 0..max_steps {
        let action = act(actor, &state, device)?;
        let outcome = env.step(&action)?;
        score += outcome.reward;
        info!("step {n_step}: action {action:?}, reward {}", outcome.reward);
        if outcome.terminal {
            break;
        }
        state = outcome.observation.to_state();
    }

    warn!("score: {score}");
    env.end()?;
    Ok(score)
}

/// Train a fresh agent and store everything under `path`.
///
/// The configs go to `config_algorithm.ron` / `config_training.ron`, the
/// metrics to `telemetry.parquet` and the actor to `<checkpoint>.safetensors`.
pub fn run_training<Env: Environment>(
    path: &dyn AsRef<Path>,
    checkpoint: &str,
    env: &mut Env,
    ddpg_config: &DDPG_Config,
    train_config: &TrainConfig,
    device: &Device,
) -> Result<TrainReport> {
    let path = path.as_ref();

    let alg_config_exists = path.join("config_algorithm.ron").try_exists()?;
    let train_config_exists = path.join("config_training.ron").try_exists()?;
    if alg_config_exists || train_config_exists {
        Err(anyhow!(concat!(
            "Config files already exist in this directory!\n",
            "I am assuming I would be overwriting existing data!",
        )))?
    }

    create_dir_all(path)?;
    write_config(ddpg_config, path.join("config_algorithm.ron"))?;
    write_config(train_config, path.join("config_training.ron"))?;

    let mut agent = *DDPG::from_config(
        device,
        ddpg_config,
        env.observation_space(),
        &env.action_domain(),
        train_config.seed,
    )?;
    let mut exploration = Exploration::from_config(
        &ddpg_config.ou_noise,
        train_config.exploration_decay,
        train_config.seed,
    );
    let mut telemetry = ParquetTelemetry::new(path.join("telemetry.parquet"));

    let report = train(env, &mut agent, &mut exploration, train_config, &mut telemetry)?;

    agent.save(path, checkpoint)?;
    telemetry.flush()?;
    warn!("Saved actor to {}", path.join(format!("{checkpoint}.safetensors")).display());
    Ok(report)
}

/// Load the actor trained by [`run_training`] and evaluate it.
pub fn run_evaluation<Env: Environment>(
    path: &dyn AsRef<Path>,
    checkpoint: &str,
    env: &mut Env,
    ddpg_config: &DDPG_Config,
    train_config: &TrainConfig,
    device: &Device,
) -> Result<f64> {
    let path = path.as_ref();
    warn!("Loading model weights from {} with name {checkpoint}", path.display());

    let mut actor = Actor::new(
        device,
        env.observation_space(),
        &env.action_domain(),
        ddpg_config.hidden_1_size,
        ddpg_config.hidden_2_size,
    )?;
    actor.load(path, checkpoint)?;

    evaluate(env, &actor, train_config.eval_max_steps, device)
}
