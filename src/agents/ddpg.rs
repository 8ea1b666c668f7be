use {
    super::{
        networks::{
            act,
            soft_update,
            Actor,
            ActorNetwork,
            Critic,
            CriticNetwork,
            Learner,
        },
        Checkpoint,
    },
    crate::{
        components::{
            Batch,
            ReplayBuffer,
            Transition,
        },
        configs::DDPG_Config,
    },
    candle_core::{
        Device,
        Result,
        Tensor,
    },
    std::{
        ops::RangeInclusive,
        path::Path,
    },
    tracing::info,
};


/// The Bellman target `y = r + (1 - terminal) * gamma * next_values`.
///
/// All arguments are `(n, 1)` tensors. For terminal transitions the next
/// value is replaced by zero, so `y == r` even when it is not finite. The result is detached
/// from the graph.
pub fn bootstrap(
    rewards: &Tensor,
    terminals: &Tensor,
    next_values: &Tensor,
    gamma: f64,
) -> Result<Tensor> {
    let done = terminals.ge(0.5)?;
    let future = done
        .where_cond(&next_values.zeros_like()?, next_values)?
        .affine(gamma, 0.0)?;
    Ok((rewards + future)?.detach())
}

/// The mean smooth L1 (Huber, `beta = 1`) loss between `inputs` and `targets`.
///
/// Quadratic for absolute errors below one and linear above, which keeps
/// outlier targets from dominating the gradient.
pub fn smooth_l1_loss(
    inputs: &Tensor,
    targets: &Tensor,
) -> Result<Tensor> {
    let abs = (inputs - targets)?.abs()?;
    let quadratic = abs.clamp(0f64, 1f64)?;
    let linear = (&abs - &quadratic)?;
    (quadratic.sqr()?.affine(0.5, 0.0)? + linear)?.mean_all()
}

/// Scalars describing one training step.
#[derive(Clone, Copy, Debug)]
pub struct TrainStats {
    /// Mean reward of the sampled batch.
    pub reward: f64,
    pub critic_loss: f64,
    pub actor_loss: f64,
}

/// Deep Deterministic Policy Gradient.
///
/// Holds the live actor and critic (each bound to its own optimizer), their
/// target twins and the replay buffer the off-policy updates are sampled
/// from. The target networks are never trained directly, they only follow
/// the live networks through [`soft_update`].
#[allow(clippy::upper_case_acronyms)]
pub struct DDPG<A, C> {
    actor: Learner<A>,
    actor_target: A,
    critic: Learner<C>,
    critic_target: C,
    gamma: f64,
    tau: f64,
    replay_buffer: ReplayBuffer,
    batch_size: usize,
    device: Device,
}

impl<A, C> DDPG<A, C>
where
    A: ActorNetwork,
    C: CriticNetwork,
{
    /// Assemble the algorithm from its networks.
    ///
    /// The targets are overwritten with copies of the live networks, so they
    /// only need to have the same shapes.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &Device,
        actor: A,
        actor_target: A,
        critic: C,
        critic_target: C,
        actor_lr: f64,
        critic_lr: f64,
        gamma: f64,
        tau: f64,
        replay_buffer: ReplayBuffer,
        batch_size: usize,
    ) -> Result<Self> {
        // this sets the two networks to be equal to each other using tau = 1.0
        soft_update(&actor_target, &actor, 1.0)?;
        soft_update(&critic_target, &critic, 1.0)?;

        Ok(Self {
            actor: Learner::new(actor, actor_lr)?,
            actor_target,
            critic: Learner::new(critic, critic_lr)?,
            critic_target,
            gamma,
            tau,
            replay_buffer,
            batch_size,
            device: device.clone(),
        })
    }

    pub fn actor(&self) -> &A {
        self.actor.network()
    }

    pub fn actor_target(&self) -> &A {
        &self.actor_target
    }

    pub fn critic(&self) -> &C {
        self.critic.network()
    }

    pub fn critic_target(&self) -> &C {
        &self.critic_target
    }

    pub fn replay_buffer(&self) -> &ReplayBuffer {
        &self.replay_buffer
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// The deterministic action of the live actor for a single state.
    pub fn act(
        &self,
        state: &[f64],
    ) -> Result<Vec<f64>> {
        act(self.actor.network(), state, &self.device)
    }

    /// The live critic's value of the live actor's action in `state`.
    pub fn q_value(
        &self,
        state: &[f64],
    ) -> Result<f64> {
        self.policy_value(self.actor.network(), self.critic.network(), state)
    }

    /// The target critic's value of the target actor's action in `state`.
    pub fn target_q_value(
        &self,
        state: &[f64],
    ) -> Result<f64> {
        self.policy_value(&self.actor_target, &self.critic_target, state)
    }

    fn policy_value(
        &self,
        actor: &A,
        critic: &C,
        state: &[f64],
    ) -> Result<f64> {
        let state = Tensor::new(state, &self.device)?.unsqueeze(0)?;
        let action = actor.forward(&state)?;
        critic
            .forward(&state, &action)?
            .flatten_all()?
            .get(0)?
            .to_scalar::<f64>()
    }

    /// Store one transition in the replay buffer.
    pub fn remember(
        &mut self,
        state: &[f64],
        action: &[f64],
        reward: f64,
        next_state: &[f64],
        terminal: bool,
    ) -> Result<()> {
        info!(
            concat!(
                "\nPushing to replay buffer:",
                "\n{state:?}",
                "\n{action:?}",
                "\n{reward:?}",
                "\n{terminal:?}",
            ),
            state = state,
            action = action,
            reward = reward,
            terminal = terminal,
        );
        let device = &self.device;
        self.replay_buffer.put(Transition::new(
            &Tensor::new(state, device)?,
            &Tensor::new(action, device)?,
            &Tensor::new(&[reward], device)?,
            &Tensor::new(next_state, device)?,
            &Tensor::new(&[if terminal { 1.0 } else { 0.0 }], device)?,
        ));
        Ok(())
    }

    /// The detached critic regression targets for a batch, computed with the
    /// target networks.
    pub fn bootstrap_targets(
        &self,
        batch: &Batch,
    ) -> Result<Tensor> {
        let next_actions = self.actor_target.forward(&batch.next_states)?;
        let next_values = self.critic_target.forward(&batch.next_states, &next_actions)?;
        bootstrap(&batch.rewards, &batch.terminals, &next_values, self.gamma)
    }

    /// One optimizer step for the critic followed by one for the actor.
    ///
    /// The targets are left untouched, see [`DDPG::sync_targets`].
    pub fn train_step(
        &mut self,
        batch: &Batch,
    ) -> Result<TrainStats> {
        let targets = self.bootstrap_targets(batch)?;
        let q = self.critic.network().forward(&batch.states, &batch.actions)?;
        let critic_loss = smooth_l1_loss(&q, &targets)?;
        self.critic.optimize_step(&critic_loss)?;

        // The actor optimizer only holds the actor's parameters, so the
        // critic stays fixed while its gradient flows into the actor.
        let actor_loss = self
            .critic
            .network()
            .forward(&batch.states, &self.actor.network().forward(&batch.states)?)?
            .mean_all()?
            .neg()?;
        self.actor.optimize_step(&actor_loss)?;

        Ok(TrainStats {
            reward: batch.rewards.mean_all()?.to_scalar::<f64>()?,
            critic_loss: critic_loss.to_scalar::<f64>()?,
            actor_loss: actor_loss.to_scalar::<f64>()?,
        })
    }

    /// Let both target networks follow their live counterparts by `tau`.
    pub fn sync_targets(&mut self) -> Result<()> {
        soft_update(&self.critic_target, self.critic.network(), self.tau)?;
        soft_update(&self.actor_target, self.actor.network(), self.tau)
    }

    /// Sample a batch, train on it and update the targets.
    ///
    /// The replay buffer must hold at least `batch_size` transitions.
    pub fn train(&mut self) -> Result<TrainStats> {
        let batch = self.replay_buffer.sample(self.batch_size)?;
        let stats = self.train_step(&batch)?;
        self.sync_targets()?;
        Ok(stats)
    }
}

impl DDPG<Actor, Critic> {
    /// Build the driving networks and their optimizers from a config.
    pub fn from_config(
        device: &Device,
        config: &DDPG_Config,
        size_state: usize,
        action_domain: &[RangeInclusive<f64>],
        seed: Option<u64>,
    ) -> Result<Box<Self>> {
        let size_action = action_domain.len();
        let make_actor = || {
            Actor::new(
                device,
                size_state,
                action_domain,
                config.hidden_1_size,
                config.hidden_2_size,
            )
        };
        let make_critic = || {
            Critic::new(
                device,
                size_state,
                size_action,
                config.hidden_1_size,
                config.hidden_2_size,
            )
        };
        let replay_buffer = match seed {
            Some(seed) => ReplayBuffer::with_seed(config.replay_buffer_capacity, seed),
            None => ReplayBuffer::new(config.replay_buffer_capacity),
        };

        Ok(Box::new(Self::new(
            device,
            make_actor()?,
            make_actor()?,
            make_critic()?,
            make_critic()?,
            config.actor_learning_rate,
            config.critic_learning_rate,
            config.gamma,
            config.tau,
            replay_buffer,
            config.training_batch_size,
        )?))
    }
}

impl<A, C> Checkpoint for DDPG<A, C>
where
    A: ActorNetwork + Checkpoint,
    C: CriticNetwork,
{
    /// Only the actor is persisted, it is all a rollout needs.
    fn save<P: AsRef<Path> + ?Sized>(
        &self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        self.actor.network().save(path, name)
    }

    fn load<P: AsRef<Path> + ?Sized>(
        &mut self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        self.actor.network_mut().load(path, name)?;
        soft_update(&self.actor_target, self.actor.network(), 1.0)
    }
}
