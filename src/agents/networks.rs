//! The function approximators of the actor-critic pair.
//!
//! The training algorithm only ever talks to the [`ActorNetwork`] and
//! [`CriticNetwork`] traits, so any candle-backed model whose parameters are
//! [`Var`]s can be swapped in. [`Actor`] and [`Critic`] are the multilayer
//! perceptrons used for driving.
use {
    super::Checkpoint,
    candle_core::{
        DType,
        Device,
        Error,
        Module,
        Result,
        Tensor,
        Var,
    },
    candle_nn::{
        linear,
        sequential::seq,
        Activation,
        AdamW,
        Optimizer,
        ParamsAdamW,
        Sequential,
        VarBuilder,
        VarMap,
    },
    std::{
        ops::RangeInclusive,
        path::Path,
    },
};


/// A differentiable function with a flat list of trainable parameters.
pub trait Approximator {
    /// All parameters, always in the same order for networks of the same shape.
    fn parameters(&self) -> Vec<Var>;

    /// Overwrite the parameters with `values`, given in [`Approximator::parameters`] order.
    fn load_parameters(
        &self,
        values: &[Tensor],
    ) -> Result<()> {
        let parameters = self.parameters();
        if parameters.len() != values.len() {
            Err(Error::Msg(format!(
                "expected {} parameter tensors, got {}",
                parameters.len(),
                values.len(),
            )))?
        }
        for (var, value) in parameters.iter().zip(values) {
            var.set(value)?;
        }
        Ok(())
    }
}

/// Maps a batch of states `(n, size_state)` to a batch of actions `(n, size_action)`.
pub trait ActorNetwork: Approximator {
    fn forward(
        &self,
        states: &Tensor,
    ) -> Result<Tensor>;
}

/// Maps a batch of state-action pairs to a batch of values `(n, 1)`.
pub trait CriticNetwork: Approximator {
    fn forward(
        &self,
        states: &Tensor,
        actions: &Tensor,
    ) -> Result<Tensor>;
}

/// Move every parameter of `target` a fraction `tau` towards `live`.
///
/// `target <- (1 - tau) * target + tau * live`, so `tau = 1.0` copies `live`.
pub fn soft_update<N: Approximator>(
    target: &N,
    live: &N,
    tau: f64,
) -> Result<()> {
    let target_params = target.parameters();
    let live_params = live.parameters();
    if target_params.len() != live_params.len() {
        Err(Error::Msg(format!(
            "cannot track a network with {} parameters using one with {}",
            target_params.len(),
            live_params.len(),
        )))?
    }
    for (target_var, live_var) in target_params.iter().zip(live_params.iter()) {
        let mixed = (live_var.as_tensor().affine(tau, 0.0)?
            + target_var.as_tensor().affine(1.0 - tau, 0.0)?)?;
        target_var.set(&mixed)?;
    }
    Ok(())
}

/// Run the actor on a single, unbatched state.
pub fn act<A: ActorNetwork>(
    actor: &A,
    state: &[f64],
    device: &Device,
) -> Result<Vec<f64>> {
    // Candle assumes a batch dimension, so when we don't have one we need
    // to pretend we do by un- and resqueezing the state tensor.
    let state = Tensor::new(state, device)?.unsqueeze(0)?;
    actor.forward(&state)?.squeeze(0)?.to_vec1::<f64>()
}

/// A live network bound to the optimizer that trains it.
pub struct Learner<N> {
    network: N,
    optimizer: AdamW,
}
impl<N: Approximator> Learner<N> {
    /// Bind an Adam optimizer (no weight decay) to the parameters of `network`.
    pub fn new(
        network: N,
        learning_rate: f64,
    ) -> Result<Self> {
        let optimizer = AdamW::new(
            network.parameters(),
            ParamsAdamW {
                lr: learning_rate,
                weight_decay: 0.0,
                ..Default::default()
            },
        )?;
        Ok(Self { network, optimizer })
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }

    /// Back-propagate the scalar `loss` and apply one optimizer update.
    ///
    /// Gradients are recomputed from scratch on every call, only the
    /// parameters bound to this optimizer are changed.
    pub fn optimize_step(
        &mut self,
        loss: &Tensor,
    ) -> Result<()> {
        self.optimizer.backward_step(loss)
    }
}

fn sorted_vars(varmap: &VarMap) -> Vec<Var> {
    let data = varmap
        .data()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut named: Vec<(&String, &Var)> = data.iter().collect();
    named.sort_by(|a, b| a.0.cmp(b.0));
    named.into_iter().map(|(_, var)| var.clone()).collect()
}

fn mlp(
    vb: &VarBuilder,
    prefix: &str,
    dims: &[(usize, usize); 3],
) -> Result<Sequential> {
    Ok(seq()
        .add(linear(dims[0].0, dims[0].1, vb.pp(format!("{prefix}-fc0")))?)
        .add(Activation::Relu)
        .add(linear(dims[1].0, dims[1].1, vb.pp(format!("{prefix}-fc1")))?)
        .add(Activation::Relu)
        .add(linear(dims[2].0, dims[2].1, vb.pp(format!("{prefix}-fc2")))?))
}

fn checkpoint_file<P: AsRef<Path> + ?Sized>(
    path: &P,
    name: &str,
) -> std::path::PathBuf {
    path.as_ref().join(format!("{name}.safetensors"))
}


/// The policy network.
///
/// Two hidden ReLU layers followed by a `tanh` output that is rescaled per
/// dimension onto the action domain, so every output is a valid action.
pub struct Actor {
    varmap: VarMap,
    network: Sequential,
    low: Tensor,
    scale: Tensor,
}
impl Actor {
    pub fn new(
        device: &Device,
        size_state: usize,
        action_domain: &[RangeInclusive<f64>],
        hidden_1_size: usize,
        hidden_2_size: usize,
    ) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F64, device);
        let size_action = action_domain.len();

        let network = mlp(
            &vb,
            "actor",
            &[
                (size_state, hidden_1_size),
                (hidden_1_size, hidden_2_size),
                (hidden_2_size, size_action),
            ],
        )?;

        let low: Vec<f64> = action_domain.iter().map(|r| *r.start()).collect();
        let scale: Vec<f64> = action_domain.iter().map(|r| r.end() - r.start()).collect();

        Ok(Self {
            varmap,
            network,
            low: Tensor::from_vec(low, (1, size_action), device)?,
            scale: Tensor::from_vec(scale, (1, size_action), device)?,
        })
    }
}

impl Approximator for Actor {
    fn parameters(&self) -> Vec<Var> {
        sorted_vars(&self.varmap)
    }
}

impl ActorNetwork for Actor {
    fn forward(
        &self,
        states: &Tensor,
    ) -> Result<Tensor> {
        // tanh lands in [-1, 1], shift it to [0, 1] before stretching.
        let unit = self.network.forward(states)?.tanh()?.affine(0.5, 0.5)?;
        unit.broadcast_mul(&self.scale)?.broadcast_add(&self.low)
    }
}

impl Checkpoint for Actor {
    fn save<P: AsRef<Path> + ?Sized>(
        &self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        self.varmap.save(checkpoint_file(path, name))
    }

    fn load<P: AsRef<Path> + ?Sized>(
        &mut self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        self.varmap.load(checkpoint_file(path, name))
    }
}


/// The action-value network.
///
/// The action and the state are concatenated and fed through two hidden ReLU
/// layers into a single linear output.
pub struct Critic {
    varmap: VarMap,
    network: Sequential,
}
impl Critic {
    pub fn new(
        device: &Device,
        size_state: usize,
        size_action: usize,
        hidden_1_size: usize,
        hidden_2_size: usize,
    ) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F64, device);

        let network = mlp(
            &vb,
            "critic",
            &[
                (size_state + size_action, hidden_1_size),
                (hidden_1_size, hidden_2_size),
                (hidden_2_size, 1),
            ],
        )?;

        Ok(Self { varmap, network })
    }
}

impl Approximator for Critic {
    fn parameters(&self) -> Vec<Var> {
        sorted_vars(&self.varmap)
    }
}

impl CriticNetwork for Critic {
    fn forward(
        &self,
        states: &Tensor,
        actions: &Tensor,
    ) -> Result<Tensor> {
        let xs = Tensor::cat(&[actions, states], 1)?;
        self.network.forward(&xs)
    }
}

impl Checkpoint for Critic {
    fn save<P: AsRef<Path> + ?Sized>(
        &self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        self.varmap.save(checkpoint_file(path, name))
    }

    fn load<P: AsRef<Path> + ?Sized>(
        &mut self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        self.varmap.load(checkpoint_file(path, name))
    }
}
