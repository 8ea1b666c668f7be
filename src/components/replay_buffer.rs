use {
    candle_core::{
        Error,
        Result,
        Tensor,
    },
    rand::{
        rngs::StdRng,
        seq::index,
        SeedableRng,
    },
    std::collections::VecDeque,
    unzip_n::unzip_n,
};

unzip_n!(5);

/// A transition in the replay buffer.
///
/// # Fields
///
/// * `state` - The state tensor, shape `(state_dim,)`.
/// * `action` - The action tensor, shape `(action_dim,)`.
/// * `reward` - The reward tensor, shape `(1,)`.
/// * `next_state` - The next state tensor, shape `(state_dim,)`.
/// * `terminal` - `1.0` if the episode ended here, `0.0` otherwise, shape `(1,)`.
#[derive(Clone, Debug)]
pub struct Transition {
    state: Tensor,
    action: Tensor,
    reward: Tensor,
    next_state: Tensor,
    terminal: Tensor,
}
impl Transition {
    pub fn new(
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        terminal: &Tensor,
    ) -> Self {
        Self {
            state: state.clone(),
            action: action.clone(),
            reward: reward.clone(),
            next_state: next_state.clone(),
            terminal: terminal.clone(),
        }
    }

    pub fn state(&self) -> &Tensor {
        &self.state
    }

    pub fn action(&self) -> &Tensor {
        &self.action
    }

    pub fn reward(&self) -> &Tensor {
        &self.reward
    }

    pub fn next_state(&self) -> &Tensor {
        &self.next_state
    }

    pub fn terminal(&self) -> &Tensor {
        &self.terminal
    }
}

/// A sampled batch, split into five parallel tensors with a leading batch
/// dimension.
#[derive(Clone, Debug)]
pub struct Batch {
    pub states: Tensor,
    pub actions: Tensor,
    pub rewards: Tensor,
    pub next_states: Tensor,
    pub terminals: Tensor,
}

/// A replay buffer for off-policy algorithms.
///
/// The replay buffer is implemented as a simple ring buffer / VecDeque. Once
/// it is full, every push evicts the oldest transition.
///
/// # Fields
///
/// * `buffer` - The buffer of transitions.
/// * `capacity` - The capacity of the buffer.
/// * `rng` - Used to draw the sample indices.
#[derive(Clone)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
    rng: StdRng,
}
impl ReplayBuffer {
    /// Create a new replay buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_entropy())
    }

    /// Create a new replay buffer whose sampling sequence is reproducible.
    pub fn with_seed(
        capacity: usize,
        seed: u64,
    ) -> Self {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        capacity: usize,
        rng: StdRng,
    ) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            rng,
        }
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.size() == self.capacity
    }

    /// Push a transition into the buffer.
    ///
    /// If the buffer is full, the oldest transition is removed to make room for
    /// the new transition.
    pub fn put(
        &mut self,
        transition: Transition,
    ) {
        if self.capacity == 0 {
            return;
        }
        if self.is_full() {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Iterate over the stored transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    /// Sample `batch_size` distinct transitions uniformly at random.
    ///
    /// The caller must make sure that the buffer holds at least `batch_size`
    /// transitions, asking for more is an error.
    pub fn sample(
        &mut self,
        batch_size: usize,
    ) -> Result<Batch> {
        if self.size() < batch_size {
            Err(Error::Msg(format!(
                "cannot sample {batch_size} transitions from a buffer holding {}",
                self.size(),
            )))?
        }

        let transition_to_tuple =
            |t: &Transition| -> Result<(Tensor, Tensor, Tensor, Tensor, Tensor)> {
                Ok((
                    t.state.unsqueeze(0)?,
                    t.action.unsqueeze(0)?,
                    t.reward.unsqueeze(0)?,
                    t.next_state.unsqueeze(0)?,
                    t.terminal.unsqueeze(0)?,
                ))
            };

        let (states, actions, rewards, next_states, terminals) =
            index::sample(&mut self.rng, self.buffer.len(), batch_size)
            .into_iter()
            .map(|i| transition_to_tuple(&self.buffer[i]))
            .collect::<Result<Vec<(Tensor, Tensor, Tensor, Tensor, Tensor)>>>()?
            .into_iter()
            .unzip_n_vec();

        Ok(Batch {
            states: Tensor::cat(&states, 0)?,
            actions: Tensor::cat(&actions, 0)?,
            rewards: Tensor::cat(&rewards, 0)?,
            next_states: Tensor::cat(&next_states, 0)?,
            terminals: Tensor::cat(&terminals, 0)?,
        })
    }
}


#[cfg(test)]
mod tests {
    use {
        super::*,
        candle_core::Device,
        std::collections::HashSet,
    };

    // Every field carries the index so transitions can be told apart.
    fn transition(i: usize) -> Transition {
        let device = &Device::Cpu;
        let x = i as f64;
        Transition::new(
            &Tensor::new(&[x, x, x], device).unwrap(),
            &Tensor::new(&[x, -x], device).unwrap(),
            &Tensor::new(&[x], device).unwrap(),
            &Tensor::new(&[x + 1.0, x + 1.0, x + 1.0], device).unwrap(),
            &Tensor::new(&[(i % 2) as f64], device).unwrap(),
        )
    }

    fn rewards(buffer: &ReplayBuffer) -> Vec<f64> {
        buffer
            .iter()
            .map(|t| t.reward().to_vec1::<f64>().unwrap()[0])
            .collect()
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let mut buffer = ReplayBuffer::with_seed(10, 0);
        for i in 0..35 {
            buffer.put(transition(i));
            assert!(buffer.size() <= buffer.capacity());
            assert_eq!(buffer.size(), (i + 1).min(10));
        }
        assert!(buffer.is_full());
    }

    #[test]
    fn evicts_oldest_first() {
        let mut buffer = ReplayBuffer::with_seed(5, 0);
        for i in 0..8 {
            buffer.put(transition(i));
        }
        assert_eq!(rewards(&buffer), vec![3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn sample_shapes() {
        let mut buffer = ReplayBuffer::with_seed(100, 0);
        for i in 0..20 {
            buffer.put(transition(i));
        }
        let batch = buffer.sample(8).unwrap();
        assert_eq!(batch.states.dims(), &[8, 3]);
        assert_eq!(batch.actions.dims(), &[8, 2]);
        assert_eq!(batch.rewards.dims(), &[8, 1]);
        assert_eq!(batch.next_states.dims(), &[8, 3]);
        assert_eq!(batch.terminals.dims(), &[8, 1]);
    }

    #[test]
    fn samples_are_distinct_and_previously_inserted() {
        let mut buffer = ReplayBuffer::with_seed(50, 3);
        for i in 0..80 {
            buffer.put(transition(i));
        }
        let stored: HashSet<u64> = rewards(&buffer).iter().map(|r| r.to_bits()).collect();

        for n in [1, 10, 49, 50] {
            let batch = buffer.sample(n).unwrap();
            let sampled = batch.rewards.flatten_all().unwrap().to_vec1::<f64>().unwrap();
            assert_eq!(sampled.len(), n);

            let unique: HashSet<u64> = sampled.iter().map(|r| r.to_bits()).collect();
            assert_eq!(unique.len(), n);
            assert!(unique.is_subset(&stored));

            // The rows of one sample stay together.
            let states = batch.states.to_vec2::<f64>().unwrap();
            let actions = batch.actions.to_vec2::<f64>().unwrap();
            for ((r, s), a) in sampled.iter().zip(states).zip(actions) {
                assert_eq!(s, vec![*r, *r, *r]);
                assert_eq!(a, vec![*r, -*r]);
            }
        }
    }

    #[test]
    fn sampling_a_partly_filled_buffer_draws_from_stored_only() {
        let mut buffer = ReplayBuffer::with_seed(100, 1);
        for i in 0..6 {
            buffer.put(transition(i));
        }
        let mut sampled = buffer.sample(6).unwrap().rewards.flatten_all().unwrap().to_vec1::<f64>().unwrap();
        sampled.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(sampled, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn sampling_too_many_is_an_error() {
        let mut buffer = ReplayBuffer::with_seed(10, 0);
        for i in 0..4 {
            buffer.put(transition(i));
        }
        assert!(buffer.sample(5).is_err());
        assert!(buffer.sample(4).is_ok());
    }

    #[test]
    fn same_seed_samples_the_same_batch() {
        let mut a = ReplayBuffer::with_seed(100, 9);
        let mut b = ReplayBuffer::with_seed(100, 9);
        for i in 0..100 {
            a.put(transition(i));
            b.put(transition(i));
        }
        let xs = a.sample(16).unwrap().rewards.flatten_all().unwrap().to_vec1::<f64>().unwrap();
        let ys = b.sample(16).unwrap().rewards.flatten_all().unwrap().to_vec1::<f64>().unwrap();
        assert_eq!(xs, ys);
    }
}
