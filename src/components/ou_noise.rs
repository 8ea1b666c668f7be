use {
    rand::{
        rngs::StdRng,
        SeedableRng,
        Rng,
    },
    rand_distr::StandardNormal,
};

/// A scalar Ornstein-Uhlenbeck process.
///
/// Every call to [`OuNoise::sample`] advances the process by one step of size
/// `dt` following
///
/// `x_{t+1} = x_t + theta * (mu - x_t) * dt + sigma * sqrt(dt) * N(0, 1)`
///
/// and returns the new state. The state is only initialised on construction,
/// it is not reset between episodes.
///
/// # Fields
///
/// * `mu` - The long-run mean the process reverts to.
/// * `theta` - The speed of mean reversion.
/// * `sigma` - The volatility.
/// * `dt` - The step size.
/// * `state` - The last emitted sample.
/// * `rng` - The source of the gaussian increments.
#[derive(Clone, Debug)]
pub struct OuNoise {
    mu: f64,
    theta: f64,
    sigma: f64,
    dt: f64,
    state: f64,
    rng: StdRng,
}
impl OuNoise {
    /// Create a process starting at `x0` seeded from system entropy.
    pub fn new(
        x0: f64,
        mu: f64,
        theta: f64,
        sigma: f64,
        dt: f64,
    ) -> Self {
        Self::with_rng(x0, mu, theta, sigma, dt, StdRng::from_entropy())
    }

    /// Create a process starting at `x0` with a reproducible sequence.
    pub fn with_seed(
        x0: f64,
        mu: f64,
        theta: f64,
        sigma: f64,
        dt: f64,
        seed: u64,
    ) -> Self {
        Self::with_rng(x0, mu, theta, sigma, dt, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        x0: f64,
        mu: f64,
        theta: f64,
        sigma: f64,
        dt: f64,
        rng: StdRng,
    ) -> Self {
        Self {
            mu,
            theta,
            sigma,
            dt,
            state: x0,
            rng,
        }
    }

    pub fn sample(&mut self) -> f64 {
        let rand: f64 = self.rng.sample(StandardNormal);
        let dx = self.theta * (self.mu - self.state) * self.dt
            + self.sigma * self.dt.sqrt() * rand;
        self.state += dx;
        self.state
    }

    pub fn state(&self) -> f64 {
        self.state
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_same_sequence() {
        let mut a = OuNoise::with_seed(0.0, 0.0, 0.6, 0.1, 0.01, 42);
        let mut b = OuNoise::with_seed(0.0, 0.0, 0.6, 0.1, 0.01, 42);

        let xs: Vec<f64> = (0..100).map(|_| a.sample()).collect();
        let ys: Vec<f64> = (0..100).map(|_| b.sample()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = OuNoise::with_seed(0.0, 0.0, 0.6, 0.1, 0.01, 1);
        let mut b = OuNoise::with_seed(0.0, 0.0, 0.6, 0.1, 0.01, 2);

        let xs: Vec<f64> = (0..10).map(|_| a.sample()).collect();
        let ys: Vec<f64> = (0..10).map(|_| b.sample()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn state_tracks_last_sample() {
        let mut noise = OuNoise::with_seed(0.0, 0.0, 0.15, 0.2, 0.01, 7);
        assert_eq!(noise.state(), 0.0);
        let x = noise.sample();
        assert_eq!(noise.state(), x);
    }

    #[test]
    fn without_volatility_it_reverts_to_the_mean() {
        let mut noise = OuNoise::with_seed(1.0, 0.0, 0.5, 0.0, 0.1, 0);

        // x_{t+1} = x_t * (1 - theta * dt)
        assert!((noise.sample() - 0.95).abs() < 1e-12);
        assert!((noise.sample() - 0.9025).abs() < 1e-12);

        for _ in 0..2_000 {
            noise.sample();
        }
        assert!(noise.state().abs() < 1e-12);
    }
}
