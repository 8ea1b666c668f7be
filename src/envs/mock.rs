//! A deterministic stand-in for the simulator.
use {
    super::{
        Environment,
        StateVector,
        Step,
    },
    anyhow::{
        anyhow,
        Result,
    },
    std::{
        collections::HashMap,
        ops::RangeInclusive,
    },
};

#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub distance: f64,
    pub offset: f64,
    pub speed: f64,
}

impl StateVector for Position {
    fn to_state(&self) -> Vec<f64> {
        vec![self.distance, self.offset, self.speed]
    }
}

/// A car on a straight road. Throttle adds speed, steering moves it off the
/// axis and the reward is the speed minus the offset. Episodes end after a
/// fixed number of steps.
pub struct StraightTrack {
    pub episode_length: usize,
    pub position: Position,
    pub steps: usize,
    pub resets: usize,
    pub relaunches: usize,
    pub actions: Vec<Vec<f64>>,
    pub ended: bool,
}
impl StraightTrack {
    pub fn new(episode_length: usize) -> Self {
        Self {
            episode_length,
            position: Position {
                distance: 0.0,
                offset: 0.0,
                speed: 0.0,
            },
            steps: 0,
            resets: 0,
            relaunches: 0,
            actions: Vec::new(),
            ended: false,
        }
    }
}

impl Environment for StraightTrack {
    type Observation = Position;

    fn reset(
        &mut self,
        relaunch: bool,
    ) -> Result<Position> {
        if self.ended {
            Err(anyhow!("environment was already ended"))?
        }
        self.resets += 1;
        if relaunch {
            self.relaunches += 1;
        }
        self.steps = 0;
        self.position = Position {
            distance: 0.0,
            offset: 0.0,
            speed: 0.0,
        };
        Ok(self.position.clone())
    }

    fn step(
        &mut self,
        action: &[f64],
    ) -> Result<Step<Position>> {
        if self.ended {
            Err(anyhow!("environment was already ended"))?
        }
        self.actions.push(action.to_vec());
        self.steps += 1;
        self.position.speed = 0.9 * self.position.speed + action[1];
        self.position.offset += 0.1 * action[0];
        self.position.distance += self.position.speed;

        Ok(Step {
            observation: self.position.clone(),
            reward: self.position.speed - self.position.offset.abs(),
            terminal: self.steps >= self.episode_length,
            info: HashMap::new(),
        })
    }

    fn end(&mut self) -> Result<()> {
        self.ended = true;
        Ok(())
    }

    fn action_domain(&self) -> Vec<RangeInclusive<f64>> {
        vec![-1.0..=1.0, 0.0..=1.0]
    }

    fn observation_space(&self) -> usize {
        3
    }
}
