//! Bridge to the Python `gym_torcs` client of the TORCS racing simulator.
use {
    super::{
        Environment,
        Step,
        TorcsObservation,
        ACTION_DOMAIN,
        ACTION_NAMES,
        STATE_DIM,
    },
    anyhow::{
        anyhow,
        Error,
        Result,
    },
    pyo3::{
        types::{
            PyDict,
            PyList,
        },
        PyAny,
        PyErr,
        PyObject,
        PyResult,
        Python,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        collections::HashMap,
        ops::RangeInclusive,
    },
    tracing::{
        info,
        warn,
    },
};

fn w(res: PyErr) -> Error {
    anyhow!(res)
}

/// How the `gym_torcs.TorcsEnv` client is constructed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TorcsConfig {
    pub module: String,
    pub vision: bool,
    pub throttle: bool,
    pub gear_change: bool,
}
impl Default for TorcsConfig {
    fn default() -> Self {
        Self {
            module: "gym_torcs".to_owned(),
            vision: false,
            throttle: true,
            gear_change: false,
        }
    }
}

/// The sensor fields may be numpy arrays, `tolist()` turns them into plain
/// python lists (or floats for 0-d arrays).
fn vector(
    ob: &PyAny,
    name: &str,
) -> PyResult<Vec<f64>> {
    ob.getattr(name)?.call_method0("tolist")?.extract()
}

fn scalar(
    ob: &PyAny,
    name: &str,
) -> PyResult<f64> {
    ob.getattr(name)?.extract()
}

fn get_observation(ob: &PyAny) -> PyResult<TorcsObservation> {
    Ok(TorcsObservation {
        angle: scalar(ob, "angle")?,
        track: vector(ob, "track")?,
        track_pos: scalar(ob, "trackPos")?,
        speed_x: scalar(ob, "speedX")?,
        speed_y: scalar(ob, "speedY")?,
        speed_z: scalar(ob, "speedZ")?,
        wheel_spin_vel: vector(ob, "wheelSpinVel")?,
        rpm: scalar(ob, "rpm")?,
    })
}

pub struct TorcsEnv {
    env: PyObject,
    config: TorcsConfig,
}

impl TorcsEnv {
    pub fn new(config: TorcsConfig) -> Result<Self> {
        let env = Python::with_gil(|py| {
            let sys = py.import("sys")?;
            let version: String = sys.getattr("version")?.extract()?;
            let path: String = sys.getattr("executable")?.extract()?;
            info!("python version: {version}");
            info!("python executable: {path}");

            let kwargs = PyDict::new(py);
            kwargs.set_item("vision", config.vision)?;
            kwargs.set_item("throttle", config.throttle)?;
            kwargs.set_item("gear_change", config.gear_change)?;
            let env = py
                .import(config.module.as_str())?
                .getattr("TorcsEnv")?
                .call((), Some(kwargs))?;
            Ok::<PyObject, PyErr>(env.into())
        })
        .map_err(w)?;
        Ok(Self { env, config })
    }

    pub fn config(&self) -> &TorcsConfig {
        &self.config
    }
}

impl Environment for TorcsEnv {
    type Observation = TorcsObservation;

    fn reset(
        &mut self,
        relaunch: bool,
    ) -> Result<TorcsObservation> {
        if relaunch {
            warn!("Relaunching TORCS");
        }
        Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("relaunch", relaunch)?;
            let ob = self.env.call_method(py, "reset", (), Some(kwargs))?;
            get_observation(ob.as_ref(py))
        })
        .map_err(w)
    }

    fn step(
        &mut self,
        action: &[f64],
    ) -> Result<Step<TorcsObservation>> {
        let (observation, reward, terminal, info) = Python::with_gil(|py| {
            let action = PyList::new(py, action);
            let step = self.env.call_method1(py, "step", (action, ))?;
            let step = step.as_ref(py);
            let observation = get_observation(step.get_item(0)?)?;
            let reward: f64 = step.get_item(1)?.extract()?;
            let terminal = step.get_item(2)?.is_true()?;
            let info = step
                .get_item(3)?
                .extract::<HashMap<String, &PyAny>>()?
                .into_iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect::<HashMap<String, String>>();
            Ok::<_, PyErr>((observation, reward, terminal, info))
        })
        .map_err(w)?;
        Ok(Step {
            observation,
            reward,
            terminal,
            info,
        })
    }

    fn end(&mut self) -> Result<()> {
        Python::with_gil(|py| {
            self.env.call_method0(py, "end")?;
            Ok::<(), PyErr>(())
        })
        .map_err(w)
    }

    fn action_domain(&self) -> Vec<RangeInclusive<f64>> {
        ACTION_DOMAIN.to_vec()
    }

    fn observation_space(&self) -> usize {
        STATE_DIM
    }

    fn action_names(&self) -> Vec<String> {
        ACTION_NAMES.iter().map(|n| n.to_string()).collect()
    }
}
