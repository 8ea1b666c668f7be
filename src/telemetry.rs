use {
    anyhow::Result,
    polars::prelude::{
        DataFrame,
        NamedFrom,
        ParquetWriter,
        Series,
    },
    std::{
        fs::File,
        path::{
            Path,
            PathBuf,
        },
    },
    tracing::info,
};


/// A sink for named scalar metrics indexed by the global step.
pub trait Telemetry {
    fn scalar(
        &mut self,
        name: &str,
        value: f64,
        step: u64,
    ) -> Result<()>;

    /// Persist whatever has been recorded so far.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects metrics and writes them as one long-format parquet table with
/// the columns `metric`, `value` and `step`.
pub struct ParquetTelemetry {
    path: PathBuf,
    metrics: Vec<String>,
    values: Vec<f64>,
    steps: Vec<u64>,
}
impl ParquetTelemetry {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            metrics: Vec::new(),
            values: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Telemetry for ParquetTelemetry {
    fn scalar(
        &mut self,
        name: &str,
        value: f64,
        step: u64,
    ) -> Result<()> {
        info!("{name} = {value} @ {step}");
        self.metrics.push(name.to_owned());
        self.values.push(value);
        self.steps.push(step);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let mut df = DataFrame::new(vec![
            Series::new("metric", &self.metrics),
            Series::new("value", &self.values),
            Series::new("step", &self.steps),
        ])?;

        ParquetWriter::new(
            File::create(&self.path)?
        ).finish(&mut df)?;
        Ok(())
    }
}

/// Keeps every metric in memory.
#[derive(Default, Debug)]
pub struct MemoryTelemetry {
    pub records: Vec<(String, f64, u64)>,
}
impl MemoryTelemetry {
    /// All recorded `(step, value)` pairs of one metric.
    pub fn series(
        &self,
        name: &str,
    ) -> Vec<(u64, f64)> {
        self.records
            .iter()
            .filter(|(n, _, _)| n == name)
            .map(|(_, v, s)| (*s, *v))
            .collect()
    }
}

impl Telemetry for MemoryTelemetry {
    fn scalar(
        &mut self,
        name: &str,
        value: f64,
        step: u64,
    ) -> Result<()> {
        self.records.push((name.to_owned(), value, step));
        Ok(())
    }
}
