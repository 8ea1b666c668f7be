use {
    anyhow::Result,
    serde::{
        de::DeserializeOwned,
        Serialize,
    },
    std::{
        fs::{
            read_to_string,
            File,
        },
        io::Write,
        path::Path,
    },
};


/// Write `config` as pretty RON to `path`.
pub fn write_config<T: Serialize, P: AsRef<Path>>(
    config: &T,
    path: P,
) -> Result<()> {
    File::create(path)?.write_all(
        ron::ser::to_string_pretty(
            config,
            ron::ser::PrettyConfig::default(),
        )?.as_bytes()
    )?;
    Ok(())
}

/// Read a RON config from `path`.
pub fn read_config<T: DeserializeOwned, P: AsRef<Path>>(
    path: P,
) -> Result<T> {
    Ok(ron::from_str(&read_to_string(path)?)?)
}
