use {
    anyhow::Result,
    std::{
        fs::{
            create_dir_all,
            File,
        },
        path::Path,
        sync::Arc,
    },
    tracing::Level,
    tracing_subscriber::{
        fmt::{
            layer,
            writer::MakeWriterExt,
        },
        layer::SubscriberExt,
        util::SubscriberInitExt,
    },
};

/// Log to `path` and to stdout, both filtered at `level`.
///
/// With `level == None` no subscriber is installed and every event is dropped.
pub fn setup_logging(
    path: &dyn AsRef<Path>,
    level: Option<Level>,
) -> Result<()> {
    let Some(level) = level else {
        return Ok(());
    };
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let log_file = Arc::new(File::create(path)?);

    tracing_subscriber::registry()
        // File writer
        .with(
            layer()
                .with_writer(log_file.with_max_level(level))
                .with_ansi(false),
        )
        // Stdout writer
        .with(
            layer()
                .with_writer(std::io::stdout.with_max_level(level))
                .compact()
                .with_line_number(true)
                .with_thread_ids(false)
                .with_target(false),
        )
        .try_init()?;

    Ok(())
}
