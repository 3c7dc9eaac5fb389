pub mod calendar; // Calendar presentation adapter
pub mod config;
pub mod db; // SQLite persistence adapter
pub mod directory; // Client directory lookup
pub mod models;
pub mod scheduling; // Appointment repository, editor, validation

use chrono::Local;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::calendar::CalendarAdapter;
use crate::directory::InMemoryDirectory;
use crate::scheduling::{AppointmentRepository, ChangeIntent, IntentSink, LogSink};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Cannot create data directory {path}: {source}")]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Database(#[from] db::DatabaseError),

    #[error("Cannot render calendar: {0}")]
    Render(#[from] serde_json::Error),
}

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Opens the calendar from the data directory and prints the current frame
/// (view, legend, styled visible events) as JSON. A fresh store is seeded with the demo appointments.
pub fn run() -> Result<(), StartupError> {
    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir).map_err(|source| StartupError::DataDir {
        path: data_dir.display().to_string(),
        source,
    })?;
    let settings = config::load_settings(&data_dir)?;

    let conn = db::open_database(&config::database_path())?;
    let stored = db::load_appointments(&conn)?;
    let mut sink = db::SqliteSink::new(conn);

    let repository = if stored.is_empty() {
        tracing::info!("Empty store, seeding demo appointments");
        let seed = scheduling::demo_appointments();
        for apt in &seed {
            if let Err(e) = sink.apply(&ChangeIntent::Created(apt.clone())) {
                tracing::warn!(error = %e, "Seeding failed");
            }
        }
        AppointmentRepository::with_appointments(seed)
    } else {
        tracing::info!(count = stored.len(), "Loaded appointments");
        AppointmentRepository::with_appointments(stored)
    };

    let mut calendar = CalendarAdapter::new(
        repository,
        InMemoryDirectory::demo(),
        settings,
        Local::now().date_naive(),
    );
    calendar.attach_sink(Box::new(LogSink));
    calendar.attach_sink(Box::new(sink));

    let rendered = serde_json::to_string_pretty(&calendar.render())?;
    println!("{rendered}");
    Ok(())
}
