// Module declarations for the application's core components
pub mod config; // Configuration management
pub mod coordinator; // Poll orchestration
pub mod error; // Error handling and types
pub mod options; // Command line options parsing
pub mod prelude; // Common imports and types
pub mod register_map; // Register mapping table and lookup
pub mod solarman; // Solarman data logger protocol implementation
pub mod telemetry; // Telemetry record and accumulation

// Get the package version from Cargo.toml
const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

use crate::prelude::*;
use crate::coordinator::Coordinator;
use crate::solarman::datalogger::DataLogger;

/// Main application entry point
///
/// Loads configuration and the register map, connects to the data logger,
/// runs a single polling session and prints the telemetry record as JSON.
pub async fn app() -> Result<()> {
    let options = Options::new();
    let config_file = options.config_file.clone();

    let config = Config::new(options.config_file)
        .with_context(|| format!("failed to load config {}", config_file))?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.loglevel()),
    )
    .format(|buf, record| {
        writeln!(
            buf,
            "[{} {} {}] {}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
            record.level(),
            record.module_path().unwrap_or(""),
            record.args()
        )
    })
    .write_style(env_logger::WriteStyle::Never)
    .init();

    info!(
        "starting deye-bridge {} with config file: {}",
        CARGO_PKG_VERSION, config_file
    );

    let register_map = RegisterMap::new(config.inverter().register_map_file())?;
    let coordinator = Coordinator::new(config.clone(), register_map)?;

    let inverter = config.inverter();
    let mut logger = DataLogger::connect(inverter.host(), inverter.port()).await?;

    let data = coordinator.poll(&mut logger).await?;

    println!("{}", serde_json::to_string_pretty(&data)?);

    Ok(())
}
