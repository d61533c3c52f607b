use anyhow::Error;
use confique::Config;
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Debug, Config)]
pub struct FleetMetricsConfig {
    /// Decimal places used when the CLI formats values.
    #[config(env = "FLEETMETRICS_PRECISION", default = 2)]
    pub precision: usize,

    /// Tracing filter used when `RUST_LOG` is not set.
    #[config(env = "FLEETMETRICS_LOG_FILTER", default = "info")]
    pub log_filter: String,

    #[config(env = "FLEETMETRICS_PRETTY_OUTPUT", default = true)]
    pub pretty_output: bool,
}

impl FleetMetricsConfig {
    pub fn load() -> Result<FleetMetricsConfig, Error> {
        let c = FleetMetricsConfig::builder()
            .env()
            .file("settings.toml")
            .load()?;

        Ok(c)
    }
}

static FLEETMETRICS_CONFIG: OnceLock<Arc<FleetMetricsConfig>> = OnceLock::new();

pub fn get() -> Result<Arc<FleetMetricsConfig>, Error> {
    FLEETMETRICS_CONFIG.get().cloned().ok_or_else(|| {
        Error::msg(
            "Configuration not loaded. Please call load_configuration() before using the configuration",
        )
    })
}

pub fn load_configuration() -> Result<(), Error> {
    if FLEETMETRICS_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = FleetMetricsConfig::load()?;
    FLEETMETRICS_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}

static TEST_CONFIG_INIT: Mutex<()> = Mutex::new(());

/// Loads the configuration once per test binary, from whichever test gets there first.
pub fn load_configuration_for_tests() -> Result<(), Error> {
    let _guard = TEST_CONFIG_INIT
        .lock()
        .map_err(|e| Error::msg(format!("Test configuration lock poisoned: {}", e)))?;

    if FLEETMETRICS_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = FleetMetricsConfig::load()?;
    FLEETMETRICS_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}
