use crate::prelude::*;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub inverter: Inverter,

    #[serde(default = "Config::default_loglevel")]
    pub loglevel: String,
}

// Inverter {{{
#[derive(Clone, Debug, Deserialize)]
pub struct Inverter {
    #[serde(default = "Config::default_host")]
    pub host: String,

    #[serde(default = "Config::default_port")]
    pub port: u16,

    /// Serial number of the Solarman data logger stick, echoed little-endian
    /// in every request frame.
    #[serde(default = "Config::default_serial")]
    pub serial: u32,

    #[serde(default = "Config::default_register_map_file")]
    pub register_map_file: String,

    #[serde(default = "Config::default_ranges")]
    pub ranges: Vec<RegisterRange>,
}

impl Inverter {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn register_map_file(&self) -> &str {
        &self.register_map_file
    }

    pub fn ranges(&self) -> &[RegisterRange] {
        &self.ranges
    }
} // }}}

impl Config {
    pub fn new(file: String) -> Result<Self> {
        let content = std::fs::read_to_string(&file)
            .map_err(|err| anyhow!("error reading {}: {}", file, err))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|err| anyhow!("error parsing {}: {}", file, err))?;

        config.validate()?;

        Ok(config)
    }

    // Deserialization bypasses the RegisterRange constructor, so re-check the
    // invariants here before anything builds a request from them.
    fn validate(&self) -> Result<()> {
        for range in self.inverter.ranges() {
            if range.start() > range.end() {
                bail!(
                    "invalid register range: start {:#06x} > end {:#06x}",
                    range.start(),
                    range.end()
                );
            }
        }

        Ok(())
    }

    pub fn inverter(&self) -> &Inverter {
        &self.inverter
    }

    pub fn loglevel(&self) -> String {
        self.loglevel.clone()
    }

    fn default_loglevel() -> String {
        "info".to_string()
    }

    fn default_host() -> String {
        "10.98.128.77".to_string()
    }

    fn default_port() -> u16 {
        8899
    }

    fn default_serial() -> u32 {
        3119026917
    }

    fn default_register_map_file() -> String {
        "DEYE_SUN_SG01LP1_EU_Map.json".to_string()
    }

    // the three register blocks the stock SUN-SG01LP1 map file covers
    fn default_ranges() -> Vec<RegisterRange> {
        [(0x0046, 0x00C0), (0x00C1, 0x00CC), (0x0100, 0x013F)]
            .into_iter()
            .map(|(start, end)| RegisterRange::new(start, end).expect("default range is valid"))
            .collect()
    }
}
