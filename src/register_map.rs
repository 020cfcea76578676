use crate::prelude::*;

use serde::Deserialize;

/// One entry of the register map file: a semantic field title plus the
/// register address(es) feeding it and how to scale them.
///
/// The trailing metadata fields are carried for downstream consumers of the
/// same map files (Domoticz, Prometheus exporters); this bridge only reads
/// title, registers, ratio and unit.
#[derive(Clone, Debug, Deserialize)]
pub struct RegisterMapping {
    #[serde(rename = "titleEN")]
    pub title: String,

    #[serde(rename = "registers", deserialize_with = "de_registers")]
    pub registers: Vec<u16>,

    #[serde(default = "default_ratio")]
    pub ratio: f64,

    #[serde(default)]
    pub unit: String,

    #[serde(rename = "DomoticzIdx", default)]
    pub domoticz_idx: Option<i64>,
    #[serde(rename = "optionRanges", default)]
    pub option_ranges: Vec<serde_json::Value>,
    #[serde(default)]
    pub graph: Option<i64>,
    #[serde(default)]
    pub metric_type: Option<String>,
    #[serde(default)]
    pub metric_name: Option<String>,
    #[serde(default)]
    pub label_name: Option<String>,
    #[serde(default)]
    pub label_value: Option<String>,
}

impl RegisterMapping {
    pub fn contains(&self, address: u16) -> bool {
        self.registers.contains(&address)
    }

    /// Whether this mapping's unit is degrees Celsius. Map files in the wild
    /// carry the degree sign double-encoded ("Â°C"), so substring match.
    pub fn is_celsius(&self) -> bool {
        self.unit.contains("°C")
    }
}

fn default_ratio() -> f64 {
    1.0
}

// Addresses appear in the map file as "0x0046"-style strings.
fn de_registers<'de, D>(deserializer: D) -> Result<Vec<u16>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<String> = Vec::deserialize(deserializer)?;
    raw.iter()
        .map(|s| {
            let digits = s.trim_start_matches("0x").trim_start_matches("0X");
            u16::from_str_radix(digits, 16)
                .map_err(|err| serde::de::Error::custom(format!("register address {s:?}: {err}")))
        })
        .collect()
}

// The map file groups entries under named directories; the groups are a
// presentation concern and are flattened away at load.
#[derive(Debug, Deserialize)]
struct MappingGroup {
    #[serde(rename = "directory", default)]
    _directory: String,
    items: Vec<RegisterMapping>,
}

/// The externally supplied register-address-to-telemetry-field table,
/// immutable once loaded.
#[derive(Clone, Debug, Default)]
pub struct RegisterMap {
    mappings: Vec<RegisterMapping>,
}

impl RegisterMap {
    pub fn new(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| anyhow!("error reading register map {}: {}", path, err))?;
        let map = Self::from_json(&content)
            .map_err(|err| anyhow!("error parsing register map {}: {}", path, err))?;

        info!("loaded {} register mappings from {}", map.mappings.len(), path);

        Ok(map)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let groups: Vec<MappingGroup> = serde_json::from_str(content)?;
        let mappings = groups.into_iter().flat_map(|g| g.items).collect();
        Ok(Self { mappings })
    }

    /// First mapping whose address set contains `address`, in table order.
    /// Ambiguous tables shadow later entries; no match is not an error.
    pub fn resolve(&self, address: u16) -> Option<&RegisterMapping> {
        self.mappings.iter().find(|m| m.contains(address))
    }

    pub fn mappings(&self) -> &[RegisterMapping] {
        &self.mappings
    }

    /// Checks every mapping title against the output schema, so a map file
    /// that references a field we do not have fails at startup instead of
    /// mid-poll.
    pub fn validate(&self) -> Result<(), Error> {
        for mapping in &self.mappings {
            if InverterData::field_kind(&mapping.title).is_none() {
                return Err(Error::InvalidMapping {
                    title: mapping.title.clone(),
                });
            }
        }
        Ok(())
    }
}
