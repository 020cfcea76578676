#![allow(dead_code)]

use deye_bridge::prelude::*;

pub struct Factory;

impl Factory {
    /// A logger response: 28 bytes of vendor+protocol header followed by one
    /// big-endian word per register.
    pub fn response(words: &[u16]) -> Vec<u8> {
        let mut buf = vec![0u8; 28];
        for word in words {
            buf.extend_from_slice(&word.to_be_bytes());
        }
        buf
    }

    pub fn mapping(title: &str, registers: &[u16], ratio: f64, unit: &str) -> RegisterMapping {
        RegisterMapping {
            title: title.to_string(),
            registers: registers.to_vec(),
            ratio,
            unit: unit.to_string(),
            domoticz_idx: None,
            option_ranges: Vec::new(),
            graph: None,
            metric_type: None,
            metric_name: None,
            label_name: None,
            label_value: None,
        }
    }

    /// A cut-down map file in the shape the stock DEYE maps use.
    pub fn map_json() -> &'static str {
        r#"[
            {
                "directory": "Solar",
                "items": [
                    {
                        "titleEN": "DailyProduction",
                        "registers": ["0x006C"],
                        "DomoticzIdx": 3,
                        "optionRanges": [],
                        "ratio": 0.1,
                        "unit": "kWh",
                        "graph": 1,
                        "metric_type": "counter",
                        "metric_name": "deye_daily_production_kwh",
                        "label_name": "",
                        "label_value": ""
                    },
                    {
                        "titleEN": "TotalProduction",
                        "registers": ["0x0060", "0x0061"],
                        "DomoticzIdx": 4,
                        "optionRanges": [],
                        "ratio": 0.1,
                        "unit": "kWh",
                        "graph": 1,
                        "metric_type": "counter",
                        "metric_name": "deye_total_production_kwh",
                        "label_name": "",
                        "label_value": ""
                    }
                ]
            },
            {
                "directory": "Temperature",
                "items": [
                    {
                        "titleEN": "ACTemperature",
                        "registers": ["0x005A"],
                        "DomoticzIdx": 9,
                        "optionRanges": [],
                        "ratio": 0.01,
                        "unit": "Â°C",
                        "graph": 1,
                        "metric_type": "gauge",
                        "metric_name": "deye_ac_temperature_c",
                        "label_name": "",
                        "label_value": ""
                    }
                ]
            }
        ]"#
    }
}
