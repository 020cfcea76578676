use crate::prelude::*;

use serde::Serialize;

/// Declared kind of an output field: integers are rounded on assignment,
/// floats stored as-is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Int,
    Float,
}

enum Slot<'a> {
    Int(&'a mut i32),
    Float(&'a mut f64),
}

/// One poll's worth of telemetry, serialized with the field titles the
/// register map files and downstream consumers expect.
///
/// Mapping titles are matched case-insensitively against the field names in
/// `slot()`; that table is the single source of truth for both startup
/// validation and per-register assignment.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InverterData {
    // Daily energy data
    #[serde(rename = "Daily Battery Charge (kWh)")]
    pub daily_battery_charge: f64,
    #[serde(rename = "Daily Battery Discharge (kWh)")]
    pub daily_battery_discharge: f64,
    #[serde(rename = "Total Battery Charge (kWh)")]
    pub total_battery_charge: f64,
    #[serde(rename = "Total Battery Discharge (kWh)")]
    pub total_battery_discharge: f64,
    #[serde(rename = "Daily Energy Bought (kWh)")]
    pub daily_energy_bought: f64,
    #[serde(rename = "Daily Energy Sold (kWh)")]
    pub daily_energy_sold: f64,
    #[serde(rename = "Total Energy Bought (kWh)")]
    pub total_energy_bought: f64,
    #[serde(rename = "Total Energy Sold (kWh)")]
    pub total_energy_sold: f64,
    #[serde(rename = "Total Production (kWh)")]
    pub total_production: f64,
    #[serde(rename = "Daily Production (kWh)")]
    pub daily_production: f64,

    // Temperatures
    #[serde(rename = "DC Temperature (°C)")]
    pub dc_temperature: f64,
    #[serde(rename = "AC Temperature (°C)")]
    pub ac_temperature: f64,
    #[serde(rename = "Battery Temperature (°C)")]
    pub battery_temperature: f64,

    // PV strings
    #[serde(rename = "PV1 Voltage (V)")]
    pub pv1_voltage: f64,
    #[serde(rename = "PV1 Current (A)")]
    pub pv1_current: f64,
    #[serde(rename = "PV2 Voltage (V)")]
    pub pv2_voltage: f64,
    #[serde(rename = "PV2 Current (A)")]
    pub pv2_current: f64,
    #[serde(rename = "PV1 Power (W)")]
    pub pv1_power: i32,
    #[serde(rename = "PV2 Power (W)")]
    pub pv2_power: i32,

    // Grid
    #[serde(rename = "Grid Voltage L1 (V)")]
    pub grid_voltage_l1: f64,
    #[serde(rename = "Grid Voltage L2 (V)")]
    pub grid_voltage_l2: f64,
    #[serde(rename = "Grid Current L1 (A)")]
    pub grid_current_l1: f64,
    #[serde(rename = "Grid Current L2 (A)")]
    pub grid_current_l2: f64,
    #[serde(rename = "Grid Frequency (Hz)")]
    pub grid_frequency: f64,

    // Power
    #[serde(rename = "Micro-inverter Power (W)")]
    pub micro_inverter_power: i32,
    #[serde(rename = "Internal CT L1 Power (W)")]
    pub internal_ct_l1_power: i32,
    #[serde(rename = "Internal CT L2 Power (W)")]
    pub internal_ct_l2_power: i32,
    #[serde(rename = "Total Grid Power (W)")]
    pub total_grid_power: i32,
    #[serde(rename = "External CT L1 Power (W)")]
    pub external_ct_l1_power: i32,
    #[serde(rename = "External CT L2 Power (W)")]
    pub external_ct_l2_power: i32,
    #[serde(rename = "Inverter L1 Power (W)")]
    pub inverter_l1_power: i32,
    #[serde(rename = "Inverter L2 Power (W)")]
    pub inverter_l2_power: i32,
    #[serde(rename = "Total Power (W)")]
    pub total_power: i32,

    // Battery
    #[serde(rename = "Battery Voltage (V)")]
    pub battery_voltage: f64,
    #[serde(rename = "Battery SOC (%)")]
    pub battery_soc: i32,
    #[serde(rename = "Battery Status")]
    pub battery_status: i32,
    #[serde(rename = "Battery Power (W)")]
    pub battery_power: i32,
    #[serde(rename = "Battery Current (A)")]
    pub battery_current: f64,
    #[serde(rename = "Battery Capacity (Ah)")]
    pub battery_capacity: i32,

    // BMS
    #[serde(rename = "BMS1 Charging Voltage (V)")]
    pub bms1_charging_voltage: f64,
    #[serde(rename = "BMS1 Discharge Voltage (V)")]
    pub bms1_discharge_voltage: f64,
    #[serde(rename = "BMS1 Charge Current Limit (A)")]
    pub bms1_charge_current_limit: i32,
    #[serde(rename = "BMS1 Discharge Current Limit (A)")]
    pub bms1_discharge_current_limit: i32,
    #[serde(rename = "BMS1 SOC (%)")]
    pub bms1_soc: i32,
    #[serde(rename = "BMS1 Voltage (V)")]
    pub bms1_voltage: f64,
    #[serde(rename = "BMS1 Current (A)")]
    pub bms1_current: i32,
    #[serde(rename = "BMS1 Temperature (°C)")]
    pub bms1_temperature: f64,

    // Settings
    #[serde(rename = "Active Power Regulation (%)")]
    pub active_power_regulation: f64,
}

impl InverterData {
    fn slot(&mut self, title: &str) -> Option<Slot<'_>> {
        use Slot::*;

        let slot = match title.to_ascii_lowercase().as_str() {
            "dailybatterycharge" => Float(&mut self.daily_battery_charge),
            "dailybatterydischarge" => Float(&mut self.daily_battery_discharge),
            "totalbatterycharge" => Float(&mut self.total_battery_charge),
            "totalbatterydischarge" => Float(&mut self.total_battery_discharge),
            "dailyenergybought" => Float(&mut self.daily_energy_bought),
            "dailyenergysold" => Float(&mut self.daily_energy_sold),
            "totalenergybought" => Float(&mut self.total_energy_bought),
            "totalenergysold" => Float(&mut self.total_energy_sold),
            "totalproduction" => Float(&mut self.total_production),
            "dailyproduction" => Float(&mut self.daily_production),
            "dctemperature" => Float(&mut self.dc_temperature),
            "actemperature" => Float(&mut self.ac_temperature),
            "batterytemperature" => Float(&mut self.battery_temperature),
            "pv1voltage" => Float(&mut self.pv1_voltage),
            "pv1current" => Float(&mut self.pv1_current),
            "pv2voltage" => Float(&mut self.pv2_voltage),
            "pv2current" => Float(&mut self.pv2_current),
            "pv1power" => Int(&mut self.pv1_power),
            "pv2power" => Int(&mut self.pv2_power),
            "gridvoltagel1" => Float(&mut self.grid_voltage_l1),
            "gridvoltagel2" => Float(&mut self.grid_voltage_l2),
            "gridcurrentl1" => Float(&mut self.grid_current_l1),
            "gridcurrentl2" => Float(&mut self.grid_current_l2),
            "gridfrequency" => Float(&mut self.grid_frequency),
            "microinverterpower" => Int(&mut self.micro_inverter_power),
            "internalctl1power" => Int(&mut self.internal_ct_l1_power),
            "internalctl2power" => Int(&mut self.internal_ct_l2_power),
            "totalgridpower" => Int(&mut self.total_grid_power),
            "externalctl1power" => Int(&mut self.external_ct_l1_power),
            "externalctl2power" => Int(&mut self.external_ct_l2_power),
            "inverterl1power" => Int(&mut self.inverter_l1_power),
            "inverterl2power" => Int(&mut self.inverter_l2_power),
            "totalpower" => Int(&mut self.total_power),
            "batteryvoltage" => Float(&mut self.battery_voltage),
            "batterysoc" => Int(&mut self.battery_soc),
            "batterystatus" => Int(&mut self.battery_status),
            "batterypower" => Int(&mut self.battery_power),
            "batterycurrent" => Float(&mut self.battery_current),
            "batterycapacity" => Int(&mut self.battery_capacity),
            "bms1chargingvoltage" => Float(&mut self.bms1_charging_voltage),
            "bms1dischargevoltage" => Float(&mut self.bms1_discharge_voltage),
            "bms1chargecurrentlimit" => Int(&mut self.bms1_charge_current_limit),
            "bms1dischargecurrentlimit" => Int(&mut self.bms1_discharge_current_limit),
            "bms1soc" => Int(&mut self.bms1_soc),
            "bms1voltage" => Float(&mut self.bms1_voltage),
            "bms1current" => Int(&mut self.bms1_current),
            "bms1temperature" => Float(&mut self.bms1_temperature),
            "activepowerregulation" => Float(&mut self.active_power_regulation),
            _ => return None,
        };

        Some(slot)
    }

    /// Assigns `value` to the field a mapping title refers to. Unknown titles
    /// mean the map file and this schema have drifted apart, which is fatal.
    pub fn set_field(&mut self, title: &str, value: f64) -> Result<(), Error> {
        match self.slot(title) {
            Some(Slot::Float(field)) => *field = value,
            Some(Slot::Int(field)) => *field = value.round() as i32,
            None => {
                return Err(Error::InvalidMapping {
                    title: title.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Kind of the field `title` refers to, if any. Used by map validation.
    pub fn field_kind(title: &str) -> Option<FieldKind> {
        Self::default().slot(title).map(|slot| match slot {
            Slot::Int(_) => FieldKind::Int,
            Slot::Float(_) => FieldKind::Float,
        })
    }
}

// lifetime counters {{{
/// The five energy quantities the inverter reports as split 32-bit lifetime
/// counters, one low and one high 16-bit register each.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Counter {
    BatteryCharge,
    BatteryDischarge,
    EnergyBought,
    EnergySold,
    Production,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Word {
    Low,
    High,
}

impl Counter {
    /// Which lifetime counter, if any, a register address contributes to.
    /// Dispatch is by fixed address, not by mapping content.
    pub fn for_address(address: u16) -> Option<(Counter, Word)> {
        use Counter::*;
        use Word::*;

        match address {
            0x0048 => Some((BatteryCharge, Low)),
            0x0049 => Some((BatteryCharge, High)),
            0x004A => Some((BatteryDischarge, Low)),
            0x004B => Some((BatteryDischarge, High)),
            0x004E => Some((EnergyBought, Low)),
            0x004F => Some((EnergyBought, High)),
            0x0051 => Some((EnergySold, Low)),
            0x0052 => Some((EnergySold, High)),
            0x0060 => Some((Production, Low)),
            0x0061 => Some((Production, High)),
            _ => None,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Counter::BatteryCharge => "TotalBatteryCharge",
            Counter::BatteryDischarge => "TotalBatteryDischarge",
            Counter::EnergyBought => "TotalEnergyBought",
            Counter::EnergySold => "TotalEnergySold",
            Counter::Production => "TotalProduction",
        }
    }
}
// }}}

// A high word at or above this is garbage from hybrid-inverter firmware and
// contributes nothing (10 * 0.1 * 65536 would jump the total by 65536 kWh).
const HIGH_WORD_LIMIT: i32 = 10;

/// Running kWh totals for the split lifetime counters.
///
/// Contributions are additive only, so an instance is scoped to a single
/// poll; reusing one across polls would double-count every range read again.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Accumulator {
    total_battery_charge: f64,
    total_battery_discharge: f64,
    total_energy_bought: f64,
    total_energy_sold: f64,
    total_production: f64,
}

impl Accumulator {
    /// Folds one decoded register into the telemetry record.
    ///
    /// Unmapped registers are discarded. Lifetime-counter addresses feed
    /// their running total, which is then written to the output field; all
    /// other mapped registers are ratio-scaled (with the Celsius fold-back
    /// where the unit calls for it) and assigned by mapping title.
    pub fn apply(
        &mut self,
        reg: &RegisterValue,
        mapping: Option<&RegisterMapping>,
        data: &mut InverterData,
    ) -> Result<(), Error> {
        let Some(mapping) = mapping else {
            debug!("no mapping found for register {:#06x}", reg.address);
            return Ok(());
        };

        if let Some((counter, word)) = Counter::for_address(reg.address) {
            let value = reg.value();
            match word {
                Word::Low => *self.total_mut(counter) += f64::from(value) * 0.1,
                Word::High if value < HIGH_WORD_LIMIT => {
                    *self.total_mut(counter) += f64::from(value) * 0.1 * 65536.0
                }
                Word::High => {
                    debug!(
                        "register {:#06x}: high word {} ignored (likely invalid data for hybrid inverter)",
                        reg.address, value
                    );
                }
            }
            return data.set_field(counter.title(), self.total(counter));
        }

        let scaled = f64::from(reg.value()) * mapping.ratio;
        let scaled = if mapping.is_celsius() {
            // sub-100 readings encode sub-zero temperatures
            if scaled >= 100.0 {
                scaled - 100.0
            } else {
                -scaled
            }
        } else {
            scaled
        };

        debug!(
            "{:#06x} - {}: {}{}",
            reg.address, mapping.title, scaled, mapping.unit
        );

        data.set_field(&mapping.title, scaled)
    }

    pub fn total(&self, counter: Counter) -> f64 {
        *match counter {
            Counter::BatteryCharge => &self.total_battery_charge,
            Counter::BatteryDischarge => &self.total_battery_discharge,
            Counter::EnergyBought => &self.total_energy_bought,
            Counter::EnergySold => &self.total_energy_sold,
            Counter::Production => &self.total_production,
        }
    }

    fn total_mut(&mut self, counter: Counter) -> &mut f64 {
        match counter {
            Counter::BatteryCharge => &mut self.total_battery_charge,
            Counter::BatteryDischarge => &mut self.total_battery_discharge,
            Counter::EnergyBought => &mut self.total_energy_bought,
            Counter::EnergySold => &mut self.total_energy_sold,
            Counter::Production => &mut self.total_production,
        }
    }
}
