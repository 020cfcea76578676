use crate::prelude::*;

use crate::solarman::datalogger::Transport;
use crate::solarman::packet;

/// Drives one polling session: walks the configured register ranges in
/// order, one request/response exchange each, and folds every decoded
/// register into a fresh telemetry record.
pub struct Coordinator {
    config: Config,
    register_map: RegisterMap,
}

impl Coordinator {
    /// Validates the register map against the output schema up front; a map
    /// file referencing fields we do not have must fail here, not mid-poll.
    pub fn new(config: Config, register_map: RegisterMap) -> Result<Self> {
        register_map
            .validate()
            .context("register map does not match the telemetry schema")?;

        Ok(Self {
            config,
            register_map,
        })
    }

    /// Reads all configured register ranges over `transport` and returns the
    /// assembled telemetry record.
    ///
    /// Accumulator state lives and dies inside this call, so repeated polls
    /// on the same Coordinator start their lifetime counters from zero. A
    /// transport failure on any range aborts the whole poll; a malformed
    /// response only drops that range's contribution.
    pub async fn poll<T: Transport>(&self, transport: &mut T) -> Result<InverterData> {
        let inverter = self.config.inverter();
        let mut data = InverterData::default();
        let mut totals = Accumulator::default();

        for range in inverter.ranges() {
            let frame = packet::build_request(*range, inverter.serial())?;

            transport
                .send(&frame)
                .await
                .with_context(|| format!("sending request for range {}", range))?;
            let response = transport
                .receive()
                .await
                .with_context(|| format!("reading response for range {}", range))?;

            let payload = match ResponsePayload::parse(&response) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("range {}: {}, dropping this range", range, e);
                    continue;
                }
            };

            debug!(
                "range {}: {} of {} registers present",
                range,
                payload.len(),
                range.register_count()
            );

            for reg in payload.registers(*range) {
                let mapping = self.register_map.resolve(reg.address);
                totals
                    .apply(&reg, mapping, &mut data)
                    .with_context(|| format!("register {:#06x} in range {}", reg.address, range))?;
            }
        }

        Ok(data)
    }
}
