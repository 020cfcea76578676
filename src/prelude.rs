pub use std::io::Write;

pub use anyhow::{anyhow, bail, Context, Result};
pub use log::{debug, error, info, trace, warn};

pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::options::Options;
pub use crate::register_map::{RegisterMap, RegisterMapping};
pub use crate::solarman::packet::{RegisterRange, RegisterValue, ResponsePayload};
pub use crate::telemetry::{Accumulator, InverterData};
