use crate::prelude::*;

use num_enum::IntoPrimitive;

/// First byte of every Solarman V5 frame.
pub const FRAME_START: u8 = 0xA5;
/// Last byte of every Solarman V5 frame.
pub const FRAME_END: u8 = 0x15;
/// Control code for a logger data request.
pub const CONTROL_CODE: [u8; 2] = [0x10, 0x45];
/// Modbus device address of the inverter behind the logger.
pub const DEVICE_ADDRESS: u8 = 0x01;

/// Register data in a response starts here, past the vendor and protocol
/// headers. Each register is 2 bytes, big-endian.
pub const PAYLOAD_OFFSET: usize = 28;

/// A request frame is always the same size: the business field carries a
/// start address and count, never values.
pub const REQUEST_FRAME_LEN: usize = 36;

// Length of the data field (padding + business field + CRC), as carried in
// the frame's little-endian length bytes.
const DATA_FIELD_LEN: u16 = 23;

// The logger firmware reports these registers as two's-complement values;
// nothing in the response marks them, so signedness is keyed off the address.
const SIGNED_REGISTERS: [u16; 16] = [
    0x005A, 0x005B, 0x00A4, 0x00A5, 0x00A7, 0x00A8, 0x00A9, 0x00AA, 0x00AB, 0x00AD, 0x00AE,
    0x00AF, 0x00B6, 0x00BE, 0x00BF, 0x013E,
];

#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive)]
#[repr(u8)]
pub enum DeviceFunction {
    ReadHold = 3,
    // the logger also answers 4 (ReadInput) and 6 (WriteSingle), but this
    // bridge only ever issues holding-register reads
}

// RegisterRange {{{
/// An inclusive range of holding-register addresses, one request each.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize)]
pub struct RegisterRange {
    start: u16,
    end: u16,
}

impl RegisterRange {
    pub fn new(start: u16, end: u16) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of registers covered, `end - start + 1`. Can be 0x10000 for the
    /// full address space, hence u32.
    pub fn register_count(&self) -> u32 {
        u32::from(self.end) - u32::from(self.start) + 1
    }
}

impl std::fmt::Display for RegisterRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}..={:#06x}", self.start, self.end)
    }
}
// }}}

/// Builds the request frame for one register range.
///
/// Layout: start byte, LE data-field length, control code, frame serial,
/// LE logger serial, 15 bytes of padding (0x02 then zeroes), the 6-byte
/// Modbus business field, CRC16-Modbus over the business field (LE), an
/// additive checksum over the frame body, end byte.
///
/// Pure construction; the only failure is a register count that does not fit
/// the protocol's 16-bit count field.
pub fn build_request(range: RegisterRange, logger_serial: u32) -> Result<Vec<u8>, Error> {
    let count = range.register_count();
    let count = u16::try_from(count).map_err(|_| Error::RegisterCountOutOfRange {
        start: range.start(),
        end: range.end(),
        count,
    })?;

    let mut frame = Vec::with_capacity(REQUEST_FRAME_LEN);
    frame.push(FRAME_START);
    frame.extend_from_slice(&DATA_FIELD_LEN.to_le_bytes());
    frame.extend_from_slice(&CONTROL_CODE);
    frame.extend_from_slice(&0u16.to_le_bytes()); // frame serial, unused
    frame.extend_from_slice(&logger_serial.to_le_bytes());

    // data field padding
    frame.push(0x02);
    frame.extend_from_slice(&[0u8; 14]);

    // business field: a plain Modbus read-holding-registers request
    frame.push(DEVICE_ADDRESS);
    frame.push(DeviceFunction::ReadHold.into());
    frame.extend_from_slice(&range.start().to_be_bytes());
    frame.extend_from_slice(&count.to_be_bytes());

    let crc = crc16::State::<crc16::MODBUS>::calculate(&frame[frame.len() - 6..]);
    frame.extend_from_slice(&crc.to_le_bytes());

    frame.push(0x00); // checksum placeholder
    frame.push(FRAME_END);

    // checksum covers everything between the start byte and itself
    let len = frame.len();
    let checksum = frame[1..len - 2]
        .iter()
        .fold(0u8, |sum, b| sum.wrapping_add(*b));
    frame[len - 2] = checksum;

    Ok(frame)
}

// ResponsePayload {{{
/// Borrowed view of the register words in a logger response.
///
/// Only the minimum length is validated; the vendor markers, echoed serial
/// and response checksum are not. Loggers in the field answer with assorted
/// header contents and the payload offset is the one constant, so anything
/// long enough is taken at face value.
#[derive(Clone, Copy, Debug)]
pub struct ResponsePayload<'a> {
    data: &'a [u8],
}

impl<'a> ResponsePayload<'a> {
    pub fn parse(response: &'a [u8]) -> Result<Self, Error> {
        if response.len() <= PAYLOAD_OFFSET {
            return Err(Error::MalformedResponse {
                len: response.len(),
                min: PAYLOAD_OFFSET,
            });
        }

        Ok(Self {
            data: &response[PAYLOAD_OFFSET..],
        })
    }

    /// Register words available in this payload.
    pub fn len(&self) -> usize {
        self.data.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the registers of `range` in address order, one
    /// [`RegisterValue`] per word actually present in the payload. Registers
    /// past the end of a short response are skipped, not defaulted.
    pub fn registers(&self, range: RegisterRange) -> Registers<'a> {
        Registers {
            data: self.data,
            range,
            index: 0,
        }
    }
}
// }}}

// Registers {{{
/// Lazy decoder over one response payload.
pub struct Registers<'a> {
    data: &'a [u8],
    range: RegisterRange,
    index: u32,
}

impl Iterator for Registers<'_> {
    type Item = RegisterValue;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.range.register_count() {
            let i = self.index as usize;
            let address = self.range.start().wrapping_add(self.index as u16);
            self.index += 1;

            match self.data.get(2 * i..2 * i + 2) {
                Some(word) => {
                    let raw = u16::from_be_bytes([word[0], word[1]]);
                    return Some(RegisterValue::new(address, raw));
                }
                None => {
                    debug!(
                        "register {:#06x}: payload offset {} exceeds payload length {}, skipping",
                        address,
                        2 * i,
                        self.data.len()
                    );
                    // everything after this is out of bounds too
                    self.index = self.range.register_count();
                }
            }
        }

        None
    }
}
// }}}

// RegisterValue {{{
/// One decoded 16-bit register word.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RegisterValue {
    pub address: u16,
    pub raw: u16,
    pub signed: bool,
}

impl RegisterValue {
    pub fn new(address: u16, raw: u16) -> Self {
        Self {
            address,
            raw,
            signed: SIGNED_REGISTERS.contains(&address),
        }
    }

    /// The register's value with signedness applied.
    pub fn value(&self) -> i32 {
        if self.signed {
            i32::from(self.raw as i16)
        } else {
            i32::from(self.raw)
        }
    }
}
// }}}
