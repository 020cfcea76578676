use deye_bridge::error::Error;
use deye_bridge::solarman::packet::{self, RegisterRange, REQUEST_FRAME_LEN};

const LOGGER_SERIAL: u32 = 3119026917;

fn range(start: u16, end: u16) -> RegisterRange {
    RegisterRange::new(start, end).unwrap()
}

#[test]
fn frame_matches_reference_capture() {
    // request for 0x0046..=0x00C0 as sent by the stock logger client
    let frame = packet::build_request(range(0x0046, 0x00C0), LOGGER_SERIAL).unwrap();

    let expected: Vec<u8> = vec![
        0xA5, // frame start
        0x17, 0x00, // data field length
        0x10, 0x45, // control code
        0x00, 0x00, // frame serial
        0xE5, 0x92, 0xE8, 0xB9, // logger serial 3119026917, little-endian
        0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // padding
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // padding
        0x01, // device address
        0x03, // read holding registers
        0x00, 0x46, // start address, big-endian
        0x00, 0x7B, // register count 123, big-endian
        0xE4, 0x3C, // CRC16-Modbus 0x3CE4, little-endian
        0x6B, // additive checksum
        0x15, // frame end
    ];

    assert_eq!(frame, expected);
}

#[test]
fn crc_covers_only_the_business_field() {
    // CRC16-Modbus of 01 03 00 46 00 01 is 0xDF65
    let frame = packet::build_request(range(0x0046, 0x0046), LOGGER_SERIAL).unwrap();
    assert_eq!(&frame[32..34], &[0x65, 0xDF]);
}

#[test]
fn crc16_modbus_check_value() {
    // the standard CRC16/MODBUS check value for "123456789"
    assert_eq!(
        crc16::State::<crc16::MODBUS>::calculate(b"123456789"),
        0x4B37
    );
}

#[test]
fn frame_length_is_constant() {
    for (start, end) in [(0x0000, 0x0000), (0x0046, 0x00C0), (0x0100, 0x013F)] {
        let frame = packet::build_request(range(start, end), LOGGER_SERIAL).unwrap();
        assert_eq!(frame.len(), REQUEST_FRAME_LEN);
    }
}

#[test]
fn count_field_is_end_minus_start_plus_one() {
    let frame = packet::build_request(range(0x0100, 0x013F), LOGGER_SERIAL).unwrap();
    assert_eq!(&frame[28..30], &[0x01, 0x00]); // start address
    assert_eq!(&frame[30..32], &[0x00, 0x40]); // 0x013F - 0x0100 + 1
}

#[test]
fn checksum_is_additive_over_frame_body() {
    let frame = packet::build_request(range(0x00C1, 0x00CC), LOGGER_SERIAL).unwrap();

    let len = frame.len();
    let sum = frame[1..len - 2]
        .iter()
        .fold(0u8, |sum, b| sum.wrapping_add(*b));

    assert_eq!(frame[len - 2], sum);
    assert_eq!(frame[0], 0xA5);
    assert_eq!(frame[len - 1], 0x15);
}

#[test]
fn register_count_must_fit_the_count_field() {
    let err = packet::build_request(range(0x0000, 0xFFFF), LOGGER_SERIAL).unwrap_err();
    assert!(matches!(
        err,
        Error::RegisterCountOutOfRange { count: 65536, .. }
    ));

    // one register short of the limit is fine
    assert!(packet::build_request(range(0x0001, 0xFFFF), LOGGER_SERIAL).is_ok());
}

#[test]
fn range_start_must_not_exceed_end() {
    assert!(matches!(
        RegisterRange::new(0x0047, 0x0046),
        Err(Error::InvalidRange { .. })
    ));
    assert!(RegisterRange::new(0x0046, 0x0046).is_ok());
}
