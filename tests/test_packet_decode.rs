mod common;
use common::*;

use deye_bridge::error::Error;
use deye_bridge::solarman::packet::{RegisterRange, RegisterValue, ResponsePayload};

fn range(start: u16, end: u16) -> RegisterRange {
    RegisterRange::new(start, end).unwrap()
}

#[test]
fn payload_starts_past_the_header() {
    let response = Factory::response(&[100]);
    let payload = ResponsePayload::parse(&response).unwrap();

    let regs: Vec<RegisterValue> = payload.registers(range(0x0046, 0x0046)).collect();
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].address, 0x0046);
    assert_eq!(regs[0].raw, 100);
    assert_eq!(regs[0].value(), 100);
}

#[test]
fn words_are_big_endian() {
    let mut response = vec![0u8; 28];
    response.extend_from_slice(&[0x01, 0x02]);
    let payload = ResponsePayload::parse(&response).unwrap();

    let regs: Vec<RegisterValue> = payload.registers(range(0x0046, 0x0046)).collect();
    assert_eq!(regs[0].raw, 0x0102);
}

#[test]
fn signed_registers_decode_as_twos_complement() {
    let response = Factory::response(&[0xFFFF, 0x7FFF]);
    let payload = ResponsePayload::parse(&response).unwrap();

    // 0x00A4 and 0x00A5 are in the signed set
    let regs: Vec<RegisterValue> = payload.registers(range(0x00A4, 0x00A5)).collect();
    assert!(regs[0].signed);
    assert_eq!(regs[0].value(), -1);
    assert_eq!(regs[1].value(), 32767);
}

#[test]
fn unsigned_registers_keep_their_full_range() {
    let response = Factory::response(&[0xFFFF]);
    let payload = ResponsePayload::parse(&response).unwrap();

    let regs: Vec<RegisterValue> = payload.registers(range(0x0046, 0x0046)).collect();
    assert!(!regs[0].signed);
    assert_eq!(regs[0].value(), 65535);
}

#[test]
fn truncated_response_yields_only_in_bounds_registers() {
    // four registers requested, two words present
    let response = Factory::response(&[10, 20]);
    let payload = ResponsePayload::parse(&response).unwrap();

    let regs: Vec<RegisterValue> = payload.registers(range(0x0046, 0x0049)).collect();
    assert_eq!(regs.len(), 2);
    assert_eq!(regs[0].raw, 10);
    assert_eq!(regs[1].raw, 20);
}

#[test]
fn odd_trailing_byte_is_ignored() {
    let mut response = Factory::response(&[10]);
    response.push(0xAB); // half a register
    let payload = ResponsePayload::parse(&response).unwrap();

    let regs: Vec<RegisterValue> = payload.registers(range(0x0046, 0x0047)).collect();
    assert_eq!(regs.len(), 1);
}

#[test]
fn response_must_be_longer_than_the_header() {
    assert!(matches!(
        ResponsePayload::parse(&[0u8; 28]),
        Err(Error::MalformedResponse { len: 28, .. })
    ));
    assert!(ResponsePayload::parse(&[]).is_err());

    // 29 bytes is enough for half a register, which decodes to nothing
    let payload = ResponsePayload::parse(&[0u8; 29]).unwrap();
    assert_eq!(payload.registers(range(0x0046, 0x0046)).count(), 0);
}
