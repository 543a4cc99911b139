//! Payload decoding and datagram length handling.

use std::sync::{Mutex, Once};

use myrtio_light_sync::{Address, Datagram, DecodeError, LightState, Message, ModeId, SENTINEL};

const PEER: Address = Address::new([0xDC, 0x54, 0x75, 0xF1, 0xE2, 0x20]);

struct CapturingLogger {
    lines: Mutex<Vec<String>>,
}

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.lines.lock().unwrap().push(record.args().to_string());
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    lines: Mutex::new(Vec::new()),
};
static LOGGER_INIT: Once = Once::new();

fn logged(needle: &str) -> bool {
    LOGGER
        .lines
        .lock()
        .unwrap()
        .iter()
        .any(|line| line.contains(needle))
}

fn capture_logs() {
    LOGGER_INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Debug);
    });
}

#[test]
fn sentinel_is_single_reserved_byte() {
    assert_eq!(Message::decode(&[SENTINEL]), Ok(Message::Sentinel));
    assert_eq!(Message::Sentinel.encode().as_bytes(), &[0xFF]);
}

#[test]
fn snapshot_is_mode_then_brightness() {
    let snapshot = Message::Snapshot(LightState::new(ModeId::Warm, 153));
    assert_eq!(snapshot.encode().as_bytes(), &[2, 153]);
    assert_eq!(Message::decode(&[2, 153]), Ok(snapshot));
}

#[test]
fn two_byte_payload_starting_with_reserved_value_is_a_snapshot() {
    // 0xFF % 6 == 3
    assert_eq!(
        Message::decode(&[0xFF, 10]),
        Ok(Message::Snapshot(LightState::new(ModeId::Blue, 10)))
    );
}

#[test]
fn out_of_range_mode_is_folded() {
    assert_eq!(
        Message::decode(&[7, 0]),
        Ok(Message::Snapshot(LightState::new(ModeId::White, 0)))
    );
}

#[test]
fn folding_an_out_of_range_mode_is_logged() {
    capture_logs();

    assert_eq!(
        Message::decode(&[6, 40]),
        Ok(Message::Snapshot(LightState::new(ModeId::Off, 40)))
    );
    assert!(logged("mode 6 out of range, folded to off"));

    assert!(Message::decode(&[4, 40]).is_ok());
    assert!(!logged("mode 4 out of range"));
}

#[test]
fn single_byte_other_than_sentinel_is_rejected() {
    assert_eq!(Message::decode(&[0x01]), Err(DecodeError::UnknownSignal(0x01)));
}

#[test]
fn unexpected_lengths_are_rejected() {
    assert_eq!(Message::decode(&[]), Err(DecodeError::InvalidLength(0)));
    assert_eq!(Message::decode(&[1, 2, 3]), Err(DecodeError::InvalidLength(3)));
}

#[test]
fn oversized_datagram_keeps_its_length() {
    let payload = [0x42u8; 250];
    let datagram = Datagram::new(PEER, &payload);
    assert_eq!(datagram.len(), 250);
    assert_eq!(datagram.message(), Err(DecodeError::InvalidLength(250)));
}

#[test]
fn empty_datagram_is_rejected() {
    let datagram = Datagram::new(PEER, &[]);
    assert!(datagram.is_empty());
    assert_eq!(datagram.message(), Err(DecodeError::InvalidLength(0)));
}

#[test]
fn datagram_decodes_valid_payloads() {
    assert_eq!(Datagram::new(PEER, &[SENTINEL]).message(), Ok(Message::Sentinel));
    assert_eq!(
        Datagram::new(PEER, &[5, 255]).message(),
        Ok(Message::Snapshot(LightState::new(ModeId::Rainbow, 255)))
    );
}

#[test]
fn address_formats_as_mac() {
    assert_eq!(PEER.to_string(), "DC:54:75:F1:E2:20");
}

#[test]
fn decode_error_display() {
    assert_eq!(
        DecodeError::InvalidLength(3).to_string(),
        "invalid payload length 3"
    );
    assert_eq!(
        DecodeError::UnknownSignal(1).to_string(),
        "unknown signal byte 0x01"
    );
}
