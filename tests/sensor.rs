//! End-to-end tests: raw bytes in through a mock transport, measurements out

use mr60bha2_io::protocol::constants::*;
use mr60bha2_io::protocol::{checksum, FrameBuilder, FrameSynchronizer, RawFrame};
use mr60bha2_io::{Distance, MockTransport, Mr60bha2, Phases, Reading, Result, Transport};
use std::time::{Duration, Instant};

const POLL: Duration = Duration::from_millis(20);

fn sensor() -> (Mr60bha2<MockTransport>, MockTransport) {
    let mock = MockTransport::new();
    (Mr60bha2::new(mock.clone()), mock)
}

/// The reference distance frame: flag = 1, range = 0.5 m
fn reference_distance_frame() -> Vec<u8> {
    let payload = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x3F];
    let mut frame = vec![0x01, 0x00, 0x00, 0x00, 0x08, 0x0A, 0x16, 0xEA];
    frame.extend_from_slice(&payload);
    frame.push(checksum(&payload));
    frame
}

#[test]
fn distance_from_literal_bytes() {
    let (mut sensor, mock) = sensor();
    mock.inject_read(&reference_distance_frame());

    assert!(sensor.update(POLL).unwrap());
    let distance = sensor.get_distance().unwrap();
    assert!(distance.detected);
    assert!((distance.range_m - 0.5).abs() < f32::EPSILON);
}

#[test]
fn breath_rate_from_payload_bytes() {
    let (mut sensor, mock) = sensor();
    mock.inject_read(&FrameBuilder::new().build(TYPE_BREATH_RATE, &[0x00, 0x00, 0x98, 0x41]));

    assert!(sensor.update(POLL).unwrap());
    assert_eq!(sensor.get_breath_rate(), Some(19.0));
}

#[test]
fn heart_rate_round_trip_is_bit_exact() {
    let (mut sensor, mock) = sensor();
    let mut builder = FrameBuilder::new();

    for value in [72.0f32, 58.125, 0.0, 1.0e-7, 199.99] {
        mock.inject_read(&builder.build(TYPE_HEART_RATE, &value.to_le_bytes()));
        assert!(sensor.update(POLL).unwrap());
        assert_eq!(sensor.get_heart_rate().map(f32::to_bits), Some(value.to_bits()));
    }
}

#[test]
fn debug_text_is_delivered_verbatim() {
    let (mut sensor, mock) = sensor();
    mock.inject_read(&FrameBuilder::new().build(TYPE_DEBUG_TEXT, b"invalid BR = 7082"));

    assert!(sensor.update(POLL).unwrap());
    let text = sensor.get_debug_text().unwrap();
    assert_eq!(text.code, 0x0100);
    assert_eq!(text.text, b"invalid BR = 7082".to_vec());
}

#[test]
fn consuming_read_clears_freshness() {
    let (mut sensor, mock) = sensor();
    let mut builder = FrameBuilder::new();
    mock.inject_read(&builder.build(TYPE_HEART_RATE, &64.0f32.to_le_bytes()));

    sensor.update(POLL).unwrap();
    assert_eq!(sensor.get_heart_rate(), Some(64.0));
    assert_eq!(sensor.get_heart_rate(), None);

    // Nothing new on the wire: still absent
    assert!(!sensor.update(POLL).unwrap());
    assert_eq!(sensor.get_heart_rate(), None);

    mock.inject_read(&builder.build(TYPE_HEART_RATE, &66.0f32.to_le_bytes()));
    sensor.update(POLL).unwrap();
    assert_eq!(sensor.get_heart_rate(), Some(66.0));
}

#[test]
fn garbage_before_valid_frame() {
    let (mut sensor, mock) = sensor();
    mock.inject_read(&[0xFF, 0xFF, 0x01]);
    mock.inject_read(&reference_distance_frame());

    assert!(sensor.update(POLL).unwrap());
    assert_eq!(
        sensor.get_distance(),
        Some(Distance {
            detected: true,
            range_m: 0.5
        })
    );
}

#[test]
fn corrupted_frames_are_absorbed() {
    let (mut sensor, mock) = sensor();
    let mut builder = FrameBuilder::new();

    let mut bad_header = builder.build(TYPE_HEART_RATE, &80.0f32.to_le_bytes());
    bad_header[SIZE_HEADER_FIELDS] ^= 0xFF;
    let mut bad_data = builder.build(TYPE_BREATH_RATE, &12.0f32.to_le_bytes());
    let last = bad_data.len() - 1;
    bad_data[last] ^= 0x01;

    mock.inject_read(&bad_header);
    mock.inject_read(&bad_data);
    assert!(!sensor.update(POLL).unwrap());
    assert_eq!(sensor.get_heart_rate(), None);
    assert_eq!(sensor.get_breath_rate(), None);

    let stats = sensor.stats();
    assert_eq!(stats.sync.header_checksum_errors, 1);
    assert_eq!(stats.sync.data_checksum_errors, 1);

    // The line recovers on the next good frame
    mock.inject_read(&builder.build(TYPE_BREATH_RATE, &12.0f32.to_le_bytes()));
    assert!(sensor.update(POLL).unwrap());
    assert_eq!(sensor.get_breath_rate(), Some(12.0));
}

#[test]
fn frame_split_across_updates() {
    let (mut sensor, mock) = sensor();
    let frame = reference_distance_frame();

    mock.inject_read(&frame[..6]);
    assert!(!sensor.update(POLL).unwrap());
    mock.inject_read(&frame[6..13]);
    assert!(!sensor.update(POLL).unwrap());
    mock.inject_read(&frame[13..]);
    assert!(sensor.update(POLL).unwrap());
    assert!(sensor.get_distance().is_some());
}

#[test]
fn length_mismatch_is_not_an_error() {
    let (mut sensor, mock) = sensor();
    // Checksums fine, but a heart rate frame must carry exactly 4 bytes
    mock.inject_read(&FrameBuilder::new().build(TYPE_HEART_RATE, &[0x00, 0x00, 0x90]));

    assert!(sensor.update(POLL).unwrap());
    assert_eq!(sensor.get_heart_rate(), None);
    assert_eq!(sensor.stats().unknown_frames, 1);
    assert_eq!(sensor.store().last_unknown(), Some((TYPE_HEART_RATE, &[0x00, 0x00, 0x90][..])));
}

#[test]
fn get_all_is_non_consuming() {
    let (mut sensor, mock) = sensor();
    let mut builder = FrameBuilder::new();
    let mut phases = Vec::new();
    for v in [3.0f32, 1.0, 2.0] {
        phases.extend(v.to_le_bytes());
    }
    mock.inject_read(&builder.build(TYPE_HEART_BREATH_PHASE, &phases));
    mock.inject_read(&builder.build(TYPE_HEART_RATE, &75.0f32.to_le_bytes()));
    sensor.update(POLL).unwrap();

    let expected_phases = Phases {
        total: 3.0,
        breath: 1.0,
        heart: 2.0,
    };
    for _ in 0..2 {
        let all = sensor.get_all();
        assert_eq!(
            all.heart_rate,
            Reading {
                value: Some(75.0),
                fresh: true
            }
        );
        assert_eq!(all.phases.value, Some(expected_phases));
        assert!(all.phases.fresh);
        assert_eq!(all.breath_rate.value, None);
        assert_eq!(all.distance.value, None);
    }

    assert_eq!(sensor.get_phases(), Some(expected_phases));
    let all = sensor.get_all();
    assert_eq!(all.phases.value, Some(expected_phases));
    assert!(!all.phases.fresh);
}

#[test]
fn latest_frame_supersedes_unconsumed_value() {
    let (mut sensor, mock) = sensor();
    let mut builder = FrameBuilder::new();
    for bpm in [14.0f32, 15.0, 16.0] {
        mock.inject_read(&builder.build(TYPE_BREATH_RATE, &bpm.to_le_bytes()));
    }

    sensor.update(POLL).unwrap();
    assert_eq!(sensor.get_breath_rate(), Some(16.0));
    assert_eq!(sensor.get_breath_rate(), None);
}

#[test]
fn undetected_distance_is_not_suppressed() {
    let (mut sensor, mock) = sensor();
    let mut payload = vec![0, 0, 0, 0];
    payload.extend(74.62f32.to_le_bytes());
    mock.inject_read(&FrameBuilder::new().build(TYPE_HEART_BREATH_DISTANCE, &payload));

    sensor.update(POLL).unwrap();
    let distance = sensor.get_distance().unwrap();
    assert!(!distance.detected);
    assert_eq!(distance.range_m, 74.62);
}

#[test]
fn wait_for_heart_rate_returns_value() {
    let (mut sensor, mock) = sensor();
    mock.set_chunk_size(3);
    let mut builder = FrameBuilder::new();
    mock.inject_read(&builder.build(TYPE_BREATH_RATE, &18.0f32.to_le_bytes()));
    mock.inject_read(&builder.build(TYPE_HEART_RATE, &71.0f32.to_le_bytes()));

    assert_eq!(
        sensor.wait_for_heart_rate(Duration::from_secs(2)).unwrap(),
        Some(71.0)
    );
    assert_eq!(sensor.get_heart_rate(), None);
    assert_eq!(sensor.get_breath_rate(), Some(18.0));
}

#[test]
fn wait_for_times_out_without_frames() {
    let (mut sensor, mock) = sensor();
    mock.inject_read(&[0x00, 0x13, 0x37]);

    assert_eq!(
        sensor.wait_for_breath_rate(Duration::from_millis(30)).unwrap(),
        None
    );
    assert_eq!(
        sensor.wait_for_phases(Duration::from_millis(30)).unwrap(),
        None
    );
}

/// A sensor that never goes quiet: the same frame, back to back, forever
struct ChattySensor {
    frame: Vec<u8>,
    pos: usize,
}

impl Transport for ChattySensor {
    fn read_available(&mut self, buffer: &mut [u8], _max_wait: Duration) -> Result<usize> {
        for byte in buffer.iter_mut() {
            *byte = self.frame[self.pos];
            self.pos = (self.pos + 1) % self.frame.len();
        }
        Ok(buffer.len())
    }

    fn is_open(&self) -> bool {
        true
    }
}

#[test]
fn update_returns_when_budget_runs_out() {
    let mut frame = vec![0xFF, 0x00];
    frame.extend(FrameBuilder::new().build(TYPE_HEART_RATE, &73.0f32.to_le_bytes()));
    let mut sensor = Mr60bha2::new(ChattySensor { frame, pos: 0 });

    let start = Instant::now();
    assert!(sensor.update(Duration::from_millis(20)).unwrap());
    assert!(start.elapsed() < Duration::from_millis(500));

    assert_eq!(sensor.get_heart_rate(), Some(73.0));
    let stats = sensor.stats();
    assert!(stats.sync.frames > 0);
    assert_eq!(stats.sync.framing_errors(), 0);
}

#[test]
fn chunking_does_not_change_frames() {
    let mut builder = FrameBuilder::new();
    let mut stream = vec![0x42, 0x01, 0x01];
    stream.extend(builder.build(TYPE_HEART_RATE, &70.0f32.to_le_bytes()));
    stream.extend([0x01, 0x00]);
    stream.extend(reference_distance_frame());
    stream.extend(builder.build(0x0F09, &[9, 9]));

    let mut all_at_once = FrameSynchronizer::new();
    let mut expected: Vec<RawFrame> = Vec::new();
    all_at_once.feed(&stream, |f| expected.push(*f));
    assert_eq!(expected.len(), 3);

    let mut byte_wise = FrameSynchronizer::new();
    let mut frames: Vec<RawFrame> = Vec::new();
    for &b in &stream {
        if let Some(frame) = byte_wise.push(b) {
            frames.push(*frame);
        }
    }
    assert_eq!(frames, expected);
}
