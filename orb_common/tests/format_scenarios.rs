//! End-to-end scenarios: register hand-written topic tables, seal, look up
//! and format raw messages built byte by byte.

use orb_common::clock::MonotonicTime;
use orb_common::device_id;
use orb_common::format::{FormatError, format};
use orb_common::raw::RawWriter;
use orb_common::registry::{RegistryError, TopicRegistry};
use orb_common::topic::TypeTag;

const MAVLINK_LOG_FIELDS: &str = "uint64_t timestamp;char[127] text;uint8_t severity;";
const ADC_REPORT_FIELDS: &str = "uint64_t timestamp;uint32_t device_id;int32_t[12] raw_data;\
    uint32_t resolution;float v_ref;int16_t[12] channel_id;uint8_t[4] _padding0;";

fn registry() -> TopicRegistry {
    let mut reg = TopicRegistry::new();
    reg.register(
        "mavlink_log",
        0,
        136,
        MAVLINK_LOG_FIELDS,
        TypeTag::untyped("mavlink_log"),
    )
    .expect("register mavlink_log");
    reg.register(
        "adc_report",
        1,
        96,
        ADC_REPORT_FIELDS,
        TypeTag::untyped("adc_report"),
    )
    .expect("register adc_report");
    reg.sealed()
}

fn mavlink_log(timestamp: u64, text: &str, severity: u8) -> Vec<u8> {
    let mut bytes = [0u8; 127];
    bytes[..text.len()].copy_from_slice(text.as_bytes());
    let mut w = RawWriter::new(136);
    w.put_u64(timestamp).put_bytes(&bytes).put_u8(severity);
    w.finish()
}

#[test]
fn unstamped_message_prints_blank_timestamp_line() {
    let reg = registry();
    let entry = reg.lookup_by_name("mavlink_log").unwrap();
    let buf = mavlink_log(0, "boot", 6);

    let out = format(entry, &buf, MonotonicTime(5_000_000)).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], " mavlink_log");
    assert_eq!(lines[1], "");
    assert!(!out.contains("seconds ago"));
    assert_eq!(lines[2], "\ttext: \"boot\"");
    assert_eq!(lines[3], "\tseverity: 6");
}

#[test]
fn stamped_message_reports_freshness() {
    let reg = registry();
    let entry = reg.lookup_by_id(0).unwrap();
    let t = 123_456_789u64;
    let buf = mavlink_log(t, "armed", 4);

    let out = format(entry, &buf, MonotonicTime(t + 2_500_000)).unwrap();
    assert_eq!(
        out,
        format!(" mavlink_log\n\ttimestamp: {t}  (2.500000 seconds ago)\n\ttext: \"armed\"\n\tseverity: 4\n")
    );
}

#[test]
fn future_timestamp_reports_negative_elapsed() {
    let reg = registry();
    let entry = reg.lookup_by_id(0).unwrap();
    let buf = mavlink_log(3_000_000, "", 0);

    let out = format(entry, &buf, MonotonicTime(1_000_000)).unwrap();
    assert!(out.contains("\ttimestamp: 3000000  (-2.000000 seconds ago)\n"));
}

#[test]
fn wrong_buffer_length_fails_without_output() {
    let reg = registry();
    let entry = reg.lookup_by_name("mavlink_log").unwrap();

    for len in [0usize, 135, 137, 4096] {
        let err = format(entry, &vec![0u8; len], MonotonicTime(0)).unwrap_err();
        assert_eq!(
            err,
            FormatError::SizeMismatch {
                topic: "mavlink_log".to_string(),
                expected: 136,
                actual: len,
            }
        );
    }
}

#[test]
fn adc_report_full_render() {
    let reg = registry();
    let entry = reg.lookup_by_name("adc_report").unwrap();
    assert_eq!(entry.size_no_padding(), 92);

    let id = device_id::encode(1, 2, 0x44, 0x21);
    let mut w = RawWriter::new(96);
    w.put_u64(1_000_000).put_u32(id);
    for v in 1..=12 {
        w.put_i32(v * 10);
    }
    w.put_u32(4095).put_f32(3.3);
    for ch in 0..12i16 {
        w.put_i16(ch - 6);
    }
    let buf = w.finish();

    let out = format(entry, &buf, MonotonicTime(3_500_000)).unwrap();
    let expected = " adc_report\n\
        \ttimestamp: 1000000  (2.500000 seconds ago)\n\
        \tdevice_id: 2180113 (Type: 0x21, I2C:2 (0x44))\n\
        \traw_data: [10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120]\n\
        \tresolution: 4095\n\
        \tv_ref: 3.3000\n\
        \tchannel_id: [-6, -5, -4, -3, -2, -1, 0, 1, 2, 3, 4, 5]\n";
    assert_eq!(out, expected);
}

#[test]
fn raw_data_array_keeps_all_entries_in_order() {
    let reg = registry();
    let entry = reg.lookup_by_name("adc_report").unwrap();

    let mut w = RawWriter::new(96);
    w.put_u64(0).put_u32(0);
    let values = [7, -1, 0, i32::MAX, i32::MIN, 3, 3, 3, 9, 8, 7, 6];
    for v in values {
        w.put_i32(v);
    }
    let out = format(entry, &w.finish(), MonotonicTime(0)).unwrap();

    let line = out
        .lines()
        .find(|l| l.starts_with("\traw_data: "))
        .unwrap();
    let inner = line
        .trim_start_matches("\traw_data: [")
        .trim_end_matches(']');
    let parsed: Vec<i32> = inner.split(", ").map(|s| s.parse().unwrap()).collect();
    assert_eq!(parsed, values);
}

#[test]
fn garbage_device_id_still_renders() {
    let reg = registry();
    let entry = reg.lookup_by_name("adc_report").unwrap();

    let mut w = RawWriter::new(96);
    w.put_u64(0).put_u32(0xFFFF_FFFF);
    let out = format(entry, &w.finish(), MonotonicTime(0)).unwrap();
    assert!(out.contains("\tdevice_id: 4294967295 (Type: 0xFF, BUS7:31 (0xFF))\n"));
}

#[test]
fn sealed_registry_rejects_late_registration() {
    let mut reg = registry();
    let err = reg
        .register("late", 9, 1, "uint8_t x;", TypeTag::untyped("late"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::RegistryFrozen { .. }));
}

#[test]
fn concurrent_formatting_of_one_entry() {
    let reg = std::sync::Arc::new(registry());
    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let reg = std::sync::Arc::clone(&reg);
            std::thread::spawn(move || {
                let entry = reg.lookup_by_name("mavlink_log").unwrap();
                let buf = mavlink_log(1_000_000, "tick", i as u8);
                format(entry, &buf, MonotonicTime(2_000_000)).unwrap()
            })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        let out = h.join().unwrap();
        assert!(out.ends_with(&format!("\tseverity: {i}\n")));
        assert!(out.contains("(1.000000 seconds ago)"));
    }
}
