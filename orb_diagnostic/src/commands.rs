//! Command implementations.

use std::io::Write;

use orb::clock::{Clock, MonotonicTime};
use orb::device_id::DeviceId;
use orb::format::{FormatOptions, MessageView};
use orb::registry::{TopicEntry, TopicRegistry};
use tracing::debug;

use crate::DiagError;

/// Resolve a topic given by name or numeric id.
pub fn resolve<'r>(registry: &'r TopicRegistry, topic: &str) -> Result<&'r TopicEntry, DiagError> {
    registry
        .lookup_by_name(topic)
        .or_else(|| topic.parse().ok().and_then(|id| registry.lookup_by_id(id)))
        .ok_or_else(|| DiagError::UnknownTopic(topic.to_string()))
}

/// One line per topic in numeric id order.
pub fn list(registry: &TopicRegistry, out: &mut impl Write) -> Result<(), DiagError> {
    writeln!(out, "{:>5}  {:<24} {:>6}  {:>6}", "ID", "NAME", "SIZE", "FIELDS")?;
    for entry in registry.all_topics() {
        let fields = entry.layout().map_or(0, |l| l.fields().len());
        write!(
            out,
            "{:>5}  {:<24} {:>6}  {:>6}",
            entry.numeric_id(),
            entry.name(),
            entry.byte_size(),
            fields
        )?;
        match entry.issue() {
            Some(issue) => writeln!(out, "  ! {issue}")?,
            None => writeln!(out)?,
        }
    }
    Ok(())
}

/// Metadata and resolved field layout of one topic.
pub fn show(registry: &TopicRegistry, topic: &str, out: &mut impl Write) -> Result<(), DiagError> {
    let entry = resolve(registry, topic)?;
    writeln!(out, "topic:      {}", entry.name())?;
    writeln!(out, "id:         {}", entry.numeric_id())?;
    writeln!(out, "size:       {}", entry.byte_size())?;
    writeln!(out, "no padding: {}", entry.size_no_padding())?;
    writeln!(out, "type:       {}", entry.type_tag().type_name())?;
    writeln!(out, "descriptor: {}", entry.descriptor())?;
    if let Some(issue) = entry.issue() {
        writeln!(out, "issue:      {issue}")?;
    }

    let Some(layout) = entry.layout() else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "{:>6}  {:>5}  {:<12} NAME", "OFFSET", "SIZE", "TYPE")?;
    for field in layout.fields() {
        let ty = if field.is_array() {
            format!("{}[{}]", field.kind, field.array_len)
        } else {
            field.kind.to_string()
        };
        writeln!(out, "{:>6}  {:>5}  {:<12} {}", field.offset, field.size(), ty, field.name)?;
    }
    Ok(())
}

/// `now` for a decode: the override if given, otherwise a sample of `clock`.
pub fn sample_time(now: Option<u64>, clock: &impl Clock) -> Result<MonotonicTime, DiagError> {
    match now {
        Some(us) => Ok(MonotonicTime(us)),
        None => Ok(clock.now()?),
    }
}

/// Decode one raw message of `topic` and print it.
pub fn decode(
    registry: &TopicRegistry,
    topic: &str,
    payload: &[u8],
    now: MonotonicTime,
    options: FormatOptions,
    out: &mut impl Write,
) -> Result<(), DiagError> {
    let entry = resolve(registry, topic)?;
    debug!(topic = entry.name(), bytes = payload.len(), now = now.as_micros(), "decoding");
    let view = MessageView::new(entry, payload, now, options)?;
    write!(out, "{view}")?;
    Ok(())
}

/// Parse hex text, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex_payload(text: &str) -> Result<Vec<u8>, DiagError> {
    let compact: String = text.split_whitespace().collect();
    let digits = compact.strip_prefix("0x").unwrap_or(&compact);
    Ok(hex::decode(digits)?)
}

/// Parse a device id as decimal or `0x` hex.
pub fn parse_device_id(text: &str) -> Result<u32, DiagError> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| DiagError::InvalidDeviceId(text.to_string()))
}

/// Break a packed device id into its fields.
pub fn device_id(value: &str, out: &mut impl Write) -> Result<(), DiagError> {
    let id = DeviceId(parse_device_id(value)?);
    let parts = id.parts();
    writeln!(out, "{} (0x{:08X})", id.raw(), id.raw())?;
    writeln!(out, "  {id}")?;
    writeln!(out, "  bus_type: {}", parts.bus_type)?;
    writeln!(out, "  bus:      {}", parts.bus)?;
    writeln!(out, "  address:  0x{:02X}", parts.address)?;
    writeln!(out, "  devtype:  0x{:02X}", parts.devtype)?;
    if parts.reserved != 0 {
        writeln!(out, "  reserved: 0x{:02X}", parts.reserved)?;
    }
    Ok(())
}
