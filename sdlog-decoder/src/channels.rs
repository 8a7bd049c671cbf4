//! Identifier-to-channel dispatch
//!
//! Maps a decoded frame identifier to its payload decode rule and populates
//! the named telemetry channels of the output record. The protocol table is
//! data-driven: one row per known identifier, each carrying a small tagged
//! decode rule, so individual rows stay independently testable.
//!
//! All payload offsets are relative to the start of the payload slice
//! (frame offset 7 onward).

use crate::modules::ModuleLookup;
use crate::types::{Channel, ChannelRecord, ChannelValue, DecodeError, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Payload decode rule shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeRule {
    /// One byte, read as an integer
    Byte(Channel),
    /// Two bytes in reversed order, read as an integer
    Word(Channel),
    /// Two bytes rendered as one `integer.fraction` fixed-point value
    FixedPoint(Channel),
    /// Four bytes rendered as two fixed-point values
    FixedPointPair(Channel, Channel),
    /// Four bytes in reversed order as the error flag, one byte of elapsed
    /// minutes, and a module-table resolution of the identifier
    ErrorFlag,
}

impl DecodeRule {
    /// Payload bytes the declared data length must cover
    fn declared_bytes(&self) -> usize {
        match self {
            DecodeRule::Byte(_) => 1,
            DecodeRule::Word(_) => 2,
            DecodeRule::FixedPoint(_) => 2,
            DecodeRule::FixedPointPair(..) => 4,
            DecodeRule::ErrorFlag => 4,
        }
    }

    /// Fixed bytes the rule reads beyond the declared length. The error
    /// family appends its elapsed-minutes byte after the declared flag
    /// bytes.
    fn trailing_bytes(&self) -> usize {
        match self {
            DecodeRule::ErrorFlag => 1,
            _ => 0,
        }
    }

    /// Total payload bytes the rule consumes
    fn required_bytes(&self) -> usize {
        self.declared_bytes() + self.trailing_bytes()
    }
}

/// The protocol dispatch table: identifier to decode rule
const DISPATCH: &[(u16, DecodeRule)] = &[
    (1000, DecodeRule::Byte(Channel::Brake)),
    (
        1401,
        DecodeRule::FixedPointPair(Channel::PmCurrent, Channel::PmVoltage),
    ),
    (
        1410,
        DecodeRule::FixedPointPair(Channel::CellTemp1, Channel::CellTemp2),
    ),
    (1415, DecodeRule::FixedPoint(Channel::Speed)),
    (1420, DecodeRule::Byte(Channel::Throttle)),
    (1601, DecodeRule::Byte(Channel::SuStart)),
    (1602, DecodeRule::Word(Channel::LoggerStart)),
    (1603, DecodeRule::Byte(Channel::PmStart)),
    (301, DecodeRule::ErrorFlag),
    (302, DecodeRule::ErrorFlag),
    (303, DecodeRule::ErrorFlag),
];

fn rule_for(identifier: u16) -> Option<DecodeRule> {
    DISPATCH
        .iter()
        .find(|(id, _)| *id == identifier)
        .map(|(_, rule)| *rule)
}

/// Populates channel values from frame payloads
///
/// Holds a reference to the run's module table for resolving error sources;
/// otherwise stateless.
pub struct ChannelDispatcher<'a> {
    lookup: &'a ModuleLookup,
}

impl<'a> ChannelDispatcher<'a> {
    pub fn new(lookup: &'a ModuleLookup) -> Self {
        Self { lookup }
    }

    /// Apply the record's identifier rule to the payload
    ///
    /// Unknown identifiers update nothing and are not an error. A rule that
    /// needs more bytes than the frame declared (or actually carries) fails
    /// with `PayloadTooShort` and leaves the record untouched.
    pub fn dispatch(&self, record: &mut ChannelRecord, payload: &[u8]) -> Result<()> {
        let rule = match rule_for(record.identifier) {
            Some(rule) => rule,
            None => {
                log::trace!("Unknown identifier {}, payload ignored", record.identifier);
                return Ok(());
            }
        };

        let declared = record.data_length as usize;
        let available = payload.len().min(declared + rule.trailing_bytes());
        if declared < rule.declared_bytes() || available < rule.required_bytes() {
            return Err(DecodeError::PayloadTooShort {
                identifier: record.identifier,
                required: rule.required_bytes(),
                available,
            });
        }

        match rule {
            DecodeRule::Byte(channel) => {
                record.set(channel, ChannelValue::Integer(u32::from(payload[0])));
            }
            DecodeRule::Word(channel) => {
                let value = LittleEndian::read_u16(&payload[..2]);
                record.set(channel, ChannelValue::Integer(u32::from(value)));
            }
            DecodeRule::FixedPoint(channel) => {
                record.set(channel, ChannelValue::FixedPoint(payload[0], payload[1]));
            }
            DecodeRule::FixedPointPair(first, second) => {
                record.set(first, ChannelValue::FixedPoint(payload[0], payload[1]));
                record.set(second, ChannelValue::FixedPoint(payload[2], payload[3]));
            }
            DecodeRule::ErrorFlag => {
                let flag = LittleEndian::read_u32(&payload[..4]);
                record.set(Channel::ErrorFlag, ChannelValue::Integer(flag));
                record.set(
                    Channel::ErrorMinutes,
                    ChannelValue::Integer(u32::from(payload[4])),
                );
                let names = self.lookup.resolve(record.identifier);
                if !names.reason.is_empty() || !names.module.is_empty() {
                    record.set(Channel::ErrorSource, ChannelValue::Text(names.display()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameHeader, FrameKind, IdWidth};

    fn record(identifier: u16, data_length: u8) -> ChannelRecord {
        let header = FrameHeader {
            data_length,
            kind: FrameKind::Data,
            id_width: IdWidth::Standard,
        };
        ChannelRecord::new(0, &header, identifier)
    }

    fn dispatch(identifier: u16, payload: &[u8]) -> Result<ChannelRecord> {
        let lookup = ModuleLookup::new();
        let dispatcher = ChannelDispatcher::new(&lookup);
        let mut rec = record(identifier, payload.len() as u8);
        dispatcher.dispatch(&mut rec, payload)?;
        Ok(rec)
    }

    #[test]
    fn test_brake() {
        let rec = dispatch(1000, &[0x01]).unwrap();
        assert_eq!(rec.get(Channel::Brake), Some(&ChannelValue::Integer(1)));
    }

    #[test]
    fn test_power_meter_pair() {
        let rec = dispatch(1401, &[0x0C, 0x05, 0x03, 0x02]).unwrap();
        assert_eq!(rec.get(Channel::PmCurrent).unwrap().to_string(), "12.5");
        assert_eq!(rec.get(Channel::PmVoltage).unwrap().to_string(), "3.2");
    }

    #[test]
    fn test_cell_temperatures() {
        let rec = dispatch(1410, &[0x19, 0x02, 0x1A, 0x07]).unwrap();
        assert_eq!(rec.get(Channel::CellTemp1).unwrap().to_string(), "25.2");
        assert_eq!(rec.get(Channel::CellTemp2).unwrap().to_string(), "26.7");
    }

    #[test]
    fn test_speed() {
        let rec = dispatch(1415, &[0x2D, 0x09]).unwrap();
        assert_eq!(rec.get(Channel::Speed).unwrap().to_string(), "45.9");
    }

    #[test]
    fn test_throttle() {
        let rec = dispatch(1420, &[0x63]).unwrap();
        assert_eq!(rec.get(Channel::Throttle), Some(&ChannelValue::Integer(99)));
    }

    #[test]
    fn test_start_flags() {
        let rec = dispatch(1601, &[0x01]).unwrap();
        assert_eq!(rec.get(Channel::SuStart), Some(&ChannelValue::Integer(1)));

        // Logger start is a reversed two-byte read
        let rec = dispatch(1602, &[0x01, 0x01]).unwrap();
        assert_eq!(
            rec.get(Channel::LoggerStart),
            Some(&ChannelValue::Integer(257))
        );

        let rec = dispatch(1603, &[0x00]).unwrap();
        assert_eq!(rec.get(Channel::PmStart), Some(&ChannelValue::Integer(0)));
    }

    #[test]
    fn test_error_flag_reversed_read() {
        let rec = dispatch(301, &[0x01, 0x00, 0x00, 0x00, 0x05]).unwrap();
        assert_eq!(rec.get(Channel::ErrorFlag), Some(&ChannelValue::Integer(1)));
        assert_eq!(
            rec.get(Channel::ErrorMinutes),
            Some(&ChannelValue::Integer(5))
        );
        // Empty lookup: no source name, slot stays empty
        assert_eq!(rec.get(Channel::ErrorSource), None);
    }

    #[test]
    fn test_error_minutes_byte_may_exceed_declared_length() {
        // The error family declares only its four flag bytes; the elapsed
        // minutes byte rides after them as a fixed extra
        let lookup = ModuleLookup::new();
        let dispatcher = ChannelDispatcher::new(&lookup);
        let mut rec = record(303, 4);
        dispatcher
            .dispatch(&mut rec, &[0x07, 0x00, 0x00, 0x00, 0x2A])
            .unwrap();
        assert_eq!(rec.get(Channel::ErrorFlag), Some(&ChannelValue::Integer(7)));
        assert_eq!(
            rec.get(Channel::ErrorMinutes),
            Some(&ChannelValue::Integer(42))
        );

        // Without the trailing byte actually present, the rule fails
        let mut rec = record(303, 4);
        let err = dispatcher
            .dispatch(&mut rec, &[0x07, 0x00, 0x00, 0x00])
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::PayloadTooShort {
                required: 5,
                available: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_error_source_resolution() {
        let mut lookup_json = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        lookup_json
            .write_all(
                br#"{"module_reason": [{"id": "3000", "name": "Error"}],
                     "module": [{"id": "2", "name": "Logger"}]}"#,
            )
            .unwrap();
        let lookup = ModuleLookup::from_path(lookup_json.path()).unwrap();
        let dispatcher = ChannelDispatcher::new(&lookup);

        let mut rec = record(302, 5);
        dispatcher
            .dispatch(&mut rec, &[0x02, 0x00, 0x00, 0x00, 0x0A])
            .unwrap();
        assert_eq!(
            rec.get(Channel::ErrorSource),
            Some(&ChannelValue::Text("Error Logger".into()))
        );
    }

    #[test]
    fn test_unknown_identifier_is_noop() {
        let rec = dispatch(777, &[0xFF; 8]).unwrap();
        assert!(!rec.has_channel_data());
    }

    #[test]
    fn test_payload_too_short_for_rule() {
        let err = dispatch(1401, &[0x0C, 0x05]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::PayloadTooShort {
                identifier: 1401,
                required: 4,
                available: 2,
            }
        ));
    }

    #[test]
    fn test_declared_length_bounds_the_read() {
        // The slice has enough bytes but the header declared fewer; the
        // declaration wins
        let lookup = ModuleLookup::new();
        let dispatcher = ChannelDispatcher::new(&lookup);
        let mut rec = record(1000, 0);
        let err = dispatcher.dispatch(&mut rec, &[0x01]).unwrap_err();
        assert!(matches!(err, DecodeError::PayloadTooShort { .. }));
        assert!(!rec.has_channel_data());
    }

    #[test]
    fn test_every_error_identifier_dispatches() {
        for id in [301, 302, 303] {
            let rec = dispatch(id, &[0x00, 0x01, 0x00, 0x00, 0x03]).unwrap();
            assert_eq!(
                rec.get(Channel::ErrorFlag),
                Some(&ChannelValue::Integer(256))
            );
        }
    }
}
