//! Decoder for the state-vector feed.
//!
//! The payload is not treated as JSON. A fixed-length header carrying the
//! message time is skipped, the rest is split on `[` and each chunk is read as
//! positional comma-separated fields. A chunk with too few fields ends the
//! whole payload, so callers only ever see a prefix of the valid records.

use super::types::StateRecord;

/// `{"time":NNNNNNNNNN,"states":[[`
pub const HEADER_LEN: usize = 30;
pub const MIN_FIELDS: usize = 13;
pub const UNKNOWN_CALLSIGN: &str = "Unknown";

const NULL: &str = "null";

const CALLSIGN: usize = 1;
const TIME_POSITION: usize = 3;
const LONGITUDE: usize = 5;
const LATITUDE: usize = 6;
const BARO_ALTITUDE: usize = 7;
const VELOCITY: usize = 9;
const TRUE_TRACK: usize = 10;
const VERTICAL_RATE: usize = 11;
const GEO_ALTITUDE: usize = 13;

pub fn parse_states(payload: &str) -> StateRecords<'_> {
    let body = payload.get(HEADER_LEN..).unwrap_or("");
    StateRecords {
        chunks: body.split('['),
        done: false,
    }
}

/// Lazy sequence of records, see [`parse_states`].
pub struct StateRecords<'a> {
    chunks: std::str::Split<'a, char>,
    done: bool,
}

impl Iterator for StateRecords<'_> {
    type Item = StateRecord;

    fn next(&mut self) -> Option<StateRecord> {
        if self.done {
            return None;
        }

        for chunk in self.chunks.by_ref() {
            let fields: Vec<&str> = chunk.split(',').collect();
            if fields.len() < MIN_FIELDS {
                log::debug!(
                    "feed record with {} fields, ignoring rest of payload",
                    fields.len()
                );
                break;
            }

            match parse_record(&fields) {
                Some(record) => return Some(record),
                None => log::debug!("dropping feed record without position: {}", fields[CALLSIGN]),
            }
        }

        self.done = true;
        None
    }
}

fn parse_record(fields: &[&str]) -> Option<StateRecord> {
    let longitude = number(fields[LONGITUDE])?;
    let latitude = number(fields[LATITUDE])?;

    let altitude_m = fields
        .get(GEO_ALTITUDE)
        .and_then(|f| number(f))
        .or_else(|| number(fields[BARO_ALTITUDE]))
        .unwrap_or(0.0);

    Some(StateRecord {
        callsign: parse_callsign(fields[CALLSIGN]),
        latitude,
        longitude,
        altitude_m,
        velocity_m_s: number(fields[VELOCITY]).unwrap_or(0.0),
        heading_deg: number(fields[TRUE_TRACK]).unwrap_or(0.0),
        vertical_rate_m_s: number(fields[VERTICAL_RATE]).unwrap_or(0.0),
        last_contact: number(fields[TIME_POSITION]).map_or(0, |t| t as i64),
    })
}

/// Strips the opening quote and the closing quote plus one padding char.
///
/// Trailing spaces are trimmed, and `null` or an all-blank field maps to
/// [`UNKNOWN_CALLSIGN`] as well as a field too short to slice.
pub fn parse_callsign(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() < 3 || raw == NULL {
        return UNKNOWN_CALLSIGN.to_string();
    }

    let callsign: String = chars[1..chars.len() - 2].iter().collect();
    let callsign = callsign.trim_end();
    if callsign.is_empty() {
        UNKNOWN_CALLSIGN.to_string()
    } else {
        callsign.to_string()
    }
}

/// `None` for the `null` token and for anything that is not a number.
fn number(raw: &str) -> Option<f64> {
    let raw = raw.trim().trim_end_matches([']', '}']);
    if raw == NULL {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "{\"time\":1583171590,\"states\":[[";

    fn payload(records: &[&str]) -> String {
        format!("{}{}]]}}", HEADER, records.join("],["))
    }

    const ABC123: &str = "\"a1b2c3\",\"ABC123  \",\"United States\",1583171589,1583171589,10,5,1000.5,false,100,90,2,null,null,\"1200\",false,0";
    const N512XY: &str = "\"a3f001\",\"N512XY  \",\"United States\",1583171580,1583171580,-117.2,33.6,2000,false,55.5,270.25,-1.5,null,2100,null,false,0";

    #[test]
    fn test_header_is_thirty_chars() {
        assert_eq!(HEADER.len(), HEADER_LEN);
    }

    #[test]
    fn test_parse_single_record() {
        let records: Vec<_> = parse_states(&payload(&[ABC123])).collect();
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.callsign, "ABC123");
        assert_eq!(r.latitude, 5.0);
        assert_eq!(r.longitude, 10.0);
        assert_eq!(r.altitude_m, 1000.5); // geometric altitude null, barometric used
        assert_eq!(r.velocity_m_s, 100.0);
        assert_eq!(r.heading_deg, 90.0);
        assert_eq!(r.vertical_rate_m_s, 2.0);
        assert_eq!(r.last_contact, 1583171589);
    }

    #[test]
    fn test_geometric_altitude_preferred() {
        let records: Vec<_> = parse_states(&payload(&[ABC123, N512XY])).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].callsign, "N512XY");
        assert_eq!(records[1].altitude_m, 2100.0);
        assert_eq!(records[1].heading_deg, 270.25);
        assert_eq!(records[1].vertical_rate_m_s, -1.5);
    }

    #[test]
    fn test_null_optionals_default_to_zero() {
        let rec = "\"a1b2c3\",\"ZERO1   \",\"X\",null,null,10,5,null,false,null,null,null,null,null,null,false,0";
        let records: Vec<_> = parse_states(&payload(&[rec])).collect();
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.altitude_m, 0.0);
        assert_eq!(r.velocity_m_s, 0.0);
        assert_eq!(r.heading_deg, 0.0);
        assert_eq!(r.vertical_rate_m_s, 0.0);
        assert_eq!(r.last_contact, 0);
    }

    #[test]
    fn test_null_position_dropped_and_parsing_continues() {
        let no_lon = "\"a1b2c3\",\"NOPOS   \",\"X\",1,1,null,5,100,false,1,1,1,null,null,null,false,0";
        let no_lat = "\"a1b2c3\",\"NOPOS2  \",\"X\",1,1,10,null,100,false,1,1,1,null,null,null,false,0";
        let records: Vec<_> = parse_states(&payload(&[no_lon, ABC123, no_lat, N512XY])).collect();

        let callsigns: Vec<_> = records.iter().map(|r| r.callsign.as_str()).collect();
        assert_eq!(callsigns, vec!["ABC123", "N512XY"]);
    }

    #[test]
    fn test_short_record_stops_payload() {
        let short = "\"a1b2c3\",\"SHORT   \",\"X\",1,1,10,5";
        let records: Vec<_> = parse_states(&payload(&[ABC123, short, N512XY])).collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].callsign, "ABC123");
    }

    #[test]
    fn test_exactly_min_fields_accepted() {
        let rec = "\"a1b2c3\",\"MIN13   \",\"X\",7,7,10,5,300,false,1,2,3,null";
        let payload = format!("{}{}", HEADER, rec);
        let records: Vec<_> = parse_states(&payload).collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].altitude_m, 300.0);
    }

    #[test]
    fn test_empty_and_short_payloads() {
        assert_eq!(parse_states("").count(), 0);
        assert_eq!(parse_states("{\"time\":1}").count(), 0);
        assert_eq!(parse_states("{\"time\":1583171590,\"states\":null}").count(), 0);
    }

    #[test]
    fn test_callsign_trimming() {
        assert_eq!(parse_callsign("\"ABC123  \""), "ABC123");
        assert_eq!(parse_callsign("\"SWR4    \""), "SWR4");
        assert_eq!(parse_callsign("\"\""), UNKNOWN_CALLSIGN);
        assert_eq!(parse_callsign("\" \""), UNKNOWN_CALLSIGN);
        assert_eq!(parse_callsign("\"  \""), UNKNOWN_CALLSIGN);
        assert_eq!(parse_callsign("null"), UNKNOWN_CALLSIGN);
    }

    #[test]
    fn test_iterator_is_fused_after_stop() {
        let short = "\"a\",\"b\"";
        let text = payload(&[ABC123, short, N512XY]);
        let mut records = parse_states(&text);

        assert!(records.next().is_some());
        assert!(records.next().is_none());
        assert!(records.next().is_none());
    }
}
