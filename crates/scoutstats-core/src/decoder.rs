//! Registration identifier decoding.
//!
//! A registration identifier such as `111.01.001-1` encodes a unit's
//! position in the hierarchy. Two decodings are used:
//!
//! - [`decode`] splits on `.` and `-` and feeds the dropdown filters.
//! - [`decode_whole`] takes fixed-width prefixes of the raw identifier and
//!   feeds the treemap nesting.
//!
//! Neither ever fails: anything that cannot be derived becomes [`UNKNOWN`].

use tracing::debug;

use crate::models::{DecodedRecord, HierarchyKey, UnitRecord, UNKNOWN};

/// Prefix widths used by [`decode_whole`] for region, district, group and troop.
const WHOLE_REGION_WIDTH: usize = 2;
const WHOLE_DISTRICT_WIDTH: usize = 3;
const WHOLE_GROUP_WIDTH: usize = 6;
const WHOLE_TROOP_WIDTH: usize = 10;

/// Width of the region code taken from the first segment.
const REGION_WIDTH: usize = 2;

fn or_unknown(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn prefix(s: &str, chars: usize) -> &str {
    match s.char_indices().nth(chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Digits of a trailing `-<digits>` suffix.
fn patrol_suffix(id: &str) -> Option<&str> {
    let (_, suffix) = id.rsplit_once('-')?;
    if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
        Some(suffix)
    } else {
        None
    }
}

/// Decode a registration identifier by its `.`/`-` delimiters.
///
/// The troop code is only taken from a third segment that carries a patrol
/// suffix (`001-1` gives `001`); a bare `001` yields [`UNKNOWN`].
pub fn decode(registration_id: Option<&str>) -> HierarchyKey {
    let id = registration_id.unwrap_or("");
    if id.is_empty() {
        return HierarchyKey::unknown();
    }

    let segments: Vec<&str> = id.split('.').collect();
    let first = segments.first().copied();

    let troop = segments
        .get(2)
        .filter(|s| s.contains('-'))
        .and_then(|s| s.split('-').next());

    HierarchyKey {
        region_code: or_unknown(first.map(|s| prefix(s, REGION_WIDTH))),
        district_code: or_unknown(first),
        group_code: or_unknown(segments.get(1).copied()),
        troop_code: or_unknown(troop),
        patrol_code: or_unknown(patrol_suffix(id)),
    }
}

/// Decode a registration identifier by fixed-width prefixes.
///
/// Prefixes are clamped to the identifier length; the patrol code is the
/// identifier itself.
pub fn decode_whole(registration_id: Option<&str>) -> HierarchyKey {
    let id = registration_id.unwrap_or("");
    if id.is_empty() {
        return HierarchyKey::unknown();
    }

    HierarchyKey {
        region_code: prefix(id, WHOLE_REGION_WIDTH).to_string(),
        district_code: prefix(id, WHOLE_DISTRICT_WIDTH).to_string(),
        group_code: prefix(id, WHOLE_GROUP_WIDTH).to_string(),
        troop_code: prefix(id, WHOLE_TROOP_WIDTH).to_string(),
        patrol_code: id.to_string(),
    }
}

/// Attach both hierarchy keys to every record.
pub fn attach_hierarchy(records: Vec<UnitRecord>) -> Vec<DecodedRecord> {
    let decoded: Vec<DecodedRecord> = records.into_iter().map(DecodedRecord::new).collect();

    let undecodable = decoded.iter().filter(|r| r.key.is_unknown()).count();
    if undecodable > 0 {
        debug!(
            count = undecodable,
            total = decoded.len(),
            "Records without a usable registration identifier"
        );
    }

    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HierarchyLevel, MemberCounts, UnitType};

    fn assert_populated(key: &HierarchyKey) {
        for level in HierarchyLevel::ALL {
            assert!(!level.code_of(key).is_empty(), "{} empty in {:?}", level, key);
        }
    }

    // -------------------------------------------------------------------------
    // Delimiter decoding
    // -------------------------------------------------------------------------

    #[test]
    fn test_decode_full_identifier() {
        let key = decode(Some("11.02.003-1"));
        assert_eq!(key.region_code, "11");
        assert_eq!(key.district_code, "11");
        assert_eq!(key.group_code, "02");
        assert_eq!(key.troop_code, "003");
        assert_eq!(key.patrol_code, "1");
    }

    #[test]
    fn test_decode_troop_without_patrol_suffix_is_unknown() {
        let key = decode(Some("111.01.001"));
        assert_eq!(key.region_code, "11");
        assert_eq!(key.district_code, "111");
        assert_eq!(key.group_code, "01");
        assert_eq!(key.troop_code, UNKNOWN);
        assert_eq!(key.patrol_code, UNKNOWN);
    }

    #[test]
    fn test_decode_empty_and_missing() {
        assert_eq!(decode(Some("")), HierarchyKey::unknown());
        assert_eq!(decode(None), HierarchyKey::unknown());
    }

    #[test]
    fn test_decode_short_identifiers() {
        let key = decode(Some("1"));
        assert_eq!(key.region_code, "1");
        assert_eq!(key.district_code, "1");
        assert_eq!(key.group_code, UNKNOWN);

        let key = decode(Some("110"));
        assert_eq!(key.region_code, "11");
        assert_eq!(key.district_code, "110");
        assert_eq!(key.troop_code, UNKNOWN);
    }

    #[test]
    fn test_decode_patrol_suffix_must_be_trailing_digits() {
        assert_eq!(decode(Some("111.01.001-12")).patrol_code, "12");
        assert_eq!(decode(Some("111.01.001-1a")).patrol_code, UNKNOWN);
        assert_eq!(decode(Some("111.01.001-")).patrol_code, UNKNOWN);
        // Suffix is taken from the full identifier, not only the third segment
        assert_eq!(decode(Some("111-4")).patrol_code, "4");
    }

    #[test]
    fn test_decode_malformed_never_leaves_empty_fields() {
        for id in ["..", ".", "-", "..-", "a..b-", "111..-7", "ř.ž.č-1", "  "] {
            assert_populated(&decode(Some(id)));
        }
    }

    // -------------------------------------------------------------------------
    // Whole-code decoding
    // -------------------------------------------------------------------------

    #[test]
    fn test_decode_whole_prefixes() {
        let key = decode_whole(Some("1102003001"));
        assert_eq!(key.region_code, "11");
        assert_eq!(key.district_code, "110");
        assert_eq!(key.group_code, "110200");
        assert_eq!(key.troop_code, "1102003001");
        assert_eq!(key.patrol_code, "1102003001");
    }

    #[test]
    fn test_decode_whole_dotted_identifier() {
        let key = decode_whole(Some("111.01.001-1"));
        assert_eq!(key.region_code, "11");
        assert_eq!(key.district_code, "111");
        assert_eq!(key.group_code, "111.01");
        assert_eq!(key.troop_code, "111.01.001");
        assert_eq!(key.patrol_code, "111.01.001-1");
    }

    #[test]
    fn test_decode_whole_clamps_to_input_length() {
        let id = "1102";
        let key = decode_whole(Some(id));
        for level in HierarchyLevel::ALL {
            assert!(level.code_of(&key).len() <= id.len());
        }
        assert_eq!(key.district_code, "110");
        assert_eq!(key.group_code, "1102");
    }

    #[test]
    fn test_decode_whole_empty() {
        assert_eq!(decode_whole(None), HierarchyKey::unknown());
        assert_eq!(decode_whole(Some("")), HierarchyKey::unknown());
    }

    #[test]
    fn test_decode_whole_multibyte_characters() {
        let key = decode_whole(Some("žšč"));
        assert_eq!(key.region_code, "žš");
        assert_eq!(key.district_code, "žšč");
    }

    // -------------------------------------------------------------------------
    // Enrichment
    // -------------------------------------------------------------------------

    #[test]
    fn test_attach_hierarchy() {
        let records = vec![
            UnitRecord {
                registration_id: "111.01.001-2".to_string(),
                year: 2024,
                unit_name: "Sokoli".to_string(),
                unit_type: UnitType::Patrol,
                members: MemberCounts::default(),
            },
            UnitRecord {
                registration_id: String::new(),
                year: 2024,
                unit_name: "Bez čísla".to_string(),
                unit_type: UnitType::Special,
                members: MemberCounts::default(),
            },
        ];
        let decoded = attach_hierarchy(records);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].key.patrol_code, "2");
        assert_eq!(decoded[0].whole_key.troop_code, "111.01.001");
        assert!(decoded[1].key.is_unknown());
        assert!(decoded[1].whole_key.is_unknown());
    }
}
