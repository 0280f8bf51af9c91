//! Unit records as they come out of the membership exports.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::hierarchy::{HierarchyKey, HierarchyLevel};
use crate::decoder;

/// Classification of a record's own level in the organization.
///
/// The exports use Czech codes (`kraj`, `okres`, ...); English names are
/// accepted as well. Anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UnitType {
    Region,
    District,
    Group,
    Troop,
    Patrol,
    Headquarters,
    Special,
    Other(String),
}

impl UnitType {
    pub fn from_code(code: &str) -> Self {
        let trimmed = code.trim();
        match trimmed.to_lowercase().as_str() {
            "kraj" | "region" => UnitType::Region,
            "okres" | "district" => UnitType::District,
            "stredisko" | "group" => UnitType::Group,
            "oddil" | "troop" => UnitType::Troop,
            "druzina" | "patrol" => UnitType::Patrol,
            "ustredi" | "headquarters" => UnitType::Headquarters,
            "zvlastnijednotka" | "special" => UnitType::Special,
            _ => UnitType::Other(trimmed.to_string()),
        }
    }

    /// Code as written in the exports.
    pub fn code(&self) -> &str {
        match self {
            UnitType::Region => "kraj",
            UnitType::District => "okres",
            UnitType::Group => "stredisko",
            UnitType::Troop => "oddil",
            UnitType::Patrol => "druzina",
            UnitType::Headquarters => "ustredi",
            UnitType::Special => "zvlastniJednotka",
            UnitType::Other(code) => code,
        }
    }

    /// Hierarchy level of this unit type, if it sits in the hierarchy at all.
    pub fn level(&self) -> Option<HierarchyLevel> {
        match self {
            UnitType::Region => Some(HierarchyLevel::Region),
            UnitType::District => Some(HierarchyLevel::District),
            UnitType::Group => Some(HierarchyLevel::Group),
            UnitType::Troop => Some(HierarchyLevel::Troop),
            UnitType::Patrol => Some(HierarchyLevel::Patrol),
            UnitType::Headquarters | UnitType::Special | UnitType::Other(_) => None,
        }
    }

    /// National headquarters and special units are left out of the treemap.
    pub fn is_outside_hierarchy(&self) -> bool {
        matches!(self, UnitType::Headquarters | UnitType::Special)
    }
}

impl From<String> for UnitType {
    fn from(code: String) -> Self {
        UnitType::from_code(&code)
    }
}

impl From<UnitType> for String {
    fn from(unit_type: UnitType) -> Self {
        unit_type.code().to_string()
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Member counts for one unit in one year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCounts {
    pub total: u64,
    pub regular: u64,
    /// Counts by age bracket, keyed by the bracket label from the export header.
    #[serde(default)]
    pub by_age: BTreeMap<String, u64>,
}

/// Which member count a chart sums up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    #[default]
    Regular,
    Total,
}

impl Measure {
    pub fn of(&self, members: &MemberCounts) -> u64 {
        match self {
            Measure::Regular => members.regular,
            Measure::Total => members.total,
        }
    }
}

/// One organizational unit in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub registration_id: String,
    pub year: i32,
    pub unit_name: String,
    pub unit_type: UnitType,
    pub members: MemberCounts,
}

/// A unit record with both hierarchy keys attached.
///
/// `key` comes from delimiter decoding and feeds the dropdowns;
/// `whole_key` comes from fixed-width prefixes and feeds treemap nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedRecord {
    #[serde(flatten)]
    pub record: UnitRecord,
    pub key: HierarchyKey,
    pub whole_key: HierarchyKey,
}

impl DecodedRecord {
    pub fn new(record: UnitRecord) -> Self {
        let key = decoder::decode(Some(record.registration_id.as_str()));
        let whole_key = decoder::decode_whole(Some(record.registration_id.as_str()));
        Self {
            record,
            key,
            whole_key,
        }
    }

    pub fn level(&self) -> Option<HierarchyLevel> {
        self.record.unit_type.level()
    }
}

/// The merged, decoded record set. Read-only once built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSet {
    records: Vec<DecodedRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<UnitRecord>) -> Self {
        Self {
            records: decoder::attach_hierarchy(records),
        }
    }

    pub fn from_decoded(records: Vec<DecodedRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DecodedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecodedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(|r| r.record.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// New set with only the records that pass `keep`.
    pub fn filtered(&self, keep: impl Fn(&DecodedRecord) -> bool) -> RecordSet {
        RecordSet {
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a DecodedRecord;
    type IntoIter = std::slice::Iter<'a, DecodedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, year: i32, unit_type: UnitType) -> UnitRecord {
        UnitRecord {
            registration_id: id.to_string(),
            year,
            unit_name: format!("Unit {}", id),
            unit_type,
            members: MemberCounts::default(),
        }
    }

    #[test]
    fn test_unit_type_from_code() {
        assert_eq!(UnitType::from_code("okres"), UnitType::District);
        assert_eq!(UnitType::from_code("Oddil"), UnitType::Troop);
        assert_eq!(UnitType::from_code("zvlastniJednotka"), UnitType::Special);
        assert_eq!(
            UnitType::from_code(" klub "),
            UnitType::Other("klub".to_string())
        );
    }

    #[test]
    fn test_unit_type_serde_uses_export_codes() {
        let json = serde_json::to_string(&UnitType::Group).unwrap();
        assert_eq!(json, "\"stredisko\"");
        let parsed: UnitType = serde_json::from_str("\"ustredi\"").unwrap();
        assert_eq!(parsed, UnitType::Headquarters);
    }

    #[test]
    fn test_unit_type_level() {
        assert_eq!(UnitType::Patrol.level(), Some(HierarchyLevel::Patrol));
        assert_eq!(UnitType::Headquarters.level(), None);
        assert!(UnitType::Special.is_outside_hierarchy());
        assert!(!UnitType::Troop.is_outside_hierarchy());
    }

    #[test]
    fn test_measure_of() {
        let members = MemberCounts {
            total: 12,
            regular: 10,
            by_age: BTreeMap::new(),
        };
        assert_eq!(Measure::Regular.of(&members), 10);
        assert_eq!(Measure::Total.of(&members), 12);
    }

    #[test]
    fn test_record_set_decodes_and_lists_years() {
        let set = RecordSet::new(vec![
            record("111.01", 2024, UnitType::Group),
            record("111", 2022, UnitType::District),
            record("111.01", 2022, UnitType::Group),
        ]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.years(), vec![2022, 2024]);
        assert_eq!(set.records()[0].key.group_code, "01");
        assert_eq!(set.records()[0].whole_key.group_code, "111.01");
    }

    #[test]
    fn test_record_set_filtered() {
        let set = RecordSet::new(vec![
            record("111", 2022, UnitType::District),
            record("111.01", 2022, UnitType::Group),
        ]);
        let groups = set.filtered(|r| r.level() == Some(HierarchyLevel::Group));
        assert_eq!(groups.len(), 1);
        assert_eq!(set.len(), 2);
    }
}
