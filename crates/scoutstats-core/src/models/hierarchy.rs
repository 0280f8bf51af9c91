//! Hierarchy levels and the decoded per-record hierarchy key.

use serde::{Deserialize, Serialize};

use super::record::UnitType;

/// Placeholder for any hierarchy level that cannot be derived.
pub const UNKNOWN: &str = "Unknown";

/// The five nested levels of the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyLevel {
    Region,
    District,
    Group,
    Troop,
    Patrol,
}

impl HierarchyLevel {
    /// All levels, outermost first.
    pub const ALL: [HierarchyLevel; 5] = [
        HierarchyLevel::Region,
        HierarchyLevel::District,
        HierarchyLevel::Group,
        HierarchyLevel::Troop,
        HierarchyLevel::Patrol,
    ];

    pub fn parent(&self) -> Option<HierarchyLevel> {
        match self {
            HierarchyLevel::Region => None,
            HierarchyLevel::District => Some(HierarchyLevel::Region),
            HierarchyLevel::Group => Some(HierarchyLevel::District),
            HierarchyLevel::Troop => Some(HierarchyLevel::Group),
            HierarchyLevel::Patrol => Some(HierarchyLevel::Troop),
        }
    }

    pub fn child(&self) -> Option<HierarchyLevel> {
        match self {
            HierarchyLevel::Region => Some(HierarchyLevel::District),
            HierarchyLevel::District => Some(HierarchyLevel::Group),
            HierarchyLevel::Group => Some(HierarchyLevel::Troop),
            HierarchyLevel::Troop => Some(HierarchyLevel::Patrol),
            HierarchyLevel::Patrol => None,
        }
    }

    /// Levels strictly above this one, outermost first.
    pub fn ancestors(&self) -> Vec<HierarchyLevel> {
        HierarchyLevel::ALL
            .iter()
            .copied()
            .take_while(|level| level != self)
            .collect()
    }

    /// The unit type whose records populate this level's options.
    pub fn unit_type(&self) -> UnitType {
        match self {
            HierarchyLevel::Region => UnitType::Region,
            HierarchyLevel::District => UnitType::District,
            HierarchyLevel::Group => UnitType::Group,
            HierarchyLevel::Troop => UnitType::Troop,
            HierarchyLevel::Patrol => UnitType::Patrol,
        }
    }

    /// Read this level's code out of a decoded key.
    pub fn code_of<'a>(&self, key: &'a HierarchyKey) -> &'a str {
        match self {
            HierarchyLevel::Region => &key.region_code,
            HierarchyLevel::District => &key.district_code,
            HierarchyLevel::Group => &key.group_code,
            HierarchyLevel::Troop => &key.troop_code,
            HierarchyLevel::Patrol => &key.patrol_code,
        }
    }

    pub fn parse(s: &str) -> Option<HierarchyLevel> {
        match s.trim().to_lowercase().as_str() {
            "region" | "kraj" => Some(HierarchyLevel::Region),
            "district" | "okres" => Some(HierarchyLevel::District),
            "group" | "stredisko" => Some(HierarchyLevel::Group),
            "troop" | "oddil" => Some(HierarchyLevel::Troop),
            "patrol" | "druzina" => Some(HierarchyLevel::Patrol),
            _ => None,
        }
    }
}

impl std::fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HierarchyLevel::Region => write!(f, "Region"),
            HierarchyLevel::District => write!(f, "District"),
            HierarchyLevel::Group => write!(f, "Group"),
            HierarchyLevel::Troop => write!(f, "Troop"),
            HierarchyLevel::Patrol => write!(f, "Patrol"),
        }
    }
}

/// Hierarchy codes derived from a registration identifier.
///
/// Every field is always populated; levels that cannot be derived hold
/// [`UNKNOWN`] so equality filters never have to deal with missing values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct HierarchyKey {
    pub region_code: String,
    pub district_code: String,
    pub group_code: String,
    pub troop_code: String,
    pub patrol_code: String,
}

impl HierarchyKey {
    /// Key with every level set to [`UNKNOWN`].
    pub fn unknown() -> Self {
        Self {
            region_code: UNKNOWN.to_string(),
            district_code: UNKNOWN.to_string(),
            group_code: UNKNOWN.to_string(),
            troop_code: UNKNOWN.to_string(),
            patrol_code: UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        HierarchyLevel::ALL
            .iter()
            .all(|level| level.code_of(self) == UNKNOWN)
    }

    /// Codes outermost first, for building nested paths.
    pub fn path(&self) -> [&str; 5] {
        [
            self.region_code.as_str(),
            self.district_code.as_str(),
            self.group_code.as_str(),
            self.troop_code.as_str(),
            self.patrol_code.as_str(),
        ]
    }
}

impl Default for HierarchyKey {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parent_child() {
        assert_eq!(HierarchyLevel::Region.parent(), None);
        assert_eq!(HierarchyLevel::Troop.parent(), Some(HierarchyLevel::Group));
        assert_eq!(HierarchyLevel::Group.child(), Some(HierarchyLevel::Troop));
        assert_eq!(HierarchyLevel::Patrol.child(), None);
    }

    #[test]
    fn test_level_ancestors() {
        assert!(HierarchyLevel::Region.ancestors().is_empty());
        assert_eq!(
            HierarchyLevel::Troop.ancestors(),
            vec![HierarchyLevel::Region, HierarchyLevel::District, HierarchyLevel::Group]
        );
    }

    #[test]
    fn test_level_parse_accepts_export_names() {
        assert_eq!(HierarchyLevel::parse("okres"), Some(HierarchyLevel::District));
        assert_eq!(HierarchyLevel::parse(" Troop "), Some(HierarchyLevel::Troop));
        assert_eq!(HierarchyLevel::parse("county"), None);
    }

    #[test]
    fn test_unknown_key() {
        let key = HierarchyKey::unknown();
        assert!(key.is_unknown());
        assert_eq!(key.path(), [UNKNOWN; 5]);
    }
}
