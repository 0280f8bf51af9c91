//! Dashboard query state: one selection per hierarchy level plus a year.

use serde::{Deserialize, Serialize};

use super::hierarchy::HierarchyLevel;

/// Code that means "no constraint at this level".
pub const ALL: &str = "ALL";

/// One entry of a dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct FilterOption {
    pub code: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }

    /// The synthetic entry every option list starts with.
    pub fn all() -> Self {
        Self::new(ALL, ALL)
    }

    pub fn is_all(&self) -> bool {
        self.code == ALL
    }
}

/// Selection for one level. Serialized as the bare code or `"ALL"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Code(String),
}

impl Selection {
    pub fn code(code: impl Into<String>) -> Self {
        let code = code.into();
        if code == ALL || code.is_empty() {
            Selection::All
        } else {
            Selection::Code(code)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn as_code(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Code(code) => Some(code),
        }
    }
}

impl From<String> for Selection {
    fn from(code: String) -> Self {
        Selection::code(code)
    }
}

impl From<Selection> for String {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::All => ALL.to_string(),
            Selection::Code(code) => code,
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::All => write!(f, "{}", ALL),
            Selection::Code(code) => write!(f, "{}", code),
        }
    }
}

/// The four selectable slots of the dashboard plus the selected year.
///
/// Patrols have no slot; they are only ever shown as options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub region: Selection,
    pub district: Selection,
    pub group: Selection,
    pub troop: Selection,
    #[serde(default)]
    pub year: Option<i32>,
}

impl SelectionState {
    /// Levels that have a slot, outermost first.
    pub const SLOTS: [HierarchyLevel; 4] = [
        HierarchyLevel::Region,
        HierarchyLevel::District,
        HierarchyLevel::Group,
        HierarchyLevel::Troop,
    ];

    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn slot(&self, level: HierarchyLevel) -> Option<&Selection> {
        match level {
            HierarchyLevel::Region => Some(&self.region),
            HierarchyLevel::District => Some(&self.district),
            HierarchyLevel::Group => Some(&self.group),
            HierarchyLevel::Troop => Some(&self.troop),
            HierarchyLevel::Patrol => None,
        }
    }

    pub fn slot_mut(&mut self, level: HierarchyLevel) -> Option<&mut Selection> {
        match level {
            HierarchyLevel::Region => Some(&mut self.region),
            HierarchyLevel::District => Some(&mut self.district),
            HierarchyLevel::Group => Some(&mut self.group),
            HierarchyLevel::Troop => Some(&mut self.troop),
            HierarchyLevel::Patrol => None,
        }
    }

    /// Builder-style slot update. Setting the patrol level is a no-op.
    pub fn with(mut self, level: HierarchyLevel, selection: Selection) -> Self {
        if let Some(slot) = self.slot_mut(level) {
            *slot = selection;
        }
        self
    }

    /// Reset every slot below `level` to `ALL`.
    pub fn clear_below(&mut self, level: HierarchyLevel) {
        for slot_level in Self::SLOTS {
            if slot_level > level {
                if let Some(slot) = self.slot_mut(slot_level) {
                    *slot = Selection::All;
                }
            }
        }
    }

    /// Active (non-`ALL`) slots, outermost first.
    pub fn active(&self) -> Vec<(HierarchyLevel, &str)> {
        Self::SLOTS
            .iter()
            .filter_map(|&level| {
                self.slot(level)
                    .and_then(|s| s.as_code())
                    .map(|code| (level, code))
            })
            .collect()
    }

    /// The deepest active slot.
    pub fn most_specific(&self) -> Option<(HierarchyLevel, &str)> {
        self.active().into_iter().last()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.active().is_empty()
    }
}

/// A change coming from one of the dashboard controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionEvent {
    /// The year slider moved.
    YearChanged { year: i32 },
    /// A level's own dropdown changed: descendants are cleared.
    Selected { level: HierarchyLevel, code: String },
    /// A unit was picked some other way (e.g. clicking into a chart):
    /// ancestors are re-derived from the code.
    Derived { level: HierarchyLevel, code: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_code_maps_all() {
        assert_eq!(Selection::code("ALL"), Selection::All);
        assert_eq!(Selection::code(""), Selection::All);
        assert_eq!(Selection::code("111"), Selection::Code("111".to_string()));
    }

    #[test]
    fn test_selection_serializes_as_plain_string() {
        let state = SelectionState::default().with(HierarchyLevel::District, Selection::code("111"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["region"], "ALL");
        assert_eq!(json["district"], "111");

        let back: SelectionState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_clear_below() {
        let mut state = SelectionState::default()
            .with(HierarchyLevel::Region, Selection::code("110"))
            .with(HierarchyLevel::District, Selection::code("111"))
            .with(HierarchyLevel::Group, Selection::code("111.01"));
        state.clear_below(HierarchyLevel::District);
        assert_eq!(state.district, Selection::code("111"));
        assert!(state.group.is_all());
        assert!(state.troop.is_all());
    }

    #[test]
    fn test_most_specific() {
        let state = SelectionState::default();
        assert_eq!(state.most_specific(), None);
        assert!(state.is_unconstrained());

        let state = state
            .with(HierarchyLevel::Region, Selection::code("110"))
            .with(HierarchyLevel::Group, Selection::code("111.01"));
        assert_eq!(state.most_specific(), Some((HierarchyLevel::Group, "111.01")));
    }

    #[test]
    fn test_patrol_has_no_slot() {
        let state = SelectionState::default().with(HierarchyLevel::Patrol, Selection::code("1"));
        assert!(state.slot(HierarchyLevel::Patrol).is_none());
        assert!(state.is_unconstrained());
    }

    #[test]
    fn test_event_serde_shape() {
        let event: SelectionEvent =
            serde_json::from_str(r#"{"kind":"selected","level":"district","code":"111"}"#).unwrap();
        assert_eq!(
            event,
            SelectionEvent::Selected {
                level: HierarchyLevel::District,
                code: "111".to_string()
            }
        );
    }
}
