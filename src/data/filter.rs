use std::collections::BTreeSet;

use super::model::{UserRecord, UserTable};

// ---------------------------------------------------------------------------
// Filter predicate: which categorical values are selected per dimension
// ---------------------------------------------------------------------------

/// The two categorical dimensions the dashboard filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    DeviceType,
    GameMode,
}

impl Dimension {
    pub fn label(self) -> &'static str {
        match self {
            Dimension::DeviceType => "Device Type",
            Dimension::GameMode => "Preferred Game Mode",
        }
    }

    /// Every value of this dimension observed in `table`.
    pub fn observed(self, table: &UserTable) -> &BTreeSet<String> {
        match self {
            Dimension::DeviceType => &table.device_types,
            Dimension::GameMode => &table.game_modes,
        }
    }

    fn value_of(self, record: &UserRecord) -> &str {
        match self {
            Dimension::DeviceType => &record.device_type,
            Dimension::GameMode => &record.game_mode,
        }
    }
}

/// Selected values per dimension.
///
/// An empty set means nothing is selected for that dimension, so no row
/// passes. Values need not have been observed in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub devices: BTreeSet<String>,
    pub game_modes: BTreeSet<String>,
}

impl FilterSelection {
    pub fn new(
        devices: impl IntoIterator<Item = impl Into<String>>,
        game_modes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        FilterSelection {
            devices: devices.into_iter().map(Into::into).collect(),
            game_modes: game_modes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn values(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::DeviceType => &self.devices,
            Dimension::GameMode => &self.game_modes,
        }
    }

    pub fn values_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        match dim {
            Dimension::DeviceType => &mut self.devices,
            Dimension::GameMode => &mut self.game_modes,
        }
    }

    /// Whether `record` passes both dimensions.
    pub fn matches(&self, record: &UserRecord) -> bool {
        [Dimension::DeviceType, Dimension::GameMode]
            .into_iter()
            .all(|dim| self.values(dim).contains(dim.value_of(record)))
    }
}

/// Initialise a [`FilterSelection`] with all values selected (i.e., show everything).
pub fn init_selection(table: &UserTable) -> FilterSelection {
    FilterSelection {
        devices: table.device_types.clone(),
        game_modes: table.game_modes.clone(),
    }
}

/// Return the rows of `table` that pass `selection`, in their original order.
pub fn apply(table: &UserTable, selection: &FilterSelection) -> UserTable {
    let rows = table
        .records()
        .iter()
        .filter(|record| selection.matches(record))
        .cloned()
        .collect();
    UserTable::from_records(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn user(name: &str, device: &str, mode: &str) -> UserRecord {
        UserRecord::from_fields(|c| match c {
            Column::Username => Some(name),
            Column::DeviceType => Some(device),
            Column::GameMode => Some(mode),
            _ => None,
        })
    }

    fn sample_table() -> UserTable {
        UserTable::from_records(vec![
            user("ava", "Mobile", "Solo"),
            user("ben", "PC", "Co-op"),
            user("cy", "Mobile", "Co-op"),
            user("di", "Console", "Solo"),
        ])
    }

    fn names(table: &UserTable) -> Vec<&str> {
        table.records().iter().map(|r| r.username.as_str()).collect()
    }

    #[test]
    fn default_selection_keeps_everything() {
        let table = sample_table();
        let filtered = apply(&table, &init_selection(&table));
        assert_eq!(filtered, table);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let table = sample_table();
        let selection = FilterSelection::new(["Mobile"], ["Co-op"]);
        assert_eq!(names(&apply(&table, &selection)), vec!["cy"]);
    }

    #[test]
    fn empty_dimension_matches_nothing() {
        let table = sample_table();
        let mut selection = init_selection(&table);
        selection.values_mut(Dimension::GameMode).clear();

        let filtered = apply(&table, &selection);
        assert!(filtered.is_empty());
        assert!(filtered.device_types.is_empty());
    }

    #[test]
    fn unobserved_values_are_allowed() {
        let table = sample_table();
        let selection = FilterSelection::new(["Mobile", "Fridge"], ["Solo", "Raid"]);
        assert_eq!(names(&apply(&table, &selection)), vec!["ava"]);
    }

    #[test]
    fn result_is_an_ordered_subset_satisfying_the_predicate() {
        let table = sample_table();
        let selections = [
            FilterSelection::new(["Mobile", "PC"], ["Solo", "Co-op"]),
            FilterSelection::new(["Console"], ["Co-op"]),
            FilterSelection::new(["PC", "Console"], ["Solo"]),
            FilterSelection::default(),
        ];
        for selection in &selections {
            let filtered = apply(&table, selection);
            assert!(filtered.len() <= table.len());
            assert!(filtered.records().iter().all(|r| selection.matches(r)));

            let mut source = table.records().iter();
            for row in filtered.records() {
                assert!(source.any(|r| r == row), "rows must keep source order");
            }
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = sample_table();
        let selection = FilterSelection::new(["Mobile", "Console"], ["Solo"]);
        assert_eq!(apply(&table, &selection), apply(&table, &selection));
    }
}
