use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::TableCache;
use crate::data::filter::{init_selection, Dimension, FilterSelection};
use crate::data::model::UserTable;
use crate::data::view::DashboardView;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded tables, keyed by source version.
    pub cache: TableCache,

    /// Current source file (None until a file is loaded).
    pub source: Option<PathBuf>,

    /// The loaded table, shared read-only with the cache.
    pub table: Option<Arc<UserTable>>,

    /// Per-dimension filter selections.
    pub selection: FilterSelection,

    /// Derived datasets for the current selection (cached).
    pub view: Option<DashboardView>,

    /// Colours for the device-type dimension.
    pub device_colors: Option<ColorMap>,

    pub config: DashboardConfig,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn with_config(config: DashboardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Load `path` through the cache and reset the selection to everything.
    pub fn load(&mut self, path: &Path, now: NaiveDateTime) -> Result<(), LoadError> {
        match self.cache.get_or_load(path) {
            Ok(table) => {
                self.set_table(path, table, now);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Drop the cached copy of the current source and load it again,
    /// keeping the selection.
    pub fn reload(&mut self, now: NaiveDateTime) -> Result<(), LoadError> {
        let Some(path) = self.source.clone() else {
            return Ok(());
        };
        self.cache.invalidate(&path);
        let selection = self.selection.clone();
        self.load(&path, now)?;
        self.selection = selection;
        self.recompute(now);
        Ok(())
    }

    fn set_table(&mut self, path: &Path, table: Arc<UserTable>, now: NaiveDateTime) {
        self.selection = init_selection(&table);
        self.device_colors = Some(ColorMap::new(&table.device_types));
        self.source = Some(path.to_path_buf());
        self.table = Some(table);
        self.status_message = None;
        self.recompute(now);
    }

    /// Recompute the derived view after a selection change.
    pub fn recompute(&mut self, now: NaiveDateTime) {
        self.view = self
            .table
            .as_deref()
            .map(|table| DashboardView::compute(table, &self.selection, now, &self.config));
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle(&mut self, dim: Dimension, value: &str, now: NaiveDateTime) {
        let selected = self.selection.values_mut(dim);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.recompute(now);
    }

    /// Select every observed value of a dimension.
    pub fn select_all(&mut self, dim: Dimension, now: NaiveDateTime) {
        if let Some(table) = &self.table {
            *self.selection.values_mut(dim) = dim.observed(table).clone();
            self.recompute(now);
        }
    }

    /// Deselect every value of a dimension.
    pub fn select_none(&mut self, dim: Dimension, now: NaiveDateTime) {
        self.selection.values_mut(dim).clear();
        self.recompute(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn write_sample(dir: &Path) -> PathBuf {
        let path = dir.join("users.csv");
        std::fs::write(
            &path,
            "Username,Device_Type,Preferred_Game_Mode,Total_Revenue_USD,Total_Play_Sessions,Signup_Date,Last_Login\n\
             ava,Mobile,Solo,100,3,2024-01-01,2024-06-01\n\
             ben,PC,Co-op,50,20,2024-01-02,2024-06-29\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn loading_selects_everything() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(dir.path());
        let mut state = AppState::default();
        state.load(&path, now()).unwrap();

        let view = state.view.as_ref().unwrap();
        assert_eq!(view.metrics.total_users, 2);
        assert_eq!(state.selection.devices.len(), 2);
        assert!(state.device_colors.is_some());
    }

    #[test]
    fn toggling_recomputes_the_view() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(dir.path());
        let mut state = AppState::default();
        state.load(&path, now()).unwrap();

        state.toggle(Dimension::DeviceType, "PC", now());
        assert_eq!(state.view.as_ref().unwrap().metrics.total_users, 1);

        state.select_none(Dimension::GameMode, now());
        assert_eq!(state.view.as_ref().unwrap().metrics.total_users, 0);

        state.select_all(Dimension::GameMode, now());
        state.toggle(Dimension::DeviceType, "PC", now());
        assert_eq!(state.view.as_ref().unwrap().metrics.total_users, 2);
    }

    #[test]
    fn reload_keeps_the_selection() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(dir.path());
        let mut state = AppState::default();
        state.load(&path, now()).unwrap();
        state.toggle(Dimension::DeviceType, "Mobile", now());

        state.reload(now()).unwrap();
        assert!(!state.selection.devices.contains("Mobile"));
        assert_eq!(state.view.as_ref().unwrap().metrics.total_users, 1);
    }

    #[test]
    fn load_failure_sets_status() {
        let mut state = AppState::default();
        assert!(state.load(Path::new("/tmp/does-not-exist-dashboard/users.csv"), now()).is_err());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
        assert!(state.view.is_none());
    }
}
