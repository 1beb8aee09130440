//! View state (Model in TEA pattern)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::settings_sync::SettingsSynchronizer;

/// Number of tabs on the start page
pub const DEFAULT_TAB_COUNT: usize = 4;

/// Which variant of the start page is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewFlow {
    /// Regular page with the release notes menu open
    #[default]
    Changelog,
    /// Shown when no Python interpreter is available; menu starts collapsed
    NoPython,
}

impl ViewFlow {
    pub fn initial_menu_expanded(&self) -> bool {
        matches!(self, ViewFlow::Changelog)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewFlow::Changelog => "changelog",
            ViewFlow::NoPython => "no-python",
        }
    }
}

impl fmt::Display for ViewFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewFlow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "changelog" => Ok(ViewFlow::Changelog),
            "no-python" => Ok(ViewFlow::NoPython),
            other => Err(format!(
                "unknown flow '{}' (expected changelog or no-python)",
                other
            )),
        }
    }
}

/// Lifecycle of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPhase {
    /// Created, not yet announced to the host
    #[default]
    Mounting,
    /// Announced; handling messages and user input
    Ready,
    /// Torn down; everything is ignored
    Unmounted,
}

/// Complete view state
#[derive(Debug, Clone)]
pub struct ViewState {
    pub flow: ViewFlow,
    pub phase: ViewPhase,
    pub menu_expanded: bool,
    pub active_tab: usize,
    tab_count: usize,
    pub settings: SettingsSynchronizer,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewFlow::default(), DEFAULT_TAB_COUNT)
    }
}

impl ViewState {
    /// Initial state for `flow`. A `tab_count` of zero is raised to one.
    pub fn new(flow: ViewFlow, tab_count: usize) -> Self {
        Self {
            flow,
            phase: ViewPhase::Mounting,
            menu_expanded: flow.initial_menu_expanded(),
            active_tab: 0,
            tab_count: tab_count.max(1),
            settings: SettingsSynchronizer::new(),
        }
    }

    pub fn tab_count(&self) -> usize {
        self.tab_count
    }

    pub fn is_ready(&self) -> bool {
        self.phase == ViewPhase::Ready
    }

    pub fn is_unmounted(&self) -> bool {
        self.phase == ViewPhase::Unmounted
    }

    pub fn toggle_menu(&mut self) {
        self.menu_expanded = !self.menu_expanded;
    }

    /// Returns false, leaving the state alone, if `index` is out of range
    pub fn select_tab(&mut self, index: usize) -> bool {
        if index >= self.tab_count {
            return false;
        }
        self.active_tab = index;
        true
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let settings = self.settings.state();
        ViewSnapshot {
            menu_expanded: self.menu_expanded,
            active_tab: self.active_tab,
            tab_count: self.tab_count,
            show_again_setting: settings.local,
            checkbox_checked: self.settings.checkbox_checked(),
            setting_confirmed: !settings.is_stale(),
            phase: self.phase,
        }
    }
}

/// Everything a renderer needs, in serializable form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    pub menu_expanded: bool,
    pub active_tab: usize,
    pub tab_count: usize,
    pub show_again_setting: bool,
    pub checkbox_checked: bool,
    /// False while the shown setting is still waiting on the host
    pub setting_confirmed: bool,
    pub phase: ViewPhase,
}
