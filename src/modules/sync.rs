// Synchronization channel between the registry and the tab strip.
// Forward: full state snapshot after every visible mutation.
// Back: user commands routed straight into the registry.

use serde::{Deserialize, Serialize};

use crate::modules::surface::TabId;

/// Event name the tab strip listens on.
pub const TABS_UPDATED_EVENT: &str = "tabs-updated";

/// Lightweight projection of a tab record. Never exposes the surface.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TabSummary {
    pub id: TabId,
    pub title: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TabsPayload {
    pub tabs: Vec<TabSummary>,
    /// `None` only while the registry is transiently empty.
    pub active_id: Option<TabId>,
}

/// Receiver of state snapshots. Implementations replace their whole view
/// from each payload, so pushing the same payload twice is harmless.
pub trait DisplaySink {
    fn push(&self, payload: &TabsPayload);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Everything the tab strip, keyboard shortcuts, menu and tray can ask of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    NewTab,
    CloseTab(TabId),
    /// Close whichever tab is active ("Close Tab" / "Kill Active Tab").
    CloseActive,
    ActivateTab(TabId),
    Cycle(Direction),
    SearchTabs(String),
    FindInPage(String),
    StopFindInPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Done,
    Matches(Vec<TabSummary>),
}
