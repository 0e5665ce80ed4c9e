// Window chrome model - pure logic, no Tauri imports.
// Menus and the tray are rebuilt from `UiState` whenever it changes;
// main.rs renders these descriptions into native menus.

use crate::modules::sync::{Direction, ShellCommand};

pub mod ids {
    pub const NEW_TAB: &str = "new_tab";
    pub const CLOSE_TAB: &str = "close_tab";
    pub const KILL_TAB: &str = "kill_tab";
    pub const NEXT_TAB: &str = "next_tab";
    pub const PREV_TAB: &str = "prev_tab";
    pub const FIND: &str = "find_in_page";
    pub const SEARCH_TABS: &str = "search_tabs";
    pub const RESTART: &str = "restart";
    pub const ALWAYS_ON_TOP: &str = "always_on_top";
    pub const TOGGLE_WINDOW: &str = "toggle_window";
    pub const FULLSCREEN: &str = "fullscreen";
    pub const QUIT: &str = "quit";
}

/// Everything menus and tray depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    pub always_on_top: bool,
    pub window_visible: bool,
    pub has_active_tab: bool,
}

impl UiState {
    /// Record the window's visibility as the OS reports it.
    /// Returns whether the tray needs rebuilding.
    pub fn observe_visibility(&mut self, visible: bool) -> bool {
        let changed = self.window_visible != visible;
        self.window_visible = visible;
        changed
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            always_on_top: false,
            window_visible: true,
            has_active_tab: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predefined {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item {
        id: &'static str,
        label: &'static str,
        accelerator: Option<&'static str>,
        enabled: bool,
    },
    Check {
        id: &'static str,
        label: &'static str,
        checked: bool,
    },
    Predefined(Predefined),
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submenu {
    pub label: &'static str,
    pub entries: Vec<MenuEntry>,
}

/// What a menu, tray or accelerator click should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChromeAction {
    Tabs(ShellCommand),
    OpenFind,
    OpenTabSearch,
    ToggleAlwaysOnTop,
    ToggleWindow,
    ToggleFullscreen,
    Restart,
    Quit,
}

fn item(id: &'static str, label: &'static str, accelerator: Option<&'static str>) -> MenuEntry {
    MenuEntry::Item {
        id,
        label,
        accelerator,
        enabled: true,
    }
}

fn always_on_top(state: &UiState) -> MenuEntry {
    MenuEntry::Check {
        id: ids::ALWAYS_ON_TOP,
        label: "Always on Top",
        checked: state.always_on_top,
    }
}

pub fn app_menu(state: &UiState) -> Vec<Submenu> {
    let file = Submenu {
        label: "File",
        entries: vec![
            item(ids::NEW_TAB, "New Tab", Some("CmdOrCtrl+T")),
            item(ids::CLOSE_TAB, "Close Tab", Some("CmdOrCtrl+W")),
            item(ids::KILL_TAB, "Kill Active Tab", Some("Shift+CmdOrCtrl+W")),
            MenuEntry::Separator,
            item(ids::NEXT_TAB, "Next Tab", Some("Ctrl+Tab")),
            item(ids::PREV_TAB, "Previous Tab", Some("Ctrl+Shift+Tab")),
            MenuEntry::Separator,
            item(ids::RESTART, "Restart App", Some("CmdOrCtrl+R")),
            MenuEntry::Separator,
            always_on_top(state),
            MenuEntry::Separator,
            item(ids::QUIT, "Quit", Some("CmdOrCtrl+Q")),
        ],
    };

    let edit = Submenu {
        label: "Edit",
        entries: vec![
            MenuEntry::Predefined(Predefined::Undo),
            MenuEntry::Predefined(Predefined::Redo),
            MenuEntry::Separator,
            MenuEntry::Predefined(Predefined::Cut),
            MenuEntry::Predefined(Predefined::Copy),
            MenuEntry::Predefined(Predefined::Paste),
            MenuEntry::Predefined(Predefined::SelectAll),
            MenuEntry::Separator,
            item(ids::FIND, "Find in Page", Some("CmdOrCtrl+F")),
            item(ids::SEARCH_TABS, "Search Tabs", Some("Ctrl+Shift+A")),
        ],
    };

    let view = Submenu {
        label: "View",
        entries: vec![item(ids::FULLSCREEN, "Toggle Full Screen", Some("F11"))],
    };

    vec![file, edit, view]
}

pub fn tray_menu(state: &UiState) -> Vec<MenuEntry> {
    let visibility = if state.window_visible {
        "Hide Window"
    } else {
        "Show Window"
    };
    vec![
        item(ids::TOGGLE_WINDOW, visibility, None),
        MenuEntry::Separator,
        always_on_top(state),
        MenuEntry::Item {
            id: ids::KILL_TAB,
            label: "Kill Active Tab",
            accelerator: None,
            enabled: state.has_active_tab,
        },
        item(ids::RESTART, "Restart App", None),
        MenuEntry::Separator,
        item(ids::QUIT, "Quit", None),
    ]
}

pub fn action_for(id: &str) -> Option<ChromeAction> {
    let action = match id {
        ids::NEW_TAB => ChromeAction::Tabs(ShellCommand::NewTab),
        ids::CLOSE_TAB | ids::KILL_TAB => ChromeAction::Tabs(ShellCommand::CloseActive),
        ids::NEXT_TAB => ChromeAction::Tabs(ShellCommand::Cycle(Direction::Forward)),
        ids::PREV_TAB => ChromeAction::Tabs(ShellCommand::Cycle(Direction::Backward)),
        ids::FIND => ChromeAction::OpenFind,
        ids::SEARCH_TABS => ChromeAction::OpenTabSearch,
        ids::RESTART => ChromeAction::Restart,
        ids::ALWAYS_ON_TOP => ChromeAction::ToggleAlwaysOnTop,
        ids::TOGGLE_WINDOW => ChromeAction::ToggleWindow,
        ids::FULLSCREEN => ChromeAction::ToggleFullscreen,
        ids::QUIT => ChromeAction::Quit,
        _ => return None,
    };
    Some(action)
}
