// Managed application state and the main-thread scheduler.
// Every registry mutation runs on the main thread through the mailbox.
// Webview callbacks can fire synchronously while a mutation is building a
// webview, so they only ever queue work and never lock the registry.

use std::sync::atomic::AtomicBool;
use std::sync::{Mutex, RwLock};

use tauri::{AppHandle, Manager};

use crate::host::{ToolbarDisplay, WebviewFactory};
use crate::menus;
use crate::modules::chrome::UiState;
use crate::modules::mailbox::Mailbox;
use crate::modules::tabs::TabRegistry;
use crate::settings::Settings;

pub type Shell = TabRegistry<WebviewFactory, ToolbarDisplay>;

pub struct AppState {
    pub tabs: Mailbox<Shell>,
    pub ui: Mutex<UiState>,
    pub settings: RwLock<Settings>,
    /// Set before an intentional quit/restart so window close is not turned into hide.
    pub quitting: AtomicBool,
}

impl AppState {
    pub fn new(tabs: Shell, ui: UiState, settings: Settings) -> Self {
        Self {
            tabs: Mailbox::new(tabs),
            ui: Mutex::new(ui),
            settings: RwLock::new(settings),
            quitting: AtomicBool::new(false),
        }
    }
}

/// Run `f` against the registry on the main thread, then refresh chrome that
/// depends on whether a tab is active.
///
/// When called on the main thread this runs inline, unless another job is
/// already running, in which case `f` runs right after that job returns.
pub fn schedule<F>(app: &AppHandle, f: F)
where
    F: FnOnce(&mut Shell) + Send + 'static,
{
    let handle = app.clone();
    let result = app.run_on_main_thread(move || {
        let state = handle.state::<AppState>();
        let refresh = handle.clone();
        state.tabs.post(move |tabs| {
            f(tabs);
            let has_active_tab = tabs.active_id().is_some();
            menus::update_ui(&refresh, |ui| ui.has_active_tab = has_active_tab);
        });
    });
    if let Err(e) = result {
        log::error!("[State] Failed to schedule on main thread: {}", e);
    }
}
