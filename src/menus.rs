// Native menu, tray and window actions.
// Menus are never edited in place: every UiState change rebuilds them
// from the descriptions in modules::chrome.

use std::sync::atomic::Ordering;

use tauri::image::Image;
use tauri::menu::{
    CheckMenuItemBuilder, IsMenuItem, Menu, MenuBuilder, MenuItemBuilder, PredefinedMenuItem,
    SubmenuBuilder,
};
use tauri::tray::{TrayIconBuilder, TrayIconEvent};
use tauri::{AppHandle, Emitter, Manager, Wry};

use crate::host::MAIN_WINDOW;
use crate::modules::chrome::{self, ChromeAction, MenuEntry, Predefined, UiState};
use crate::state::{schedule, AppState};

pub const TRAY_ID: &str = "main";
pub const OPEN_FIND_EVENT: &str = "open-find";
pub const OPEN_TAB_SEARCH_EVENT: &str = "open-tab-search";

fn predefined(app: &AppHandle, item: Predefined) -> tauri::Result<PredefinedMenuItem<Wry>> {
    match item {
        Predefined::Undo => PredefinedMenuItem::undo(app, None),
        Predefined::Redo => PredefinedMenuItem::redo(app, None),
        Predefined::Cut => PredefinedMenuItem::cut(app, None),
        Predefined::Copy => PredefinedMenuItem::copy(app, None),
        Predefined::Paste => PredefinedMenuItem::paste(app, None),
        Predefined::SelectAll => PredefinedMenuItem::select_all(app, None),
    }
}

fn render(app: &AppHandle, entries: &[MenuEntry]) -> tauri::Result<Vec<Box<dyn IsMenuItem<Wry>>>> {
    let mut items: Vec<Box<dyn IsMenuItem<Wry>>> = Vec::with_capacity(entries.len());
    for entry in entries {
        let item: Box<dyn IsMenuItem<Wry>> = match entry {
            MenuEntry::Item {
                id,
                label,
                accelerator,
                enabled,
            } => {
                let mut builder = MenuItemBuilder::with_id(*id, *label).enabled(*enabled);
                if let Some(accelerator) = accelerator {
                    builder = builder.accelerator(*accelerator);
                }
                Box::new(builder.build(app)?)
            }
            MenuEntry::Check { id, label, checked } => Box::new(
                CheckMenuItemBuilder::with_id(*id, *label)
                    .checked(*checked)
                    .build(app)?,
            ),
            MenuEntry::Predefined(item) => Box::new(predefined(app, *item)?),
            MenuEntry::Separator => Box::new(PredefinedMenuItem::separator(app)?),
        };
        items.push(item);
    }
    Ok(items)
}

fn as_refs(items: &[Box<dyn IsMenuItem<Wry>>]) -> Vec<&dyn IsMenuItem<Wry>> {
    items.iter().map(|item| item.as_ref()).collect()
}

pub fn build_app_menu(app: &AppHandle, ui: &UiState) -> tauri::Result<Menu<Wry>> {
    let mut builder = MenuBuilder::new(app);

    #[cfg(target_os = "macos")]
    {
        let app_menu = SubmenuBuilder::new(app, "Lil' GPT")
            .item(&PredefinedMenuItem::about(app, None, None)?)
            .separator()
            .item(&PredefinedMenuItem::services(app, None)?)
            .separator()
            .item(&PredefinedMenuItem::hide(app, None)?)
            .item(&PredefinedMenuItem::hide_others(app, None)?)
            .item(&PredefinedMenuItem::show_all(app, None)?)
            .build()?;
        builder = builder.item(&app_menu);
    }

    for submenu in chrome::app_menu(ui) {
        let items = render(app, &submenu.entries)?;
        let built = SubmenuBuilder::new(app, submenu.label)
            .items(&as_refs(&items))
            .build()?;
        builder = builder.item(&built);
    }
    builder.build()
}

pub fn build_tray_menu(app: &AppHandle, ui: &UiState) -> tauri::Result<Menu<Wry>> {
    let items = render(app, &chrome::tray_menu(ui))?;
    MenuBuilder::new(app).items(&as_refs(&items)).build()
}

pub fn create_tray(app: &AppHandle, ui: &UiState) -> tauri::Result<()> {
    let icon = Image::from_bytes(include_bytes!("../icons/tray.png"))?;
    TrayIconBuilder::with_id(TRAY_ID)
        .icon(icon)
        .tooltip("Lil' GPT")
        .menu(&build_tray_menu(app, ui)?)
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Enter { .. } = event {
                sync_window_visibility(tray.app_handle());
            }
        })
        .build(app)?;
    Ok(())
}

/// Rebuild app menu and tray menu from `ui`.
pub fn render_chrome(app: &AppHandle, ui: &UiState) {
    match build_app_menu(app, ui) {
        Ok(menu) => {
            if let Err(e) = app.set_menu(menu) {
                log::warn!("[Menu] Failed to install app menu: {}", e);
            }
        }
        Err(e) => log::warn!("[Menu] Failed to build app menu: {}", e),
    }

    if let Some(tray) = app.tray_by_id(TRAY_ID) {
        match build_tray_menu(app, ui) {
            Ok(menu) => {
                if let Err(e) = tray.set_menu(Some(menu)) {
                    log::warn!("[Tray] Failed to install tray menu: {}", e);
                }
            }
            Err(e) => log::warn!("[Tray] Failed to build tray menu: {}", e),
        }
    }
}

/// Apply `change` to the UI state and rebuild chrome if anything moved.
pub fn update_ui<F>(app: &AppHandle, change: F) -> UiState
where
    F: FnOnce(&mut UiState),
{
    let state = app.state::<AppState>();
    let (before, after) = match state.ui.lock() {
        Ok(mut ui) => {
            let before = *ui;
            change(&mut ui);
            (before, *ui)
        }
        Err(e) => {
            log::error!("[Menu] UI state lock poisoned: {}", e);
            return UiState::default();
        }
    };
    if before != after {
        render_chrome(app, &after);
    }
    after
}

pub fn show_window(app: &AppHandle) {
    if let Some(window) = app.get_window(MAIN_WINDOW) {
        let _ = window.unminimize();
        let _ = window.show();
        let _ = window.set_focus();
    }
    update_ui(app, |ui| {
        ui.observe_visibility(true);
    });
}

pub fn hide_window(app: &AppHandle) {
    if let Some(window) = app.get_window(MAIN_WINDOW) {
        let _ = window.hide();
    }
    update_ui(app, |ui| {
        ui.observe_visibility(false);
    });
}

/// Pick up shows and hides the app did not initiate (macOS Hide, dock, ...).
pub fn sync_window_visibility(app: &AppHandle) {
    let Some(visible) = app
        .get_window(MAIN_WINDOW)
        .and_then(|w| w.is_visible().ok())
    else {
        return;
    };
    update_ui(app, |ui| {
        if ui.observe_visibility(visible) {
            log::debug!("[Window] Visibility changed outside the app: {}", visible);
        }
    });
}

fn toggle_always_on_top(app: &AppHandle) {
    let ui = update_ui(app, |ui| ui.always_on_top = !ui.always_on_top);
    if let Some(window) = app.get_window(MAIN_WINDOW) {
        if let Err(e) = window.set_always_on_top(ui.always_on_top) {
            log::warn!("[Window] Failed to set always-on-top: {}", e);
        }
    }

    let state = app.state::<AppState>();
    let snapshot = match state.settings.write() {
        Ok(mut settings) => {
            settings.always_on_top = ui.always_on_top;
            settings.clone()
        }
        Err(e) => {
            log::error!("[Settings] Lock poisoned: {}", e);
            return;
        }
    };
    if let Err(e) = snapshot.save(app) {
        log::warn!("[Settings] Failed to persist always-on-top: {}", e);
    }
}

/// Bring the tab strip forward and ask it to open an overlay.
fn open_overlay(app: &AppHandle, event: &str) {
    show_window(app);
    if let Some(webview) = app.get_webview(MAIN_WINDOW) {
        let _ = webview.set_focus();
    }
    if let Err(e) = app.emit_to(MAIN_WINDOW, event, ()) {
        log::debug!("[Menu] Failed to emit {}: {}", event, e);
    }
}

pub fn perform(app: &AppHandle, action: ChromeAction) {
    log::debug!("[Menu] {:?}", action);
    match action {
        ChromeAction::Tabs(command) => schedule(app, move |tabs| {
            tabs.execute(command);
        }),
        ChromeAction::OpenFind => open_overlay(app, OPEN_FIND_EVENT),
        ChromeAction::OpenTabSearch => open_overlay(app, OPEN_TAB_SEARCH_EVENT),
        ChromeAction::ToggleAlwaysOnTop => toggle_always_on_top(app),
        ChromeAction::ToggleWindow => {
            let visible = app
                .get_window(MAIN_WINDOW)
                .and_then(|w| w.is_visible().ok())
                .unwrap_or(false);
            if visible {
                hide_window(app);
            } else {
                show_window(app);
            }
        }
        ChromeAction::ToggleFullscreen => {
            if let Some(window) = app.get_window(MAIN_WINDOW) {
                let fullscreen = window.is_fullscreen().unwrap_or(false);
                let _ = window.set_fullscreen(!fullscreen);
            }
        }
        ChromeAction::Restart => {
            log::info!("[App] Restarting");
            app.state::<AppState>().quitting.store(true, Ordering::SeqCst);
            app.restart();
        }
        ChromeAction::Quit => {
            log::info!("[App] Quitting");
            app.state::<AppState>().quitting.store(true, Ordering::SeqCst);
            app.exit(0);
        }
    }
}

pub fn handle_menu_event(app: &AppHandle, id: &str) {
    match chrome::action_for(id) {
        Some(action) => perform(app, action),
        None => log::debug!("[Menu] Unhandled menu id {}", id),
    }
}
