use std::sync::atomic::Ordering;

use tauri::{AppHandle, Manager, RunEvent, State, Window, WindowEvent};

use lilgpt_lib::host::{ToolbarDisplay, WebviewFactory, MAIN_WINDOW};
use lilgpt_lib::menus;
use lilgpt_lib::modules::chrome::UiState;
use lilgpt_lib::modules::surface::TabId;
use lilgpt_lib::modules::sync::{CommandReply, ShellCommand, TabSummary, TabsPayload};
use lilgpt_lib::modules::tabs::TabRegistry;
use lilgpt_lib::settings::Settings;
use lilgpt_lib::state::{schedule, AppState};

fn run_command(app: &AppHandle, command: ShellCommand) {
    schedule(app, move |tabs| {
        tabs.execute(command);
    });
}

#[tauri::command]
fn new_tab(app: AppHandle) {
    run_command(&app, ShellCommand::NewTab);
}

#[tauri::command]
fn close_tab(app: AppHandle, id: TabId) {
    run_command(&app, ShellCommand::CloseTab(id));
}

#[tauri::command]
fn activate_tab(app: AppHandle, id: TabId) {
    run_command(&app, ShellCommand::ActivateTab(id));
}

#[tauri::command]
fn find_in_page(app: AppHandle, term: Option<String>) {
    run_command(&app, ShellCommand::FindInPage(term.unwrap_or_default()));
}

#[tauri::command]
fn stop_find_in_page(app: AppHandle) {
    run_command(&app, ShellCommand::StopFindInPage);
}

// Reads are async so they run off the main thread and wait for any running
// registry job instead of re-entering it.
#[tauri::command]
async fn search_tabs(state: State<'_, AppState>, term: Option<String>) -> Result<Vec<TabSummary>, String> {
    let mut tabs = state.tabs.lock().map_err(|e| e.to_string())?;
    match tabs.execute(ShellCommand::SearchTabs(term.unwrap_or_default())) {
        CommandReply::Matches(matches) => Ok(matches),
        CommandReply::Done => Ok(Vec::new()),
    }
}

// The strip asks once on load, in case it missed pushes sent before it was listening.
#[tauri::command]
async fn tabs_snapshot(state: State<'_, AppState>) -> Result<TabsPayload, String> {
    let tabs = state.tabs.lock().map_err(|e| e.to_string())?;
    Ok(tabs.snapshot())
}

fn watch_main_window(app: &AppHandle, window: &Window) {
    let handle = app.clone();
    let window_clone = window.clone();
    window.on_window_event(move |event| match event {
        WindowEvent::Resized(size) => {
            let (width, height) = (size.width, size.height);
            let scale = window_clone.scale_factor().unwrap_or(1.0);
            schedule(&handle, move |tabs| tabs.resize(width, height, scale));
        }
        WindowEvent::ScaleFactorChanged {
            scale_factor,
            new_inner_size,
            ..
        } => {
            let (width, height, scale) = (new_inner_size.width, new_inner_size.height, *scale_factor);
            schedule(&handle, move |tabs| tabs.resize(width, height, scale));
        }
        WindowEvent::Focused(_) => menus::sync_window_visibility(&handle),
        WindowEvent::CloseRequested { api, .. } => {
            let state = handle.state::<AppState>();
            let hide_on_close = state
                .settings
                .read()
                .map(|s| s.hide_on_close)
                .unwrap_or(true);
            if hide_on_close && !state.quitting.load(Ordering::SeqCst) {
                api.prevent_close();
                menus::hide_window(&handle);
            }
        }
        _ => {}
    });
}

// Dock icon click on macOS brings a hidden window back.
#[cfg(target_os = "macos")]
fn on_run_event(app: &AppHandle, event: RunEvent) {
    if let RunEvent::Reopen { .. } = event {
        menus::show_window(app);
    }
}

#[cfg(not(target_os = "macos"))]
fn on_run_event(_app: &AppHandle, _event: RunEvent) {}

fn main() {
    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            menus::show_window(app);
        }))
        .setup(|app| {
            let handle = app.handle().clone();
            let settings = Settings::load(&handle);

            let level = if cfg!(debug_assertions) {
                log::LevelFilter::Debug
            } else {
                settings.log_level()
            };
            handle.plugin(tauri_plugin_log::Builder::default().level(level).build())?;
            log::info!("[App] Starting with home page {}", settings.home_url());

            let profiles_dir = handle.path().app_data_dir()?.join("profiles");
            let registry = TabRegistry::new(
                WebviewFactory::new(handle.clone(), profiles_dir),
                ToolbarDisplay::new(handle.clone()),
                settings.tab_defaults(),
                settings.surface_profile(),
                settings.tab_bar_height,
            );
            let ui = UiState {
                always_on_top: settings.always_on_top,
                ..UiState::default()
            };
            app.manage(AppState::new(registry, ui, settings));

            let main_window = app
                .get_window(MAIN_WINDOW)
                .ok_or("main window is missing from the configuration")?;
            main_window.set_always_on_top(ui.always_on_top)?;

            app.set_menu(menus::build_app_menu(&handle, &ui)?)?;
            app.on_menu_event(|app, event| menus::handle_menu_event(app, event.id().as_ref()));
            menus::create_tray(&handle, &ui)?;

            watch_main_window(&handle, &main_window);

            // First tab, sized to the window as it is now.
            let size = main_window.inner_size()?;
            let scale = main_window.scale_factor()?;
            schedule(&handle, move |tabs| {
                tabs.resize(size.width, size.height, scale);
                tabs.create(None);
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            new_tab,
            close_tab,
            activate_tab,
            search_tabs,
            find_in_page,
            stop_find_in_page,
            tabs_snapshot
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(on_run_event);
}
