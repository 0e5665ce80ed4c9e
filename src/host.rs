// Tauri side of the content surface and display contracts.
// Each tab is a child webview of the main window; the tab strip is the
// window's own "main" webview and receives snapshots as events.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use tauri::webview::{NewWindowResponse, PageLoadEvent};
use tauri::{
    AppHandle, Emitter, Manager, PhysicalPosition, PhysicalSize, Position, Rect, Size, Webview,
    WebviewBuilder, WebviewUrl,
};
use url::Url;

use crate::modules::find::{find_script, stop_find_script};
use crate::modules::surface::{
    Bounds, ContentSurface, SurfaceError, SurfaceEvent, SurfaceFactory, SurfaceProfile, TabId,
};
use crate::modules::sync::{DisplaySink, TabsPayload, TABS_UPDATED_EVENT};
use crate::state::schedule;

pub const MAIN_WINDOW: &str = "main";

impl From<tauri::Error> for SurfaceError {
    fn from(e: tauri::Error) -> Self {
        SurfaceError::Host(e.to_string())
    }
}

pub fn tab_label(id: TabId) -> String {
    format!("tab-{}", id)
}

/// Hand a surface event to the registry on the main thread.
/// Callbacks may fire while a registry job is still running; the event is
/// then queued behind that job.
fn forward(app: &AppHandle, id: TabId, event: SurfaceEvent) {
    schedule(app, move |tabs| tabs.dispatch(id, event));
}

pub struct WebviewSurface {
    webview: Webview,
    alive: AtomicBool,
}

impl WebviewSurface {
    fn ensure_alive(&self) -> Result<(), SurfaceError> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(SurfaceError::Gone)
        }
    }
}

fn rect(bounds: Bounds) -> Rect {
    Rect {
        position: Position::Physical(PhysicalPosition::new(bounds.x, bounds.y)),
        size: Size::Physical(PhysicalSize::new(bounds.width, bounds.height)),
    }
}

impl ContentSurface for WebviewSurface {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
            && self
                .webview
                .app_handle()
                .get_webview(self.webview.label())
                .is_some()
    }

    fn load(&self, url: &str) -> Result<(), SurfaceError> {
        self.ensure_alive()?;
        let url = Url::parse(url).map_err(|e| SurfaceError::Host(e.to_string()))?;
        self.webview.navigate(url)?;
        Ok(())
    }

    fn reload(&self) -> Result<(), SurfaceError> {
        self.ensure_alive()?;
        self.webview.reload()?;
        Ok(())
    }

    fn destroy(&self) -> Result<(), SurfaceError> {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return Err(SurfaceError::Gone);
        }
        self.webview.close()?;
        Ok(())
    }

    fn show(&self, bounds: Bounds) -> Result<(), SurfaceError> {
        self.ensure_alive()?;
        self.webview.set_bounds(rect(bounds))?;
        self.webview.show()?;
        Ok(())
    }

    fn hide(&self) -> Result<(), SurfaceError> {
        self.ensure_alive()?;
        self.webview.hide()?;
        Ok(())
    }

    fn set_bounds(&self, bounds: Bounds) -> Result<(), SurfaceError> {
        self.ensure_alive()?;
        self.webview.set_bounds(rect(bounds))?;
        Ok(())
    }

    fn find_in_page(&self, term: &str) -> Result<(), SurfaceError> {
        self.ensure_alive()?;
        self.webview.eval(&find_script(term))?;
        Ok(())
    }

    fn stop_find_in_page(&self) -> Result<(), SurfaceError> {
        self.ensure_alive()?;
        self.webview.eval(stop_find_script())?;
        Ok(())
    }
}

/// Builds tab webviews inside the main window, all sharing one persistent profile.
pub struct WebviewFactory {
    app: AppHandle,
    profiles_dir: PathBuf,
}

impl WebviewFactory {
    pub fn new(app: AppHandle, profiles_dir: PathBuf) -> Self {
        Self { app, profiles_dir }
    }
}

impl SurfaceFactory for WebviewFactory {
    type Surface = WebviewSurface;

    fn spawn(&self, id: TabId, profile: &SurfaceProfile) -> Result<WebviewSurface, SurfaceError> {
        let window = self
            .app
            .get_window(MAIN_WINDOW)
            .ok_or_else(|| SurfaceError::Host("main window is gone".to_string()))?;

        // Start blank and hidden; the registry loads the real URL and the
        // viewport attacher decides whether it is shown.
        let blank = Url::parse("about:blank").map_err(|e| SurfaceError::Host(e.to_string()))?;

        let on_title = self.app.clone();
        let on_load = self.app.clone();
        let on_popup = self.app.clone();

        let mut builder = WebviewBuilder::new(tab_label(id), WebviewUrl::External(blank))
            .data_directory(self.profiles_dir.join(&profile.partition))
            .incognito(false)
            .on_document_title_changed(move |_webview, title| {
                forward(&on_title, id, SurfaceEvent::TitleChanged(title));
            })
            .on_page_load(move |_webview, payload| {
                if matches!(payload.event(), PageLoadEvent::Finished) && payload.url().scheme() != "about" {
                    forward(&on_load, id, SurfaceEvent::Navigated(payload.url().to_string()));
                }
            })
            .on_new_window(move |url, _features| {
                forward(&on_popup, id, SurfaceEvent::RequestedNewSurface(url.to_string()));
                NewWindowResponse::Deny
            });

        if let Some(user_agent) = &profile.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let webview = window.add_child(builder, PhysicalPosition::new(0, 0), PhysicalSize::new(0, 0))?;
        webview.hide()?;

        log::debug!("[Host] Spawned webview {} in profile {}", webview.label(), profile.partition);
        Ok(WebviewSurface {
            webview,
            alive: AtomicBool::new(true),
        })
    }
}

/// The tab strip: the main window's own webview.
pub struct ToolbarDisplay {
    app: AppHandle,
}

impl ToolbarDisplay {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl DisplaySink for ToolbarDisplay {
    fn push(&self, payload: &TabsPayload) {
        if let Err(e) = self.app.emit_to(MAIN_WINDOW, TABS_UPDATED_EVENT, payload) {
            log::debug!("[Host] Tab strip push failed: {}", e);
        }
    }
}
