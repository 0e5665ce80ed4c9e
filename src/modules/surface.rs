// Content surface contract - no Tauri imports allowed.
// The host adapter (host.rs) implements these traits over real webviews;
// tests implement them over in-memory fakes.

use thiserror::Error;

/// Tab identifier. Positive, strictly increasing, never reused.
pub type TabId = u32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("content surface is already gone")]
    Gone,
    #[error("host error: {0}")]
    Host(String),
}

/// Physical-pixel rectangle a surface occupies inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Execution context every tab surface is created with.
///
/// All tabs share one persistent partition so a login survives restarts
/// and is visible to every tab, while remaining isolated from the tab strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceProfile {
    pub partition: String,
    pub user_agent: Option<String>,
}

/// Lifecycle events a surface reports back to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    TitleChanged(String),
    Navigated(String),
    /// Render process died for any reason other than a clean exit.
    CrashedAbnormally,
    Unresponsive,
    /// The page asked for a new top-level destination (window.open, target=_blank).
    RequestedNewSurface(String),
}

/// An embeddable browsing context exclusively owned by one tab.
///
/// Every method is best-effort: callers log and drop the error.
pub trait ContentSurface {
    fn is_alive(&self) -> bool;
    fn load(&self, url: &str) -> Result<(), SurfaceError>;
    fn reload(&self) -> Result<(), SurfaceError>;
    fn destroy(&self) -> Result<(), SurfaceError>;

    /// Mount into the visible region at `bounds`.
    fn show(&self, bounds: Bounds) -> Result<(), SurfaceError>;
    /// Detach from the visible region without destroying.
    fn hide(&self) -> Result<(), SurfaceError>;
    fn set_bounds(&self, bounds: Bounds) -> Result<(), SurfaceError>;

    fn find_in_page(&self, term: &str) -> Result<(), SurfaceError>;
    fn stop_find_in_page(&self) -> Result<(), SurfaceError>;
}

/// Constructs surfaces for newly created tabs.
pub trait SurfaceFactory {
    type Surface: ContentSurface;

    fn spawn(&self, id: TabId, profile: &SurfaceProfile) -> Result<Self::Surface, SurfaceError>;
}
