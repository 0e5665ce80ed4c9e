// Viewport attacher - pure logic, no Tauri imports.
// Keeps exactly one tab surface mounted below the tab bar.

use crate::modules::surface::{Bounds, ContentSurface, TabId};

#[derive(Debug, Clone)]
pub struct ViewportAttacher {
    /// Tab bar height in logical pixels.
    chrome_height: f64,
    scale_factor: f64,
    /// Window content area in physical pixels.
    width: u32,
    height: u32,
    mounted: Option<TabId>,
}

impl ViewportAttacher {
    pub fn new(chrome_height: f64) -> Self {
        Self {
            chrome_height,
            scale_factor: 1.0,
            width: 0,
            height: 0,
            mounted: None,
        }
    }

    pub fn mounted(&self) -> Option<TabId> {
        self.mounted
    }

    /// Region for the active surface: full width, everything under the tab bar.
    /// Height clamps to zero when the window is shorter than the bar.
    pub fn bounds(&self) -> Bounds {
        let chrome = (self.chrome_height * self.scale_factor) as u32;
        Bounds {
            x: 0,
            y: chrome as i32,
            width: self.width,
            height: self.height.saturating_sub(chrome),
        }
    }

    /// Record a new window content size. Callers follow up with `recompute_bounds`.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        self.width = width;
        self.height = height;
        if scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    /// Detach whatever is mounted, then mount `active` if its surface is still alive.
    ///
    /// `current` is the surface of the currently mounted tab, if that tab still exists.
    pub fn attach<S: ContentSurface>(&mut self, current: Option<&S>, active: Option<(TabId, &S)>) {
        if let Some(surface) = current {
            if surface.is_alive() {
                if let Err(e) = surface.hide() {
                    log::debug!("[Viewport] Failed to detach tab {:?}: {}", self.mounted, e);
                }
            }
        }
        self.mounted = None;

        let Some((id, surface)) = active else {
            return;
        };
        if !surface.is_alive() {
            log::debug!("[Viewport] Tab {} surface is gone, leaving viewport empty", id);
            return;
        }

        let bounds = self.bounds();
        match surface.show(bounds) {
            Ok(()) => self.mounted = Some(id),
            Err(e) => log::warn!("[Viewport] Failed to mount tab {}: {}", id, e),
        }
    }

    /// Re-apply the current region to the mounted surface.
    pub fn recompute_bounds<S: ContentSurface>(&self, mounted: Option<&S>) {
        let Some(surface) = mounted else {
            return;
        };
        if !surface.is_alive() {
            return;
        }
        if let Err(e) = surface.set_bounds(self.bounds()) {
            log::debug!("[Viewport] Failed to resize tab {:?}: {}", self.mounted, e);
        }
    }

    /// Drop the mount record for a tab that no longer exists.
    pub fn forget(&mut self, id: TabId) {
        if self.mounted == Some(id) {
            self.mounted = None;
        }
    }
}
