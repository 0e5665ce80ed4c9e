// In-memory stand-ins for webviews and the tab strip, shared by unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::modules::surface::{Bounds, ContentSurface, SurfaceError, SurfaceFactory, SurfaceProfile, TabId};
use crate::modules::sync::{DisplaySink, TabsPayload};

#[derive(Debug, Default)]
struct SurfaceLog {
    destroyed: Cell<bool>,
    shown: Cell<bool>,
    bounds: Cell<Option<Bounds>>,
    loads: RefCell<Vec<String>>,
    reloads: Cell<u32>,
    destroy_calls: Cell<u32>,
    finds: RefCell<Vec<String>>,
    stop_finds: Cell<u32>,
    fail_load: Cell<bool>,
}

/// Clones share state, so a test can keep a handle after the registry takes ownership.
#[derive(Debug, Clone, Default)]
pub struct FakeSurface {
    log: Rc<SurfaceLog>,
}

impl FakeSurface {
    pub fn is_shown(&self) -> bool {
        self.log.shown.get()
    }

    pub fn last_bounds(&self) -> Option<Bounds> {
        self.log.bounds.get()
    }

    pub fn loads(&self) -> Vec<String> {
        self.log.loads.borrow().clone()
    }

    pub fn reloads(&self) -> u32 {
        self.log.reloads.get()
    }

    pub fn destroy_calls(&self) -> u32 {
        self.log.destroy_calls.get()
    }

    pub fn finds(&self) -> Vec<String> {
        self.log.finds.borrow().clone()
    }

    pub fn stop_finds(&self) -> u32 {
        self.log.stop_finds.get()
    }

    /// Simulate the host tearing the surface down behind the registry's back.
    pub fn kill(&self) {
        self.log.destroyed.set(true);
        self.log.shown.set(false);
    }

    fn check(&self) -> Result<(), SurfaceError> {
        if self.log.destroyed.get() {
            Err(SurfaceError::Gone)
        } else {
            Ok(())
        }
    }
}

impl ContentSurface for FakeSurface {
    fn is_alive(&self) -> bool {
        !self.log.destroyed.get()
    }

    fn load(&self, url: &str) -> Result<(), SurfaceError> {
        self.check()?;
        self.log.loads.borrow_mut().push(url.to_string());
        if self.log.fail_load.get() {
            return Err(SurfaceError::Host("net::ERR_NAME_NOT_RESOLVED".to_string()));
        }
        Ok(())
    }

    fn reload(&self) -> Result<(), SurfaceError> {
        self.check()?;
        self.log.reloads.set(self.log.reloads.get() + 1);
        Ok(())
    }

    fn destroy(&self) -> Result<(), SurfaceError> {
        self.log.destroy_calls.set(self.log.destroy_calls.get() + 1);
        self.check()?;
        self.kill();
        Ok(())
    }

    fn show(&self, bounds: Bounds) -> Result<(), SurfaceError> {
        self.check()?;
        self.log.shown.set(true);
        self.log.bounds.set(Some(bounds));
        Ok(())
    }

    fn hide(&self) -> Result<(), SurfaceError> {
        self.check()?;
        self.log.shown.set(false);
        Ok(())
    }

    fn set_bounds(&self, bounds: Bounds) -> Result<(), SurfaceError> {
        self.check()?;
        self.log.bounds.set(Some(bounds));
        Ok(())
    }

    fn find_in_page(&self, term: &str) -> Result<(), SurfaceError> {
        self.check()?;
        self.log.finds.borrow_mut().push(term.to_string());
        Ok(())
    }

    fn stop_find_in_page(&self) -> Result<(), SurfaceError> {
        self.check()?;
        self.log.stop_finds.set(self.log.stop_finds.get() + 1);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeFactory {
    spawned: Rc<RefCell<Vec<(TabId, FakeSurface)>>>,
    profiles: Rc<RefCell<Vec<SurfaceProfile>>>,
    refuse: Rc<Cell<bool>>,
    fail_loads: Rc<Cell<bool>>,
}

impl FakeFactory {
    pub fn surface(&self, id: TabId) -> FakeSurface {
        self.spawned
            .borrow()
            .iter()
            .find(|(tab, _)| *tab == id)
            .map(|(_, s)| s.clone())
            .unwrap_or_else(|| panic!("no surface spawned for tab {}", id))
    }

    pub fn spawn_count(&self) -> usize {
        self.spawned.borrow().len()
    }

    pub fn last_profile(&self) -> Option<SurfaceProfile> {
        self.profiles.borrow().last().cloned()
    }

    /// Make every following spawn fail as if the host could not build a webview.
    pub fn refuse_spawns(&self, refuse: bool) {
        self.refuse.set(refuse);
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.set(fail);
    }
}

impl SurfaceFactory for FakeFactory {
    type Surface = FakeSurface;

    fn spawn(&self, id: TabId, profile: &SurfaceProfile) -> Result<FakeSurface, SurfaceError> {
        if self.refuse.get() {
            return Err(SurfaceError::Host("window is gone".to_string()));
        }
        let surface = FakeSurface::default();
        surface.log.fail_load.set(self.fail_loads.get());
        self.spawned.borrow_mut().push((id, surface.clone()));
        self.profiles.borrow_mut().push(profile.clone());
        Ok(surface)
    }
}

/// Tab strip stand-in: replaces its view wholesale on every push.
#[derive(Debug, Clone, Default)]
pub struct FakeDisplay {
    view: Rc<RefCell<TabsPayload>>,
    history: Rc<RefCell<Vec<TabsPayload>>>,
}

impl FakeDisplay {
    pub fn view(&self) -> TabsPayload {
        self.view.borrow().clone()
    }

    pub fn pushes(&self) -> Vec<TabsPayload> {
        self.history.borrow().clone()
    }

    pub fn push_count(&self) -> usize {
        self.history.borrow().len()
    }
}

impl DisplaySink for FakeDisplay {
    fn push(&self, payload: &TabsPayload) {
        *self.view.borrow_mut() = payload.clone();
        self.history.borrow_mut().push(payload.clone());
    }
}
