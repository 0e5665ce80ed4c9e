// Tab registry - pure logic, no Tauri imports.
// Owns every tab record and its surface, decides which tab is active,
// and pushes a full snapshot to the tab strip after each visible mutation.

use crate::modules::surface::{ContentSurface, SurfaceEvent, SurfaceFactory, SurfaceProfile, TabId};
use crate::modules::sync::{CommandReply, Direction, DisplaySink, ShellCommand, TabSummary, TabsPayload};
use crate::modules::viewport::ViewportAttacher;

/// Placeholder values shown until a surface reports its own title and URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabDefaults {
    pub url: String,
    pub title: String,
}

struct TabRecord<S> {
    id: TabId,
    surface: S,
    title: String,
    url: String,
}

pub struct TabRegistry<F: SurfaceFactory, D: DisplaySink> {
    factory: F,
    display: D,
    viewport: ViewportAttacher,
    profile: SurfaceProfile,
    defaults: TabDefaults,
    tabs: Vec<TabRecord<F::Surface>>,
    active_id: Option<TabId>,
    next_id: TabId,
}

fn surface_of<S>(tabs: &[TabRecord<S>], id: Option<TabId>) -> Option<(TabId, &S)> {
    let id = id?;
    tabs.iter().find(|t| t.id == id).map(|t| (t.id, &t.surface))
}

impl<F: SurfaceFactory, D: DisplaySink> TabRegistry<F, D> {
    pub fn new(
        factory: F,
        display: D,
        defaults: TabDefaults,
        profile: SurfaceProfile,
        chrome_height: f64,
    ) -> Self {
        Self {
            factory,
            display,
            viewport: ViewportAttacher::new(chrome_height),
            profile,
            defaults,
            tabs: Vec::new(),
            active_id: None,
            next_id: 1,
        }
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.active_id
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Ids in registry (creation) order.
    pub fn ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id).collect()
    }

    pub fn get(&self, id: TabId) -> Option<TabSummary> {
        self.tabs.iter().find(|t| t.id == id).map(|t| self.summary(t))
    }

    /// Tab whose surface currently occupies the viewport.
    pub fn mounted(&self) -> Option<TabId> {
        self.viewport.mounted()
    }

    /// Open a tab on `url` (home page when `None`) and make it active.
    ///
    /// Returns `None` only if the host could not build a surface at all; the id
    /// is consumed either way. A failed initial load is not an error here.
    pub fn create(&mut self, url: Option<&str>) -> Option<TabId> {
        let id = self.next_id;
        self.next_id += 1;
        let url = url.unwrap_or(self.defaults.url.as_str()).to_string();

        let surface = match self.factory.spawn(id, &self.profile) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("[Tabs] Failed to create surface for tab {}: {}", id, e);
                return None;
            }
        };

        // Initial load failures surface later as title/url updates, or not at all.
        if let Err(e) = surface.load(&url) {
            log::debug!("[Tabs] Initial load of {} in tab {} failed: {}", url, id, e);
        }

        self.tabs.push(TabRecord {
            id,
            surface,
            title: self.defaults.title.clone(),
            url,
        });
        log::info!("[Tabs] Created tab {} ({} open)", id, self.tabs.len());

        self.activate(id);
        Some(id)
    }

    pub fn close(&mut self, id: TabId) {
        let Some(index) = self.tabs.iter().position(|t| t.id == id) else {
            log::debug!("[Tabs] Close ignored, tab {} not found", id);
            return;
        };
        let was_active = self.active_id == Some(id);
        let record = self.tabs.remove(index);
        self.viewport.forget(id);

        if record.surface.is_alive() {
            if let Err(e) = record.surface.destroy() {
                log::debug!("[Tabs] Destroying tab {} surface failed: {}", id, e);
            }
        }
        log::info!("[Tabs] Closed tab {} (index {}, {} left)", id, index, self.tabs.len());

        if self.tabs.is_empty() {
            // Let the strip observe zero tabs before the replacement appears.
            self.active_id = None;
            self.push();
            self.create(None);
            return;
        }

        if was_active {
            let fallback = self.tabs[index.saturating_sub(1)].id;
            self.activate(fallback);
        } else {
            self.push();
        }
    }

    /// The single place where the visible tab changes.
    pub fn activate(&mut self, id: TabId) {
        if !self.tabs.iter().any(|t| t.id == id) {
            log::debug!("[Tabs] Activate ignored, tab {} not found", id);
            return;
        }
        self.active_id = Some(id);
        self.attach();
        self.push();
    }

    /// Activate the next or previous tab, wrapping around registry order.
    pub fn cycle(&mut self, direction: Direction) {
        let len = self.tabs.len();
        if len == 0 {
            return;
        }
        let current = self
            .active_id
            .and_then(|id| self.tabs.iter().position(|t| t.id == id));
        let next = match (current, direction) {
            (Some(i), Direction::Forward) => (i + 1) % len,
            (Some(i), Direction::Backward) => (i + len - 1) % len,
            (None, Direction::Forward) => 0,
            (None, Direction::Backward) => len - 1,
        };
        let id = self.tabs[next].id;
        self.activate(id);
    }

    /// Case-insensitive substring match on title or URL, in registry order.
    /// An empty term matches every tab.
    pub fn search(&self, term: &str) -> Vec<TabSummary> {
        let needle = term.to_lowercase();
        self.tabs
            .iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle) || t.url.to_lowercase().contains(&needle)
            })
            .map(|t| self.summary(t))
            .collect()
    }

    pub fn find_in_page(&self, term: &str) {
        let Some((id, surface)) = surface_of(&self.tabs, self.active_id) else {
            return;
        };
        if !surface.is_alive() {
            return;
        }
        if let Err(e) = surface.find_in_page(term) {
            log::debug!("[Tabs] Find in tab {} failed: {}", id, e);
        }
    }

    pub fn stop_find_in_page(&self) {
        let Some((id, surface)) = surface_of(&self.tabs, self.active_id) else {
            return;
        };
        if !surface.is_alive() {
            return;
        }
        if let Err(e) = surface.stop_find_in_page() {
            log::debug!("[Tabs] Stop find in tab {} failed: {}", id, e);
        }
    }

    /// Window content area changed; physical pixels.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        self.viewport.resize(width, height, scale_factor);
        let mounted = surface_of(&self.tabs, self.viewport.mounted()).map(|(_, s)| s);
        self.viewport.recompute_bounds(mounted);
    }

    /// Single entry point for events raised by a tab's own surface.
    pub fn dispatch(&mut self, id: TabId, event: SurfaceEvent) {
        let Some(record) = self.tabs.iter_mut().find(|t| t.id == id) else {
            log::debug!("[Tabs] Dropping {:?} for closed tab {}", event, id);
            return;
        };
        log::debug!("[Tabs] Tab {} event: {:?}", id, event);

        match event {
            SurfaceEvent::TitleChanged(title) => {
                record.title = title;
                self.push();
            }
            SurfaceEvent::Navigated(url) => {
                record.url = url;
                self.push();
            }
            SurfaceEvent::CrashedAbnormally | SurfaceEvent::Unresponsive => {
                if record.surface.is_alive() {
                    log::warn!("[Tabs] Tab {} stopped responding, reloading", id);
                    if let Err(e) = record.surface.reload() {
                        log::debug!("[Tabs] Reload of tab {} failed: {}", id, e);
                    }
                }
            }
            SurfaceEvent::RequestedNewSurface(url) => {
                self.create(Some(&url));
            }
        }
    }

    /// Route a back-channel command. Only searches produce data.
    pub fn execute(&mut self, command: ShellCommand) -> CommandReply {
        match command {
            ShellCommand::NewTab => {
                self.create(None);
            }
            ShellCommand::CloseTab(id) => self.close(id),
            ShellCommand::CloseActive => {
                if let Some(id) = self.active_id {
                    self.close(id);
                }
            }
            ShellCommand::ActivateTab(id) => self.activate(id),
            ShellCommand::Cycle(direction) => self.cycle(direction),
            ShellCommand::SearchTabs(term) => return CommandReply::Matches(self.search(&term)),
            ShellCommand::FindInPage(term) => self.find_in_page(&term),
            ShellCommand::StopFindInPage => self.stop_find_in_page(),
        }
        CommandReply::Done
    }

    pub fn snapshot(&self) -> TabsPayload {
        TabsPayload {
            tabs: self.tabs.iter().map(|t| self.summary(t)).collect(),
            active_id: self.active_id,
        }
    }

    /// Re-send the current state without mutating anything.
    pub fn push(&self) {
        self.display.push(&self.snapshot());
    }

    fn attach(&mut self) {
        let current = surface_of(&self.tabs, self.viewport.mounted()).map(|(_, s)| s);
        let active = surface_of(&self.tabs, self.active_id);
        self.viewport.attach(current, active);
    }

    fn summary(&self, record: &TabRecord<F::Surface>) -> TabSummary {
        let or_default = |value: &str, fallback: &str| {
            if value.is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };
        TabSummary {
            id: record.id,
            title: or_default(&record.title, &self.defaults.title),
            url: or_default(&record.url, &self.defaults.url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::{FakeDisplay, FakeFactory};
    use rstest::rstest;

    const HOME: &str = "https://chatgpt.com/";

    fn registry() -> (TabRegistry<FakeFactory, FakeDisplay>, FakeFactory, FakeDisplay) {
        let factory = FakeFactory::default();
        let display = FakeDisplay::default();
        let registry = TabRegistry::new(
            factory.clone(),
            display.clone(),
            TabDefaults {
                url: HOME.to_string(),
                title: "ChatGPT".to_string(),
            },
            SurfaceProfile {
                partition: "chatgpt".to_string(),
                user_agent: None,
            },
            42.0,
        );
        (registry, factory, display)
    }

    fn with_tabs(n: usize) -> (TabRegistry<FakeFactory, FakeDisplay>, FakeFactory, FakeDisplay) {
        let (mut reg, factory, display) = registry();
        for _ in 0..n {
            reg.create(None);
        }
        (reg, factory, display)
    }

    fn assert_single_active(reg: &TabRegistry<FakeFactory, FakeDisplay>) {
        let ids = reg.ids();
        match reg.active_id() {
            Some(active) => assert_eq!(ids.iter().filter(|id| **id == active).count(), 1),
            None => assert!(ids.is_empty()),
        }
    }

    #[test]
    fn test_ids_strictly_increase_and_are_never_reused() {
        let (mut reg, _, _) = with_tabs(3);
        reg.close(3);
        reg.close(2);
        let id = reg.create(None).unwrap();
        assert_eq!(id, 4);
        assert_eq!(reg.ids(), vec![1, 4]);
    }

    #[test]
    fn test_create_loads_url_and_activates() {
        let (mut reg, factory, display) = registry();
        let id = reg.create(Some("https://chatgpt.com/c/abc")).unwrap();

        assert_eq!(reg.active_id(), Some(id));
        assert_eq!(reg.mounted(), Some(id));
        assert_eq!(factory.surface(id).loads(), vec!["https://chatgpt.com/c/abc"]);
        assert_eq!(factory.last_profile().unwrap().partition, "chatgpt");

        let view = display.view();
        assert_eq!(view.active_id, Some(id));
        assert_eq!(view.tabs[0].title, "ChatGPT");
        assert_eq!(view.tabs[0].url, "https://chatgpt.com/c/abc");
        assert_eq!(display.push_count(), 1);
    }

    #[test]
    fn test_create_swallows_initial_load_failure() {
        let (mut reg, factory, _) = registry();
        factory.fail_loads(true);
        let id = reg.create(None).unwrap();
        assert_eq!(reg.active_id(), Some(id));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_create_without_surface_leaves_registry_untouched() {
        let (mut reg, factory, display) = with_tabs(1);
        factory.refuse_spawns(true);
        assert_eq!(reg.create(None), None);
        assert_eq!(reg.ids(), vec![1]);
        assert_eq!(reg.active_id(), Some(1));
        assert_eq!(display.push_count(), 1);

        factory.refuse_spawns(false);
        assert_eq!(reg.create(None), Some(3));
    }

    #[test]
    fn test_close_inactive_keeps_active() {
        let (mut reg, factory, display) = with_tabs(3);
        reg.close(1);
        assert_eq!(reg.active_id(), Some(3));
        assert_eq!(reg.ids(), vec![2, 3]);
        assert_eq!(factory.surface(1).destroy_calls(), 1);
        assert_eq!(display.view().tabs.len(), 2);
    }

    #[test]
    fn test_close_active_falls_back_to_left_neighbor() {
        let (mut reg, factory, _) = with_tabs(3);
        reg.activate(2);
        reg.close(2);
        assert_eq!(reg.active_id(), Some(1));
        assert_eq!(reg.mounted(), Some(1));
        assert!(factory.surface(1).is_shown());
        assert!(!factory.surface(3).is_shown());
    }

    #[test]
    fn test_close_first_active_falls_back_to_new_first() {
        let (mut reg, _, _) = with_tabs(3);
        reg.activate(1);
        reg.close(1);
        assert_eq!(reg.active_id(), Some(2));
    }

    #[test]
    fn test_close_last_tab_recreates_with_transient_empty_state() {
        let (mut reg, factory, display) = with_tabs(1);
        reg.close(1);

        assert_eq!(reg.len(), 1);
        assert_eq!(reg.active_id(), Some(2));
        assert_eq!(factory.spawn_count(), 2);

        let pushes = display.pushes();
        let empty = &pushes[pushes.len() - 2];
        assert!(empty.tabs.is_empty());
        assert_eq!(empty.active_id, None);
        assert_eq!(pushes.last().unwrap().active_id, Some(2));
    }

    #[test]
    fn test_close_last_tab_stays_empty_when_replacement_cannot_spawn() {
        let (mut reg, factory, display) = with_tabs(1);
        factory.refuse_spawns(true);
        reg.close(1);

        assert!(reg.is_empty());
        assert_eq!(reg.active_id(), None);
        assert_eq!(reg.mounted(), None);
        let last = display.pushes().pop().unwrap();
        assert!(last.tabs.is_empty());
        assert_eq!(last.active_id, None);

        factory.refuse_spawns(false);
        reg.execute(ShellCommand::NewTab);
        assert_eq!(reg.ids(), vec![3]);
        assert_eq!(reg.active_id(), Some(3));
    }

    #[test]
    fn test_close_tolerates_already_destroyed_surface() {
        let (mut reg, factory, _) = with_tabs(2);
        factory.surface(2).kill();
        reg.close(2);
        assert_eq!(reg.ids(), vec![1]);
        assert_eq!(reg.active_id(), Some(1));
        assert_eq!(factory.surface(2).destroy_calls(), 0);
    }

    #[rstest]
    #[case::close(ShellCommand::CloseTab(99))]
    #[case::activate(ShellCommand::ActivateTab(99))]
    fn test_unknown_ids_are_ignored(#[case] command: ShellCommand) {
        let (mut reg, _, display) = with_tabs(2);
        let before = display.push_count();
        reg.execute(command);
        assert_eq!(reg.ids(), vec![1, 2]);
        assert_eq!(reg.active_id(), Some(2));
        assert_eq!(display.push_count(), before);
    }

    #[test]
    fn test_activate_mounts_exactly_one_surface() {
        let (mut reg, factory, _) = with_tabs(4);
        for id in [2, 4, 1, 3, 3] {
            reg.activate(id);
            let shown: Vec<TabId> = reg
                .ids()
                .into_iter()
                .filter(|id| factory.surface(*id).is_shown())
                .collect();
            assert_eq!(shown, vec![id]);
            assert_eq!(reg.mounted(), Some(id));
        }
    }

    #[test]
    fn test_single_active_holds_across_mixed_operations() {
        let (mut reg, _, _) = with_tabs(2);
        let script: Vec<ShellCommand> = vec![
            ShellCommand::NewTab,
            ShellCommand::ActivateTab(1),
            ShellCommand::CloseTab(2),
            ShellCommand::CloseActive,
            ShellCommand::CloseActive,
            ShellCommand::NewTab,
            ShellCommand::Cycle(Direction::Backward),
            ShellCommand::CloseTab(3),
        ];
        for command in script {
            reg.execute(command);
            assert_single_active(&reg);
            assert!(!reg.is_empty());
        }
    }

    #[test]
    fn test_activate_dead_surface_changes_selection_but_mounts_nothing() {
        let (mut reg, factory, _) = with_tabs(2);
        factory.surface(1).kill();
        reg.activate(1);
        assert_eq!(reg.active_id(), Some(1));
        assert_eq!(reg.mounted(), None);
        assert!(!factory.surface(2).is_shown());
    }

    #[rstest]
    #[case(Direction::Forward, 1)]
    #[case(Direction::Backward, 2)]
    fn test_cycle_wraps_around(#[case] direction: Direction, #[case] expected: TabId) {
        let (mut reg, _, _) = with_tabs(3);
        reg.cycle(direction);
        assert_eq!(reg.active_id(), Some(expected));
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_or_url() {
        let (mut reg, _, _) = with_tabs(2);
        reg.dispatch(1, SurfaceEvent::TitleChanged("ChatGPT".to_string()));
        reg.dispatch(2, SurfaceEvent::TitleChanged("Other".to_string()));
        reg.dispatch(2, SurfaceEvent::Navigated("https://example.com/".to_string()));

        let hits = reg.search("gpt");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        assert_eq!(reg.search("EXAMPLE").iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(reg.search("").iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(reg.search("nothing here").is_empty());
    }

    #[test]
    fn test_search_via_command_returns_matches() {
        let (mut reg, _, _) = with_tabs(2);
        let reply = reg.execute(ShellCommand::SearchTabs(String::new()));
        match reply {
            CommandReply::Matches(tabs) => assert_eq!(tabs.len(), 2),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_identical_push_is_idempotent() {
        let (reg, _, display) = with_tabs(2);
        let before = display.view();
        reg.push();
        reg.push();
        assert_eq!(display.view(), before);
        assert_eq!(display.view().tabs.len(), 2);
    }

    #[test]
    fn test_title_and_url_events_update_and_push() {
        let (mut reg, _, display) = with_tabs(1);
        reg.dispatch(1, SurfaceEvent::TitleChanged("Project notes".to_string()));
        reg.dispatch(1, SurfaceEvent::Navigated("https://chatgpt.com/c/42".to_string()));

        let tab = reg.get(1).unwrap();
        assert_eq!(tab.title, "Project notes");
        assert_eq!(tab.url, "https://chatgpt.com/c/42");
        assert_eq!(display.view().tabs[0], tab);
        assert_eq!(display.push_count(), 3);
    }

    #[test]
    fn test_empty_title_projects_placeholder() {
        let (mut reg, _, _) = with_tabs(1);
        reg.dispatch(1, SurfaceEvent::TitleChanged(String::new()));
        assert_eq!(reg.get(1).unwrap().title, "ChatGPT");
    }

    #[rstest]
    #[case(SurfaceEvent::CrashedAbnormally)]
    #[case(SurfaceEvent::Unresponsive)]
    fn test_faults_reload_live_surface(#[case] event: SurfaceEvent) {
        let (mut reg, factory, display) = with_tabs(1);
        let before = display.push_count();
        reg.dispatch(1, event);
        assert_eq!(factory.surface(1).reloads(), 1);
        assert_eq!(display.push_count(), before);
    }

    #[test]
    fn test_faults_on_dead_surface_do_nothing() {
        let (mut reg, factory, _) = with_tabs(1);
        factory.surface(1).kill();
        reg.dispatch(1, SurfaceEvent::CrashedAbnormally);
        assert_eq!(factory.surface(1).reloads(), 0);
        assert_eq!(reg.active_id(), Some(1));
    }

    #[test]
    fn test_new_surface_request_opens_tab() {
        let (mut reg, factory, _) = with_tabs(1);
        reg.dispatch(1, SurfaceEvent::RequestedNewSurface("https://openai.com/".to_string()));
        assert_eq!(reg.ids(), vec![1, 2]);
        assert_eq!(reg.active_id(), Some(2));
        assert_eq!(factory.surface(2).loads(), vec!["https://openai.com/"]);
        assert!(factory.surface(1).loads().iter().all(|u| u != "https://openai.com/"));
    }

    #[test]
    fn test_events_for_closed_tab_are_dropped() {
        let (mut reg, _, display) = with_tabs(2);
        reg.close(1);
        let before = display.push_count();
        reg.dispatch(1, SurfaceEvent::TitleChanged("late".to_string()));
        assert_eq!(display.push_count(), before);
    }

    #[test]
    fn test_find_goes_to_active_surface_only() {
        let (mut reg, factory, _) = with_tabs(2);
        reg.execute(ShellCommand::FindInPage("tokio".to_string()));
        reg.execute(ShellCommand::StopFindInPage);
        assert_eq!(factory.surface(2).finds(), vec!["tokio"]);
        assert_eq!(factory.surface(2).stop_finds(), 1);
        assert!(factory.surface(1).finds().is_empty());
    }

    #[test]
    fn test_find_on_dead_surface_is_harmless() {
        let (reg, factory, _) = with_tabs(1);
        factory.surface(1).kill();
        reg.find_in_page("anything");
        reg.stop_find_in_page();
        assert_eq!(reg.active_id(), Some(1));
        assert!(factory.surface(1).finds().is_empty());
    }

    #[test]
    fn test_find_without_tabs_is_noop() {
        let (reg, _, _) = registry();
        reg.find_in_page("x");
        reg.stop_find_in_page();
        assert_eq!(reg.active_id(), None);
    }

    #[test]
    fn test_resize_updates_mounted_bounds() {
        let (mut reg, factory, _) = with_tabs(1);
        reg.resize(1000, 500, 2.0);
        let bounds = factory.surface(1).last_bounds().unwrap();
        assert_eq!((bounds.y, bounds.width, bounds.height), (84, 1000, 416));
    }
}
