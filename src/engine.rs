//! The overlay engine: one owned context holding every piece of mutable state
//!
//! All mutation happens either inside `tick` or through the discrete action
//! methods below; every state change is written through to the config file.

use anyhow::Result;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

use crate::category::Category;
use crate::color::Rgb;
use crate::config::{clamp_scale, ConfigStore, Settings};
use crate::constants::{hover, scale};
use crate::hotkeys::KeyPoller;
use crate::input::{Action, InputEdgeDetector};
use crate::poi::{find_hovered, Dataset, HoverHit, NormalizedPoint, PointCache};
use crate::style::TypeSpecs;
use crate::types::{MapProfile, ScreenRect};
use crate::x11_utils::PointerSource;

pub struct OverlayEngine {
    store: ConfigStore,
    specs: TypeSpecs,
    cache: PointCache,
    input: InputEdgeDetector,
    screen: (u32, u32),
    rect: ScreenRect,
    hover: Option<HoverHit>,
}

impl OverlayEngine {
    pub fn new(dataset: &Dataset, specs: TypeSpecs, store: ConfigStore, screen: (u32, u32)) -> Self {
        let cache = PointCache::build(dataset);
        let rect = store
            .config
            .rect_ratio(store.config.settings.selected_map)
            .to_screen_rect(screen.0, screen.1);
        Self {
            store,
            specs,
            cache,
            input: InputEdgeDetector::new(),
            screen,
            rect,
            hover: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.store.config.settings
    }

    fn settings_mut(&mut self) -> &mut Settings {
        &mut self.store.config.settings
    }

    pub fn specs(&self) -> &TypeSpecs {
        &self.specs
    }

    pub fn current_map(&self) -> MapProfile {
        self.settings().selected_map
    }

    /// Cached points of one category on the selected map
    pub fn points(&self, category: Category) -> &[NormalizedPoint] {
        self.cache.points(self.current_map(), category)
    }

    pub fn rect(&self) -> ScreenRect {
        self.rect
    }

    pub fn hover(&self) -> Option<&HoverHit> {
        self.hover.as_ref()
    }

    /// Master on and overlay visible
    pub fn is_shown(&self) -> bool {
        self.settings().master_on && self.settings().visible_overlay
    }

    /// One control-loop iteration
    pub fn tick(&mut self, keys: &dyn KeyPoller, pointer: &dyn PointerSource) -> Result<()> {
        let actions = self.input.poll(keys);

        for action in &actions {
            match *action {
                Action::ToggleMaster => self.toggle_master(),
                Action::HideOverlay => {
                    if self.settings().visible_overlay {
                        self.set_visible(false);
                    }
                }
                Action::ToggleVisible => {
                    if self.settings().master_on {
                        self.toggle_visible();
                    }
                }
                Action::SwitchMap(map) => {
                    if self.is_shown() && self.settings().enable_num_switch {
                        self.switch_map(map);
                    }
                }
                // Needs this tick's hover result
                Action::HideHovered => {}
            }
        }

        self.refresh_hover(pointer)?;

        if actions.contains(&Action::HideHovered) {
            self.hide_hovered();
        }
        Ok(())
    }

    /// Run a tick, absorbing errors and panics so the loop keeps going
    ///
    /// State stays as of the last mutation that completed.
    pub fn tick_safe(&mut self, keys: &dyn KeyPoller, pointer: &dyn PointerSource) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.tick(keys, pointer))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = ?e, "Overlay tick failed"),
            Err(_) => error!("Overlay tick panicked"),
        }
    }

    fn refresh_hover(&mut self, pointer: &dyn PointerSource) -> Result<()> {
        let previous = self.hover.take();
        if !self.is_shown() {
            return Ok(());
        }

        let position = pointer.position()?;
        let settings = &self.store.config.settings;
        let Some(points) = self.cache.map_points(settings.selected_map) else {
            return Ok(());
        };
        self.hover = find_hovered(
            settings.selected_map,
            points,
            self.rect,
            position,
            |category| settings.types[category].enabled,
            &settings.hidden,
            hover::RADIUS_PX,
        );

        let key = |hit: &HoverHit| (hit.category, hit.identity());
        if self.hover.as_ref().map(key) != previous.as_ref().map(key) {
            match &self.hover {
                Some(hit) => debug!(
                    kind = %self.specs[hit.category].label,
                    id = %hit.identity(),
                    item = %hit.point.payload,
                    "Hovering POI"
                ),
                None => debug!("Hover cleared"),
            }
        }
        Ok(())
    }

    /// Write-through; failures are logged and the in-memory state stays authoritative
    fn save(&self) {
        if let Err(e) = self.store.persist() {
            warn!(path = ?self.store.path(), error = ?e, "Failed to save config");
        }
    }

    fn apply_rect(&mut self) {
        let map = self.current_map();
        self.rect = self
            .store
            .config
            .rect_ratio(map)
            .to_screen_rect(self.screen.0, self.screen.1);
    }

    pub fn toggle_master(&mut self) {
        let settings = self.settings_mut();
        settings.master_on = !settings.master_on;
        if !settings.master_on && settings.visible_overlay {
            settings.visible_overlay = false;
        }
        if !self.is_shown() {
            self.hover = None;
        }
        info!(master_on = self.settings().master_on, visible = self.settings().visible_overlay, "Toggled master");
        self.save();
    }

    pub fn toggle_visible(&mut self) {
        let visible = !self.settings().visible_overlay;
        self.set_visible(visible);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.settings_mut().visible_overlay = visible;
        if !visible {
            self.hover = None;
        }
        info!(visible = visible, "Overlay visibility changed");
        self.save();
    }

    /// Select a map; a no-op when it is already selected
    pub fn switch_map(&mut self, map: MapProfile) -> bool {
        if map == self.current_map() {
            return false;
        }
        self.settings_mut().selected_map = map;
        self.apply_rect();
        self.hover = None;
        info!(map = %map, rect = ?self.rect, "Switched map");
        self.save();
        true
    }

    /// Hide the hovered POI in its hovered category only
    pub fn hide_hovered(&mut self) -> bool {
        let Some(hit) = self.hover.take() else {
            return false;
        };
        let id = hit.identity();
        self.settings_mut().hidden.hide(hit.category, id.clone());
        info!(map = %hit.map, category = %hit.category, kind = %self.specs[hit.category].label, id = %id, "Hid POI");
        self.save();
        true
    }

    pub fn unhide(&mut self, category: Category, id: &str) -> bool {
        let removed = self.settings_mut().hidden.unhide(category, id);
        if removed {
            info!(category = %category, id = %id, "Unhid POI");
            self.save();
        }
        removed
    }

    pub fn reset_hidden(&mut self) {
        self.settings_mut().hidden.reset();
        self.hover = None;
        info!("Cleared all hidden POIs");
        self.save();
    }

    pub fn set_num_switch(&mut self, enabled: bool) {
        self.settings_mut().enable_num_switch = enabled;
        info!(enabled = enabled, "Number key map switching changed");
        self.save();
    }

    pub fn set_type_enabled(&mut self, category: Category, enabled: bool) {
        self.settings_mut().types[category].enabled = enabled;
        if !enabled && self.hover.as_ref().is_some_and(|h| h.category == category) {
            self.hover = None;
        }
        info!(category = %category, enabled = enabled, "Category visibility changed");
        self.save();
    }

    pub fn set_type_color(&mut self, category: Category, color: Rgb) {
        self.settings_mut().types[category].color = Some(color);
        info!(category = %category, color = %color.to_hex_string(), "Category color changed");
        self.save();
    }

    /// Returns the clamped value actually stored
    pub fn set_global_scale(&mut self, value: f64) -> f64 {
        let clamped = clamp_scale(value);
        self.settings_mut().global_scale = clamped;
        info!(requested = value, global_scale = clamped, "Global scale changed");
        self.save();
        clamped
    }

    /// Step the scale by `steps` increments of 0.05, kept to two decimals
    pub fn nudge_scale(&mut self, steps: i32) -> f64 {
        let next = self.settings().global_scale + f64::from(steps) * scale::STEP;
        self.set_global_scale((next * 100.0).round() / 100.0)
    }

    /// Re-enable every category and restore style colors
    pub fn reset_type_defaults(&mut self) {
        self.store.config.settings.reset_types(&self.specs);
        info!("Restored default category colors");
        self.save();
    }

    /// Display resolution changed; hides stay valid since identities ignore it
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen = (width, height);
        self.apply_rect();
        self.hover = None;
    }

    /// Replace every cached point list from a freshly loaded dataset
    pub fn rebuild_cache(&mut self, dataset: &Dataset) {
        self.cache.rebuild(dataset);
        self.hover = None;
        info!("Rebuilt point cache");
    }

    /// Persist once more (used on shutdown)
    pub fn flush(&self) {
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkeys::{Key, KeySnapshot};
    use crate::input::HIDE_HOVERED_CHORD;
    use crate::poi::identity;
    use crate::style::build_type_specs;
    use serde_json::json;
    use std::cell::Cell;

    struct FakePointer {
        at: Cell<(f64, f64)>,
        queries: Cell<usize>,
    }

    impl FakePointer {
        fn at(x: f64, y: f64) -> Self {
            Self {
                at: Cell::new((x, y)),
                queries: Cell::new(0),
            }
        }
    }

    impl PointerSource for FakePointer {
        fn position(&self) -> Result<(f64, f64)> {
            self.queries.set(self.queries.get() + 1);
            Ok(self.at.get())
        }
    }

    struct BrokenPointer;

    impl PointerSource for BrokenPointer {
        fn position(&self) -> Result<(f64, f64)> {
            anyhow::bail!("display went away")
        }
    }

    struct PanickingPointer;

    impl PointerSource for PanickingPointer {
        fn position(&self) -> Result<(f64, f64)> {
            panic!("pointer backend exploded")
        }
    }

    fn keys(pressed: &[Key]) -> KeySnapshot {
        KeySnapshot::from_keys(pressed.iter().copied())
    }

    fn none() -> KeySnapshot {
        KeySnapshot::default()
    }

    fn chord() -> KeySnapshot {
        keys(&HIDE_HOVERED_CHORD)
    }

    fn dataset() -> Dataset {
        Dataset::from_json(json!([
            {"i": 0, "r": {
                "towers": [{"c": [100, 200]}],
                "armories": [{"c": [2000, 2000]}],
                "spawns": [{"c": [4000, 10]}]
            }},
            {"i": 1, "r": {"beetles": [{"c": [50, 50]}]}}
        ]))
        .unwrap()
    }

    /// Engine on a 4095x4095 screen with a full-screen rect on every map
    fn engine_with(store: ConfigStore) -> OverlayEngine {
        let mut engine = OverlayEngine::new(&dataset(), build_type_specs(&json!({})), store, (4095, 4095));
        for entry in engine.store.config.profiles.maps.values_mut() {
            entry.rect_ratio = crate::types::RectRatio { rx: 0.0, ry: 0.0, rw: 1.0, rh: 1.0 };
        }
        engine.apply_rect();
        engine
    }

    fn engine() -> OverlayEngine {
        engine_with(ConfigStore::in_memory(&build_type_specs(&json!({}))))
    }

    /// Screen position of the first point of `category` on the current map
    fn screen_pos(engine: &OverlayEngine, category: Category) -> (f64, f64) {
        let point = &engine.points(category)[0];
        engine.rect().project(point.u, point.v)
    }

    fn show(engine: &mut OverlayEngine) {
        engine.tick(&keys(&[Key::Tab]), &FakePointer::at(-100.0, -100.0)).unwrap();
        engine.tick(&none(), &FakePointer::at(-100.0, -100.0)).unwrap();
        assert!(engine.is_shown());
    }

    #[test]
    fn test_tab_toggles_visibility_once_per_press() {
        let mut engine = engine();
        let pointer = FakePointer::at(0.0, 0.0);
        assert!(!engine.settings().visible_overlay);
        engine.tick(&keys(&[Key::Tab]), &pointer).unwrap();
        assert!(engine.settings().visible_overlay);
        engine.tick(&keys(&[Key::Tab]), &pointer).unwrap();
        assert!(engine.settings().visible_overlay);
        engine.tick(&none(), &pointer).unwrap();
        engine.tick(&keys(&[Key::Tab]), &pointer).unwrap();
        assert!(!engine.settings().visible_overlay);
    }

    #[test]
    fn test_master_off_forces_hidden_and_disables_tab() {
        let mut engine = engine();
        show(&mut engine);
        let pointer = FakePointer::at(0.0, 0.0);

        engine.tick(&keys(&[Key::Backtick]), &pointer).unwrap();
        assert!(!engine.settings().master_on);
        assert!(!engine.settings().visible_overlay);

        engine.tick(&none(), &pointer).unwrap();
        engine.tick(&keys(&[Key::Tab]), &pointer).unwrap();
        assert!(!engine.settings().visible_overlay);
    }

    #[test]
    fn test_tab_edge_advances_while_master_off() {
        let mut engine = engine();
        let pointer = FakePointer::at(0.0, 0.0);
        engine.tick(&keys(&[Key::Backtick]), &pointer).unwrap();
        assert!(!engine.settings().master_on);

        // Tab held while master is off, then master comes back on with Tab still held
        engine.tick(&keys(&[Key::Tab]), &pointer).unwrap();
        engine.tick(&keys(&[Key::Tab, Key::Backtick]), &pointer).unwrap();
        assert!(engine.settings().master_on);
        assert!(!engine.settings().visible_overlay);
    }

    #[test]
    fn test_h_hides_only_when_visible() {
        let mut engine = engine();
        let pointer = FakePointer::at(0.0, 0.0);
        engine.tick(&keys(&[Key::H]), &pointer).unwrap();
        assert!(!engine.settings().visible_overlay);

        engine.tick(&none(), &pointer).unwrap();
        show(&mut engine);
        engine.tick(&keys(&[Key::H]), &pointer).unwrap();
        assert!(!engine.settings().visible_overlay);
    }

    #[test]
    fn test_number_keys_switch_only_when_shown_and_enabled() {
        let mut engine = engine();
        let pointer = FakePointer::at(0.0, 0.0);
        engine.tick(&keys(&[Key::Digit2]), &pointer).unwrap();
        assert_eq!(engine.current_map(), MapProfile::StillwaterBayou);

        show(&mut engine);
        engine.tick(&keys(&[Key::Digit2]), &pointer).unwrap();
        assert_eq!(engine.current_map(), MapProfile::DeSalle);
        // Held: re-applied every tick, idempotent
        engine.tick(&keys(&[Key::Digit2]), &pointer).unwrap();
        assert_eq!(engine.current_map(), MapProfile::DeSalle);

        engine.set_num_switch(false);
        engine.tick(&keys(&[Key::Digit4]), &pointer).unwrap();
        assert_eq!(engine.current_map(), MapProfile::DeSalle);
    }

    #[test]
    fn test_switch_map_is_idempotent() {
        let mut engine = engine();
        assert!(!engine.switch_map(MapProfile::StillwaterBayou));
        assert!(engine.switch_map(MapProfile::LawsonDelta));
        assert!(!engine.switch_map(MapProfile::LawsonDelta));
    }

    #[test]
    fn test_hover_requires_shown_overlay() {
        let mut engine = engine();
        let (x, y) = screen_pos(&engine, Category::Spawns);
        let pointer = FakePointer::at(x, y);
        engine.tick(&none(), &pointer).unwrap();
        assert!(engine.hover().is_none());
        assert_eq!(pointer.queries.get(), 0);

        show(&mut engine);
        engine.tick(&none(), &pointer).unwrap();
        assert_eq!(engine.hover().unwrap().category, Category::Spawns);
    }

    #[test]
    fn test_chord_hides_hovered_in_its_category_only() {
        let mut engine = engine();
        show(&mut engine);
        let (x, y) = screen_pos(&engine, Category::Towers);
        let pointer = FakePointer::at(x, y);

        engine.tick(&none(), &pointer).unwrap();
        // Union entries come first in declared order but towers, being later, wins the tie
        assert_eq!(engine.hover().unwrap().category, Category::Towers);

        engine.set_type_enabled(Category::Towers, false);
        engine.tick(&none(), &pointer).unwrap();
        assert_eq!(engine.hover().unwrap().category, Category::PossibleXp);

        engine.tick(&chord(), &pointer).unwrap();
        let hidden = &engine.settings().hidden;
        assert!(hidden.is_hidden(Category::PossibleXp, "towers:100:200"));
        assert!(!hidden.is_hidden(Category::Towers, "100:200"));

        // Held chord does not fire again, and the point is no longer hoverable in the union
        engine.tick(&chord(), &pointer).unwrap();
        assert!(engine.hover().is_none());

        engine.set_type_enabled(Category::Towers, true);
        engine.tick(&none(), &pointer).unwrap();
        assert_eq!(engine.hover().unwrap().category, Category::Towers);
    }

    #[test]
    fn test_chord_without_hover_is_noop_but_consumes_edge() {
        let mut engine = engine();
        show(&mut engine);
        let far = FakePointer::at(-500.0, -500.0);
        engine.tick(&chord(), &far).unwrap();
        assert_eq!(engine.settings().hidden, crate::poi::HiddenStateStore::new());

        // Moving onto a POI while still holding the chord must not hide it
        let (x, y) = screen_pos(&engine, Category::Spawns);
        engine.tick(&chord(), &FakePointer::at(x, y)).unwrap();
        assert_eq!(engine.settings().hidden.count(Category::Spawns), 0);
        assert!(engine.hover().is_some());
    }

    #[test]
    fn test_hide_survives_resolution_change() {
        let mut engine = engine();
        show(&mut engine);
        let (x, y) = screen_pos(&engine, Category::Spawns);
        let pointer = FakePointer::at(x, y);
        engine.tick(&none(), &pointer).unwrap();
        engine.tick(&chord(), &pointer).unwrap();

        engine.set_screen_size(1920, 1080);
        let (x, y) = screen_pos(&engine, Category::Spawns);
        engine.tick(&none(), &FakePointer::at(x, y)).unwrap();
        assert!(engine.hover().is_none());

        let point = &engine.points(Category::Spawns)[0];
        assert!(engine.settings().hidden.is_hidden(Category::Spawns, &identity(Category::Spawns, point)));
    }

    #[test]
    fn test_scale_actions_clamp() {
        let mut engine = engine();
        assert_eq!(engine.set_global_scale(0.02), 0.10);
        assert_eq!(engine.set_global_scale(9.0), 5.00);
        assert_eq!(engine.nudge_scale(1), 5.00);
        assert_eq!(engine.nudge_scale(-1), 4.95);
        engine.set_global_scale(1.0);
        assert_eq!(engine.nudge_scale(1), 1.05);
    }

    #[test]
    fn test_reset_type_defaults() {
        let mut engine = engine();
        let default_color = engine.settings().types[Category::Beetles].color;
        engine.set_type_color(Category::Beetles, Rgb::new(1, 2, 3));
        engine.set_type_enabled(Category::Spawns, false);
        engine.reset_type_defaults();
        assert_eq!(engine.settings().types[Category::Beetles].color, default_color);
        assert!(engine.settings().types[Category::Spawns].enabled);
    }

    #[test]
    fn test_reset_and_unhide() {
        let mut engine = engine();
        engine.settings_mut().hidden.hide(Category::Spawns, "1:1");
        engine.settings_mut().hidden.hide(Category::Towers, "2:2");
        assert!(engine.unhide(Category::Spawns, "1:1"));
        assert!(!engine.unhide(Category::Spawns, "1:1"));
        engine.reset_hidden();
        assert_eq!(engine.settings().hidden.count(Category::Towers), 0);
    }

    #[test]
    fn test_tick_errors_are_absorbed() {
        let mut engine = engine();
        show(&mut engine);
        engine.tick_safe(&keys(&[Key::Digit2]), &BrokenPointer);
        // Mutations before the failure are kept
        assert_eq!(engine.current_map(), MapProfile::DeSalle);
        assert!(engine.hover().is_none());

        engine.tick_safe(&none(), &PanickingPointer);
        engine.tick_safe(&keys(&[Key::H]), &FakePointer::at(0.0, 0.0));
        assert!(!engine.settings().visible_overlay);
    }

    #[test]
    fn test_actions_write_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let specs = build_type_specs(&json!({}));
        let mut engine = engine_with(ConfigStore::load(path.clone(), &specs));

        engine.switch_map(MapProfile::MammonsGulch);
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["settings"]["selected_map"], json!("Mammon's Gulch"));

        engine.set_global_scale(2.5);
        let reloaded = ConfigStore::load(path, &specs);
        assert_eq!(reloaded.config.settings.global_scale, 2.5);
        assert_eq!(reloaded.config.settings.selected_map, MapProfile::MammonsGulch);
    }

    #[test]
    fn test_rebuild_cache_replaces_points() {
        let mut engine = engine();
        show(&mut engine);
        let (x, y) = screen_pos(&engine, Category::Spawns);
        engine.tick(&none(), &FakePointer::at(x, y)).unwrap();
        assert!(engine.hover().is_some());

        let replacement = Dataset::from_json(json!([
            {"i": 0, "r": {"spawns": [{"c": [10, 10]}, {"c": [20, 20]}]}}
        ]))
        .unwrap();
        engine.rebuild_cache(&replacement);
        assert!(engine.hover().is_none());
        assert_eq!(engine.points(Category::Spawns).len(), 2);
        assert!(engine.points(Category::PossibleXp).is_empty());
    }
}
