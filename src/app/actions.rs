use crate::model;

use super::{CanvasApp, persistence, settings};

/// Fixed position for toolbar-created boxes; nudged when the level already
/// has content so stacked boxes stay distinguishable.
const TOOLBAR_BOX_POS: (f32, f32) = (50.0, 50.0);
const TOOLBAR_BOX_NUDGE: f32 = 20.0;

impl CanvasApp {
    pub(super) fn request_add_box(&mut self) {
        let (mut x, mut y) = TOOLBAR_BOX_POS;
        let occupied = self
            .diagram
            .current_level()
            .is_some_and(|l| !l.boxes.is_empty());
        if occupied {
            x += TOOLBAR_BOX_NUDGE;
            y += TOOLBAR_BOX_NUDGE;
        }
        let (next, _) = self.diagram.add_box(x, y);
        self.diagram = next;
    }

    pub(super) fn request_start_connecting(&mut self) {
        self.interaction.arm_connecting();
    }

    pub(super) fn request_navigate_back(&mut self) {
        self.diagram = self.diagram.navigate_back();
        self.interaction.reset();
    }

    /// Labels along the zoom path, root first, current level last. Each
    /// non-root level is named after its owning box in the enclosing level.
    pub(super) fn breadcrumb(&self) -> Vec<String> {
        let mut trail: Vec<u64> = self.diagram.level_stack.clone();
        trail.push(self.diagram.current_level_id);
        trail
            .into_iter()
            .map(|id| {
                if id == model::ROOT_LEVEL_ID {
                    return "Root".to_string();
                }
                self.diagram
                    .level(id)
                    .and_then(|l| l.parent_id)
                    .and_then(|parent| self.diagram.level(parent))
                    .and_then(|parent| parent.box_by_id(id))
                    .map(|b| b.text.clone())
                    .unwrap_or_else(|| format!("Box {id}"))
            })
            .collect()
    }

    pub(super) fn save_to_path(&mut self) {
        match persistence::save_to_file(&self.file_path, &self.diagram) {
            Ok(()) => {
                log::info!("saved diagram to {}", self.file_path);
                self.status = Some(format!("Saved {}", self.file_path));
            }
            Err(e) => {
                log::warn!("save to {} failed: {e}", self.file_path);
                self.status = Some(format!("Save failed: {e}"));
            }
        }
    }

    /// Loads from the quick path. The current diagram is replaced only when
    /// the whole document parses and validates.
    pub(super) fn load_from_path(&mut self) {
        match persistence::load_from_file(&self.file_path) {
            Ok(diagram) => {
                log::info!("loaded diagram from {}", self.file_path);
                self.diagram = diagram;
                self.interaction.reset();
                self.status = Some(format!("Loaded {}", self.file_path));
            }
            Err(e) => {
                log::warn!("load from {} failed: {e}", self.file_path);
                self.status = Some(format!("Load failed: {e}"));
            }
        }
    }

    pub(super) fn save_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name("diagram.json")
            .add_filter("JSON", &["json"])
            .save_file()
        {
            self.file_path = path.display().to_string();
            self.save_to_path();
            self.persist_settings();
        }
    }

    pub(super) fn open_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            self.file_path = path.display().to_string();
            self.load_from_path();
            self.persist_settings();
        }
    }

    pub(super) fn persist_settings(&mut self) {
        let snapshot = settings::AppSettings {
            file_path: self.file_path.clone(),
            show_grid: self.show_grid,
            node_radius: self.interaction.node_radius,
        };
        if let Err(e) = settings::save_settings(&self.settings_path, &snapshot) {
            log::warn!("settings save failed: {e}");
            self.status = Some(format!("Settings save failed: {e}"));
        }
    }
}
