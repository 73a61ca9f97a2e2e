use crate::model;
use eframe::egui;

mod actions;
mod geometry;
mod interaction;
mod persistence;
mod render;
mod settings;
mod update;

/// Screen-space pan and zoom over the world-space diagram. The gesture
/// machine and the model only ever see world coordinates.
#[derive(Clone, Copy, Debug)]
struct View {
    pan_screen: egui::Vec2,
    zoom: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            pan_screen: egui::Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl View {
    fn world_to_screen(&self, origin: egui::Pos2, world: egui::Pos2) -> egui::Pos2 {
        origin + self.pan_screen + world.to_vec2() * self.zoom
    }

    fn screen_to_world(&self, origin: egui::Pos2, screen: egui::Pos2) -> egui::Pos2 {
        ((screen - origin - self.pan_screen) / self.zoom).to_pos2()
    }

    fn zoom_about_screen_point(
        &mut self,
        origin: egui::Pos2,
        screen_point: egui::Pos2,
        zoom_delta: f32,
    ) {
        let before = self.screen_to_world(origin, screen_point);
        self.zoom = (self.zoom * zoom_delta).clamp(0.1, 8.0);
        let after_screen = self.world_to_screen(origin, before);
        self.pan_screen += screen_point - after_screen;
    }
}

pub struct CanvasApp {
    diagram: model::Diagram,
    interaction: interaction::Interaction,
    view: View,
    last_pointer_world: Option<egui::Pos2>,
    file_path: String,
    settings_path: String,
    show_grid: bool,
    status: Option<String>,
}

impl CanvasApp {
    fn config_path() -> Option<String> {
        if let Some(home) = std::env::var_os("HOME") {
            let path = std::path::PathBuf::from(home)
                .join(".config")
                .join("ireko.toml");
            if path.exists() {
                return Some(path.display().to_string());
            }
        }
        if std::path::Path::new("settings.toml").exists() {
            return Some("settings.toml".to_string());
        }
        None
    }

    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings_path = Self::config_path().unwrap_or_else(|| "settings.toml".to_string());
        let settings = settings::load_settings(&settings_path).unwrap_or_default();

        let mut interaction = interaction::Interaction::default();
        interaction.node_radius = settings.node_radius;

        Self {
            diagram: model::Diagram::new(),
            interaction,
            view: View::default(),
            last_pointer_world: None,
            file_path: settings.file_path,
            settings_path,
            show_grid: settings.show_grid,
            status: None,
        }
    }
}
