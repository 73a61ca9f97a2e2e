use eframe::egui;

use super::{CanvasApp, geometry, render};

impl eframe::App for CanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.input_mut(|i| {
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::S) {
                self.save_to_path();
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::O) {
                self.load_from_path();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Escape) {
                if self.interaction.editing_box_id().is_some() {
                    self.interaction.cancel_text_edit();
                } else {
                    self.interaction.reset();
                }
            }
        });

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Add Box").clicked() {
                    self.request_add_box();
                }
                let armed = self.interaction.is_connecting();
                if ui.selectable_label(armed, "Connect").clicked() {
                    if armed {
                        self.interaction.reset();
                    } else {
                        self.request_start_connecting();
                    }
                }
                let can_go_back = !self.diagram.level_stack.is_empty();
                if ui
                    .add_enabled(can_go_back, egui::Button::new("Back"))
                    .clicked()
                {
                    self.request_navigate_back();
                }
                ui.separator();
                if ui.button("Save…").clicked() {
                    self.save_dialog();
                }
                if ui.button("Open…").clicked() {
                    self.open_dialog();
                }
                ui.separator();
                for (i, name) in self.breadcrumb().into_iter().enumerate() {
                    if i > 0 {
                        ui.label("›");
                    }
                    ui.label(name);
                }
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.checkbox(&mut self.show_grid, "Grid").changed() {
                    self.persist_settings();
                }
                ui.separator();
                ui.label("Path:");
                if ui.text_edit_singleline(&mut self.file_path).changed() {
                    self.persist_settings();
                }
                if ui.small_button("Quick Save").clicked() {
                    self.save_to_path();
                }
                if ui.small_button("Quick Load").clicked() {
                    self.load_from_path();
                }
                ui.separator();
                if let Some(status) = &self.status {
                    ui.label(status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
            let origin = rect.min;
            let painter = ui.painter_at(rect);

            let scroll_delta = ctx.input(|i| i.raw_scroll_delta.y);
            if scroll_delta.abs() > 0.0 {
                if let Some(hover_pos) = ctx.input(|i| i.pointer.hover_pos()) {
                    if rect.contains(hover_pos) {
                        let zoom_delta = (1.0 + scroll_delta * 0.001).clamp(0.8, 1.25);
                        self.view
                            .zoom_about_screen_point(origin, hover_pos, zoom_delta);
                    }
                }
            }
            if response.dragged_by(egui::PointerButton::Middle) {
                self.view.pan_screen += response.drag_delta();
            }

            let pointer_pos = ctx.input(|i| i.pointer.interact_pos());
            let pointer_world = pointer_pos.map(|p| self.view.screen_to_world(origin, p));
            self.last_pointer_world = pointer_world;

            let pressed =
                response.drag_started_by(egui::PointerButton::Primary) || response.clicked();

            // A press anywhere on the canvas blurs an open text editor; the
            // draft commits before the press is routed as a new gesture.
            if (pressed || response.double_clicked())
                && self.interaction.editing_box_id().is_some()
            {
                if let Some(next) = self.interaction.commit_text_edit(&self.diagram) {
                    self.diagram = next;
                }
            }

            // Click multiplicity comes from the platform; no manual timing.
            let mut handled_double_click = false;
            if response.double_clicked() {
                if let Some(p) = pointer_world {
                    if let Some(next) = self.interaction.pointer_down(&self.diagram, p, true) {
                        self.diagram = next;
                    }
                    handled_double_click = true;
                }
            }
            if pressed && !handled_double_click {
                if let Some(p) = pointer_world {
                    if let Some(next) = self.interaction.pointer_down(&self.diagram, p, false) {
                        self.diagram = next;
                    }
                }
            }

            // Drag motion only applies while the button is actually held;
            // every other frame the move is just hover tracking.
            if let (Some(pos), Some(world)) = (pointer_pos, pointer_world) {
                if rect.contains(pos) && (!self.interaction.is_dragging() || response.dragged()) {
                    if let Some(next) = self.interaction.pointer_move(&self.diagram, world) {
                        self.diagram = next;
                    }
                }
            }
            // A plain click is a press and a release on the same frame, and
            // `drag_stopped` never fires for it.
            if response.clicked() || response.drag_stopped() {
                self.interaction.pointer_up();
            }

            render::draw_background(&painter, rect, &self.view, self.show_grid);
            if let Some(level) = self.diagram.current_level() {
                render::draw_level(
                    &painter,
                    origin,
                    &self.view,
                    level,
                    self.interaction.hovered_box,
                    self.interaction.hovered_node,
                    self.interaction.node_radius,
                );
                if let (Some(start), Some(p)) =
                    (self.interaction.connecting_start(), self.last_pointer_world)
                {
                    render::draw_rubber_band(&painter, origin, &self.view, level, start, p);
                }
            }

            self.text_editor_overlay(ctx, ui, origin);
        });
    }
}

impl CanvasApp {
    /// In-place label editor: a floating single-line edit positioned over
    /// the box's text region. Enter or focus loss commits the draft.
    fn text_editor_overlay(&mut self, ctx: &egui::Context, ui: &egui::Ui, origin: egui::Pos2) {
        let Some(box_id) = self.interaction.editing_box_id() else {
            return;
        };
        let Some(b) = self
            .diagram
            .current_level()
            .and_then(|l| l.box_by_id(box_id))
        else {
            self.interaction.cancel_text_edit();
            return;
        };
        let region = geometry::text_region_rect(b);
        let screen = egui::Rect::from_min_max(
            self.view.world_to_screen(origin, region.min),
            self.view.world_to_screen(origin, region.max),
        );

        let mut commit = false;
        let area_id = ui.id().with("box_text_edit");
        egui::Area::new(area_id)
            .fixed_pos(screen.min)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let frame = egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(255, 255, 255, 240))
                    .stroke(egui::Stroke::new(
                        1.0,
                        egui::Color32::from_rgb(90, 160, 255),
                    ))
                    .inner_margin(4.0);
                frame.show(ui, |ui| {
                    let Some(draft) = self.interaction.edit_draft_mut() else {
                        return;
                    };
                    let response = ui.add(
                        egui::TextEdit::singleline(draft)
                            .desired_width(screen.width().max(120.0))
                            .frame(false),
                    );
                    if response.lost_focus() {
                        commit = true;
                    } else {
                        response.request_focus();
                    }
                });
            });

        if commit {
            if let Some(next) = self.interaction.commit_text_edit(&self.diagram) {
                self.diagram = next;
            }
        }
    }
}
