use crate::model;
use eframe::egui;

use super::View;
use super::geometry::{connection_nodes, node_point};

const DEFAULT_FILL: egui::Color32 = egui::Color32::WHITE;
const DEFAULT_BORDER: egui::Color32 = egui::Color32::from_rgb(30, 30, 30);
const LABEL_COLOR: egui::Color32 = egui::Color32::from_rgb(30, 30, 30);
const NODE_MARKER: egui::Color32 = egui::Color32::from_rgb(90, 160, 255);
const NODE_MARKER_ACTIVE: egui::Color32 = egui::Color32::from_rgb(230, 120, 40);
const RUBBER_BAND: egui::Color32 = egui::Color32::from_rgb(120, 120, 120);

/// A line of the level with both endpoints resolved to world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ResolvedLine {
    pub start: egui::Pos2,
    pub end: egui::Pos2,
}

/// Lines in draw order with endpoint coordinates resolved against the
/// level's boxes. A line referencing a missing box is silently skipped
/// rather than treated as an error.
pub(crate) fn resolved_lines(level: &model::Level) -> Vec<ResolvedLine> {
    level
        .lines
        .iter()
        .filter_map(|line| {
            let start_box = level.box_by_id(line.start_box_id)?;
            let end_box = level.box_by_id(line.end_box_id)?;
            Some(ResolvedLine {
                start: node_point(start_box, line.start_position),
                end: node_point(end_box, line.end_position),
            })
        })
        .collect()
}

pub(crate) fn draw_background(
    painter: &egui::Painter,
    rect: egui::Rect,
    view: &View,
    show_grid: bool,
) {
    let bg = painter.ctx().style().visuals.extreme_bg_color;
    painter.rect_filled(rect, 0.0, bg);
    if !show_grid {
        return;
    }
    let grid_color = egui::Color32::from_gray(60);
    let spacing_world = 64.0;
    let spacing_screen = spacing_world * view.zoom;
    if spacing_screen >= 24.0 {
        let start = rect.min + view.pan_screen;
        let x0 = ((rect.min.x - start.x) / spacing_screen).floor() * spacing_screen + start.x;
        let y0 = ((rect.min.y - start.y) / spacing_screen).floor() * spacing_screen + start.y;
        let mut x = x0;
        while x < rect.max.x {
            painter.line_segment(
                [egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)],
                egui::Stroke::new(1.0, grid_color),
            );
            x += spacing_screen;
        }
        let mut y = y0;
        while y < rect.max.y {
            painter.line_segment(
                [egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)],
                egui::Stroke::new(1.0, grid_color),
            );
            y += spacing_screen;
        }
    }
}

/// Paints one level: lines (with arrowheads) first, then boxes on top, with
/// connection-node markers on the hovered box only.
pub(crate) fn draw_level(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    level: &model::Level,
    hovered_box: Option<u64>,
    hovered_node: Option<model::NodePosition>,
    node_radius: f32,
) {
    let stroke = egui::Stroke::new(2.0 * view.zoom, DEFAULT_BORDER);
    for line in resolved_lines(level) {
        let a = view.world_to_screen(origin, line.start);
        let b = view.world_to_screen(origin, line.end);
        painter.line_segment([a, b], stroke);
        draw_arrowhead(painter, a, b, stroke);
    }

    for b in &level.boxes {
        draw_box(painter, origin, view, b);
        if hovered_box == Some(b.id) {
            draw_node_markers(painter, origin, view, b, hovered_node, node_radius);
        }
    }
}

fn draw_box(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    b: &model::DiagramBox,
) {
    let rect = egui::Rect::from_min_max(
        view.world_to_screen(origin, b.rect().min),
        view.world_to_screen(origin, b.rect().max),
    );
    let fill = b
        .style
        .background_color
        .map(model::Rgba::to_color32)
        .unwrap_or(DEFAULT_FILL);
    let border = b
        .style
        .border_color
        .map(model::Rgba::to_color32)
        .unwrap_or(DEFAULT_BORDER);
    let rounding = 4.0 * view.zoom;
    painter.rect_filled(rect, rounding, fill);
    painter.rect_stroke(
        rect,
        rounding,
        egui::Stroke::new(2.0 * view.zoom, border),
        egui::StrokeKind::Middle,
    );
    if !b.text.is_empty() {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            &b.text,
            egui::FontId::proportional(14.0 * view.zoom),
            LABEL_COLOR,
        );
    }
}

fn draw_node_markers(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    b: &model::DiagramBox,
    hovered_node: Option<model::NodePosition>,
    node_radius: f32,
) {
    for node in connection_nodes(b) {
        let center = view.world_to_screen(origin, node.pos);
        let active = hovered_node == Some(node.position);
        let color = if active { NODE_MARKER_ACTIVE } else { NODE_MARKER };
        painter.circle_filled(center, node_radius * view.zoom, color);
        painter.circle_stroke(
            center,
            node_radius * view.zoom,
            egui::Stroke::new(1.0, DEFAULT_BORDER),
        );
    }
}

/// Preview from the bound start node to the pointer while connecting. Render
/// state only; nothing is written to the level until the second node click.
pub(crate) fn draw_rubber_band(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    level: &model::Level,
    start: (u64, model::NodePosition),
    pointer_world: egui::Pos2,
) {
    let Some(start_box) = level.box_by_id(start.0) else {
        return;
    };
    let a = view.world_to_screen(origin, node_point(start_box, start.1));
    let b = view.world_to_screen(origin, pointer_world);
    painter.line_segment([a, b], egui::Stroke::new(1.5 * view.zoom, RUBBER_BAND));
}

fn draw_arrowhead(painter: &egui::Painter, a: egui::Pos2, b: egui::Pos2, stroke: egui::Stroke) {
    let v = b - a;
    if v.length_sq() <= f32::EPSILON {
        return;
    }
    let dir = v.normalized();
    let size = 10.0;
    let perp = egui::vec2(-dir.y, dir.x);
    let tip = b;
    let base = b - dir * size;
    let left = base + perp * (size * 0.6);
    let right = base - perp * (size * 0.6);
    painter.add(egui::Shape::convex_polygon(
        vec![tip, left, right],
        stroke.color,
        egui::Stroke::NONE,
    ));
}
