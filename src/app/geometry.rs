use crate::model;
use eframe::egui;

/// Half the capture distance around a connection node. A pointer within
/// `2 * radius` of a node grabs it.
pub(crate) const DEFAULT_NODE_RADIUS: f32 = 5.0;

/// The in-place text editor opens when a click lands in this fixed-size
/// region centered on the box. It approximates the label bounds; actual text
/// metrics are not consulted.
pub(crate) const TEXT_REGION_WIDTH: f32 = 100.0;
pub(crate) const TEXT_REGION_HEIGHT: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ConnectionNode {
    pub position: model::NodePosition,
    pub pos: egui::Pos2,
}

/// Midpoints of the four sides, in the fixed top/right/bottom/left order.
pub(crate) fn connection_nodes(b: &model::DiagramBox) -> [ConnectionNode; 4] {
    model::NodePosition::ALL.map(|position| ConnectionNode {
        position,
        pos: node_point(b, position),
    })
}

pub(crate) fn node_point(b: &model::DiagramBox, position: model::NodePosition) -> egui::Pos2 {
    let rect = b.rect();
    match position {
        model::NodePosition::Top => egui::pos2(rect.center().x, rect.min.y),
        model::NodePosition::Right => egui::pos2(rect.max.x, rect.center().y),
        model::NodePosition::Bottom => egui::pos2(rect.center().x, rect.max.y),
        model::NodePosition::Left => egui::pos2(rect.min.x, rect.center().y),
    }
}

/// First box in insertion order containing the point. Bounds are inclusive,
/// so a point exactly on an edge hits; when boxes overlap the earlier one
/// wins.
pub(crate) fn box_at(level: &model::Level, pos: egui::Pos2) -> Option<&model::DiagramBox> {
    level.boxes.iter().find(|b| {
        pos.x >= b.x && pos.x <= b.x + b.width && pos.y >= b.y && pos.y <= b.y + b.height
    })
}

/// First connection node (fixed order) within `2 * radius` of the point,
/// boundary included. No ranking between candidates; the scan order decides.
pub(crate) fn nearest_node(
    pos: egui::Pos2,
    b: &model::DiagramBox,
    radius: f32,
) -> Option<ConnectionNode> {
    connection_nodes(b)
        .into_iter()
        .find(|node| node.pos.distance(pos) <= radius * 2.0)
}

/// Unbounded variant: the node closest to the point regardless of distance.
/// Used to pick a start anchor when connecting was armed from the toolbar
/// and the first click lands on a box body rather than on a node.
pub(crate) fn closest_node(pos: egui::Pos2, b: &model::DiagramBox) -> ConnectionNode {
    let nodes = connection_nodes(b);
    let mut best = nodes[0];
    for node in &nodes[1..] {
        if node.pos.distance(pos) < best.pos.distance(pos) {
            best = *node;
        }
    }
    best
}

pub(crate) fn point_in_text_region(pos: egui::Pos2, b: &model::DiagramBox) -> bool {
    text_region_rect(b).contains(pos)
}

pub(crate) fn text_region_rect(b: &model::DiagramBox) -> egui::Rect {
    egui::Rect::from_center_size(
        b.rect().center(),
        egui::vec2(TEXT_REGION_WIDTH, TEXT_REGION_HEIGHT),
    )
}
