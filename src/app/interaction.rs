use crate::model;
use eframe::egui;

use super::geometry::{
    DEFAULT_NODE_RADIUS, box_at, closest_node, nearest_node, point_in_text_region,
};

/// Mutually exclusive transient gesture layered over idle. None of this is
/// document state; it is never persisted.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Gesture {
    Idle,
    Dragging {
        box_id: u64,
        width: f32,
        height: f32,
    },
    /// `start` is bound the moment a node (or, for the toolbar entry, a box)
    /// is clicked. `None` means connecting was armed from the toolbar and no
    /// start box has been picked yet.
    Connecting {
        start: Option<(u64, model::NodePosition)>,
    },
    EditingText {
        box_id: u64,
        draft: String,
    },
}

/// Turns pointer and keyboard events into diagram mutations. Methods take
/// the current snapshot and return a replacement when a mutation happened;
/// hover and gesture state live here, outside the document.
#[derive(Clone, Debug)]
pub(crate) struct Interaction {
    pub gesture: Gesture,
    pub hovered_box: Option<u64>,
    pub hovered_node: Option<model::NodePosition>,
    pub node_radius: f32,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            gesture: Gesture::Idle,
            hovered_box: None,
            hovered_node: None,
            node_radius: DEFAULT_NODE_RADIUS,
        }
    }
}

impl Interaction {
    pub fn is_connecting(&self) -> bool {
        matches!(self.gesture, Gesture::Connecting { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Start anchor of an in-flight connection, for the rubber band.
    pub fn connecting_start(&self) -> Option<(u64, model::NodePosition)> {
        match self.gesture {
            Gesture::Connecting { start } => start,
            _ => None,
        }
    }

    pub fn editing_box_id(&self) -> Option<u64> {
        match &self.gesture {
            Gesture::EditingText { box_id, .. } => Some(*box_id),
            _ => None,
        }
    }

    /// Draft buffer the text-edit overlay binds to.
    pub fn edit_draft_mut(&mut self) -> Option<&mut String> {
        match &mut self.gesture {
            Gesture::EditingText { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Arms connecting without a preselected start box; the next box click
    /// binds the start anchor.
    pub fn arm_connecting(&mut self) {
        self.gesture = Gesture::Connecting { start: None };
    }

    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
        self.hovered_box = None;
        self.hovered_node = None;
    }

    pub fn pointer_down(
        &mut self,
        diagram: &model::Diagram,
        pos: egui::Pos2,
        double_click: bool,
    ) -> Option<model::Diagram> {
        let Some(level) = diagram.current_level() else {
            return None;
        };
        let Some(hit) = box_at(level, pos).cloned() else {
            // Empty space: a double-click plants a new box, a single click
            // abandons whatever gesture was in flight.
            self.gesture = Gesture::Idle;
            if double_click {
                let (next, _) = diagram.add_box(pos.x, pos.y);
                return Some(next);
            }
            return None;
        };

        let connecting = match &self.gesture {
            Gesture::Connecting { start } => Some(*start),
            _ => None,
        };
        let node = nearest_node(pos, &hit, self.node_radius);
        match (connecting, node) {
            (Some(Some((start_id, start_pos))), Some(node)) => {
                // Second node click commits; clicking the start box again
                // only cancels.
                let committed = (hit.id != start_id)
                    .then(|| diagram.add_line(start_id, hit.id, start_pos, node.position));
                self.gesture = Gesture::Idle;
                committed
            }
            (Some(None), node) => {
                // Toolbar-armed: the first box click binds the start anchor,
                // at the clicked node if one is close enough.
                let anchor = node.unwrap_or_else(|| closest_node(pos, &hit));
                self.gesture = Gesture::Connecting {
                    start: Some((hit.id, anchor.position)),
                };
                // The bound anchor counts as hovered, so the release of the
                // binding click does not read as "released over nothing".
                self.hovered_box = Some(hit.id);
                self.hovered_node = Some(anchor.position);
                None
            }
            (_, Some(node)) => {
                self.gesture = Gesture::Connecting {
                    start: Some((hit.id, node.position)),
                };
                self.hovered_box = Some(hit.id);
                self.hovered_node = Some(node.position);
                None
            }
            _ if double_click => {
                self.gesture = Gesture::Idle;
                Some(diagram.zoom_into(hit.id))
            }
            _ if point_in_text_region(pos, &hit) => {
                self.gesture = Gesture::EditingText {
                    box_id: hit.id,
                    draft: hit.text.clone(),
                };
                None
            }
            _ => {
                self.gesture = Gesture::Dragging {
                    box_id: hit.id,
                    width: hit.width,
                    height: hit.height,
                };
                None
            }
        }
    }

    pub fn pointer_move(
        &mut self,
        diagram: &model::Diagram,
        pos: egui::Pos2,
    ) -> Option<model::Diagram> {
        if let &Gesture::Dragging { box_id, width, height } = &self.gesture {
            // Box recenters under the pointer; the move commits continuously.
            return Some(diagram.move_box(box_id, pos.x - width / 2.0, pos.y - height / 2.0));
        }
        // Hover tracking stays live in every other state, including while
        // connecting, where pointer-up consults it to decide cancellation.
        if let Some(level) = diagram.current_level() {
            let hovered = box_at(level, pos);
            self.hovered_box = hovered.map(|b| b.id);
            self.hovered_node =
                hovered.and_then(|b| nearest_node(pos, b, self.node_radius).map(|n| n.position));
        } else {
            self.hovered_box = None;
            self.hovered_node = None;
        }
        None
    }

    pub fn pointer_up(&mut self) {
        match self.gesture {
            // Released over empty space: abandon the connection attempt.
            Gesture::Connecting { start: Some(_) } if self.hovered_node.is_none() => {
                self.gesture = Gesture::Idle;
            }
            Gesture::Dragging { .. } => {
                self.gesture = Gesture::Idle;
            }
            _ => {}
        }
    }

    /// Enter or blur: write the draft back into the box.
    pub fn commit_text_edit(&mut self, diagram: &model::Diagram) -> Option<model::Diagram> {
        if let Gesture::EditingText { box_id, draft } =
            std::mem::replace(&mut self.gesture, Gesture::Idle)
        {
            return Some(diagram.set_box_text(box_id, &draft));
        }
        None
    }

    /// Escape: discard the draft.
    pub fn cancel_text_edit(&mut self) {
        if matches!(self.gesture, Gesture::EditingText { .. }) {
            self.gesture = Gesture::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Diagram, NodePosition};

    fn apply(diagram: &mut Diagram, next: Option<Diagram>) -> bool {
        if let Some(next) = next {
            *diagram = next;
            true
        } else {
            false
        }
    }

    #[test]
    fn double_click_on_empty_space_adds_box() {
        let mut ix = Interaction::default();
        let mut d = Diagram::new();
        let next = ix.pointer_down(&d, egui::pos2(30.0, 40.0), true);
        let mutated = apply(&mut d, next);
        assert!(mutated);
        let level = d.current_level().unwrap();
        assert_eq!(level.boxes.len(), 1);
        assert_eq!((level.boxes[0].x, level.boxes[0].y), (30.0, 40.0));
        assert_eq!(ix.gesture, Gesture::Idle);
    }

    #[test]
    fn single_click_on_empty_space_mutates_nothing() {
        let mut ix = Interaction::default();
        let d = Diagram::new();
        assert!(ix.pointer_down(&d, egui::pos2(30.0, 40.0), false).is_none());
        assert_eq!(ix.gesture, Gesture::Idle);
    }

    #[test]
    fn node_click_arms_connecting_then_second_node_commits() {
        let mut ix = Interaction::default();
        let (d, b1) = Diagram::new().add_box(0.0, 0.0);
        let (mut d, b2) = d.add_box(300.0, 0.0);

        // Right node of b1 sits at (150, 50).
        assert!(ix.pointer_down(&d, egui::pos2(150.0, 50.0), false).is_none());
        assert_eq!(
            ix.gesture,
            Gesture::Connecting { start: Some((b1, NodePosition::Right)) }
        );

        // Left node of b2 sits at (300, 50).
        let next = ix.pointer_down(&d, egui::pos2(300.0, 50.0), false);
        let mutated = apply(&mut d, next);
        assert!(mutated);
        assert_eq!(ix.gesture, Gesture::Idle);
        let level = d.current_level().unwrap();
        assert_eq!(level.lines.len(), 1);
        assert_eq!(level.lines[0].start_box_id, b1);
        assert_eq!(level.lines[0].end_box_id, b2);
        assert_eq!(level.lines[0].start_position, NodePosition::Right);
        assert_eq!(level.lines[0].end_position, NodePosition::Left);
    }

    #[test]
    fn connecting_back_to_start_box_cancels_without_line() {
        let mut ix = Interaction::default();
        let (d, _b1) = Diagram::new().add_box(0.0, 0.0);
        assert!(ix.pointer_down(&d, egui::pos2(150.0, 50.0), false).is_none());
        // Top node of the same box.
        let next = ix.pointer_down(&d, egui::pos2(75.0, 0.0), false);
        assert!(next.is_none());
        assert_eq!(ix.gesture, Gesture::Idle);
        assert_eq!(d.current_level().unwrap().lines.len(), 0);
    }

    #[test]
    fn toolbar_armed_connecting_binds_on_first_box_click() {
        let mut ix = Interaction::default();
        let (d, b1) = Diagram::new().add_box(0.0, 0.0);
        let (mut d, b2) = d.add_box(300.0, 0.0);

        ix.arm_connecting();
        assert_eq!(ix.gesture, Gesture::Connecting { start: None });

        // Body click near the right edge, outside any node's capture range,
        // binds the closest node.
        assert!(ix.pointer_down(&d, egui::pos2(130.0, 50.0), false).is_none());
        assert_eq!(
            ix.gesture,
            Gesture::Connecting { start: Some((b1, NodePosition::Right)) }
        );

        let next = ix.pointer_down(&d, egui::pos2(300.0, 50.0), false);
        let mutated = apply(&mut d, next);
        assert!(mutated);
        assert_eq!(d.current_level().unwrap().lines.len(), 1);
        assert_eq!(d.current_level().unwrap().lines[0].end_box_id, b2);
    }

    #[test]
    fn double_click_on_box_body_zooms_in() {
        let mut ix = Interaction::default();
        let (mut d, b1) = Diagram::new().add_box(0.0, 0.0);
        // (20, 90) is on the body, away from nodes and the text region.
        let next = ix.pointer_down(&d, egui::pos2(20.0, 90.0), true);
        let mutated = apply(&mut d, next);
        assert!(mutated);
        assert_eq!(d.current_level_id, b1);
        assert_eq!(ix.gesture, Gesture::Idle);
    }

    #[test]
    fn click_in_text_region_opens_editor_and_enter_commits() {
        let mut ix = Interaction::default();
        let (mut d, b1) = Diagram::new().add_box(0.0, 0.0);
        // Box center.
        assert!(ix.pointer_down(&d, egui::pos2(75.0, 50.0), false).is_none());
        assert_eq!(ix.editing_box_id(), Some(b1));
        *ix.edit_draft_mut().unwrap() = "Parser".to_string();
        let next = ix.commit_text_edit(&d);
        let mutated = apply(&mut d, next);
        assert!(mutated);
        assert_eq!(ix.gesture, Gesture::Idle);
        assert_eq!(d.current_level().unwrap().box_by_id(b1).unwrap().text, "Parser");
    }

    #[test]
    fn cancel_text_edit_discards_draft() {
        let mut ix = Interaction::default();
        let (d, b1) = Diagram::new().add_box(0.0, 0.0);
        ix.pointer_down(&d, egui::pos2(75.0, 50.0), false);
        *ix.edit_draft_mut().unwrap() = "scratch".to_string();
        ix.cancel_text_edit();
        assert_eq!(ix.gesture, Gesture::Idle);
        assert_eq!(d.current_level().unwrap().box_by_id(b1).unwrap().text, "New Box");
    }

    #[test]
    fn drag_recenters_box_under_pointer() {
        let mut ix = Interaction::default();
        let (mut d, b1) = Diagram::new().add_box(0.0, 0.0);
        // Body click outside node reach and text region starts a drag.
        assert!(ix.pointer_down(&d, egui::pos2(20.0, 90.0), false).is_none());
        assert!(matches!(ix.gesture, Gesture::Dragging { .. }));
        let next = ix.pointer_move(&d, egui::pos2(400.0, 300.0));
        let mutated = apply(&mut d, next);
        assert!(mutated);
        let b = d.current_level().unwrap().box_by_id(b1).unwrap();
        assert_eq!((b.x, b.y), (325.0, 250.0));
        ix.pointer_up();
        assert_eq!(ix.gesture, Gesture::Idle);
    }

    #[test]
    fn click_release_on_box_body_leaves_box_in_place() {
        let mut ix = Interaction::default();
        let (d, b1) = Diagram::new().add_box(0.0, 0.0);
        // A stationary click delivers press and release back to back.
        assert!(ix.pointer_down(&d, egui::pos2(20.0, 90.0), false).is_none());
        assert!(ix.is_dragging());
        ix.pointer_up();
        assert_eq!(ix.gesture, Gesture::Idle);
        // Later pointer motion is plain hover, not a drag in progress.
        assert!(ix.pointer_move(&d, egui::pos2(400.0, 300.0)).is_none());
        let b = d.current_level().unwrap().box_by_id(b1).unwrap();
        assert_eq!((b.x, b.y), (0.0, 0.0));
    }

    #[test]
    fn node_click_survives_its_own_release() {
        let mut ix = Interaction::default();
        let (d, b1) = Diagram::new().add_box(0.0, 0.0);
        ix.pointer_down(&d, egui::pos2(150.0, 50.0), false);
        assert_eq!(ix.hovered_node, Some(NodePosition::Right));
        ix.pointer_up();
        assert_eq!(
            ix.gesture,
            Gesture::Connecting { start: Some((b1, NodePosition::Right)) }
        );
    }

    #[test]
    fn toolbar_bind_survives_its_own_release() {
        let mut ix = Interaction::default();
        let (d, b1) = Diagram::new().add_box(0.0, 0.0);
        ix.arm_connecting();
        // Body click away from any node binds the closest one.
        ix.pointer_down(&d, egui::pos2(20.0, 90.0), false);
        ix.pointer_up();
        assert_eq!(
            ix.gesture,
            Gesture::Connecting { start: Some((b1, NodePosition::Left)) }
        );
    }

    #[test]
    fn connecting_move_mutates_nothing_and_tracks_hover() {
        let mut ix = Interaction::default();
        let (d, b1) = Diagram::new().add_box(0.0, 0.0);
        ix.pointer_down(&d, egui::pos2(150.0, 50.0), false);
        assert!(ix.pointer_move(&d, egui::pos2(75.0, 0.0)).is_none());
        assert_eq!(ix.hovered_box, Some(b1));
        assert_eq!(ix.hovered_node, Some(NodePosition::Top));
        assert!(ix.is_connecting());
    }

    #[test]
    fn release_away_from_nodes_cancels_connecting() {
        let mut ix = Interaction::default();
        let (d, _b1) = Diagram::new().add_box(0.0, 0.0);
        ix.pointer_down(&d, egui::pos2(150.0, 50.0), false);
        assert!(ix.pointer_move(&d, egui::pos2(500.0, 500.0)).is_none());
        assert!(ix.hovered_node.is_none());
        ix.pointer_up();
        assert_eq!(ix.gesture, Gesture::Idle);
    }

    #[test]
    fn release_over_a_node_keeps_connecting_alive() {
        let mut ix = Interaction::default();
        let (d, _b1) = Diagram::new().add_box(0.0, 0.0);
        ix.pointer_down(&d, egui::pos2(150.0, 50.0), false);
        ix.pointer_move(&d, egui::pos2(150.0, 50.0));
        ix.pointer_up();
        assert!(ix.is_connecting());
    }

    #[test]
    fn hover_clears_over_empty_space() {
        let mut ix = Interaction::default();
        let (d, b1) = Diagram::new().add_box(0.0, 0.0);
        ix.pointer_move(&d, egui::pos2(20.0, 20.0));
        assert_eq!(ix.hovered_box, Some(b1));
        ix.pointer_move(&d, egui::pos2(900.0, 900.0));
        assert_eq!(ix.hovered_box, None);
        assert_eq!(ix.hovered_node, None);
    }
}
