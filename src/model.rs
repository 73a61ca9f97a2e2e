use eframe::egui;
use serde::{Deserialize, Serialize};

/// Reserved id of the root level. Box ids are allocated starting at 1, so a
/// box id can double as the id of the level nested under it without ever
/// colliding with the root.
pub const ROOT_LEVEL_ID: u64 = 0;

pub const DEFAULT_BOX_WIDTH: f32 = 150.0;
pub const DEFAULT_BOX_HEIGHT: f32 = 100.0;
pub const DEFAULT_BOX_TEXT: &str = "New Box";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_premultiplied(self.r, self.g, self.b, self.a)
    }
}

/// One of the four fixed anchor points on a box border where lines attach.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodePosition {
    Top,
    Right,
    Bottom,
    Left,
}

impl NodePosition {
    /// Fixed scan order used everywhere a node is resolved by proximity.
    pub const ALL: [NodePosition; 4] = [
        NodePosition::Top,
        NodePosition::Right,
        NodePosition::Bottom,
        NodePosition::Left,
    ];
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoxStyle {
    #[serde(default)]
    pub background_color: Option<Rgba>,
    #[serde(default)]
    pub border_color: Option<Rgba>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DiagramBox {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
    #[serde(flatten)]
    pub style: BoxStyle,
}

impl DiagramBox {
    fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            width: DEFAULT_BOX_WIDTH,
            height: DEFAULT_BOX_HEIGHT,
            text: DEFAULT_BOX_TEXT.to_string(),
            style: BoxStyle::default(),
        }
    }

    pub fn rect(&self) -> egui::Rect {
        egui::Rect::from_min_size(
            egui::pos2(self.x, self.y),
            egui::vec2(self.width, self.height),
        )
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: u64,
    pub start_box_id: u64,
    pub end_box_id: u64,
    pub start_position: NodePosition,
    pub end_position: NodePosition,
}

/// An independently addressable diagram nested under a specific box of a
/// parent level. `id` equals the owning box's id, except for the root.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Level {
    pub id: u64,
    #[serde(rename = "parentBoxId", default)]
    pub parent_id: Option<u64>,
    pub boxes: Vec<DiagramBox>,
    pub lines: Vec<Line>,
}

impl Level {
    pub fn new(id: u64, parent_id: Option<u64>) -> Self {
        Self {
            id,
            parent_id,
            boxes: Vec::new(),
            lines: Vec::new(),
        }
    }

    pub fn box_by_id(&self, id: u64) -> Option<&DiagramBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    fn box_by_id_mut(&mut self, id: u64) -> Option<&mut DiagramBox> {
        self.boxes.iter_mut().find(|b| b.id == id)
    }
}

/// The whole document: every level ever created, keyed by id, plus the
/// navigation state. Levels survive navigating away; nothing is deleted.
///
/// Every mutation returns a fresh snapshot and leaves `self` untouched, so
/// the renderer and the gesture machine can hold references across a frame
/// without aliasing surprises. All operations are total: a missing id is a
/// no-op, never a panic.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagram {
    pub levels: Vec<Level>,
    pub current_level_id: u64,
    pub level_stack: Vec<u64>,
    pub next_id: u64,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    pub fn new() -> Self {
        Self {
            levels: vec![Level::new(ROOT_LEVEL_ID, None)],
            current_level_id: ROOT_LEVEL_ID,
            level_stack: Vec::new(),
            next_id: 1,
        }
    }

    pub fn level(&self, id: u64) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.level(self.current_level_id)
    }

    fn current_level_mut(&mut self) -> Option<&mut Level> {
        let id = self.current_level_id;
        self.levels.iter_mut().find(|l| l.id == id)
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Largest id in use across levels, boxes and lines. Used to re-seed the
    /// allocator after loading a persisted document.
    pub fn max_used_id(&self) -> u64 {
        let mut max = 0;
        for level in &self.levels {
            max = max.max(level.id);
            for b in &level.boxes {
                max = max.max(b.id);
            }
            for l in &level.lines {
                max = max.max(l.id);
            }
        }
        max
    }

    /// Appends a default-sized box at the given top-left position to the
    /// current level and returns its id.
    pub fn add_box(&self, x: f32, y: f32) -> (Diagram, u64) {
        let mut next = self.clone();
        let id = next.allocate_id();
        if let Some(level) = next.current_level_mut() {
            level.boxes.push(DiagramBox::new(id, x, y));
        }
        (next, id)
    }

    /// Appends a line between two boxes of the current level. Self-loops are
    /// rejected as a no-op. Endpoint existence is the caller's concern; the
    /// renderer skips lines whose boxes are gone.
    pub fn add_line(
        &self,
        start_box_id: u64,
        end_box_id: u64,
        start_position: NodePosition,
        end_position: NodePosition,
    ) -> Diagram {
        if start_box_id == end_box_id {
            return self.clone();
        }
        let mut next = self.clone();
        let id = next.allocate_id();
        if let Some(level) = next.current_level_mut() {
            level.lines.push(Line {
                id,
                start_box_id,
                end_box_id,
                start_position,
                end_position,
            });
        }
        next
    }

    pub fn move_box(&self, box_id: u64, x: f32, y: f32) -> Diagram {
        let mut next = self.clone();
        if let Some(b) = next
            .current_level_mut()
            .and_then(|l| l.box_by_id_mut(box_id))
        {
            b.x = x;
            b.y = y;
        }
        next
    }

    pub fn set_box_text(&self, box_id: u64, text: &str) -> Diagram {
        let mut next = self.clone();
        if let Some(b) = next
            .current_level_mut()
            .and_then(|l| l.box_by_id_mut(box_id))
        {
            b.text = text.to_string();
        }
        next
    }

    pub fn set_box_style(&self, box_id: u64, style: BoxStyle) -> Diagram {
        let mut next = self.clone();
        if let Some(b) = next
            .current_level_mut()
            .and_then(|l| l.box_by_id_mut(box_id))
        {
            b.style = style;
        }
        next
    }

    /// Descends into the level nested under `box_id`, creating it empty on
    /// first visit. The level keeps its content across later navigation.
    pub fn zoom_into(&self, box_id: u64) -> Diagram {
        let mut next = self.clone();
        if next.level(box_id).is_none() {
            let parent = next.current_level_id;
            next.levels.push(Level::new(box_id, Some(parent)));
        }
        next.level_stack.push(next.current_level_id);
        next.current_level_id = box_id;
        next
    }

    /// Pops back to the enclosing level; a no-op at the root.
    pub fn navigate_back(&self) -> Diagram {
        let mut next = self.clone();
        if let Some(previous) = next.level_stack.pop() {
            next.current_level_id = previous;
        }
        next
    }
}
