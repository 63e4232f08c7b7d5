//! Board entities and the versioned export document.
//!
//! These are plain data types. The stores own the live instances; chapters
//! and export documents hold independent copies.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Current export document format version.
pub const EXPORT_VERSION: u32 = 1;

/// Default stroke color for freehand lines.
pub const DEFAULT_PEN_COLOR: &str = "#111827";

/// Default stroke width for freehand lines.
pub const DEFAULT_PEN_WIDTH: f64 = 3.0;

/// Default text font size.
pub const DEFAULT_FONT_SIZE: f64 = 18.0;

/// Default text box width.
pub const DEFAULT_TEXT_BOX_WIDTH: f64 = 220.0;

/// Team a player belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamId {
    A,
    B,
}

impl TeamId {
    /// Label used in ids and documents.
    pub fn as_str(self) -> &'static str {
        match self {
            TeamId::A => "A",
            TeamId::B => "B",
        }
    }

    /// Token color used for this team.
    pub fn color(self) -> &'static str {
        match self {
            TeamId::A => "#0ea5e9",
            TeamId::B => "#f97316",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "A" => Some(TeamId::A),
            "B" => Some(TeamId::B),
            _ => None,
        }
    }
}

/// Player role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    /// Goalkeeper.
    #[serde(rename = "GK")]
    Goalkeeper,
    /// Field player.
    #[default]
    #[serde(rename = "FP")]
    FieldPlayer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Goalkeeper => "GK",
            Role::FieldPlayer => "FP",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GK" => Some(Role::Goalkeeper),
            "FP" => Some(Role::FieldPlayer),
            _ => None,
        }
    }
}

/// What pointer drags do in the 3D view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode3D {
    /// Drags orbit the camera.
    #[default]
    Camera,
    /// Drags move pieces.
    Piece,
}

/// Quarter-turn rotation of the board view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BoardRotation {
    /// Landscape.
    #[default]
    R0,
    /// Portrait, turned right.
    R1,
    /// Landscape, flipped.
    R2,
    /// Portrait, turned left.
    R3,
}

impl BoardRotation {
    /// Next quarter-turn, wrapping after `R3`.
    pub fn next(self) -> Self {
        match self {
            BoardRotation::R0 => BoardRotation::R1,
            BoardRotation::R1 => BoardRotation::R2,
            BoardRotation::R2 => BoardRotation::R3,
            BoardRotation::R3 => BoardRotation::R0,
        }
    }

    pub fn quarter_turns(self) -> u8 {
        self as u8
    }

    pub fn from_quarter_turns(turns: u8) -> Option<Self> {
        match turns {
            0 => Some(BoardRotation::R0),
            1 => Some(BoardRotation::R1),
            2 => Some(BoardRotation::R2),
            3 => Some(BoardRotation::R3),
            _ => None,
        }
    }
}

impl From<BoardRotation> for u8 {
    fn from(rotation: BoardRotation) -> u8 {
        rotation.quarter_turns()
    }
}

impl TryFrom<u8> for BoardRotation {
    type Error = String;

    fn try_from(turns: u8) -> Result<Self, Self::Error> {
        Self::from_quarter_turns(turns).ok_or_else(|| format!("invalid board rotation: {turns}"))
    }
}

/// A player token on the rink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identity, used to match the same player across chapters.
    pub id: String,
    pub team: TeamId,
    pub role: Role,
    pub x: f64,
    pub y: f64,
    pub color: String,
    /// Jersey number, 0..=99.
    pub number: u32,
}

impl Player {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, point: Point) {
        self.x = point.x;
        self.y = point.y;
    }
}

/// The ball. Always present.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ball {
    pub x: f64,
    pub y: f64,
}

impl Ball {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for Ball {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

/// A freehand annotation stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawLine {
    /// Flat `[x1, y1, x2, y2, ...]` world coordinates.
    pub points: Vec<f64>,
    pub color: String,
    pub width: f64,
}

impl DrawLine {
    /// Minimum number of coordinates (two points) for a drawable stroke.
    pub const MIN_COORDS: usize = 4;

    pub fn new(points: Vec<f64>, color: impl Into<String>, width: f64) -> Self {
        Self {
            points,
            color: color.into(),
            width,
        }
    }

    /// Whether the stroke has at least two points and an even coordinate count.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= Self::MIN_COORDS && self.points.len() % 2 == 0
    }
}

/// A text annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawText {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: String,
    pub font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_w: Option<f64>,
}

impl DrawText {
    /// A text without an id; the drawing store assigns one on insertion.
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            x,
            y,
            text: text.into(),
            color: DEFAULT_PEN_COLOR.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            box_w: None,
        }
    }
}

/// Partial update for a text annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub text: Option<String>,
    pub color: Option<String>,
    pub font_size: Option<f64>,
    pub box_w: Option<f64>,
}

/// Partial update for a player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub color: Option<String>,
    pub number: Option<u32>,
}

impl PlayerPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }
}

/// Partial update for the ball.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BallPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Lines and texts at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawSnapshot {
    pub lines: Vec<DrawLine>,
    pub texts: Vec<DrawText>,
}

impl DrawSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.texts.is_empty()
    }
}

/// A saved chapter: an independent copy of the whole board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSnapshot {
    /// Slot label, "1" through "10".
    pub id: String,
    pub players: Vec<Player>,
    pub ball: Ball,
    pub board_rotation: BoardRotation,
    pub lines: Vec<DrawLine>,
    #[serde(default)]
    pub texts: Vec<DrawText>,
}

impl ChapterSnapshot {
    pub fn drawing(&self) -> DrawSnapshot {
        DrawSnapshot {
            lines: self.lines.clone(),
            texts: self.texts.clone(),
        }
    }
}

/// Board half of the export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSection {
    pub players: Vec<Player>,
    pub ball: Ball,
    pub board_rotation: BoardRotation,
    pub selected_id: Option<String>,
    #[serde(rename = "mode3D")]
    pub mode_3d: Mode3D,
    pub chapters: Vec<ChapterSnapshot>,
    pub active_chapter_index: usize,
}

/// Drawing half of the export document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawSection {
    pub lines: Vec<DrawLine>,
    #[serde(default)]
    pub texts: Vec<DrawText>,
}

/// The persisted and exported representation of the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: u32,
    /// RFC 3339 UTC timestamp of the export.
    pub saved_at: String,
    pub board: BoardSection,
    pub draw: DrawSection,
}

impl ExportDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        let mut r = BoardRotation::R0;
        for _ in 0..4 {
            r = r.next();
        }
        assert_eq!(r, BoardRotation::R0);
        assert_eq!(BoardRotation::R2.next(), BoardRotation::R3);
    }

    #[test]
    fn test_enum_wire_names() {
        let player = Player {
            id: "A-GK".to_string(),
            team: TeamId::A,
            role: Role::Goalkeeper,
            x: 1.0,
            y: 2.0,
            color: TeamId::A.color().to_string(),
            number: 1,
        };
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["team"], "A");
        assert_eq!(json["role"], "GK");

        assert_eq!(serde_json::to_value(Mode3D::Piece).unwrap(), "piece");
        assert_eq!(serde_json::to_value(BoardRotation::R3).unwrap(), 3);
    }

    #[test]
    fn test_text_box_width_omitted_when_unset() {
        let text = DrawText::new(0.0, 0.0, "press");
        let json = serde_json::to_value(&text).unwrap();
        assert!(json.get("boxW").is_none());
        assert_eq!(json["fontSize"], DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_line_drawable() {
        assert!(DrawLine::new(vec![0.0, 0.0, 1.0, 1.0], "#000", 2.0).is_drawable());
        assert!(!DrawLine::new(vec![0.0, 0.0, 1.0], "#000", 2.0).is_drawable());
        assert!(!DrawLine::new(vec![0.0, 0.0], "#000", 2.0).is_drawable());
    }
}
