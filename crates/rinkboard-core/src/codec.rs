//! Export to and import from the versioned session document.
//!
//! Export is a plain projection of the stores. Import is defensive: the
//! envelope (object, version, sections) must be right or nothing changes,
//! but inside a valid envelope every malformed element is dropped on its own
//! and the rest is kept. One bad chapter never costs the other nine.

use crate::board::{BoardStore, MAX_JERSEY_NUMBER, SessionParts, initial_players};
use crate::chapters::{CHAPTER_SLOTS, ChapterArchive, slot_index, slot_label};
use crate::drawing::DrawingPort;
use crate::model::{
    Ball, BoardRotation, BoardSection, ChapterSnapshot, DEFAULT_FONT_SIZE, DEFAULT_PEN_COLOR,
    DEFAULT_PEN_WIDTH, DrawLine, DrawSection, DrawSnapshot, DrawText, EXPORT_VERSION,
    ExportDocument, Mode3D, Player, Role, TeamId,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;

/// Why an import was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("The file is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("The document must be a JSON object.")]
    NotAnObject,
    #[error("Unsupported document version: {0}.")]
    UnsupportedVersion(String),
    #[error("The document is missing its board or draw section.")]
    MissingSections,
    #[error("An error occurred while importing the document.")]
    Failed,
}

/// Result of an import as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub ok: bool,
    pub message: String,
}

impl ImportOutcome {
    pub const SUCCESS_MESSAGE: &'static str = "Import succeeded.";

    pub fn success() -> Self {
        Self {
            ok: true,
            message: Self::SUCCESS_MESSAGE.to_string(),
        }
    }
}

impl From<Result<(), ImportError>> for ImportOutcome {
    fn from(result: Result<(), ImportError>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(e) => Self {
                ok: false,
                message: e.to_string(),
            },
        }
    }
}

/// File name for a downloaded export, derived from its timestamp.
pub fn export_file_name(document: &ExportDocument) -> String {
    let saved_at = DateTime::parse_from_rfc3339(&document.saved_at)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());
    format!("rinkboard-{}.json", saved_at.format("%Y-%m-%d-%H-%M-%S"))
}

impl<D: DrawingPort> BoardStore<D> {
    /// Project the whole session into an export document stamped now.
    pub fn export_all(&self) -> ExportDocument {
        self.export_at(Utc::now())
    }

    /// Project the whole session into an export document with a given stamp.
    pub fn export_at(&self, saved_at: DateTime<Utc>) -> ExportDocument {
        let DrawSnapshot { lines, texts } = self.drawing().snapshot();
        ExportDocument {
            version: EXPORT_VERSION,
            saved_at: saved_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            board: BoardSection {
                players: self.players().to_vec(),
                ball: self.ball(),
                board_rotation: self.board_rotation(),
                selected_id: self.selected_id().map(str::to_string),
                mode_3d: self.mode_3d(),
                chapters: self.chapters().sequence().cloned().collect(),
                active_chapter_index: self.active_chapter_index(),
            },
            draw: DrawSection { lines, texts },
        }
    }

    /// Replace the session from an untrusted JSON value. Never panics.
    pub fn import_all(&mut self, raw: &Value) -> ImportOutcome {
        let sanitized = std::panic::catch_unwind(|| sanitize_document(raw))
            .unwrap_or(Err(ImportError::Failed));
        let result = sanitized.map(|session| {
            log::info!(
                "Imported {} players, {} chapters, {} lines, {} texts",
                session.players.len(),
                session.chapters.saved_count(),
                session.drawing.lines.len(),
                session.drawing.texts.len()
            );
            self.replace_all(session);
        });
        if let Err(e) = &result {
            log::warn!("Import rejected: {}", e);
        }
        result.into()
    }

    /// Parse JSON text and import it.
    pub fn import_json(&mut self, text: &str) -> ImportOutcome {
        match serde_json::from_str::<Value>(text) {
            Ok(raw) => self.import_all(&raw),
            Err(e) => {
                log::warn!("Import rejected: invalid JSON: {}", e);
                ImportOutcome::from(Err::<(), _>(ImportError::InvalidJson(e.to_string())))
            }
        }
    }
}

fn sanitize_document(raw: &Value) -> Result<SessionParts, ImportError> {
    let root = raw.as_object().ok_or(ImportError::NotAnObject)?;

    let version = root.get("version").unwrap_or(&Value::Null);
    if version.as_f64() != Some(f64::from(EXPORT_VERSION)) {
        return Err(ImportError::UnsupportedVersion(version.to_string()));
    }

    let (Some(board), Some(draw)) = (
        root.get("board").filter(|v| v.is_object()),
        root.get("draw").filter(|v| v.is_object()),
    ) else {
        return Err(ImportError::MissingSections);
    };

    let players = match board.get("players").and_then(Value::as_array) {
        Some(items) => salvage(items, sanitize_player, "player"),
        None => initial_players(),
    };

    let chapters = board
        .get("chapters")
        .and_then(Value::as_array)
        .map(|items| salvage(items, sanitize_chapter, "chapter"))
        .unwrap_or_default();

    let active_chapter_index = board
        .get("activeChapterIndex")
        .and_then(finite)
        .map(|n| n.floor().clamp(0.0, (CHAPTER_SLOTS - 1) as f64) as usize)
        .unwrap_or(0);

    Ok(SessionParts {
        players,
        ball: sanitize_ball(board.get("ball")),
        board_rotation: sanitize_rotation(board.get("boardRotation")),
        mode_3d: sanitize_mode(board.get("mode3D")),
        chapters: ChapterArchive::from_chapters(chapters),
        active_chapter_index,
        drawing: sanitize_drawing(draw.get("lines"), draw.get("texts")),
    })
}

/// Keep the elements that sanitize cleanly and log how many were dropped.
fn salvage<T>(items: &[Value], sanitize: fn(&Value) -> Option<T>, what: &str) -> Vec<T> {
    let kept: Vec<T> = items.iter().filter_map(sanitize).collect();
    let dropped = items.len() - kept.len();
    if dropped > 0 {
        log::warn!("Dropped {} malformed {} entries during import", dropped, what);
    }
    kept
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

fn field_f64(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key).and_then(finite)
}

fn field_str<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn sanitize_player(raw: &Value) -> Option<Player> {
    let id = field_str(raw, "id")?;
    let team = field_str(raw, "team").and_then(TeamId::parse)?;
    let role = field_str(raw, "role").and_then(Role::parse)?;
    let x = field_f64(raw, "x")?;
    let y = field_f64(raw, "y")?;
    let color = field_str(raw, "color")?;
    let number = field_f64(raw, "number")?;

    Some(Player {
        id: id.to_string(),
        team,
        role,
        x,
        y,
        color: color.to_string(),
        number: number.floor().clamp(0.0, f64::from(MAX_JERSEY_NUMBER)) as u32,
    })
}

fn sanitize_ball(raw: Option<&Value>) -> Ball {
    match raw.filter(|v| v.is_object()) {
        Some(b) => Ball::new(
            field_f64(b, "x").unwrap_or(0.0),
            field_f64(b, "y").unwrap_or(0.0),
        ),
        None => Ball::default(),
    }
}

fn sanitize_rotation(raw: Option<&Value>) -> BoardRotation {
    let turns = match raw {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    turns
        .and_then(|t| u8::try_from(t).ok())
        .and_then(BoardRotation::from_quarter_turns)
        .unwrap_or_default()
}

fn sanitize_mode(raw: Option<&Value>) -> Mode3D {
    match raw.and_then(Value::as_str) {
        Some("piece") => Mode3D::Piece,
        _ => Mode3D::Camera,
    }
}

fn sanitize_line(raw: &Value) -> Option<DrawLine> {
    let coords = raw.get("points")?.as_array()?;
    let points: Vec<f64> = coords
        .chunks_exact(2)
        .filter_map(|pair| Some([finite(&pair[0])?, finite(&pair[1])?]))
        .flatten()
        .collect();
    let color = field_str(raw, "color").unwrap_or(DEFAULT_PEN_COLOR);
    let width = field_f64(raw, "width")
        .filter(|w| *w > 0.0)
        .unwrap_or(DEFAULT_PEN_WIDTH);
    let line = DrawLine::new(points, color, width);
    line.is_drawable().then_some(line)
}

fn sanitize_text(raw: &Value) -> Option<DrawText> {
    let id = field_str(raw, "id").filter(|id| !id.is_empty())?;
    let text = field_str(raw, "text")?;
    Some(DrawText {
        id: id.to_string(),
        x: field_f64(raw, "x")?,
        y: field_f64(raw, "y")?,
        text: text.to_string(),
        color: field_str(raw, "color")
            .unwrap_or(DEFAULT_PEN_COLOR)
            .to_string(),
        font_size: field_f64(raw, "fontSize")
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE),
        box_w: field_f64(raw, "boxW").filter(|w| *w > 0.0),
    })
}

fn sanitize_drawing(lines: Option<&Value>, texts: Option<&Value>) -> DrawSnapshot {
    let lines = lines
        .and_then(Value::as_array)
        .map(|items| salvage(items, sanitize_line, "line"))
        .unwrap_or_default();
    let mut texts: Vec<DrawText> = texts
        .and_then(Value::as_array)
        .map(|items| salvage(items, sanitize_text, "text"))
        .unwrap_or_default();

    // Ids must stay unique among texts; the first occurrence wins.
    let mut seen = std::collections::HashSet::new();
    texts.retain(|t| seen.insert(t.id.clone()));

    DrawSnapshot { lines, texts }
}

fn sanitize_chapter(raw: &Value) -> Option<ChapterSnapshot> {
    let index = field_str(raw, "id").and_then(slot_index)?;
    let players = raw.get("players")?.as_array()?;
    let drawing = sanitize_drawing(raw.get("lines"), raw.get("texts"));

    Some(ChapterSnapshot {
        id: slot_label(index),
        players: salvage(players, sanitize_player, "chapter player"),
        ball: sanitize_ball(raw.get("ball")),
        board_rotation: sanitize_rotation(raw.get("boardRotation")),
        lines: drawing.lines,
        texts: drawing.texts,
    })
}
