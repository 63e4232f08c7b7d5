//! Live annotation state: freehand lines, text labels and their undo history.

use crate::events::{StoreChange, SubscriptionId, Subscribers};
use crate::model::{
    DEFAULT_PEN_COLOR, DEFAULT_PEN_WIDTH, DEFAULT_TEXT_BOX_WIDTH, DrawLine, DrawSnapshot, DrawText,
    TextPatch,
};
use uuid::Uuid;

/// Authoring tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Select,
    Pen,
    Eraser,
    /// Reserved; selecting it has no effect.
    Arrow,
    Text,
}

impl Tool {
    pub fn is_enabled(self) -> bool {
        !matches!(self, Tool::Arrow)
    }
}

/// The slice of the drawing store the board store is allowed to use.
///
/// Board code snapshots and restores annotations through this trait only,
/// so the drawing side never depends on the board side.
pub trait DrawingPort {
    /// Deep copy of the live lines and texts.
    fn snapshot(&self) -> DrawSnapshot;

    /// Replace the live annotations and reset history to a single entry.
    fn restore(&mut self, snapshot: DrawSnapshot);

    /// Remove every annotation and reset history.
    fn clear(&mut self);
}

/// Owns the live lines and texts with a linear undo history.
#[derive(Debug)]
pub struct DrawingStore {
    lines: Vec<DrawLine>,
    texts: Vec<DrawText>,
    tool: Tool,
    pen_color: String,
    pen_width: f64,
    selected_text: Option<String>,
    /// Every state reached by an edit, oldest first.
    history: Vec<DrawSnapshot>,
    /// Index into `history` of the state currently shown.
    history_index: usize,
    subscribers: Subscribers,
}

impl Default for DrawingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingStore {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            texts: Vec::new(),
            tool: Tool::default(),
            pen_color: DEFAULT_PEN_COLOR.to_string(),
            pen_width: DEFAULT_PEN_WIDTH,
            selected_text: None,
            history: vec![DrawSnapshot::default()],
            history_index: 0,
            subscribers: Subscribers::new(),
        }
    }

    pub fn lines(&self) -> &[DrawLine] {
        &self.lines
    }

    pub fn texts(&self) -> &[DrawText] {
        &self.texts
    }

    pub fn text(&self, id: &str) -> Option<&DrawText> {
        self.texts.iter().find(|t| t.id == id)
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn pen_enabled(&self) -> bool {
        self.tool == Tool::Pen
    }

    pub fn eraser_enabled(&self) -> bool {
        self.tool == Tool::Eraser
    }

    pub fn pen_color(&self) -> &str {
        &self.pen_color
    }

    pub fn pen_width(&self) -> f64 {
        self.pen_width
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selected_text.as_deref()
    }

    pub fn history_index(&self) -> usize {
        self.history_index
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(StoreChange) + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn changed(&mut self) {
        self.subscribers.notify(StoreChange::Drawing);
    }

    /// Switch the authoring tool. Disabled tools are ignored.
    pub fn set_tool(&mut self, tool: Tool) {
        if !tool.is_enabled() {
            log::debug!("Ignoring disabled tool {:?}", tool);
            return;
        }
        self.tool = tool;
        self.changed();
    }

    pub fn set_pen_color(&mut self, color: impl Into<String>) {
        self.pen_color = color.into();
        self.changed();
    }

    pub fn set_pen_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.pen_width = width;
            self.changed();
        }
    }

    pub fn select_text(&mut self, id: Option<&str>) {
        self.selected_text = id.map(str::to_string);
        self.changed();
    }

    fn current(&self) -> DrawSnapshot {
        DrawSnapshot {
            lines: self.lines.clone(),
            texts: self.texts.clone(),
        }
    }

    /// Record the live state as a new history entry, dropping any redo tail.
    fn commit(&mut self) {
        self.history.truncate(self.history_index + 1);
        self.history.push(self.current());
        self.history_index = self.history.len() - 1;
        self.changed();
    }

    /// Append a stroke. Callers discard strokes that are too short.
    pub fn add_line(&mut self, line: DrawLine) {
        self.lines.push(line);
        self.commit();
    }

    /// Remove the stroke at `index`. Out of range is a no-op.
    pub fn erase_line(&mut self, index: usize) {
        if index >= self.lines.len() {
            return;
        }
        self.lines.remove(index);
        self.commit();
    }

    /// Insert a text label, assigning an id if it has none. Returns the id.
    pub fn add_text(&mut self, mut text: DrawText) -> String {
        if text.id.is_empty() || self.text(&text.id).is_some() {
            text.id = format!("text-{}", Uuid::new_v4());
        }
        if text.box_w.is_none() {
            text.box_w = Some(DEFAULT_TEXT_BOX_WIDTH);
        }
        let id = text.id.clone();
        self.texts.push(text);
        self.selected_text = Some(id.clone());
        self.commit();
        id
    }

    /// Patch a text label. Emptying its content removes it.
    pub fn update_text(&mut self, id: &str, patch: TextPatch) {
        let Some(pos) = self.texts.iter().position(|t| t.id == id) else {
            return;
        };
        if patch.text.as_deref().is_some_and(|s| s.trim().is_empty()) {
            self.remove_text(id);
            return;
        }

        let text = &mut self.texts[pos];
        if let Some(x) = patch.x {
            text.x = x;
        }
        if let Some(y) = patch.y {
            text.y = y;
        }
        if let Some(content) = patch.text {
            text.text = content;
        }
        if let Some(color) = patch.color {
            text.color = color;
        }
        if let Some(size) = patch.font_size {
            text.font_size = size;
        }
        if let Some(w) = patch.box_w {
            text.box_w = Some(w);
        }
        self.commit();
    }

    pub fn remove_text(&mut self, id: &str) {
        let before = self.texts.len();
        self.texts.retain(|t| t.id != id);
        if self.texts.len() == before {
            return;
        }
        if self.selected_text.as_deref() == Some(id) {
            self.selected_text = None;
        }
        self.commit();
    }

    fn load_history_entry(&mut self, index: usize) {
        let entry = self.history[index].clone();
        self.history_index = index;
        self.lines = entry.lines;
        self.texts = entry.texts;
        self.selected_text = None;
        self.changed();
    }

    /// Step back one edit. Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.load_history_entry(self.history_index - 1);
        true
    }

    /// Step forward one edit. Returns false at the end of history.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.load_history_entry(self.history_index + 1);
        true
    }

    /// Remove all lines and texts and collapse history to one empty entry.
    pub fn clear_all_lines(&mut self) {
        self.set_draw_instant(DrawSnapshot::default());
    }

    /// Jump to an externally supplied state. Not undoable.
    pub fn set_draw_instant(&mut self, snapshot: DrawSnapshot) {
        self.lines = snapshot.lines.clone();
        self.texts = snapshot.texts.clone();
        self.history = vec![snapshot];
        self.history_index = 0;
        self.selected_text = None;
        self.changed();
    }
}

impl DrawingPort for DrawingStore {
    fn snapshot(&self) -> DrawSnapshot {
        self.current()
    }

    fn restore(&mut self, snapshot: DrawSnapshot) {
        self.set_draw_instant(snapshot);
    }

    fn clear(&mut self) {
        self.clear_all_lines();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(offset: f64) -> DrawLine {
        DrawLine::new(vec![offset, 0.0, offset + 1.0, 1.0], "#111827", 3.0)
    }

    #[test]
    fn test_set_tool_flags() {
        let mut store = DrawingStore::new();
        store.set_tool(Tool::Pen);
        assert!(store.pen_enabled());
        assert!(!store.eraser_enabled());

        store.set_tool(Tool::Eraser);
        assert!(!store.pen_enabled());
        assert!(store.eraser_enabled());

        store.set_tool(Tool::Arrow);
        assert_eq!(store.tool(), Tool::Eraser);
        assert_eq!(store.history_len(), 1);
    }

    #[test]
    fn test_add_line_pushes_history() {
        let mut store = DrawingStore::new();
        store.add_line(stroke(0.0));
        store.add_line(stroke(1.0));

        assert_eq!(store.lines().len(), 2);
        assert_eq!(store.history_len(), 3);
        assert_eq!(store.history_index(), 2);
    }

    #[test]
    fn test_erase_out_of_range_is_noop() {
        let mut store = DrawingStore::new();
        store.add_line(stroke(0.0));
        store.erase_line(5);

        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.history_len(), 2);
    }

    #[test]
    fn test_undo_redo_linear() {
        let mut store = DrawingStore::new();
        store.add_line(stroke(0.0));
        let text_id = store.add_text(DrawText::new(1.0, 1.0, "screen"));
        store.add_line(stroke(2.0));
        store.erase_line(0);
        store.remove_text(&text_id);
        let final_state = store.snapshot();

        for _ in 0..5 {
            assert!(store.undo());
        }
        assert!(store.snapshot().is_empty());
        assert!(!store.undo());

        for _ in 0..5 {
            assert!(store.redo());
        }
        assert_eq!(store.snapshot(), final_state);
        assert!(!store.redo());
    }

    #[test]
    fn test_edit_after_undo_drops_redo_tail() {
        let mut store = DrawingStore::new();
        store.add_line(stroke(0.0));
        store.add_line(stroke(1.0));
        store.undo();
        assert!(store.can_redo());

        store.add_line(stroke(5.0));
        assert!(!store.can_redo());
        assert_eq!(store.history_len(), 3);
        assert_eq!(store.lines()[1], stroke(5.0));
    }

    #[test]
    fn test_add_text_defaults_and_selection() {
        let mut store = DrawingStore::new();
        let id = store.add_text(DrawText::new(0.0, 0.0, "overload left"));

        assert!(!id.is_empty());
        assert_eq!(store.selected_text(), Some(id.as_str()));
        assert_eq!(store.text(&id).unwrap().box_w, Some(DEFAULT_TEXT_BOX_WIDTH));

        let second = store.add_text(DrawText {
            id: id.clone(),
            ..DrawText::new(1.0, 1.0, "dup")
        });
        assert_ne!(second, id);
    }

    #[test]
    fn test_update_text_to_empty_removes() {
        let mut store = DrawingStore::new();
        let id = store.add_text(DrawText::new(0.0, 0.0, "note"));
        store.update_text(
            &id,
            TextPatch {
                text: Some("   ".to_string()),
                ..TextPatch::default()
            },
        );

        assert!(store.texts().is_empty());
        assert_eq!(store.selected_text(), None);
        assert_eq!(store.history_len(), 3);
    }

    #[test]
    fn test_update_text_patches_fields() {
        let mut store = DrawingStore::new();
        let id = store.add_text(DrawText::new(0.0, 0.0, "note"));
        store.update_text(
            &id,
            TextPatch {
                x: Some(4.0),
                box_w: Some(120.0),
                ..TextPatch::default()
            },
        );

        let text = store.text(&id).unwrap();
        assert_eq!(text.x, 4.0);
        assert_eq!(text.box_w, Some(120.0));
        assert_eq!(text.text, "note");
    }

    #[test]
    fn test_undo_clears_text_selection() {
        let mut store = DrawingStore::new();
        store.add_text(DrawText::new(0.0, 0.0, "a"));
        store.undo();
        assert_eq!(store.selected_text(), None);
    }

    #[test]
    fn test_set_draw_instant_resets_history() {
        let mut store = DrawingStore::new();
        store.add_line(stroke(0.0));
        store.add_line(stroke(1.0));

        let snap = DrawSnapshot {
            lines: vec![stroke(9.0)],
            texts: Vec::new(),
        };
        store.set_draw_instant(snap.clone());

        assert_eq!(store.snapshot(), snap);
        assert_eq!(store.history_len(), 1);
        assert!(!store.can_undo());
    }

    #[test]
    fn test_clear_all_lines() {
        let mut store = DrawingStore::new();
        store.add_line(stroke(0.0));
        store.add_text(DrawText::new(0.0, 0.0, "x"));
        store.clear_all_lines();

        assert!(store.lines().is_empty());
        assert!(store.texts().is_empty());
        assert_eq!(store.history_len(), 1);
        assert_eq!(store.history_index(), 0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = DrawingStore::new();
        store.add_line(stroke(0.0));
        let mut snap = store.snapshot();
        snap.lines[0].points[0] = 100.0;

        assert_eq!(store.lines()[0].points[0], 0.0);
    }
}
