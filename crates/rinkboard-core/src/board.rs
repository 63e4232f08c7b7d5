//! Live board state: players, ball, rotation, selection and chapters.

use crate::bounds::{BOUNDS, GOAL_LINE_OFFSET, clamp_to, spawn_area};
use crate::chapters::{ChapterArchive, clamp_slot, slot_label};
use crate::drawing::{DrawingPort, DrawingStore};
use crate::events::{StoreChange, SubscriptionId, Subscribers};
use crate::model::{
    Ball, BallPatch, BoardRotation, ChapterSnapshot, DrawSnapshot, Mode3D, Player, PlayerPatch,
    Role, TeamId,
};
use kurbo::Point;

/// Highest jersey number.
pub const MAX_JERSEY_NUMBER: u32 = 99;

/// Spawn rows for added players, cycled by team size.
const SPAWN_ROWS: [f64; 9] = [0.0, 3.0, -3.0, 2.0, -2.0, 5.0, -5.0, 1.0, -1.0];

/// Field player spawn column distance from the center line.
const SPAWN_COLUMN: f64 = 8.0;

fn player(id: &str, team: TeamId, role: Role, x: f64, y: f64, number: u32) -> Player {
    Player {
        id: id.to_string(),
        team,
        role,
        x,
        y,
        color: team.color().to_string(),
        number,
    }
}

/// The starting roster: one goalkeeper and four field players per team.
pub fn initial_players() -> Vec<Player> {
    use Role::{FieldPlayer as FP, Goalkeeper as GK};
    use TeamId::{A, B};

    vec![
        player("A-GK", A, GK, BOUNDS.x0 + GOAL_LINE_OFFSET, 0.0, 1),
        player("A-FP1", A, FP, -8.0, 3.0, 4),
        player("A-FP2", A, FP, -8.0, -3.0, 5),
        player("A-FP3", A, FP, -4.0, 2.0, 7),
        player("A-FP4", A, FP, -4.0, -2.0, 9),
        player("B-GK", B, GK, BOUNDS.x1 - GOAL_LINE_OFFSET, 0.0, 1),
        player("B-FP1", B, FP, 8.0, 3.0, 4),
        player("B-FP2", B, FP, 8.0, -3.0, 5),
        player("B-FP3", B, FP, 4.0, 2.0, 7),
        player("B-FP4", B, FP, 4.0, -2.0, 9),
    ]
}

/// Smallest jersey number in 1..=99 not worn by a teammate, else 99.
fn next_unused_number(players: &[Player], team: TeamId) -> u32 {
    (1..=MAX_JERSEY_NUMBER)
        .find(|n| !players.iter().any(|p| p.team == team && p.number == *n))
        .unwrap_or(MAX_JERSEY_NUMBER)
}

fn next_player_id(players: &[Player], team: TeamId, role: Role) -> String {
    let taken = |id: &str| players.iter().any(|p| p.id == id);
    let (base, mut suffix) = match role {
        Role::Goalkeeper => {
            let base = format!("{}-GK", team.as_str());
            if !taken(&base) {
                return base;
            }
            (base, 2)
        }
        Role::FieldPlayer => (format!("{}-FP", team.as_str()), 1),
    };
    loop {
        let id = format!("{base}{suffix}");
        if !taken(&id) {
            return id;
        }
        suffix += 1;
    }
}

fn apply_player_patch(player: &mut Player, patch: &PlayerPatch) {
    if let Some(x) = patch.x {
        player.x = x;
    }
    if let Some(y) = patch.y {
        player.y = y;
    }
    if let Some(color) = &patch.color {
        player.color = color.clone();
    }
    if let Some(number) = patch.number {
        player.number = number.min(MAX_JERSEY_NUMBER);
    }
}

fn apply_ball_patch(ball: &mut Ball, patch: BallPatch) {
    if let Some(x) = patch.x {
        ball.x = x;
    }
    if let Some(y) = patch.y {
        ball.y = y;
    }
}

fn default_spawn(players: &[Player], team: TeamId, role: Role) -> Point {
    let teammates = players.iter().filter(|p| p.team == team).count();
    let y = SPAWN_ROWS[teammates % SPAWN_ROWS.len()];
    let x = match (role, team) {
        (Role::Goalkeeper, TeamId::A) => BOUNDS.x0 + GOAL_LINE_OFFSET,
        (Role::Goalkeeper, TeamId::B) => BOUNDS.x1 - GOAL_LINE_OFFSET,
        (Role::FieldPlayer, TeamId::A) => -SPAWN_COLUMN,
        (Role::FieldPlayer, TeamId::B) => SPAWN_COLUMN,
    };
    clamp_to(Point::new(x, y), spawn_area())
}

/// Restart handle for chapter playback.
///
/// A token stays live while playback is on and no newer run has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackToken {
    generation: u64,
}

impl PlaybackToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Players and ball of the last discretely applied snapshot.
#[derive(Debug, Clone, PartialEq)]
struct SettledPose {
    players: Vec<Player>,
    ball: Ball,
}

/// Owns the live board and the chapter archive.
///
/// Annotations live in the drawing store `D`; the board reaches them only
/// through [`DrawingPort`].
#[derive(Debug)]
pub struct BoardStore<D: DrawingPort = DrawingStore> {
    players: Vec<Player>,
    ball: Ball,
    board_rotation: BoardRotation,
    selected_id: Option<String>,
    mode_3d: Mode3D,
    chapters: ChapterArchive,
    active_chapter_index: usize,
    is_playing_chapters: bool,
    playback_generation: u64,
    settled_pose: Option<SettledPose>,
    in_tween: bool,
    drawing: D,
    subscribers: Subscribers,
}

impl Default for BoardStore<DrawingStore> {
    fn default() -> Self {
        Self::new(DrawingStore::new())
    }
}

impl<D: DrawingPort> BoardStore<D> {
    /// Create a board with the starting roster, attached to a drawing store.
    pub fn new(drawing: D) -> Self {
        Self {
            players: initial_players(),
            ball: Ball::default(),
            board_rotation: BoardRotation::default(),
            selected_id: None,
            mode_3d: Mode3D::default(),
            chapters: ChapterArchive::new(),
            active_chapter_index: 0,
            is_playing_chapters: false,
            playback_generation: 0,
            settled_pose: None,
            in_tween: false,
            drawing,
            subscribers: Subscribers::new(),
        }
    }

    // --- Accessors ---

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn ball(&self) -> Ball {
        self.ball
    }

    pub fn board_rotation(&self) -> BoardRotation {
        self.board_rotation
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn mode_3d(&self) -> Mode3D {
        self.mode_3d
    }

    pub fn chapters(&self) -> &ChapterArchive {
        &self.chapters
    }

    pub fn active_chapter_index(&self) -> usize {
        self.active_chapter_index
    }

    pub fn is_playing_chapters(&self) -> bool {
        self.is_playing_chapters
    }

    pub fn drawing(&self) -> &D {
        &self.drawing
    }

    pub fn drawing_mut(&mut self) -> &mut D {
        &mut self.drawing
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

    fn changed(&mut self, change: StoreChange) {
        self.subscribers.notify(change);
    }

    // --- Players and ball ---

    /// Add a player with a free id, free jersey number and default spot.
    /// The new player is selected. Returns its id.
    pub fn add_player(&mut self, team: TeamId, role: Role) -> String {
        let id = next_player_id(&self.players, team, role);
        let number = next_unused_number(&self.players, team);
        let spot = default_spawn(&self.players, team, role);

        let mut added = player(&id, team, role, 0.0, 0.0, number);
        added.set_position(spot);
        self.players.push(added);
        self.selected_id = Some(id.clone());
        log::debug!("Added player {} #{}", id, number);
        self.changed(StoreChange::Board);
        id
    }

    pub fn remove_player(&mut self, id: &str) {
        self.players.retain(|p| p.id != id);
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        self.changed(StoreChange::Board);
    }

    /// Set a jersey number, clamped to 0..=99.
    pub fn set_player_number(&mut self, id: &str, number: i64) {
        let n = number.clamp(0, MAX_JERSEY_NUMBER as i64) as u32;
        if let Some(p) = self.players.iter_mut().find(|p| p.id == id) {
            p.number = n;
            self.changed(StoreChange::Board);
        }
    }

    pub fn select_player(&mut self, id: Option<&str>) {
        self.selected_id = id.map(str::to_string);
        self.changed(StoreChange::Board);
    }

    /// Patch a player. During a tween the edit also lands in the pose a stop
    /// settles back to, so stopping keeps it.
    pub fn update_player(&mut self, id: &str, patch: PlayerPatch) {
        let Some(p) = self.players.iter_mut().find(|p| p.id == id) else {
            return;
        };
        apply_player_patch(p, &patch);
        if self.in_tween {
            if let Some(pose) = self.settled_pose.as_mut() {
                if let Some(settled) = pose.players.iter_mut().find(|p| p.id == id) {
                    apply_player_patch(settled, &patch);
                }
            }
        }
        self.changed(StoreChange::Board);
    }

    /// Patch the ball. Like players, the edit survives a settle on stop.
    pub fn update_ball(&mut self, patch: BallPatch) {
        apply_ball_patch(&mut self.ball, patch);
        if self.in_tween {
            if let Some(pose) = self.settled_pose.as_mut() {
                apply_ball_patch(&mut pose.ball, patch);
            }
        }
        self.changed(StoreChange::Board);
    }

    pub fn rotate_board(&mut self) {
        self.board_rotation = self.board_rotation.next();
        self.changed(StoreChange::Board);
    }

    pub fn set_mode_3d(&mut self, mode: Mode3D) {
        self.mode_3d = mode;
        self.changed(StoreChange::Board);
    }

    /// Restore the starting roster, ball, rotation and mode.
    /// Chapters and annotations are kept.
    pub fn reset_positions(&mut self) {
        self.players = initial_players();
        self.ball = Ball::default();
        self.board_rotation = BoardRotation::default();
        self.selected_id = None;
        self.mode_3d = Mode3D::default();
        self.changed(StoreChange::Board);
    }

    /// Start over: starting roster, no chapters, no annotations.
    pub fn reset_all(&mut self) {
        self.stop_play_chapters();
        self.chapters.clear();
        self.active_chapter_index = 0;
        self.settled_pose = None;
        self.drawing.clear();
        self.reset_positions();
        self.changed(StoreChange::Chapters);
    }

    // --- Chapters ---

    /// Capture the live board and annotations into the active slot.
    pub fn save_chapter_at_active(&mut self) {
        let DrawSnapshot { lines, texts } = self.drawing.snapshot();
        let snapshot = ChapterSnapshot {
            id: slot_label(self.active_chapter_index),
            players: self.players.clone(),
            ball: self.ball,
            board_rotation: self.board_rotation,
            lines,
            texts,
        };
        log::debug!("Saved chapter {}", snapshot.id);
        self.chapters.upsert(snapshot);
        self.changed(StoreChange::Chapters);
    }

    /// Save the current slot, move to `index` and load it if it was saved.
    /// An empty destination keeps the live board as it is.
    pub fn switch_chapter(&mut self, index: usize) {
        let index = clamp_slot(index);
        self.save_chapter_at_active();
        self.active_chapter_index = index;

        if let Some(snapshot) = self.chapters.slot(index).cloned() {
            self.apply_snapshot_instant(&snapshot);
        }
        log::debug!("Switched to chapter {}", slot_label(index));
        self.changed(StoreChange::Chapters);
    }

    pub fn clear_chapters(&mut self) {
        self.stop_play_chapters();
        self.chapters.clear();
        self.active_chapter_index = 0;
        self.changed(StoreChange::Chapters);
    }

    // --- Playback signals ---

    /// Turn playback on. A run already in progress is superseded.
    pub fn start_play_chapters(&mut self) -> PlaybackToken {
        self.playback_generation += 1;
        self.is_playing_chapters = true;
        self.changed(StoreChange::Playback);
        PlaybackToken {
            generation: self.playback_generation,
        }
    }

    /// Turn playback off. A half-finished tween is settled back onto the
    /// last applied snapshot.
    pub fn stop_play_chapters(&mut self) {
        if !self.is_playing_chapters {
            return;
        }
        self.is_playing_chapters = false;
        if self.in_tween {
            if let Some(pose) = self.settled_pose.clone() {
                log::debug!("Settling interrupted tween");
                self.players = pose.players;
                self.ball = pose.ball;
                self.changed(StoreChange::Board);
            }
            self.in_tween = false;
        }
        self.changed(StoreChange::Playback);
    }

    /// Whether a run holding `token` may still write.
    pub fn is_token_live(&self, token: PlaybackToken) -> bool {
        self.is_playing_chapters && token.generation == self.playback_generation
    }

    /// Jump to a snapshot: players, ball, rotation and annotations.
    pub fn apply_snapshot_instant(&mut self, snapshot: &ChapterSnapshot) {
        self.players = snapshot.players.clone();
        self.ball = snapshot.ball;
        self.board_rotation = snapshot.board_rotation;
        self.selected_id = None;
        self.settled_pose = Some(SettledPose {
            players: snapshot.players.clone(),
            ball: snapshot.ball,
        });
        self.in_tween = false;
        self.drawing.restore(snapshot.drawing());
        self.changed(StoreChange::Board);
    }

    /// Per-frame tween write. Leaves rotation, annotations and history alone.
    pub fn set_players_and_ball(&mut self, players: &[Player], ball: Ball) {
        self.players = players.to_vec();
        self.ball = ball;
        self.in_tween = true;
        self.changed(StoreChange::Board);
    }

    /// Replace the whole session in one step. Used by import.
    pub(crate) fn replace_all(&mut self, session: SessionParts) {
        self.is_playing_chapters = false;
        self.playback_generation += 1;
        self.in_tween = false;
        self.settled_pose = None;

        self.players = session.players;
        self.ball = session.ball;
        self.board_rotation = session.board_rotation;
        self.selected_id = None;
        self.mode_3d = session.mode_3d;
        self.chapters = session.chapters;
        self.active_chapter_index = clamp_slot(session.active_chapter_index);
        self.drawing.restore(session.drawing);

        self.changed(StoreChange::Board);
        self.changed(StoreChange::Chapters);
        self.changed(StoreChange::Playback);
    }
}

/// Everything an import replaces.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SessionParts {
    pub players: Vec<Player>,
    pub ball: Ball,
    pub board_rotation: BoardRotation,
    pub mode_3d: Mode3D,
    pub chapters: ChapterArchive,
    pub active_chapter_index: usize,
    pub drawing: DrawSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DrawLine, DrawText};

    fn board() -> BoardStore {
        BoardStore::default()
    }

    #[test]
    fn test_initial_roster() {
        let b = board();
        assert_eq!(b.players().len(), 10);
        assert_eq!(b.player("A-GK").unwrap().x, -13.0);
        assert_eq!(b.player("B-GK").unwrap().x, 13.0);
        assert_eq!(b.ball(), Ball::default());
    }

    #[test]
    fn test_add_player_ids_and_numbers() {
        let mut b = board();
        let id = b.add_player(TeamId::A, Role::FieldPlayer);
        assert_eq!(id, "A-FP5");
        let added = b.player(&id).unwrap();
        // 1, 4, 5, 7, 9 are taken on team A.
        assert_eq!(added.number, 2);
        assert_eq!(added.color, TeamId::A.color());
        assert_eq!(b.selected_id(), Some("A-FP5"));

        let gk = b.add_player(TeamId::B, Role::Goalkeeper);
        assert_eq!(gk, "B-GK2");
        let gk3 = b.add_player(TeamId::B, Role::Goalkeeper);
        assert_eq!(gk3, "B-GK3");
    }

    #[test]
    fn test_add_player_fills_gaps() {
        let mut b = board();
        b.remove_player("A-FP2");
        assert_eq!(b.add_player(TeamId::A, Role::FieldPlayer), "A-FP2");
    }

    #[test]
    fn test_add_player_spawns_inside_bounds() {
        let mut b = board();
        let area = spawn_area();
        for i in 0..40 {
            let team = if i % 2 == 0 { TeamId::A } else { TeamId::B };
            let role = if i % 5 == 0 { Role::Goalkeeper } else { Role::FieldPlayer };
            let id = b.add_player(team, role);
            let p = b.player(&id).unwrap();
            assert!(p.x >= area.x0 && p.x <= area.x1, "x out of range: {}", p.x);
            assert!(p.y >= area.y0 && p.y <= area.y1, "y out of range: {}", p.y);
        }
    }

    #[test]
    fn test_jersey_numbers_exhausted() {
        let mut b = board();
        for _ in 0..100 {
            b.add_player(TeamId::B, Role::FieldPlayer);
        }
        let id = b.add_player(TeamId::B, Role::FieldPlayer);
        assert_eq!(b.player(&id).unwrap().number, MAX_JERSEY_NUMBER);
    }

    #[test]
    fn test_remove_player_clears_selection() {
        let mut b = board();
        b.select_player(Some("A-FP1"));
        b.remove_player("A-FP1");
        assert_eq!(b.selected_id(), None);
        assert!(b.player("A-FP1").is_none());
    }

    #[test]
    fn test_set_player_number_clamps() {
        let mut b = board();
        b.set_player_number("A-FP1", 150);
        assert_eq!(b.player("A-FP1").unwrap().number, 99);
        b.set_player_number("A-FP1", -3);
        assert_eq!(b.player("A-FP1").unwrap().number, 0);
    }

    #[test]
    fn test_update_player_and_ball() {
        let mut b = board();
        b.update_player("B-FP3", PlayerPatch::position(1.0, -1.0));
        assert_eq!(b.player("B-FP3").unwrap().position(), Point::new(1.0, -1.0));

        b.update_ball(BallPatch {
            x: Some(2.5),
            y: None,
        });
        assert_eq!(b.ball(), Ball::new(2.5, 0.0));
    }

    #[test]
    fn test_reset_keeps_chapters_and_drawing() {
        let mut b = board();
        b.drawing_mut()
            .add_line(DrawLine::new(vec![0.0, 0.0, 1.0, 1.0], "#fff", 2.0));
        b.save_chapter_at_active();
        b.update_player("A-FP1", PlayerPatch::position(0.0, 0.0));
        b.rotate_board();
        b.set_mode_3d(Mode3D::Piece);

        b.reset_positions();

        assert_eq!(b.players(), initial_players().as_slice());
        assert_eq!(b.board_rotation(), BoardRotation::R0);
        assert_eq!(b.mode_3d(), Mode3D::Camera);
        assert_eq!(b.chapters().saved_count(), 1);
        assert_eq!(b.drawing().lines().len(), 1);
    }

    #[test]
    fn test_save_chapter_is_idempotent() {
        let mut b = board();
        b.save_chapter_at_active();
        let first = b.chapters().slot(0).cloned();
        b.save_chapter_at_active();

        assert_eq!(b.chapters().saved_count(), 1);
        assert_eq!(b.chapters().slot(0).cloned(), first);
    }

    #[test]
    fn test_chapter_is_detached_from_live_state() {
        let mut b = board();
        b.drawing_mut()
            .add_text(DrawText::new(0.0, 0.0, "press high"));
        b.save_chapter_at_active();

        b.update_player("A-FP1", PlayerPatch::position(11.0, 1.0));
        b.drawing_mut().clear_all_lines();

        let saved = b.chapters().slot(0).unwrap();
        assert_eq!(saved.players[1].x, -8.0);
        assert_eq!(saved.texts.len(), 1);
    }

    #[test]
    fn test_switch_saves_before_leaving() {
        let mut b = board();
        b.update_player("A-FP1", PlayerPatch::position(3.0, 3.0));
        b.drawing_mut()
            .add_line(DrawLine::new(vec![0.0, 0.0, 2.0, 2.0], "#fff", 2.0));

        b.switch_chapter(1);
        assert_eq!(b.active_chapter_index(), 1);
        // Slot 2 was empty: the live board stays as it was.
        assert_eq!(b.player("A-FP1").unwrap().x, 3.0);

        b.update_player("A-FP1", PlayerPatch::position(-5.0, 0.0));
        b.drawing_mut().clear_all_lines();
        b.switch_chapter(0);

        assert_eq!(b.player("A-FP1").unwrap().position(), Point::new(3.0, 3.0));
        assert_eq!(b.drawing().lines().len(), 1);

        b.switch_chapter(1);
        assert_eq!(b.player("A-FP1").unwrap().position(), Point::new(-5.0, 0.0));
        assert!(b.drawing().lines().is_empty());
    }

    #[test]
    fn test_switch_clamps_index() {
        let mut b = board();
        b.switch_chapter(42);
        assert_eq!(b.active_chapter_index(), 9);
        assert!(b.chapters().is_saved(0));
    }

    #[test]
    fn test_apply_snapshot_clears_selection_and_history() {
        let mut b = board();
        b.drawing_mut()
            .add_line(DrawLine::new(vec![0.0, 0.0, 2.0, 2.0], "#fff", 2.0));
        b.save_chapter_at_active();
        b.select_player(Some("A-GK"));

        let snap = b.chapters().slot(0).cloned().unwrap();
        b.apply_snapshot_instant(&snap);

        assert_eq!(b.selected_id(), None);
        assert!(!b.drawing().can_undo());
        assert_eq!(b.drawing().lines().len(), 1);
    }

    #[test]
    fn test_clear_chapters_stops_playback() {
        let mut b = board();
        b.switch_chapter(3);
        let token = b.start_play_chapters();
        b.clear_chapters();

        assert!(b.chapters().is_empty());
        assert_eq!(b.active_chapter_index(), 0);
        assert!(!b.is_playing_chapters());
        assert!(!b.is_token_live(token));
    }

    #[test]
    fn test_restart_invalidates_previous_token() {
        let mut b = board();
        let first = b.start_play_chapters();
        let second = b.start_play_chapters();

        assert!(!b.is_token_live(first));
        assert!(b.is_token_live(second));

        b.stop_play_chapters();
        assert!(!b.is_token_live(second));
    }

    #[test]
    fn test_stop_settles_interrupted_tween() {
        let mut b = board();
        b.save_chapter_at_active();
        let snap = b.chapters().slot(0).cloned().unwrap();

        b.start_play_chapters();
        b.apply_snapshot_instant(&snap);
        let mut moved = snap.players.clone();
        moved[0].x = 0.5;
        b.set_players_and_ball(&moved, Ball::new(1.0, 1.0));
        b.stop_play_chapters();

        assert_eq!(b.players(), snap.players.as_slice());
        assert_eq!(b.ball(), snap.ball);
    }

    #[test]
    fn test_edit_during_tween_survives_stop() {
        let mut b = board();
        b.save_chapter_at_active();
        let snap = b.chapters().slot(0).cloned().unwrap();

        b.start_play_chapters();
        b.apply_snapshot_instant(&snap);
        let mut moved = snap.players.clone();
        moved[1].x = 0.5;
        b.set_players_and_ball(&moved, Ball::new(1.0, 1.0));

        b.update_player("A-FP1", PlayerPatch::position(-1.0, -1.0));
        b.update_ball(BallPatch {
            x: Some(2.0),
            y: None,
        });
        b.stop_play_chapters();

        assert_eq!(b.player("A-FP1").unwrap().position(), Point::new(-1.0, -1.0));
        assert_eq!(b.player("A-FP2").unwrap(), &snap.players[2]);
        assert_eq!(b.ball(), Ball::new(2.0, 0.0));
    }

    #[test]
    fn test_reset_all_clears_chapters_and_drawing() {
        let mut b = board();
        b.drawing_mut()
            .add_line(DrawLine::new(vec![0.0, 0.0, 1.0, 1.0], "#fff", 2.0));
        b.switch_chapter(2);
        b.update_player("A-GK", PlayerPatch::position(0.0, 0.0));
        let token = b.start_play_chapters();

        b.reset_all();

        assert!(!b.is_token_live(token));
        assert!(b.chapters().is_empty());
        assert_eq!(b.active_chapter_index(), 0);
        assert!(b.drawing().lines().is_empty());
        assert!(!b.drawing().can_undo());
        assert_eq!(b.players(), initial_players().as_slice());
    }

    #[test]
    fn test_notifies_subscribers() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut b = board();
        let sink = seen.clone();
        b.subscribe(move |change| sink.borrow_mut().push(change));

        b.rotate_board();
        b.save_chapter_at_active();
        b.start_play_chapters();

        assert_eq!(
            *seen.borrow(),
            vec![StoreChange::Board, StoreChange::Chapters, StoreChange::Playback]
        );
    }
}
