//! Chapter playback: tweens players and ball through the saved chapters.
//!
//! Only positions animate. Rotation and annotations change discretely when a
//! chapter is applied at a segment boundary.

use crate::board::{BoardStore, PlaybackToken};
use crate::drawing::DrawingPort;
use crate::model::{Ball, ChapterSnapshot, Player};
use crate::storage::BoxFuture;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

/// User-selectable playback speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackSpeed {
    /// 0.5x
    Half,
    /// 1x
    #[default]
    Normal,
    /// 2x
    Double,
}

impl PlaybackSpeed {
    pub fn multiplier(self) -> f64 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
        }
    }

    /// Factor applied to every duration: slower speeds stretch time.
    pub fn time_scale(self) -> f64 {
        1.0 / self.multiplier()
    }

    /// Parse "0.5", "1", "2" (an optional trailing "x" is accepted).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().trim_end_matches(['x', 'X']) {
            "0.5" | ".5" => Some(PlaybackSpeed::Half),
            "1" | "1.0" => Some(PlaybackSpeed::Normal),
            "2" | "2.0" => Some(PlaybackSpeed::Double),
            _ => None,
        }
    }
}

/// Playback timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Tween length between two chapters at 1x.
    pub tween: Duration,
    /// Shortest tween at any speed.
    pub min_tween: Duration,
    /// Pause on the starting pose before a tween.
    pub settle_hold: Duration,
    /// Pause on the destination after a tween.
    pub segment_hold: Duration,
    /// Pause when only one chapter is saved.
    pub single_chapter_hold: Duration,
    pub speed: PlaybackSpeed,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tween: Duration::from_millis(900),
            min_tween: Duration::from_millis(120),
            settle_hold: Duration::from_millis(200),
            segment_hold: Duration::from_millis(300),
            single_chapter_hold: Duration::from_millis(800),
            speed: PlaybackSpeed::Normal,
        }
    }
}

impl PlaybackConfig {
    pub fn with_speed(mut self, speed: PlaybackSpeed) -> Self {
        self.speed = speed;
        self
    }

    fn scaled(&self, duration: Duration) -> Duration {
        duration.mul_f64(self.speed.time_scale())
    }

    /// Tween length at the configured speed, never below the floor and
    /// never zero.
    pub fn tween_duration(&self) -> Duration {
        self.scaled(self.tween)
            .max(self.min_tween)
            .max(Duration::from_millis(1))
    }

    pub fn settle_duration(&self) -> Duration {
        self.scaled(self.settle_hold)
    }

    pub fn segment_hold_duration(&self) -> Duration {
        self.scaled(self.segment_hold)
    }

    pub fn single_chapter_duration(&self) -> Duration {
        self.scaled(self.single_chapter_hold)
    }
}

/// Quadratic ease-in-out over `t` in 0..=1.
pub fn ease_in_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Blend two chapters' players and ball at `eased` progress.
///
/// Players are matched by id. Every destination player is produced; one with
/// no counterpart in `from` sits at its destination for the whole segment.
pub fn interpolate_pose(
    from: &ChapterSnapshot,
    to: &ChapterSnapshot,
    eased: f64,
) -> (Vec<Player>, Ball) {
    let sources: HashMap<&str, _> = from
        .players
        .iter()
        .map(|p| (p.id.as_str(), p.position()))
        .collect();

    let players = to
        .players
        .iter()
        .map(|p| {
            let end = p.position();
            let start = sources.get(p.id.as_str()).copied().unwrap_or(end);
            let mut tweened = p.clone();
            tweened.set_position(start.lerp(end, eased));
            tweened
        })
        .collect();
    let ball = Ball::from(from.ball.position().lerp(to.ball.position(), eased));

    (players, ball)
}

/// Timing services the player suspends on.
pub trait FrameHost {
    /// Wait for `duration`.
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;

    /// Wait for the next presented frame. Resolves to the frame time,
    /// measured from any fixed origin.
    fn next_frame(&self) -> BoxFuture<'_, Duration>;
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every chapter was shown and playback was stopped.
    Finished { chapters: usize },
    /// Playback was stopped or restarted from outside.
    Cancelled,
}

/// Drives chapter playback against a board.
///
/// The board is borrowed only between suspension points, so other code may
/// use it (and stop playback) while a run is in flight.
pub struct ChapterPlayer<H: FrameHost> {
    host: H,
    config: PlaybackConfig,
}

impl<H: FrameHost> ChapterPlayer<H> {
    pub fn new(host: H, config: PlaybackConfig) -> Self {
        Self { host, config }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.config.speed = speed;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Start playback on the board and run it to the end.
    pub async fn play<D: DrawingPort>(&self, board: &RefCell<BoardStore<D>>) -> PlaybackOutcome {
        let token = board.borrow_mut().start_play_chapters();
        self.run(board, token).await
    }

    /// Run playback for an already started `token`.
    ///
    /// Nothing is written once the token is dead. A run that reaches the end
    /// stops playback itself.
    pub async fn run<D: DrawingPort>(
        &self,
        board: &RefCell<BoardStore<D>>,
        token: PlaybackToken,
    ) -> PlaybackOutcome {
        let sequence: Vec<ChapterSnapshot> = board.borrow().chapters().sequence().cloned().collect();
        if !is_live(board, token) {
            return PlaybackOutcome::Cancelled;
        }

        match sequence.as_slice() {
            [] => {
                log::debug!("No chapters to play");
            }
            [only] => {
                board.borrow_mut().apply_snapshot_instant(only);
                self.host.sleep(self.config.single_chapter_duration()).await;
                if !is_live(board, token) {
                    return PlaybackOutcome::Cancelled;
                }
            }
            _ => {
                for pair in sequence.windows(2) {
                    let (from, to) = (&pair[0], &pair[1]);
                    log::debug!("Playing chapter {} -> {}", from.id, to.id);

                    board.borrow_mut().apply_snapshot_instant(from);
                    self.host.sleep(self.config.settle_duration()).await;
                    if !is_live(board, token) {
                        return PlaybackOutcome::Cancelled;
                    }

                    if !self.tween(board, token, from, to).await {
                        return PlaybackOutcome::Cancelled;
                    }

                    board.borrow_mut().apply_snapshot_instant(to);
                    self.host.sleep(self.config.segment_hold_duration()).await;
                    if !is_live(board, token) {
                        return PlaybackOutcome::Cancelled;
                    }
                }
            }
        }

        board.borrow_mut().stop_play_chapters();
        PlaybackOutcome::Finished {
            chapters: sequence.len(),
        }
    }

    /// Frame loop for one segment. Returns false if the token died.
    async fn tween<D: DrawingPort>(
        &self,
        board: &RefCell<BoardStore<D>>,
        token: PlaybackToken,
        from: &ChapterSnapshot,
        to: &ChapterSnapshot,
    ) -> bool {
        let duration = self.config.tween_duration().as_secs_f64();
        let start = self.host.next_frame().await;
        let mut now = start;

        loop {
            if !is_live(board, token) {
                return false;
            }
            let t = now.saturating_sub(start).as_secs_f64() / duration;
            if t >= 1.0 {
                return true;
            }
            let (players, ball) = interpolate_pose(from, to, ease_in_out_quad(t));
            board.borrow_mut().set_players_and_ball(&players, ball);

            now = self.host.next_frame().await;
        }
    }
}

fn is_live<D: DrawingPort>(board: &RefCell<BoardStore<D>>, token: PlaybackToken) -> bool {
    board.borrow().is_token_live(token)
}
