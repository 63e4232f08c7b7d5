//! Rinkboard Core Library
//!
//! Platform-agnostic state, chapters, playback and persistence for the
//! Rinkboard tactics board.

pub mod board;
pub mod bounds;
pub mod chapters;
pub mod codec;
pub mod drawing;
pub mod events;
pub mod model;
pub mod playback;
pub mod share;
pub mod storage;

pub use board::{BoardStore, PlaybackToken, initial_players};
pub use bounds::{BOUNDS, clamp_to_bounds, spawn_area};
pub use chapters::{CHAPTER_SLOTS, ChapterArchive};
pub use codec::{ImportError, ImportOutcome, export_file_name};
pub use drawing::{DrawingPort, DrawingStore, Tool};
pub use events::{StoreChange, SubscriptionId};
pub use model::{
    Ball, BoardRotation, ChapterSnapshot, DrawLine, DrawSnapshot, DrawText, ExportDocument,
    Mode3D, Player, Role, TeamId,
};
pub use playback::{
    ChapterPlayer, FrameHost, PlaybackConfig, PlaybackOutcome, PlaybackSpeed, ease_in_out_quad,
    interpolate_pose,
};
pub use share::{ShareError, decode_state_from_param, encode_state_to_param};
pub use storage::{AutoSaveManager, MemoryStorage, Storage, StorageError, StorageResult};
