//! Fixed-size archive of saved chapters.

use crate::model::ChapterSnapshot;

/// Number of chapter slots.
pub const CHAPTER_SLOTS: usize = 10;

/// Label of the slot at `index` ("1" for index 0).
pub fn slot_label(index: usize) -> String {
    (index + 1).to_string()
}

/// Slot index addressed by a label, if it names one of the slots.
pub fn slot_index(label: &str) -> Option<usize> {
    let n: usize = label.trim().parse().ok()?;
    (1..=CHAPTER_SLOTS).contains(&n).then(|| n - 1)
}

/// Clamp a slot index into range.
pub fn clamp_slot(index: usize) -> usize {
    index.min(CHAPTER_SLOTS - 1)
}

/// Chapters keyed by slot label. Empty slots hold nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterArchive {
    slots: [Option<ChapterSnapshot>; CHAPTER_SLOTS],
}

impl ChapterArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an archive from chapters in any order. Later entries win a slot;
    /// chapters whose id names no slot are skipped.
    pub fn from_chapters(chapters: impl IntoIterator<Item = ChapterSnapshot>) -> Self {
        let mut archive = Self::new();
        for chapter in chapters {
            if !archive.upsert(chapter) {
                log::warn!("Skipping chapter with invalid slot label");
            }
        }
        archive
    }

    /// Store a chapter in the slot named by its id, replacing any occupant.
    /// The stored id is the slot's canonical label. Returns false if the id
    /// names no slot.
    pub fn upsert(&mut self, mut chapter: ChapterSnapshot) -> bool {
        match slot_index(&chapter.id) {
            Some(index) => {
                chapter.id = slot_label(index);
                self.slots[index] = Some(chapter);
                true
            }
            None => false,
        }
    }

    pub fn slot(&self, index: usize) -> Option<&ChapterSnapshot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn by_label(&self, label: &str) -> Option<&ChapterSnapshot> {
        slot_index(label).and_then(|i| self.slot(i))
    }

    pub fn is_saved(&self, index: usize) -> bool {
        self.slot(index).is_some()
    }

    pub fn saved_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.saved_count() == 0
    }

    /// Saved chapters in slot order, skipping empty slots.
    pub fn sequence(&self) -> impl Iterator<Item = &ChapterSnapshot> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}
