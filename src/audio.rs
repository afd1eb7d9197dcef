//! Semantic audio cues emitted by the engine.
//!
//! The engine never plays sound itself; it emits these as fire-and-forget
//! events and the front-end decides what (if anything) to play.

/// One-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    Attack,
    Block,
    Hurt,
    Hover,
    Click,
    JournalOpen,
    JournalClose,
    JournalFlip,
}

impl AudioCue {
    pub fn key(&self) -> &'static str {
        match self {
            AudioCue::Attack => "sfx_attack",
            AudioCue::Block => "sfx_block",
            AudioCue::Hurt => "sfx_hurt",
            AudioCue::Hover => "sfx_hover",
            AudioCue::Click => "sfx_click",
            AudioCue::JournalOpen => "sfx_journal_open",
            AudioCue::JournalClose => "sfx_journal_close",
            AudioCue::JournalFlip => "sfx_journal_flip",
        }
    }
}

/// Background tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicTrack {
    Exploration,
    Combat,
}

impl MusicTrack {
    pub fn key(&self) -> &'static str {
        match self {
            MusicTrack::Exploration => "bgm_forest",
            MusicTrack::Combat => "bgm_combat",
        }
    }
}
