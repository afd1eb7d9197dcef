use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::audio::AudioCue;
use crate::world::types::{Item, Lesson, NodeKind, NodeStatus};

/// How much of a rank the player can see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankVisibility {
    /// Current rank and everything behind it
    Visible,
    /// The rank just ahead, shown with a collapse/expand reveal
    Revealing,
    /// Two ranks ahead: shapes only, names hidden
    Obscured,
    Hidden,
}

impl RankVisibility {
    pub fn is_shown(&self) -> bool {
        !matches!(self, RankVisibility::Hidden)
    }
}

/// A node as the map screen should draw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView {
    pub id: u32,
    pub label: String,
    pub kind: NodeKind,
    pub status: NodeStatus,
    pub clickable: bool,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankView {
    pub depth: usize,
    pub visibility: RankVisibility,
    pub nodes: Vec<NodeView>,
}

/// What happens when the player arrives at a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encounter {
    Combat { node_id: u32, is_wildcard: bool },
    Interlude(InterludeKind),
    Lesson { node_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterludeKind {
    Treasure,
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterludeOutcome {
    /// Item already added to the inventory; the node completes afterwards
    Reward(Item),
    /// Wildcard ambush; a fight starts afterwards
    Ambush,
}

/// Scripted scene for item and wildcard nodes.
///
/// Runs in two beats: an "Exploring..." lead-in, then the outcome is
/// revealed and held on screen until the interlude finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interlude {
    pub kind: InterludeKind,
    pub node_id: u32,
    pub elapsed_ms: u64,
    pub outcome: Option<InterludeOutcome>,
    pub finished: bool,
}

impl Interlude {
    pub fn new(kind: InterludeKind, node_id: u32) -> Self {
        Self {
            kind,
            node_id,
            elapsed_ms: 0,
            outcome: None,
            finished: false,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.outcome.is_some()
    }

    /// Text for the current beat: (title, description)
    pub fn caption(&self) -> (&'static str, &'static str) {
        match (&self.outcome, self.kind) {
            (None, _) => ("Exploring...", "You venture deeper into the forest..."),
            (Some(InterludeOutcome::Ambush), _) => ("AMBUSH!", "Prepare to fight!"),
            (Some(InterludeOutcome::Reward(_)), InterludeKind::Treasure) => {
                ("Treasure Found!", "You found a potion!")
            }
            (Some(InterludeOutcome::Reward(_)), InterludeKind::Wildcard) => {
                ("Safe Path", "You find a dropped item.")
            }
        }
    }
}

/// Result of [`complete_node`](super::logic::complete_node)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCompletion {
    pub node_id: u32,
    /// Connections that became available
    pub unlocked: Vec<u32>,
    /// A boss was cleared: move on to the next world
    pub world_cleared: bool,
}

/// Node statuses of the active world, as saved to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub world_id: String,
    pub statuses: BTreeMap<u32, NodeStatus>,
}

/// Map-side notifications for the presentation and audio layers
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Feedback { text: String, success: bool },
    NodeSelected { node_id: u32 },
    SelectionCleared,
    MovedTo { from: u32, to: u32 },
    InterludeBeat { title: &'static str, description: &'static str },
    ItemGained(Item),
    ItemUsed { name: String, healed: i32 },
    LessonOpened { topic_id: String, lesson: Lesson },
    LessonPage { page: usize, total: usize },
    LessonClosed,
    NodeCompleted(NodeCompletion),
    StatsChanged,
    Sound(AudioCue),
}
