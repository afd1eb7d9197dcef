use crate::combat::types::Combat;
use crate::core::constants::{
    PLAYER_BASE_HP, PLAYER_MAX_HINTS, PLAYER_STARTING_HINTS, ROOT_NODE_ID,
};
use crate::world::types::{Item, Lesson, MapNode, NodeStatus, Question, Topic, WorldData};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Persistent player stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub max_hp: i32,
    /// Can dip below zero after a failed block; the defeat check runs afterwards.
    pub current_hp: i32,
    pub inventory: Vec<Item>,
    pub hints: u32,
    pub max_hints: u32,
    pub current_node_id: u32,
    pub previous_node_id: Option<u32>,
    pub unlocked_lessons: BTreeSet<String>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            max_hp: PLAYER_BASE_HP,
            current_hp: PLAYER_BASE_HP,
            inventory: Vec::new(),
            hints: PLAYER_STARTING_HINTS,
            max_hints: PLAYER_MAX_HINTS,
            current_node_id: ROOT_NODE_ID,
            previous_node_id: None,
            unlocked_lessons: BTreeSet::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Subtracts damage without flooring at zero.
    pub fn take_damage(&mut self, amount: i32) {
        self.current_hp -= amount;
    }

    /// Restores hp, capped at max. Returns the amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.current_hp;
        self.current_hp = (self.current_hp + amount).min(self.max_hp);
        self.current_hp - before
    }

    /// Spends one hint. Returns false (and changes nothing) when none are left.
    pub fn spend_hint(&mut self) -> bool {
        if self.hints == 0 {
            return false;
        }
        self.hints -= 1;
        true
    }

    /// Grants a hint, up to `max_hints`.
    pub fn add_hint(&mut self) {
        self.hints = (self.hints + 1).min(self.max_hints);
    }

    pub fn add_item(&mut self, item: Item) {
        self.inventory.push(item);
    }

    /// Moves the player, remembering where they came from.
    pub fn move_to(&mut self, node_id: u32) {
        self.previous_node_id = Some(self.current_node_id);
        self.current_node_id = node_id;
    }

    /// Puts the player on a world's root node.
    pub fn reset_position(&mut self) {
        self.current_node_id = ROOT_NODE_ID;
        self.previous_node_id = None;
    }
}

/// Tracks which worlds the player has reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Progression {
    pub current_world_id: String,
    /// Unlocked world IDs in unlock order
    pub unlocked_worlds: Vec<String>,
    /// "<world>:<node>" for every completed node
    pub cleared_stages: Vec<String>,
}

impl Progression {
    pub fn unlock_world(&mut self, world_id: &str) {
        if !self.unlocked_worlds.iter().any(|w| w == world_id) {
            self.unlocked_worlds.push(world_id.to_string());
        }
    }

    pub fn is_world_unlocked(&self, world_id: &str) -> bool {
        self.unlocked_worlds.iter().any(|w| w == world_id)
    }

    pub fn record_stage(&mut self, node_id: u32) {
        let stage = format!("{}:{}", self.current_world_id, node_id);
        if !self.cleared_stages.contains(&stage) {
            self.cleared_stages.push(stage);
        }
    }
}

/// The world currently being played
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveWorld {
    pub id: String,
    pub name: String,
    pub background: String,
    pub nodes: Vec<MapNode>,
    pub topics: Vec<Topic>,
    pub lessons: BTreeMap<String, Lesson>,
}

impl From<WorldData> for ActiveWorld {
    fn from(data: WorldData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            background: data.background,
            nodes: data.nodes,
            topics: data.topics,
            lessons: data.lessons,
        }
    }
}

impl ActiveWorld {
    pub fn node(&self, id: u32) -> Option<&MapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: u32) -> Option<&mut MapNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Sets a node's status. Unknown IDs are ignored.
    pub fn set_status(&mut self, id: u32, status: NodeStatus) {
        if let Some(node) = self.node_mut(id) {
            node.status = status;
        }
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    pub fn lesson(&self, topic_id: &str) -> Option<&Lesson> {
        self.lessons.get(topic_id)
    }

    /// Every question in every topic, in topic order
    pub fn all_questions(&self) -> Vec<Question> {
        self.topics
            .iter()
            .flat_map(|t| t.questions.iter().cloned())
            .collect()
    }
}

/// Main game state: the single store every subsystem reads and mutates
#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub player: Player,
    pub progression: Progression,
    pub world: Option<ActiveWorld>,
    /// Present only while a fight is running
    pub combat: Option<Combat>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_node(&self) -> Option<&MapNode> {
        self.world
            .as_ref()
            .and_then(|w| w.node(self.player.current_node_id))
    }

    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }
}
