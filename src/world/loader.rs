//! World loading and question pool resolution.
//!
//! A world is three JSON documents that live side by side in the data
//! directory: `maps.json` (node graph per world), `questions.json` (one
//! curriculum of topics per world) and `lessons.json` (lore keyed by topic).

use super::types::{Lesson, MapNode, NodeKind, Question, RawQuestion, Topic, WorldData};
use crate::core::constants::{LESSONS_FILE, MAPS_FILE, QUESTIONS_FILE};
use crate::core::error::{GameError, GameResult};
use crate::core::game_state::{ActiveWorld, GameState};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

/// Supplies world data to the level loader.
pub trait WorldSource {
    /// Loads the full data for one world.
    fn load(&self, world_id: &str) -> GameResult<WorldData>;

    /// The world that follows `world_id`, if any.
    fn next_world(&self, world_id: &str) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct MapFile {
    name: String,
    #[serde(default)]
    background: String,
    nodes: Vec<MapNode>,
}

#[derive(Debug, Deserialize)]
struct QuestionsFile {
    curriculum: Vec<Curriculum>,
}

#[derive(Debug, Deserialize)]
struct Curriculum {
    #[serde(rename = "worldId")]
    world_id: String,
    #[serde(default)]
    topics: Vec<RawTopic>,
}

#[derive(Debug, Deserialize)]
struct RawTopic {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize, Default)]
struct LessonsFile {
    #[serde(default)]
    lessons: BTreeMap<String, Lesson>,
}

/// Builds one world out of the three parsed documents.
fn assemble_world(
    world_id: &str,
    mut maps: HashMap<String, MapFile>,
    questions: QuestionsFile,
    lessons: LessonsFile,
) -> GameResult<WorldData> {
    let curriculum = questions
        .curriculum
        .into_iter()
        .find(|c| c.world_id == world_id)
        .ok_or_else(|| GameError::CurriculumNotFound(world_id.to_string()))?;

    let map = maps
        .remove(world_id)
        .ok_or_else(|| GameError::MapNotFound(world_id.to_string()))?;

    let topics = curriculum
        .topics
        .into_iter()
        .map(|raw| {
            let questions = raw
                .questions
                .into_iter()
                .filter_map(|q| match Question::try_from(q) {
                    Ok(q) => Some(q),
                    Err(e) => {
                        tracing::warn!("Skipping question in topic {}: {}", raw.id, e);
                        None
                    }
                })
                .collect();
            Topic {
                id: raw.id,
                name: raw.name,
                questions,
            }
        })
        .collect();

    Ok(WorldData {
        id: world_id.to_string(),
        name: map.name,
        background: map.background,
        nodes: map.nodes,
        topics,
        lessons: lessons.lessons,
    })
}

/// Parses a world straight from the three JSON documents.
pub fn world_from_json(
    world_id: &str,
    maps_json: &str,
    questions_json: &str,
    lessons_json: &str,
) -> GameResult<WorldData> {
    let maps: HashMap<String, MapFile> = serde_json::from_str(maps_json)?;
    let questions: QuestionsFile = serde_json::from_str(questions_json)?;
    let lessons: LessonsFile = serde_json::from_str(lessons_json)?;
    assemble_world(world_id, maps, questions, lessons)
}

/// Reads worlds from JSON files in a data directory.
#[derive(Debug, Clone)]
pub struct JsonWorldSource {
    data_dir: PathBuf,
}

impl JsonWorldSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn read(&self, file: &str) -> GameResult<String> {
        Ok(fs::read_to_string(self.data_dir.join(file))?)
    }

    fn world_order(&self) -> GameResult<Vec<String>> {
        let questions: QuestionsFile = serde_json::from_str(&self.read(QUESTIONS_FILE)?)?;
        Ok(questions
            .curriculum
            .into_iter()
            .map(|c| c.world_id)
            .collect())
    }
}

impl WorldSource for JsonWorldSource {
    fn load(&self, world_id: &str) -> GameResult<WorldData> {
        let maps = self.read(MAPS_FILE)?;
        let questions = self.read(QUESTIONS_FILE)?;
        // Lessons are optional lore; a world without them is still playable.
        let lessons = match self.read(LESSONS_FILE) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("No lessons loaded: {}", e);
                "{}".to_string()
            }
        };
        world_from_json(world_id, &maps, &questions, &lessons)
    }

    fn next_world(&self, world_id: &str) -> Option<String> {
        match self.world_order() {
            Ok(order) => next_in_order(&order, world_id),
            Err(e) => {
                tracing::warn!("Could not read world order: {}", e);
                None
            }
        }
    }
}

/// Worlds held in memory, in play order.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorldSource {
    worlds: Vec<WorldData>,
}

impl MemoryWorldSource {
    pub fn new(worlds: Vec<WorldData>) -> Self {
        Self { worlds }
    }
}

impl WorldSource for MemoryWorldSource {
    fn load(&self, world_id: &str) -> GameResult<WorldData> {
        self.worlds
            .iter()
            .find(|w| w.id == world_id)
            .cloned()
            .ok_or_else(|| GameError::CurriculumNotFound(world_id.to_string()))
    }

    fn next_world(&self, world_id: &str) -> Option<String> {
        let order: Vec<String> = self.worlds.iter().map(|w| w.id.clone()).collect();
        next_in_order(&order, world_id)
    }
}

fn next_in_order(order: &[String], world_id: &str) -> Option<String> {
    let index = order.iter().position(|w| w == world_id)?;
    order.get(index + 1).cloned()
}

/// Loads a world into the game state and puts the player on its root node.
///
/// On failure the state is left untouched and the error is returned; the
/// caller must not enter gameplay.
pub fn load_world(
    state: &mut GameState,
    source: &dyn WorldSource,
    world_id: &str,
) -> GameResult<()> {
    tracing::info!("Loading world: {}", world_id);

    let data = match source.load(world_id) {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("Failed to load world {}: {}", world_id, e);
            return Err(e);
        }
    };

    install_world(state, data);
    Ok(())
}

/// Installs already-loaded world data as the active world.
pub fn install_world(state: &mut GameState, data: WorldData) {
    state.progression.current_world_id = data.id.clone();
    state.progression.unlock_world(&data.id);
    state.player.reset_position();
    state.combat = None;
    state.world = Some(ActiveWorld::from(data));
}

/// Resolves the question pool for a map node.
///
/// Bosses draw from every topic in the world. Nodes with a topic use that
/// topic, falling back to every topic if it is missing. `None` means the
/// node has no pool of its own and the caller picks a default.
pub fn questions_for_node(world: &ActiveWorld, node: &MapNode) -> Option<Vec<Question>> {
    if node.kind == NodeKind::Boss {
        tracing::debug!("Boss fight: aggregating all topics");
        return Some(world.all_questions());
    }

    let topic_id = node.topic_id.as_deref()?;

    match world.topic(topic_id) {
        Some(topic) => Some(topic.questions.clone()),
        None => {
            tracing::warn!("Topic {} not found, using every topic", topic_id);
            Some(world.all_questions())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::types::NodeStatus;

    const MAPS: &str = r#"{
        "world_1": {
            "name": "Whispering Forest",
            "background": "forest.png",
            "nodes": [
                {"id": 0, "type": "start", "name": "Start", "connections": [1], "status": "completed"},
                {"id": 1, "type": "enemy", "name": "Java Intro", "topicId": "java_basics", "connections": [2], "status": "unlocked"},
                {"id": 2, "type": "boss", "name": "Undead Lord", "connections": [], "status": "locked"}
            ]
        },
        "world_2": {"name": "Caves", "nodes": []}
    }"#;

    const QUESTIONS: &str = r#"{
        "curriculum": [
            {"worldId": "world_1", "topics": [
                {"id": "java_basics", "name": "Java Basics", "questions": [
                    {"id": 1, "text": "Keyword for a constant?", "answers": ["static", "final", "const", "let"], "correct": 1},
                    {"id": 2, "text": "Broken", "answers": ["a"], "correct": 5}
                ]},
                {"id": "oop_concepts", "name": "OOP", "questions": [
                    {"id": 3, "text": "Hiding internal state?", "type": "input", "acceptedAnswers": ["Encapsulation"], "difficulty": "hard"}
                ]}
            ]},
            {"worldId": "world_2", "topics": []}
        ]
    }"#;

    const LESSONS: &str = r#"{"lessons": {"java_basics": {"title": "Variables", "pages": ["A variable holds a value."]}}}"#;

    fn loaded_state() -> GameState {
        let data = world_from_json("world_1", MAPS, QUESTIONS, LESSONS).unwrap();
        let mut state = GameState::new();
        install_world(&mut state, data);
        state
    }

    #[test]
    fn test_world_from_json_builds_topics_and_skips_invalid_questions() {
        let world = world_from_json("world_1", MAPS, QUESTIONS, LESSONS).unwrap();
        assert_eq!(world.name, "Whispering Forest");
        assert_eq!(world.nodes.len(), 3);
        assert_eq!(world.nodes[1].status, NodeStatus::Available);
        assert_eq!(world.topics.len(), 2);
        // question 2 has an out-of-range correct index
        assert_eq!(world.topics[0].questions.len(), 1);
        assert!(world.lessons.contains_key("java_basics"));
    }

    #[test]
    fn test_missing_curriculum_is_an_error() {
        let result = world_from_json("world_9", MAPS, QUESTIONS, LESSONS);
        assert!(matches!(result, Err(GameError::CurriculumNotFound(id)) if id == "world_9"));
    }

    #[test]
    fn test_load_world_failure_leaves_state_untouched() {
        let source = MemoryWorldSource::default();
        let mut state = GameState::new();
        state.player.current_node_id = 4;

        assert!(load_world(&mut state, &source, "world_1").is_err());
        assert!(state.world.is_none());
        assert_eq!(state.player.current_node_id, 4);
    }

    #[test]
    fn test_load_world_resets_player_to_root() {
        let data = world_from_json("world_1", MAPS, QUESTIONS, LESSONS).unwrap();
        let source = MemoryWorldSource::new(vec![data]);
        let mut state = GameState::new();
        state.player.current_node_id = 2;
        state.player.previous_node_id = Some(1);

        load_world(&mut state, &source, "world_1").unwrap();

        assert_eq!(state.player.current_node_id, 0);
        assert_eq!(state.player.previous_node_id, None);
        assert_eq!(state.progression.current_world_id, "world_1");
        assert!(state.progression.is_world_unlocked("world_1"));
        assert!(state.world.is_some());
    }

    #[test]
    fn test_boss_gets_every_topic() {
        let state = loaded_state();
        let world = state.world.as_ref().unwrap();
        let boss = world.node(2).unwrap();
        let pool = questions_for_node(world, boss).unwrap();
        let ids: Vec<u32> = pool.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_topic_node_gets_its_topic() {
        let state = loaded_state();
        let world = state.world.as_ref().unwrap();
        let pool = questions_for_node(world, world.node(1).unwrap()).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, 1);
    }

    #[test]
    fn test_unknown_topic_falls_back_to_union() {
        let state = loaded_state();
        let world = state.world.as_ref().unwrap();
        let node = MapNode::new(7, NodeKind::Enemy, "Lost", vec![]).with_topic("nope");
        let pool = questions_for_node(world, &node).unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_no_topic_means_no_specific_pool() {
        let state = loaded_state();
        let world = state.world.as_ref().unwrap();
        let node = MapNode::new(8, NodeKind::Enemy, "Wanderer", vec![]);
        assert!(questions_for_node(world, &node).is_none());
    }

    #[test]
    fn test_next_world_follows_order() {
        let w1 = world_from_json("world_1", MAPS, QUESTIONS, LESSONS).unwrap();
        let w2 = world_from_json("world_2", MAPS, QUESTIONS, LESSONS).unwrap();
        let source = MemoryWorldSource::new(vec![w1, w2]);
        assert_eq!(source.next_world("world_1").as_deref(), Some("world_2"));
        assert_eq!(source.next_world("world_2"), None);
        assert_eq!(source.next_world("unknown"), None);
    }
}
