//! World data structures: map nodes, questions, topics, lessons and items.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::GameError;

/// Kind of encounter a map node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Root of the map - nothing happens here
    Start,
    /// Ordinary combat
    Enemy,
    /// World finale; clearing it moves on to the next world
    Boss,
    /// Elite combat
    Miniboss,
    /// Guaranteed potion
    Item,
    /// Ambush or potion, decided on arrival
    Wildcard,
    /// Lore entry, completed once read
    Lesson,
}

impl NodeKind {
    pub fn is_combat(&self) -> bool {
        matches!(self, NodeKind::Enemy | NodeKind::Boss | NodeKind::Miniboss)
    }

    /// Short glyph for map rendering
    pub fn icon(&self) -> char {
        match self {
            NodeKind::Start => 'S',
            NodeKind::Enemy => 'E',
            NodeKind::Boss => 'B',
            NodeKind::Miniboss => 'M',
            NodeKind::Item => 'I',
            NodeKind::Wildcard => '?',
            NodeKind::Lesson => 'L',
        }
    }
}

/// Progress state of a map node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Locked,
    /// Reachable and selectable. Older map files call this "unlocked".
    #[serde(alias = "unlocked")]
    Available,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A vertex in the world map DAG
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    #[serde(rename = "topicId", default)]
    pub topic_id: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Outgoing edges only
    #[serde(default)]
    pub connections: Vec<u32>,
    pub status: NodeStatus,
}

impl MapNode {
    pub fn new(id: u32, kind: NodeKind, name: &str, connections: Vec<u32>) -> Self {
        Self {
            id,
            kind,
            name: name.to_string(),
            description: String::new(),
            topic_id: None,
            difficulty: None,
            connections,
            status: NodeStatus::Locked,
        }
    }

    pub fn with_topic(mut self, topic_id: &str) -> Self {
        self.topic_id = Some(topic_id.to_string());
        self
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }
}

/// How a question is answered
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerKind {
    MultipleChoice { answers: Vec<String>, correct: usize },
    /// Accepted answers are stored normalised (see [`normalize_answer`])
    FreeText { accepted: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub kind: AnswerKind,
    pub difficulty: Option<Difficulty>,
}

/// Trims and lowercases a typed answer for comparison.
pub fn normalize_answer(text: &str) -> String {
    text.trim().to_lowercase()
}

impl Question {
    pub fn multiple_choice(id: u32, text: &str, answers: &[&str], correct: usize) -> Self {
        Self {
            id,
            text: text.to_string(),
            kind: AnswerKind::MultipleChoice {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                correct,
            },
            difficulty: None,
        }
    }

    pub fn free_text(id: u32, text: &str, accepted: &[&str]) -> Self {
        Self {
            id,
            text: text.to_string(),
            kind: AnswerKind::FreeText {
                accepted: accepted.iter().map(|a| normalize_answer(a)).collect(),
            },
            difficulty: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn is_hard(&self) -> bool {
        self.difficulty == Some(Difficulty::Hard)
    }

    pub fn is_free_text(&self) -> bool {
        matches!(self.kind, AnswerKind::FreeText { .. })
    }

    /// Number of answer buttons (0 for free-text questions)
    pub fn option_count(&self) -> usize {
        match &self.kind {
            AnswerKind::MultipleChoice { answers, .. } => answers.len(),
            AnswerKind::FreeText { .. } => 0,
        }
    }

    pub fn correct_index(&self) -> Option<usize> {
        match &self.kind {
            AnswerKind::MultipleChoice { correct, .. } => Some(*correct),
            AnswerKind::FreeText { .. } => None,
        }
    }

    /// Whether a typed answer matches, ignoring case and surrounding whitespace.
    /// Always false for multiple-choice questions.
    pub fn accepts_text(&self, text: &str) -> bool {
        match &self.kind {
            AnswerKind::FreeText { accepted } => {
                let typed = normalize_answer(text);
                accepted.iter().any(|a| *a == typed)
            }
            AnswerKind::MultipleChoice { .. } => false,
        }
    }
}

/// Question as stored in questions.json
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub id: u32,
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub correct: Option<usize>,
    #[serde(rename = "acceptedAnswers", default)]
    pub accepted_answers: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl TryFrom<RawQuestion> for Question {
    type Error = GameError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| GameError::InvalidQuestion {
            id: raw.id,
            reason: reason.to_string(),
        };

        let kind = if raw.kind.as_deref() == Some("input") {
            let accepted: Vec<String> = raw
                .accepted_answers
                .iter()
                .map(|a| normalize_answer(a))
                .filter(|a| !a.is_empty())
                .collect();
            if accepted.is_empty() {
                return Err(invalid("free-text question has no accepted answers"));
            }
            AnswerKind::FreeText { accepted }
        } else {
            let correct = raw
                .correct
                .ok_or_else(|| invalid("multiple-choice question has no correct index"))?;
            if correct >= raw.answers.len() {
                return Err(invalid("correct index is out of range"));
            }
            AnswerKind::MultipleChoice {
                answers: raw.answers.clone(),
                correct,
            }
        };

        Ok(Self {
            id: raw.id,
            text: raw.text,
            kind,
            difficulty: raw.difficulty,
        })
    }
}

/// A named question pool addressable from map nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub questions: Vec<Question>,
}

/// Lore entry unlocked by lesson nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    #[serde(default)]
    pub pages: Vec<String>,
}

/// Everything needed to play one world
#[derive(Debug, Clone, PartialEq)]
pub struct WorldData {
    pub id: String,
    pub name: String,
    pub background: String,
    pub nodes: Vec<MapNode>,
    pub topics: Vec<Topic>,
    pub lessons: BTreeMap<String, Lesson>,
}

/// Consumable item template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub hp: i32,
    pub description: String,
}

impl Item {
    pub fn small_potion() -> Self {
        Self {
            name: "Small Potion".to_string(),
            hp: 1,
            description: "Restores 1 HP".to_string(),
        }
    }

    pub fn large_potion() -> Self {
        Self {
            name: "Large Potion".to_string(),
            hp: 2,
            description: "Restores 2 HP".to_string(),
        }
    }
}
