//! Game controller tying the map, combat and saves together.
//!
//! [`Game`] owns the [`GameState`] and routes [`PlayerInput`] and elapsed
//! time to whichever screen is active. It is also the only place that acts
//! on combat outcomes and node completions: completing nodes, switching
//! worlds and writing saves.

use super::config::CombatSettings;
use super::error::GameResult;
use super::game_state::GameState;
use crate::audio::AudioCue;
use crate::combat::{self, CombatEvent, CombatOutcome};
use crate::map::{self, Encounter, Interlude, InterludeOutcome, MapEvent, NodeCompletion, RankView};
use crate::save_manager::{SaveData, SaveManager};
use crate::world::loader::{load_world, WorldSource};
use crate::world::types::{Lesson, NodeStatus};
use rand::Rng;
use uuid::Uuid;

/// Which screen is in front
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Map,
    Interlude(Interlude),
    Combat,
    Lesson { lesson: Lesson, page: usize },
    GameOver,
    RunComplete,
}

/// Discrete player actions delivered by the front-end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    SelectNode(u32),
    ConfirmMove,
    CancelMove,
    UseItem(usize),
    Answer(usize),
    SubmitText(String),
    UseHint,
    ResolveQte,
    NextPage,
    PreviousPage,
    AcknowledgeLesson,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Combat(CombatEvent),
    Map(MapEvent),
    WorldEntered { world_id: String, name: String },
    GameOver,
    RunComplete,
}

fn combat_events(events: Vec<CombatEvent>) -> impl Iterator<Item = GameEvent> {
    events.into_iter().map(GameEvent::Combat)
}

fn map_events(events: Vec<MapEvent>) -> impl Iterator<Item = GameEvent> {
    events.into_iter().map(GameEvent::Map)
}

pub struct Game<R: Rng> {
    state: GameState,
    mode: Mode,
    pending_node: Option<u32>,
    source: Box<dyn WorldSource>,
    saves: Option<SaveManager>,
    settings: CombatSettings,
    run_id: Uuid,
    /// Cleared on the first move after a world is entered or restored
    fresh_map: bool,
    rng: R,
}

impl<R: Rng> Game<R> {
    /// Creates an idle game. Call [`Game::start_new_run`] or
    /// [`Game::resume_or_start`] before sending input.
    pub fn new(
        source: Box<dyn WorldSource>,
        saves: Option<SaveManager>,
        settings: CombatSettings,
        rng: R,
    ) -> Self {
        Self {
            state: GameState::new(),
            mode: Mode::Map,
            pending_node: None,
            source,
            saves,
            settings,
            run_id: Uuid::new_v4(),
            fresh_map: true,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn pending_node(&self) -> Option<u32> {
        self.pending_node
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn is_over(&self) -> bool {
        matches!(self.mode, Mode::GameOver | Mode::RunComplete)
    }

    /// Rank layout for the map screen
    pub fn map_view(&self) -> Vec<RankView> {
        map::rank_views(&self.state, self.fresh_map)
    }

    /// Starts a fresh run in `world_id`, replacing any state in memory.
    pub fn start_new_run(&mut self, world_id: &str) -> GameResult<Vec<GameEvent>> {
        let mut state = GameState::new();
        load_world(&mut state, self.source.as_ref(), world_id)?;

        self.state = state;
        self.run_id = Uuid::new_v4();
        self.enter_map();
        tracing::info!("Started run {} in {}", self.run_id, world_id);
        Ok(vec![self.world_entered()])
    }

    /// Continues the saved run if there is a readable one, else starts fresh.
    pub fn resume_or_start(&mut self, world_id: &str) -> GameResult<Vec<GameEvent>> {
        let saved = match self.saves.as_ref() {
            Some(saves) if saves.save_exists() => match saves.load() {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::error!("Failed to load save, starting fresh: {}", e);
                    None
                }
            },
            _ => None,
        };

        match saved {
            Some(data) => match self.restore(data) {
                Ok(events) => Ok(events),
                Err(e) => {
                    tracing::error!("Failed to restore save, starting fresh: {}", e);
                    self.start_new_run(world_id)
                }
            },
            None => self.start_new_run(world_id),
        }
    }

    fn restore(&mut self, data: SaveData) -> GameResult<Vec<GameEvent>> {
        let mut state = GameState::new();
        load_world(
            &mut state,
            self.source.as_ref(),
            &data.progression.current_world_id,
        )?;

        if let (Some(world), Some(snapshot)) = (state.world.as_mut(), data.map.as_ref()) {
            map::restore_map(world, snapshot);
        }
        state.player = data.player;
        state.progression = data.progression;

        self.state = state;
        self.run_id = data.run_id;
        self.enter_map();
        tracing::info!(
            "Resumed run {} at node {}",
            self.run_id,
            self.state.player.current_node_id
        );
        Ok(vec![self.world_entered()])
    }

    fn enter_map(&mut self) {
        self.mode = Mode::Map;
        self.pending_node = None;
        self.fresh_map = true;
    }

    fn world_entered(&self) -> GameEvent {
        let (world_id, name) = self
            .state
            .world
            .as_ref()
            .map(|w| (w.id.clone(), w.name.clone()))
            .unwrap_or_default();
        GameEvent::WorldEntered { world_id, name }
    }

    /// Routes one player action to the active screen. Actions that make no
    /// sense for the current screen are ignored.
    pub fn handle_input(&mut self, input: PlayerInput) -> Vec<GameEvent> {
        match self.mode {
            Mode::Map => self.handle_map_input(input),
            Mode::Combat => self.handle_combat_input(input),
            Mode::Lesson { .. } => self.handle_lesson_input(input),
            Mode::Interlude(_) | Mode::GameOver | Mode::RunComplete => Vec::new(),
        }
    }

    fn handle_map_input(&mut self, input: PlayerInput) -> Vec<GameEvent> {
        match input {
            PlayerInput::SelectNode(id) => {
                let selectable = map::can_move_to(&self.state, id)
                    && self
                        .state
                        .world
                        .as_ref()
                        .and_then(|w| w.node(id))
                        .is_some_and(|n| n.status == NodeStatus::Available);
                if !selectable {
                    return Vec::new();
                }
                self.pending_node = Some(id);
                vec![
                    GameEvent::Map(MapEvent::Sound(AudioCue::Hover)),
                    GameEvent::Map(MapEvent::NodeSelected { node_id: id }),
                ]
            }
            PlayerInput::CancelMove => match self.pending_node.take() {
                Some(_) => vec![GameEvent::Map(MapEvent::SelectionCleared)],
                None => Vec::new(),
            },
            PlayerInput::ConfirmMove => match self.pending_node.take() {
                Some(id) => self.enter_node(id),
                None => Vec::new(),
            },
            PlayerInput::UseItem(index) => {
                map_events(map::use_item(&mut self.state, index)).collect()
            }
            _ => Vec::new(),
        }
    }

    fn handle_combat_input(&mut self, input: PlayerInput) -> Vec<GameEvent> {
        let events = match input {
            PlayerInput::Answer(index) => combat::handle_answer(&mut self.state, index),
            PlayerInput::SubmitText(text) => combat::handle_input_answer(&mut self.state, &text),
            PlayerInput::UseHint => combat::use_hint(&mut self.state, &mut self.rng),
            PlayerInput::ResolveQte => combat::resolve_qte(&mut self.state),
            _ => Vec::new(),
        };
        combat_events(events).collect()
    }

    fn handle_lesson_input(&mut self, input: PlayerInput) -> Vec<GameEvent> {
        match input {
            PlayerInput::NextPage | PlayerInput::PreviousPage => {
                let forward = input == PlayerInput::NextPage;
                match &mut self.mode {
                    Mode::Lesson { lesson, page } => {
                        let total = lesson.pages.len().max(1);
                        map_events(map::turn_page(page, total, forward)).collect()
                    }
                    _ => Vec::new(),
                }
            }
            PlayerInput::AcknowledgeLesson => {
                let mut events = vec![
                    GameEvent::Map(MapEvent::Sound(AudioCue::JournalClose)),
                    GameEvent::Map(MapEvent::LessonClosed),
                ];
                self.mode = Mode::Map;
                if let Some(completion) = map::acknowledge_lesson(&mut self.state) {
                    events.extend(self.on_node_completed(completion));
                }
                events
            }
            _ => Vec::new(),
        }
    }

    fn enter_node(&mut self, target: u32) -> Vec<GameEvent> {
        let from = self.state.player.current_node_id;
        if !map::can_move_to(&self.state, target) {
            return Vec::new();
        }
        let encounter = map::proceed_to_node(&mut self.state, target);
        self.fresh_map = false;

        let mut events = vec![GameEvent::Map(MapEvent::MovedTo { from, to: target })];
        match encounter {
            Some(Encounter::Combat {
                node_id,
                is_wildcard,
            }) => events.extend(self.begin_combat(node_id, is_wildcard)),
            Some(Encounter::Interlude(kind)) => {
                let (interlude, beat) = map::start_interlude(kind, target);
                self.mode = Mode::Interlude(interlude);
                events.extend(map_events(beat));
            }
            Some(Encounter::Lesson { .. }) => {
                let opened = map::open_lesson(&mut self.state);
                let lesson = opened.iter().find_map(|e| match e {
                    MapEvent::LessonOpened { lesson, .. } => Some(lesson.clone()),
                    _ => None,
                });
                if let Some(lesson) = lesson {
                    self.mode = Mode::Lesson { lesson, page: 0 };
                }
                events.extend(map_events(opened));
            }
            None => {}
        }
        events
    }

    fn begin_combat(&mut self, node_id: u32, is_wildcard: bool) -> Vec<GameEvent> {
        let Some(node) = self
            .state
            .world
            .as_ref()
            .and_then(|w| w.node(node_id))
            .cloned()
        else {
            tracing::warn!("Combat requested on missing node {}", node_id);
            return Vec::new();
        };

        let events = combat::start_combat(
            &mut self.state,
            &node,
            is_wildcard,
            self.settings,
            &mut self.rng,
        );
        self.mode = Mode::Combat;
        combat_events(events).collect()
    }

    /// Advances timers on the active screen by `delta_ms`.
    pub fn tick(&mut self, delta_ms: u64) -> Vec<GameEvent> {
        match self.mode {
            Mode::Combat => self.tick_combat(delta_ms),
            Mode::Interlude(_) => self.tick_interlude(delta_ms),
            _ => Vec::new(),
        }
    }

    fn tick_combat(&mut self, delta_ms: u64) -> Vec<GameEvent> {
        let mut events: Vec<GameEvent> =
            combat_events(combat::tick(&mut self.state, delta_ms, &mut self.rng)).collect();

        let outcome = self.state.combat.as_ref().and_then(|c| c.outcome());
        let Some(outcome) = outcome else {
            return events;
        };
        combat::end_combat(&mut self.state);

        match outcome {
            CombatOutcome::Victory => {
                self.mode = Mode::Map;
                if let Some(completion) = map::complete_node(&mut self.state) {
                    events.extend(self.on_node_completed(completion));
                }
            }
            CombatOutcome::Defeat => {
                tracing::info!(
                    "Run {} ended in defeat at node {}",
                    self.run_id,
                    self.state.player.current_node_id
                );
                self.mode = Mode::GameOver;
                events.push(GameEvent::GameOver);
            }
        }
        events
    }

    fn tick_interlude(&mut self, delta_ms: u64) -> Vec<GameEvent> {
        let (mut events, finished) = match &mut self.mode {
            Mode::Interlude(interlude) => {
                let events: Vec<GameEvent> = map_events(map::tick_interlude(
                    interlude,
                    &mut self.state.player,
                    delta_ms,
                    &mut self.rng,
                ))
                .collect();
                let finished = interlude
                    .finished
                    .then(|| (interlude.node_id, interlude.outcome.clone()));
                (events, finished)
            }
            _ => return Vec::new(),
        };

        match finished {
            Some((node_id, Some(InterludeOutcome::Ambush))) => {
                events.extend(self.begin_combat(node_id, true));
            }
            Some(_) => {
                self.mode = Mode::Map;
                if let Some(completion) = map::complete_node(&mut self.state) {
                    events.extend(self.on_node_completed(completion));
                }
            }
            None => {}
        }
        events
    }

    fn on_node_completed(&mut self, completion: NodeCompletion) -> Vec<GameEvent> {
        let world_cleared = completion.world_cleared;
        let mut events = vec![GameEvent::Map(MapEvent::NodeCompleted(completion))];

        if world_cleared {
            events.extend(self.advance_world());
        } else {
            self.save();
        }
        events
    }

    fn advance_world(&mut self) -> Vec<GameEvent> {
        let current = self.state.progression.current_world_id.clone();
        let Some(next) = self.source.next_world(&current) else {
            tracing::info!("Run {} complete after {}", self.run_id, current);
            self.mode = Mode::RunComplete;
            self.clear_save();
            return vec![GameEvent::RunComplete];
        };

        match load_world(&mut self.state, self.source.as_ref(), &next) {
            Ok(()) => {
                self.enter_map();
                self.save();
                vec![self.world_entered()]
            }
            Err(_) => {
                // load_world already logged the cause; stay on the cleared map
                self.save();
                vec![GameEvent::Map(MapEvent::Feedback {
                    text: "The path onward is blocked.".to_string(),
                    success: false,
                })]
            }
        }
    }

    /// Writes a save. Failures are logged and play continues in memory.
    fn save(&self) {
        let Some(saves) = self.saves.as_ref() else {
            return;
        };
        if self.state.in_combat() {
            return;
        }
        let data = SaveData::new(
            self.run_id,
            self.state.player.clone(),
            self.state.progression.clone(),
            self.state.world.as_ref().map(map::snapshot_map),
        );
        if let Err(e) = saves.save(&data) {
            tracing::error!("Failed to save game: {}", e);
        }
    }

    fn clear_save(&self) {
        if let Some(saves) = self.saves.as_ref() {
            if let Err(e) = saves.clear() {
                tracing::error!("Failed to clear save: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::FRAME_MS;
    use crate::world::loader::MemoryWorldSource;
    use crate::world::types::{MapNode, NodeKind, Question, Topic, WorldData};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeMap;

    fn world(id: &str, boss_only: bool) -> WorldData {
        let nodes = if boss_only {
            vec![
                MapNode::new(0, NodeKind::Start, "Start", vec![1])
                    .with_status(NodeStatus::Completed),
                MapNode::new(1, NodeKind::Boss, "Guardian", vec![])
                    .with_status(NodeStatus::Available),
            ]
        } else {
            vec![
                MapNode::new(0, NodeKind::Start, "Start", vec![1])
                    .with_status(NodeStatus::Completed),
                MapNode::new(1, NodeKind::Enemy, "Gate", vec![2])
                    .with_topic("basics")
                    .with_status(NodeStatus::Available),
                MapNode::new(2, NodeKind::Boss, "Lord", vec![]),
            ]
        };
        WorldData {
            id: id.to_string(),
            name: format!("World {}", id),
            background: String::new(),
            nodes,
            topics: vec![Topic {
                id: "basics".to_string(),
                name: "Basics".to_string(),
                questions: vec![
                    Question::multiple_choice(1, "1+1?", &["2", "3"], 0),
                    Question::multiple_choice(2, "2+2?", &["4", "5"], 0),
                ],
            }],
            lessons: BTreeMap::new(),
        }
    }

    fn game(worlds: Vec<WorldData>) -> Game<ChaCha8Rng> {
        Game::new(
            Box::new(MemoryWorldSource::new(worlds)),
            None,
            CombatSettings::default(),
            ChaCha8Rng::seed_from_u64(3),
        )
    }

    /// Answers correctly and blocks every strike until the fight ends.
    fn win_fight(game: &mut Game<ChaCha8Rng>) {
        for _ in 0..20_000 {
            if game.mode() != &Mode::Combat {
                return;
            }
            let can_block = game
                .state()
                .combat
                .as_ref()
                .and_then(|c| c.qte.as_ref())
                .is_some_and(|q| q.is_hit());
            if can_block {
                game.handle_input(PlayerInput::ResolveQte);
            }
            game.handle_input(PlayerInput::Answer(0));
            game.tick(FRAME_MS);
        }
        panic!("fight never ended");
    }

    #[test]
    fn test_start_new_run_enters_map() {
        let mut game = game(vec![world("world_1", false)]);
        let events = game.start_new_run("world_1").unwrap();
        assert_eq!(
            events,
            vec![GameEvent::WorldEntered {
                world_id: "world_1".to_string(),
                name: "World world_1".to_string()
            }]
        );
        assert_eq!(game.mode(), &Mode::Map);
        assert_eq!(game.state().player.current_node_id, 0);
    }

    #[test]
    fn test_missing_world_is_an_error() {
        let mut game = game(vec![]);
        assert!(game.start_new_run("world_1").is_err());
        assert!(game.state().world.is_none());
    }

    #[test]
    fn test_select_and_cancel() {
        let mut game = game(vec![world("world_1", false)]);
        game.start_new_run("world_1").unwrap();

        assert!(game.handle_input(PlayerInput::SelectNode(2)).is_empty());
        assert!(game.pending_node().is_none());

        game.handle_input(PlayerInput::SelectNode(1));
        assert_eq!(game.pending_node(), Some(1));
        game.handle_input(PlayerInput::CancelMove);
        assert!(game.pending_node().is_none());
        assert!(game.handle_input(PlayerInput::ConfirmMove).is_empty());
    }

    #[test]
    fn test_victory_completes_node() {
        let mut game = game(vec![world("world_1", false)]);
        game.start_new_run("world_1").unwrap();
        game.handle_input(PlayerInput::SelectNode(1));
        game.handle_input(PlayerInput::ConfirmMove);
        assert_eq!(game.mode(), &Mode::Combat);

        win_fight(&mut game);
        assert_eq!(game.mode(), &Mode::Map);
        assert!(game.state().combat.is_none());
        let world = game.state().world.as_ref().unwrap();
        assert_eq!(world.node(1).unwrap().status, NodeStatus::Completed);
        assert_eq!(world.node(2).unwrap().status, NodeStatus::Available);
    }

    #[test]
    fn test_boss_victory_moves_to_next_world() {
        let mut game = game(vec![world("world_1", true), world("world_2", false)]);
        game.start_new_run("world_1").unwrap();
        game.handle_input(PlayerInput::SelectNode(1));
        game.handle_input(PlayerInput::ConfirmMove);
        win_fight(&mut game);

        assert_eq!(game.mode(), &Mode::Map);
        assert_eq!(game.state().progression.current_world_id, "world_2");
        assert!(game.state().progression.is_world_unlocked("world_1"));
        assert!(game.state().progression.is_world_unlocked("world_2"));
        assert_eq!(game.state().player.current_node_id, 0);
    }

    #[test]
    fn test_last_boss_completes_run() {
        let mut game = game(vec![world("world_1", true)]);
        game.start_new_run("world_1").unwrap();
        game.handle_input(PlayerInput::SelectNode(1));
        game.handle_input(PlayerInput::ConfirmMove);
        win_fight(&mut game);

        assert_eq!(game.mode(), &Mode::RunComplete);
        assert!(game.is_over());
        assert!(game.handle_input(PlayerInput::SelectNode(1)).is_empty());
    }

    #[test]
    fn test_defeat_ends_run() {
        let mut game = game(vec![world("world_1", false)]);
        game.start_new_run("world_1").unwrap();
        game.handle_input(PlayerInput::SelectNode(1));
        game.handle_input(PlayerInput::ConfirmMove);

        let mut game_overs = 0;
        for _ in 0..20_000 {
            if game.mode() != &Mode::Combat {
                break;
            }
            // Always wrong, never block
            game.handle_input(PlayerInput::Answer(1));
            game_overs += game
                .tick(FRAME_MS)
                .iter()
                .filter(|e| **e == GameEvent::GameOver)
                .count();
        }
        assert_eq!(game.mode(), &Mode::GameOver);
        assert_eq!(game_overs, 1);
        assert!(game.state().player.current_hp <= 0);
    }

    #[test]
    fn test_item_use_only_on_map() {
        let mut game = game(vec![world("world_1", false)]);
        game.start_new_run("world_1").unwrap();
        game.state_mut().player.take_damage(1);
        game.state_mut()
            .player
            .add_item(crate::world::types::Item::small_potion());

        game.handle_input(PlayerInput::SelectNode(1));
        game.handle_input(PlayerInput::ConfirmMove);
        assert!(game.handle_input(PlayerInput::UseItem(0)).is_empty());
        assert_eq!(game.state().player.inventory.len(), 1);
    }
}
