//! Map progression: fog of war, move validation, node completion,
//! interludes, lessons and item use.

use super::types::{
    Encounter, Interlude, InterludeKind, InterludeOutcome, MapEvent, MapSnapshot, NodeCompletion,
    NodeView, RankView, RankVisibility,
};
use crate::audio::AudioCue;
use crate::core::constants::{
    FIRST_NODE_ID, INTERLUDE_EXPLORE_MS, INTERLUDE_REVEAL_MS, LARGE_POTION_CHANCE,
    OBSCURED_NODE_LABEL, ROOT_NODE_ID, WILDCARD_AMBUSH_CHANCE,
};
use crate::core::game_state::{ActiveWorld, GameState, Player};
use crate::world::types::{Item, Lesson, MapNode, NodeKind, NodeStatus};
use rand::Rng;
use std::collections::{HashSet, VecDeque};

/// Groups node IDs by breadth-first distance from the root.
///
/// A node reachable along several paths belongs to the rank where it was
/// first discovered. Connections to IDs that are not in `nodes` are skipped.
pub fn compute_ranks(nodes: &[MapNode]) -> Vec<Vec<u32>> {
    let mut ranks: Vec<Vec<u32>> = Vec::new();
    let mut queue = VecDeque::new();
    let mut visited = HashSet::new();

    queue.push_back((ROOT_NODE_ID, 0usize));
    visited.insert(ROOT_NODE_ID);

    while let Some((id, depth)) = queue.pop_front() {
        let Some(node) = nodes.iter().find(|n| n.id == id) else {
            continue;
        };
        if ranks.len() <= depth {
            ranks.resize_with(depth + 1, Vec::new);
        }
        ranks[depth].push(id);

        for &next in &node.connections {
            if visited.insert(next) {
                queue.push_back((next, depth + 1));
            }
        }
    }

    ranks
}

/// Index of the rank containing `node_id`, defaulting to the root rank.
pub fn rank_of(ranks: &[Vec<u32>], node_id: u32) -> usize {
    ranks
        .iter()
        .position(|rank| rank.contains(&node_id))
        .unwrap_or(0)
}

fn visibility_for(depth: usize, current: usize, reveal: bool) -> RankVisibility {
    if depth <= current {
        RankVisibility::Visible
    } else if depth == current + 1 {
        if reveal {
            RankVisibility::Revealing
        } else {
            RankVisibility::Visible
        }
    } else if depth == current + 2 {
        RankVisibility::Obscured
    } else {
        RankVisibility::Hidden
    }
}

/// Builds the map screen's view of the active world.
///
/// The rank ahead of the player plays its reveal transition unless this is
/// the first render or the player has not moved yet. Hidden ranks are
/// included so callers can keep depth indices stable.
pub fn rank_views(state: &GameState, first_render: bool) -> Vec<RankView> {
    let Some(world) = state.world.as_ref() else {
        return Vec::new();
    };

    let ranks = compute_ranks(&world.nodes);
    let current_id = state.player.current_node_id;
    let current = rank_of(&ranks, current_id);
    let reveal = !first_render && state.player.previous_node_id.is_some();

    ranks
        .iter()
        .enumerate()
        .map(|(depth, ids)| {
            let visibility = visibility_for(depth, current, reveal);
            let nodes = ids
                .iter()
                .filter_map(|id| world.node(*id))
                .map(|node| {
                    let obscured = visibility == RankVisibility::Obscured;
                    NodeView {
                        id: node.id,
                        label: if obscured {
                            OBSCURED_NODE_LABEL.to_string()
                        } else {
                            node.name.clone()
                        },
                        kind: node.kind,
                        status: node.status,
                        clickable: node.status == NodeStatus::Available
                            && visibility.is_shown()
                            && !obscured,
                        is_current: node.id == current_id,
                    }
                })
                .collect();
            RankView {
                depth,
                visibility,
                nodes,
            }
        })
        .collect()
}

/// Whether the player may travel from their current node to `target`.
pub fn can_move_to(state: &GameState, target: u32) -> bool {
    let current = state.player.current_node_id;
    if current == ROOT_NODE_ID && target == FIRST_NODE_ID {
        return true;
    }
    state
        .current_node()
        .is_some_and(|node| node.connections.contains(&target))
}

/// Moves the player onto `target` and works out what happens there.
///
/// Every other branch leaving the current node is locked for good. Returns
/// `None` for an illegal move (nothing changes) or when the target has no
/// encounter, as with the start node.
pub fn proceed_to_node(state: &mut GameState, target: u32) -> Option<Encounter> {
    if !can_move_to(state, target) {
        tracing::warn!(
            "Refusing move from {} to {}",
            state.player.current_node_id,
            target
        );
        return None;
    }

    let current = state.player.current_node_id;
    let world = state.world.as_mut()?;
    let kind = world.node(target)?.kind;

    let siblings: Vec<u32> = world
        .node(current)
        .map(|node| {
            node.connections
                .iter()
                .copied()
                .filter(|id| *id != target)
                .collect()
        })
        .unwrap_or_default();
    for id in &siblings {
        world.set_status(*id, NodeStatus::Locked);
    }
    if !siblings.is_empty() {
        tracing::debug!("Locked branches {:?}", siblings);
    }

    state.player.move_to(target);
    tracing::info!("Moved from node {} to node {}", current, target);

    match kind {
        kind if kind.is_combat() => Some(Encounter::Combat {
            node_id: target,
            is_wildcard: false,
        }),
        NodeKind::Item => Some(Encounter::Interlude(InterludeKind::Treasure)),
        NodeKind::Wildcard => Some(Encounter::Interlude(InterludeKind::Wildcard)),
        NodeKind::Lesson => Some(Encounter::Lesson { node_id: target }),
        _ => None,
    }
}

/// Marks the current node completed and opens up its connections.
pub fn complete_node(state: &mut GameState) -> Option<NodeCompletion> {
    let node_id = state.player.current_node_id;
    let world = state.world.as_mut()?;

    let (connections, kind) = {
        let node = world.node_mut(node_id)?;
        node.status = NodeStatus::Completed;
        (node.connections.clone(), node.kind)
    };

    let mut unlocked = Vec::new();
    for id in connections {
        if world.node(id).is_some() {
            world.set_status(id, NodeStatus::Available);
            unlocked.push(id);
        }
    }

    state.progression.record_stage(node_id);
    tracing::info!("Completed node {} ({:?})", node_id, kind);

    Some(NodeCompletion {
        node_id,
        unlocked,
        world_cleared: kind == NodeKind::Boss,
    })
}

/// Starts the scripted scene for an item or wildcard node.
pub fn start_interlude(kind: InterludeKind, node_id: u32) -> (Interlude, Vec<MapEvent>) {
    let interlude = Interlude::new(kind, node_id);
    let (title, description) = interlude.caption();
    (
        interlude,
        vec![MapEvent::InterludeBeat { title, description }],
    )
}

fn roll_outcome<R: Rng>(kind: InterludeKind, rng: &mut R) -> InterludeOutcome {
    match kind {
        InterludeKind::Treasure => {
            if rng.gen_bool(LARGE_POTION_CHANCE) {
                InterludeOutcome::Reward(Item::large_potion())
            } else {
                InterludeOutcome::Reward(Item::small_potion())
            }
        }
        InterludeKind::Wildcard => {
            if rng.gen_bool(WILDCARD_AMBUSH_CHANCE) {
                InterludeOutcome::Ambush
            } else {
                InterludeOutcome::Reward(Item::small_potion())
            }
        }
    }
}

/// Advances an interlude. Rewards go into the inventory the moment they
/// are revealed; the caller acts on the outcome once `finished` is set.
pub fn tick_interlude<R: Rng>(
    interlude: &mut Interlude,
    player: &mut Player,
    delta_ms: u64,
    rng: &mut R,
) -> Vec<MapEvent> {
    let mut events = Vec::new();
    if interlude.finished {
        return events;
    }
    interlude.elapsed_ms += delta_ms;

    if !interlude.is_revealed() && interlude.elapsed_ms >= INTERLUDE_EXPLORE_MS {
        let outcome = roll_outcome(interlude.kind, rng);
        if let InterludeOutcome::Reward(item) = &outcome {
            player.add_item(item.clone());
            events.push(MapEvent::ItemGained(item.clone()));
            events.push(MapEvent::StatsChanged);
        }
        tracing::debug!("Interlude on node {}: {:?}", interlude.node_id, outcome);
        interlude.outcome = Some(outcome);

        let (title, description) = interlude.caption();
        events.push(MapEvent::InterludeBeat { title, description });
    }

    if interlude.is_revealed()
        && interlude.elapsed_ms >= INTERLUDE_EXPLORE_MS + INTERLUDE_REVEAL_MS
    {
        interlude.finished = true;
    }
    events
}

fn lesson_for_node(world: &ActiveWorld, node: &MapNode) -> (Option<String>, Lesson) {
    if let Some(topic_id) = node.topic_id.as_deref() {
        if let Some(lesson) = world.lesson(topic_id) {
            return (Some(topic_id.to_string()), lesson.clone());
        }
        tracing::warn!("No lesson for topic {}", topic_id);
    }

    let page = if node.description.is_empty() {
        "The ink has faded beyond reading.".to_string()
    } else {
        node.description.clone()
    };
    (
        None,
        Lesson {
            title: node.name.clone(),
            pages: vec![page],
        },
    )
}

/// Opens the lesson on the current node and records its topic as unlocked.
///
/// Nodes without a matching lesson show their own description instead.
pub fn open_lesson(state: &mut GameState) -> Vec<MapEvent> {
    let Some(world) = state.world.as_ref() else {
        return Vec::new();
    };
    let Some(node) = world.node(state.player.current_node_id) else {
        return Vec::new();
    };
    if node.kind != NodeKind::Lesson {
        return Vec::new();
    }

    let (topic_id, lesson) = lesson_for_node(world, node);
    if let Some(topic_id) = &topic_id {
        state.player.unlocked_lessons.insert(topic_id.clone());
    }

    let total = lesson.pages.len().max(1);
    vec![
        MapEvent::Sound(AudioCue::JournalOpen),
        MapEvent::LessonOpened {
            topic_id: topic_id.unwrap_or_default(),
            lesson,
        },
        MapEvent::LessonPage { page: 0, total },
    ]
}

/// Flips the journal one page. Does nothing at either end.
pub fn turn_page(page: &mut usize, total: usize, forward: bool) -> Vec<MapEvent> {
    let next = if forward {
        (*page + 1 < total).then_some(*page + 1)
    } else {
        page.checked_sub(1)
    };

    match next {
        Some(next) => {
            *page = next;
            vec![
                MapEvent::Sound(AudioCue::JournalFlip),
                MapEvent::LessonPage { page: next, total },
            ]
        }
        None => Vec::new(),
    }
}

/// Closes the journal and completes the lesson node.
pub fn acknowledge_lesson(state: &mut GameState) -> Option<NodeCompletion> {
    let node = state.current_node()?;
    if node.kind != NodeKind::Lesson || node.status == NodeStatus::Completed {
        return None;
    }
    complete_node(state)
}

/// Drinks the item at `index` in the inventory.
///
/// Refused during combat and when hp is already full; the item is kept in
/// both cases.
pub fn use_item(state: &mut GameState, index: usize) -> Vec<MapEvent> {
    if state.in_combat() {
        return vec![MapEvent::Feedback {
            text: "Cannot use items in battle!".to_string(),
            success: false,
        }];
    }
    let player = &mut state.player;
    if index >= player.inventory.len() {
        return Vec::new();
    }
    if player.current_hp >= player.max_hp {
        return vec![MapEvent::Feedback {
            text: "HP is already full!".to_string(),
            success: false,
        }];
    }

    let item = player.inventory.remove(index);
    let healed = player.heal(item.hp);
    tracing::debug!("Used {} for {} hp", item.name, healed);

    vec![
        MapEvent::ItemUsed {
            name: item.name.clone(),
            healed,
        },
        MapEvent::StatsChanged,
        MapEvent::Feedback {
            text: format!("Used {}! HP is now {}", item.name, player.current_hp),
            success: true,
        },
    ]
}

/// Captures node statuses for saving.
pub fn snapshot_map(world: &ActiveWorld) -> MapSnapshot {
    MapSnapshot {
        world_id: world.id.clone(),
        statuses: world.nodes.iter().map(|n| (n.id, n.status)).collect(),
    }
}

/// Reapplies saved node statuses. Returns false if the snapshot belongs to
/// another world.
pub fn restore_map(world: &mut ActiveWorld, snapshot: &MapSnapshot) -> bool {
    if snapshot.world_id != world.id {
        tracing::warn!(
            "Map snapshot is for {}, active world is {}",
            snapshot.world_id,
            world.id
        );
        return false;
    }
    for (id, status) in &snapshot.statuses {
        world.set_status(*id, *status);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::loader::install_world;
    use crate::world::types::WorldData;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeMap;

    /// Whispering Forest layout: 1 forks into 2 and 3, both rejoin at 4.
    fn forest_nodes() -> Vec<MapNode> {
        vec![
            MapNode::new(0, NodeKind::Start, "Start", vec![1]).with_status(NodeStatus::Completed),
            MapNode::new(1, NodeKind::Enemy, "Java Intro", vec![2, 3])
                .with_topic("java_basics")
                .with_status(NodeStatus::Available),
            MapNode::new(2, NodeKind::Enemy, "OOP Basics", vec![4]),
            MapNode::new(3, NodeKind::Item, "Forest Cache", vec![4]),
            MapNode::new(4, NodeKind::Lesson, "Old Scroll", vec![5]).with_topic("java_basics"),
            MapNode::new(5, NodeKind::Wildcard, "Unknown Path", vec![6]),
            MapNode::new(6, NodeKind::Boss, "Undead Lord", vec![]),
        ]
    }

    fn forest_state() -> GameState {
        let mut lessons = BTreeMap::new();
        lessons.insert(
            "java_basics".to_string(),
            Lesson {
                title: "Variables".to_string(),
                pages: vec!["Page one".to_string(), "Page two".to_string()],
            },
        );
        let mut state = GameState::new();
        install_world(
            &mut state,
            WorldData {
                id: "world_1".to_string(),
                name: "Whispering Forest".to_string(),
                background: String::new(),
                nodes: forest_nodes(),
                topics: Vec::new(),
                lessons,
            },
        );
        state
    }

    fn status(state: &GameState, id: u32) -> NodeStatus {
        state.world.as_ref().unwrap().node(id).unwrap().status
    }

    #[test]
    fn test_compute_ranks_bfs() {
        let ranks = compute_ranks(&forest_nodes());
        assert_eq!(
            ranks,
            vec![vec![0], vec![1], vec![2, 3], vec![4], vec![5], vec![6]]
        );
    }

    #[test]
    fn test_compute_ranks_first_discovery_wins() {
        let nodes = vec![
            MapNode::new(0, NodeKind::Start, "S", vec![1, 2]),
            MapNode::new(1, NodeKind::Enemy, "A", vec![3]),
            MapNode::new(2, NodeKind::Enemy, "B", vec![]),
            MapNode::new(3, NodeKind::Enemy, "C", vec![2]),
        ];
        assert_eq!(compute_ranks(&nodes), vec![vec![0], vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_compute_ranks_skips_dangling_connections() {
        let nodes = vec![MapNode::new(0, NodeKind::Start, "S", vec![1, 99])];
        assert_eq!(compute_ranks(&nodes), vec![vec![0]]);
    }

    #[test]
    fn test_rank_views_first_render() {
        let state = forest_state();
        let views = rank_views(&state, true);

        assert_eq!(views[0].visibility, RankVisibility::Visible);
        assert_eq!(views[1].visibility, RankVisibility::Visible);
        assert_eq!(views[2].visibility, RankVisibility::Obscured);
        assert_eq!(views[3].visibility, RankVisibility::Hidden);

        assert!(views[0].nodes[0].is_current);
        assert!(views[1].nodes[0].clickable);
        assert_eq!(views[2].nodes[0].label, "???");
        assert!(views[2].nodes.iter().all(|n| !n.clickable));
    }

    #[test]
    fn test_rank_views_reveal_after_move() {
        let mut state = forest_state();
        proceed_to_node(&mut state, 1);
        complete_node(&mut state);

        let views = rank_views(&state, false);
        assert_eq!(views[1].visibility, RankVisibility::Visible);
        assert_eq!(views[2].visibility, RankVisibility::Revealing);
        assert_eq!(views[3].visibility, RankVisibility::Obscured);
        assert_eq!(views[4].visibility, RankVisibility::Hidden);
        assert!(views[2].nodes.iter().all(|n| n.clickable));

        // Re-render from scratch skips the reveal.
        assert_eq!(rank_views(&state, true)[2].visibility, RankVisibility::Visible);
    }

    #[test]
    fn test_obscured_available_node_not_clickable() {
        let mut state = forest_state();
        state
            .world
            .as_mut()
            .unwrap()
            .set_status(2, NodeStatus::Available);
        let views = rank_views(&state, true);
        assert!(!views[2].nodes[0].clickable);
    }

    #[test]
    fn test_can_move_to() {
        let mut state = forest_state();
        assert!(can_move_to(&state, 1));
        assert!(!can_move_to(&state, 2));

        state.player.move_to(1);
        assert!(can_move_to(&state, 2));
        assert!(can_move_to(&state, 3));
        assert!(!can_move_to(&state, 4));
    }

    #[test]
    fn test_root_may_always_reach_first_node() {
        let mut state = forest_state();
        state.world.as_mut().unwrap().node_mut(0).unwrap().connections.clear();
        assert!(can_move_to(&state, 1));
    }

    #[test]
    fn test_proceed_locks_siblings() {
        let mut state = forest_state();
        proceed_to_node(&mut state, 1);
        complete_node(&mut state);
        assert_eq!(status(&state, 2), NodeStatus::Available);
        assert_eq!(status(&state, 3), NodeStatus::Available);

        let encounter = proceed_to_node(&mut state, 3);
        assert_eq!(encounter, Some(Encounter::Interlude(InterludeKind::Treasure)));
        assert_eq!(status(&state, 2), NodeStatus::Locked);
        assert_eq!(state.player.current_node_id, 3);
        assert_eq!(state.player.previous_node_id, Some(1));
    }

    #[test]
    fn test_proceed_dispatches_by_kind() {
        let mut state = forest_state();
        assert_eq!(
            proceed_to_node(&mut state, 1),
            Some(Encounter::Combat {
                node_id: 1,
                is_wildcard: false
            })
        );

        state.player.current_node_id = 3;
        assert_eq!(
            proceed_to_node(&mut state, 4),
            Some(Encounter::Lesson { node_id: 4 })
        );
        assert_eq!(
            proceed_to_node(&mut state, 5),
            Some(Encounter::Interlude(InterludeKind::Wildcard))
        );
    }

    #[test]
    fn test_illegal_move_changes_nothing() {
        let mut state = forest_state();
        assert!(proceed_to_node(&mut state, 6).is_none());
        assert_eq!(state.player.current_node_id, 0);
        assert!(state.player.previous_node_id.is_none());
    }

    #[test]
    fn test_complete_node_unlocks_connections() {
        let mut state = forest_state();
        proceed_to_node(&mut state, 1);
        let completion = complete_node(&mut state).unwrap();

        assert_eq!(completion.node_id, 1);
        assert_eq!(completion.unlocked, vec![2, 3]);
        assert!(!completion.world_cleared);
        assert_eq!(status(&state, 1), NodeStatus::Completed);
        assert_eq!(state.progression.cleared_stages, vec!["world_1:1".to_string()]);
    }

    #[test]
    fn test_boss_completion_clears_world() {
        let mut state = forest_state();
        state.player.current_node_id = 6;
        assert!(complete_node(&mut state).unwrap().world_cleared);
    }

    #[test]
    fn test_interlude_timing() {
        let mut state = forest_state();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (mut interlude, events) = start_interlude(InterludeKind::Treasure, 3);
        assert_eq!(
            events,
            vec![MapEvent::InterludeBeat {
                title: "Exploring...",
                description: "You venture deeper into the forest..."
            }]
        );

        tick_interlude(&mut interlude, &mut state.player, 1_999, &mut rng);
        assert!(!interlude.is_revealed());
        assert!(state.player.inventory.is_empty());

        let events = tick_interlude(&mut interlude, &mut state.player, 1, &mut rng);
        assert!(interlude.is_revealed());
        assert_eq!(state.player.inventory.len(), 1);
        assert!(matches!(events[0], MapEvent::ItemGained(_)));

        tick_interlude(&mut interlude, &mut state.player, 1_499, &mut rng);
        assert!(!interlude.finished);
        tick_interlude(&mut interlude, &mut state.player, 1, &mut rng);
        assert!(interlude.finished);

        // Finished interludes are inert
        assert!(tick_interlude(&mut interlude, &mut state.player, 5_000, &mut rng).is_empty());
        assert_eq!(state.player.inventory.len(), 1);
    }

    #[test]
    fn test_treasure_large_potion_share() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let trials = 2000;
        let large = (0..trials)
            .filter(|_| {
                roll_outcome(InterludeKind::Treasure, &mut rng)
                    == InterludeOutcome::Reward(Item::large_potion())
            })
            .count();
        let share = large as f64 / trials as f64;
        assert!((0.25..0.35).contains(&share), "large share was {}", share);
    }

    #[test]
    fn test_wildcard_outcomes() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let trials = 2000;
        let ambushes = (0..trials)
            .filter(|_| roll_outcome(InterludeKind::Wildcard, &mut rng) == InterludeOutcome::Ambush)
            .count();
        let share = ambushes as f64 / trials as f64;
        assert!((0.45..0.55).contains(&share), "ambush share was {}", share);
    }

    #[test]
    fn test_ambush_gives_no_item() {
        let mut player = Player::new();
        let mut interlude = Interlude::new(InterludeKind::Wildcard, 5);
        interlude.outcome = Some(InterludeOutcome::Ambush);
        tick_interlude(&mut interlude, &mut player, 5_000, &mut ChaCha8Rng::seed_from_u64(0));
        assert!(interlude.finished);
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn test_lesson_flow() {
        let mut state = forest_state();
        state.player.current_node_id = 4;

        let events = open_lesson(&mut state);
        assert_eq!(events[0], MapEvent::Sound(AudioCue::JournalOpen));
        assert!(state.player.unlocked_lessons.contains("java_basics"));
        assert_eq!(status(&state, 4), NodeStatus::Locked);

        let mut page = 0;
        assert!(turn_page(&mut page, 2, false).is_empty());
        assert_eq!(turn_page(&mut page, 2, true).len(), 2);
        assert_eq!(page, 1);
        assert!(turn_page(&mut page, 2, true).is_empty());

        let completion = acknowledge_lesson(&mut state).unwrap();
        assert_eq!(completion.unlocked, vec![5]);
        assert_eq!(status(&state, 4), NodeStatus::Completed);
        assert!(acknowledge_lesson(&mut state).is_none());
    }

    #[test]
    fn test_lesson_without_topic_uses_description() {
        let mut state = forest_state();
        {
            let node = state.world.as_mut().unwrap().node_mut(4).unwrap();
            node.topic_id = None;
            node.description = "Knowledge is power.".to_string();
        }
        state.player.current_node_id = 4;

        let events = open_lesson(&mut state);
        let MapEvent::LessonOpened { lesson, .. } = &events[1] else {
            panic!("expected lesson");
        };
        assert_eq!(lesson.title, "Old Scroll");
        assert_eq!(lesson.pages, vec!["Knowledge is power.".to_string()]);
        assert!(state.player.unlocked_lessons.is_empty());
    }

    #[test]
    fn test_use_item_heals_and_consumes() {
        let mut state = forest_state();
        state.player.add_item(Item::large_potion());
        state.player.take_damage(1);

        let events = use_item(&mut state, 0);
        assert!(events.contains(&MapEvent::ItemUsed {
            name: "Large Potion".to_string(),
            healed: 1
        }));
        assert_eq!(state.player.current_hp, 3);
        assert!(state.player.inventory.is_empty());
    }

    #[test]
    fn test_use_item_refused_at_full_hp() {
        let mut state = forest_state();
        state.player.add_item(Item::small_potion());
        let events = use_item(&mut state, 0);
        assert_eq!(
            events,
            vec![MapEvent::Feedback {
                text: "HP is already full!".to_string(),
                success: false
            }]
        );
        assert_eq!(state.player.inventory.len(), 1);
        assert!(use_item(&mut state, 7).is_empty());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut state = forest_state();
        proceed_to_node(&mut state, 1);
        complete_node(&mut state);
        let snapshot = snapshot_map(state.world.as_ref().unwrap());

        let mut fresh = forest_state();
        assert!(restore_map(fresh.world.as_mut().unwrap(), &snapshot));
        assert_eq!(status(&fresh, 1), NodeStatus::Completed);
        assert_eq!(status(&fresh, 2), NodeStatus::Available);

        let mut other = snapshot.clone();
        other.world_id = "world_9".to_string();
        assert!(!restore_map(fresh.world.as_mut().unwrap(), &other));
    }
}
