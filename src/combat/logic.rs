//! Turn-based quiz combat.
//!
//! A fight alternates between the player answering a question and the enemy
//! attacking, which the player blocks through the QTE minigame. All waiting
//! happens in [`tick`]: delays are scheduled [`CombatStep`]s, and every step
//! re-checks the current phase before acting so a step left over from an
//! earlier phase does nothing.

use super::qte::QteState;
use super::types::{
    Combat, CombatEvent, CombatOutcome, CombatPhase, CombatStep, Enemy, Resolution, TurnTimer,
    COMMON_TEMPLATE_COUNT, ELITE_TEMPLATE, STRONGEST_TEMPLATE,
};
use crate::audio::{AudioCue, MusicTrack};
use crate::core::config::CombatSettings;
use crate::core::constants::{
    BOSS_HARD_QUESTION_CHANCE, DELAY_ATTACK_ANIM_MS, DELAY_DAMAGE_MS, DELAY_ENEMY_WINDUP_MS,
    DELAY_TIMEOUT_SWITCH_MS, DELAY_TURN_SWITCH_MS, DELAY_VICTORY_OUTRO_MS, FRAME_MS,
    QTE_SETTLE_MS,
};
use crate::core::game_state::{GameState, Player};
use crate::world::loader::questions_for_node;
use crate::world::types::{MapNode, NodeKind, Question};
use rand::Rng;
use std::collections::BTreeSet;

/// Picks the enemy template for a node.
///
/// Bosses get the strongest template, minibosses the elite one, wildcard
/// ambushes a random common one, and everything else cycles through the
/// common templates by node ID.
pub fn select_template<R: Rng>(node: &MapNode, is_wildcard: bool, rng: &mut R) -> usize {
    match node.kind {
        NodeKind::Boss => STRONGEST_TEMPLATE,
        NodeKind::Miniboss => ELITE_TEMPLATE,
        _ if is_wildcard => rng.gen_range(0..COMMON_TEMPLATE_COUNT),
        _ => node.id as usize % COMMON_TEMPLATE_COUNT,
    }
}

/// Starts a fight on `node` and shows the first question.
pub fn start_combat<R: Rng>(
    state: &mut GameState,
    node: &MapNode,
    is_wildcard: bool,
    settings: CombatSettings,
    rng: &mut R,
) -> Vec<CombatEvent> {
    let enemy = Enemy::from_template(select_template(node, is_wildcard, rng));

    let pool = match state.world.as_ref() {
        Some(world) => questions_for_node(world, node)
            .filter(|pool| !pool.is_empty())
            .unwrap_or_else(|| world.all_questions()),
        None => Vec::new(),
    };
    if pool.is_empty() {
        tracing::warn!("Combat on node {} has no questions to ask", node.id);
    }

    tracing::debug!(
        "Combat started on node {} against {} ({} hp, {} questions)",
        node.id,
        enemy.name,
        enemy.max_hp,
        pool.len()
    );

    let mut events = vec![
        CombatEvent::Music(MusicTrack::Combat),
        CombatEvent::EnemySetup {
            name: enemy.name.clone(),
            icon: enemy.icon,
            hp: enemy.current_hp,
        },
        CombatEvent::StatsChanged,
        CombatEvent::TurnIndicator { player_turn: true },
        CombatEvent::BattleStart,
    ];

    let mut combat = Combat::new(enemy, node.id, node.kind == NodeKind::Boss, pool, settings);
    combat.is_ambush = is_wildcard;
    next_question(&mut combat, rng, &mut events);
    state.combat = Some(combat);

    events
}

/// Chooses the next question, never repeating one until the pool is exhausted.
///
/// When every question in `pool` has been used the used set is cleared and
/// the whole pool is eligible again. Boss fights prefer hard questions with
/// a 70% chance while any hard question is still available. Returns `None`
/// only for an empty pool.
pub fn pick_question<R: Rng>(
    pool: &[Question],
    used: &mut BTreeSet<u32>,
    is_boss: bool,
    rng: &mut R,
) -> Option<Question> {
    let mut available: Vec<&Question> = pool.iter().filter(|q| !used.contains(&q.id)).collect();

    if available.is_empty() {
        used.clear();
        available = pool.iter().collect();
    }
    if available.is_empty() {
        return None;
    }

    let chosen = if is_boss {
        let hard: Vec<&Question> = available.iter().copied().filter(|q| q.is_hard()).collect();
        if !hard.is_empty() && rng.gen_bool(BOSS_HARD_QUESTION_CHANCE) {
            hard[rng.gen_range(0..hard.len())]
        } else {
            available[rng.gen_range(0..available.len())]
        }
    } else {
        available[rng.gen_range(0..available.len())]
    };

    used.insert(chosen.id);
    Some(chosen.clone())
}

/// Shows a new question and restarts the turn timer.
pub fn generate_new_question<R: Rng>(state: &mut GameState, rng: &mut R) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    if let Some(combat) = state.combat.as_mut() {
        next_question(combat, rng, &mut events);
    }
    events
}

fn next_question<R: Rng>(combat: &mut Combat, rng: &mut R, events: &mut Vec<CombatEvent>) {
    combat.disabled_options.clear();
    combat.current_question = pick_question(
        &combat.pool,
        &mut combat.used_question_ids,
        combat.is_boss,
        rng,
    );

    if let Some(question) = &combat.current_question {
        events.push(CombatEvent::QuestionShown(question.clone()));
    }
    start_turn_timer(combat, events);
}

fn start_turn_timer(combat: &mut Combat, events: &mut Vec<CombatEvent>) {
    if !combat.is_player_turn() {
        return;
    }
    let timer = TurnTimer::new(combat.settings.turn_time_limit_ms);
    events.push(CombatEvent::TimerTick {
        percent: timer.percent(),
    });
    combat.turn_timer = Some(timer);
}

fn stop_turn_timer(combat: &mut Combat, events: &mut Vec<CombatEvent>) {
    if combat.turn_timer.take().is_some() {
        events.push(CombatEvent::TimerTick { percent: 100.0 });
    }
}

/// Player picked answer button `index`.
pub fn handle_answer(state: &mut GameState, index: usize) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    let Some(combat) = state.combat.as_mut() else {
        return events;
    };
    if !combat.accepts_input() {
        return events;
    }

    let correct_index = match combat.current_question.as_ref() {
        Some(question) => match question.correct_index() {
            Some(correct) if index < question.option_count() => correct,
            _ => return events,
        },
        None => return events,
    };
    if !combat.is_option_enabled(index) {
        return events;
    }

    stop_turn_timer(combat, &mut events);
    if index == correct_index {
        process_correct_answer(combat, &mut events);
    } else {
        process_wrong_answer(combat, &mut events);
    }
    events
}

/// Player submitted a typed answer.
pub fn handle_input_answer(state: &mut GameState, text: &str) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    let Some(combat) = state.combat.as_mut() else {
        return events;
    };
    if !combat.accepts_input() || text.trim().is_empty() {
        return events;
    }

    let correct = match combat.current_question.as_ref() {
        Some(question) if question.is_free_text() => question.accepts_text(text),
        _ => return events,
    };

    stop_turn_timer(combat, &mut events);
    if correct {
        process_correct_answer(combat, &mut events);
    } else {
        process_wrong_answer(combat, &mut events);
    }
    events
}

fn process_correct_answer(combat: &mut Combat, events: &mut Vec<CombatEvent>) {
    combat.phase = CombatPhase::Resolving(Resolution::Correct);
    events.push(CombatEvent::PlayerAttack);
    events.push(CombatEvent::Sound(AudioCue::Click));
    events.push(CombatEvent::Sound(AudioCue::Attack));
    events.push(CombatEvent::Feedback {
        text: "Correct!",
        success: true,
    });
    combat
        .scheduler
        .schedule(DELAY_ATTACK_ANIM_MS, CombatStep::ApplyAttackDamage);
}

fn process_wrong_answer(combat: &mut Combat, events: &mut Vec<CombatEvent>) {
    combat.phase = CombatPhase::Resolving(Resolution::Wrong);
    events.push(CombatEvent::Feedback {
        text: "Missed!",
        success: false,
    });
    combat
        .scheduler
        .schedule(DELAY_TURN_SWITCH_MS, CombatStep::BeginEnemyTurn);
}

fn handle_time_up(combat: &mut Combat, events: &mut Vec<CombatEvent>) {
    stop_turn_timer(combat, events);
    combat.phase = CombatPhase::Resolving(Resolution::TimedOut);
    events.push(CombatEvent::Feedback {
        text: "TIME'S UP!",
        success: false,
    });
    combat
        .scheduler
        .schedule(DELAY_TIMEOUT_SWITCH_MS, CombatStep::BeginEnemyTurn);
}

/// Removes one wrong answer from the current multiple-choice question.
pub fn use_hint<R: Rng>(state: &mut GameState, rng: &mut R) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    let GameState { player, combat, .. } = state;
    let Some(combat) = combat.as_mut() else {
        return events;
    };
    if !combat.accepts_input() {
        return events;
    }
    let Some(question) = combat.current_question.as_ref() else {
        return events;
    };

    if player.hints == 0 {
        events.push(CombatEvent::Feedback {
            text: "No Hints!",
            success: false,
        });
        return events;
    }
    let Some(correct) = question.correct_index() else {
        events.push(CombatEvent::Feedback {
            text: "Cannot hint here!",
            success: false,
        });
        return events;
    };

    let wrong: Vec<usize> = (0..question.option_count())
        .filter(|i| *i != correct && combat.is_option_enabled(*i))
        .collect();
    if wrong.is_empty() {
        return events;
    }

    let removed = wrong[rng.gen_range(0..wrong.len())];
    if player.spend_hint() {
        combat.disabled_options.insert(removed);
        events.push(CombatEvent::OptionRemoved(removed));
        events.push(CombatEvent::StatsChanged);
    }
    events
}

/// Player pressed the block key during the enemy's attack.
pub fn resolve_qte(state: &mut GameState) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    let GameState { player, combat, .. } = state;
    if let Some(combat) = combat.as_mut() {
        finish_block(player, combat, false, &mut events);
    }
    events
}

fn finish_block(
    player: &mut Player,
    combat: &mut Combat,
    timed_out: bool,
    events: &mut Vec<CombatEvent>,
) {
    if combat.phase != CombatPhase::Qte {
        return;
    }
    let Some(qte) = combat.qte.take() else {
        return;
    };
    if let Some(handle) = combat.qte_timeout.take() {
        combat.scheduler.cancel(handle);
    }

    let blocked = !timed_out && qte.is_hit();
    if timed_out {
        events.push(CombatEvent::QteTimedOut);
    }

    if blocked {
        events.push(CombatEvent::Feedback {
            text: "BLOCKED!",
            success: true,
        });
        events.push(CombatEvent::Sound(AudioCue::Block));
        events.push(CombatEvent::QteResolved {
            blocked: true,
            damage: 0,
        });
    } else {
        let damage = combat.enemy.damage;
        player.take_damage(damage);
        events.push(CombatEvent::Feedback {
            text: "TOOK DAMAGE!",
            success: false,
        });
        events.push(CombatEvent::Sound(AudioCue::Hurt));
        events.push(CombatEvent::DamageFlash);
        events.push(CombatEvent::QteResolved {
            blocked: false,
            damage,
        });
    }
    events.push(CombatEvent::StatsChanged);

    combat.phase = CombatPhase::QteSettling;
    combat
        .scheduler
        .schedule(QTE_SETTLE_MS, CombatStep::FinishQte);
}

/// Advances the fight by `delta_ms`: turn timer, QTE cursor and every
/// scheduled step that comes due. Time is processed in frame-sized slices
/// so steps that schedule follow-ups see the correct ordering.
pub fn tick<R: Rng>(state: &mut GameState, delta_ms: u64, rng: &mut R) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    let mut remaining = delta_ms;

    while remaining > 0 {
        let slice = remaining.min(FRAME_MS);
        remaining -= slice;
        tick_slice(state, slice, rng, &mut events);
    }

    if let Some(combat) = state.combat.as_ref() {
        if combat.is_player_turn() {
            if let Some(percent) = combat.timer_percent() {
                events.push(CombatEvent::TimerTick { percent });
            }
        }
    }
    events
}

fn tick_slice<R: Rng>(
    state: &mut GameState,
    slice_ms: u64,
    rng: &mut R,
    events: &mut Vec<CombatEvent>,
) {
    let GameState { player, combat, .. } = state;
    let Some(combat) = combat.as_mut() else {
        return;
    };
    if combat.is_finished() {
        return;
    }

    for fired in combat.scheduler.advance(slice_ms) {
        if !combat.scheduler.is_current(fired.handle) {
            tracing::debug!("Dropping stale combat step {:?}", fired.action);
            continue;
        }
        run_step(player, combat, fired.action, rng, events);
    }

    if combat.is_player_turn() {
        let expired = match combat.turn_timer.as_mut() {
            Some(timer) => {
                timer.elapsed_ms += slice_ms;
                timer.expired()
            }
            None => false,
        };
        if expired {
            handle_time_up(combat, events);
        }
    }

    if combat.phase == CombatPhase::Qte {
        if let Some(qte) = combat.qte.as_mut() {
            qte.advance(slice_ms);
        }
    }
}

fn run_step<R: Rng>(
    player: &mut Player,
    combat: &mut Combat,
    step: CombatStep,
    rng: &mut R,
    events: &mut Vec<CombatEvent>,
) {
    match step {
        CombatStep::ApplyAttackDamage => {
            if combat.phase != CombatPhase::Resolving(Resolution::Correct) {
                return;
            }
            combat.enemy.take_damage(1);
            events.push(CombatEvent::EnemyHit {
                remaining_hp: combat.enemy.current_hp,
            });
            events.push(CombatEvent::StatsChanged);
            check_win_condition(combat, events);
        }
        CombatStep::BeginEnemyTurn => {
            if !matches!(combat.phase, CombatPhase::Resolving(_)) || !combat.enemy.is_alive() {
                return;
            }
            combat.phase = CombatPhase::EnemyTurn;
            events.push(CombatEvent::TurnIndicator { player_turn: false });
            combat
                .scheduler
                .schedule(DELAY_ENEMY_WINDUP_MS, CombatStep::EnemyStrike);
        }
        CombatStep::EnemyStrike => {
            if combat.phase != CombatPhase::EnemyTurn {
                return;
            }
            events.push(CombatEvent::EnemyAttack);
            start_qte(combat, rng, events);
        }
        CombatStep::QteTimeout => {
            tracing::debug!("Block window timed out");
            finish_block(player, combat, true, events);
        }
        CombatStep::FinishQte => {
            if combat.phase != CombatPhase::QteSettling {
                return;
            }
            if !player.is_alive() {
                combat.phase = CombatPhase::Defeat;
                combat.outcome = Some(CombatOutcome::Defeat);
                combat.scheduler.cancel_all();
                tracing::info!("Player defeated by {}", combat.enemy.name);
                events.push(CombatEvent::Defeat);
            } else {
                combat.phase = CombatPhase::PlayerTurn;
                events.push(CombatEvent::TurnIndicator { player_turn: true });
                next_question(combat, rng, events);
            }
        }
        CombatStep::AnnounceVictory => {
            if combat.enemy.is_alive() || combat.is_finished() {
                return;
            }
            events.push(CombatEvent::Feedback {
                text: "VICTORY!",
                success: true,
            });
            events.push(CombatEvent::Music(MusicTrack::Exploration));
            combat
                .scheduler
                .schedule(DELAY_VICTORY_OUTRO_MS, CombatStep::FinishVictory);
        }
        CombatStep::FinishVictory => {
            if combat.enemy.is_alive() || combat.is_finished() {
                return;
            }
            combat.phase = CombatPhase::Victory;
            combat.outcome = Some(CombatOutcome::Victory);
            tracing::info!("Defeated {}", combat.enemy.name);
            events.push(CombatEvent::Victory);
        }
    }
}

fn check_win_condition(combat: &mut Combat, events: &mut Vec<CombatEvent>) {
    if !combat.enemy.is_alive() {
        stop_turn_timer(combat, events);
        combat
            .scheduler
            .schedule(DELAY_DAMAGE_MS, CombatStep::AnnounceVictory);
    } else {
        combat
            .scheduler
            .schedule(DELAY_TURN_SWITCH_MS, CombatStep::BeginEnemyTurn);
    }
}

fn start_qte<R: Rng>(combat: &mut Combat, rng: &mut R, events: &mut Vec<CombatEvent>) {
    let qte = QteState::start(combat.enemy.qte_speed(), rng);
    events.push(CombatEvent::QteStarted {
        target_start: qte.target_start,
        speed: qte.speed,
    });
    combat.qte = Some(qte);
    combat.phase = CombatPhase::Qte;

    if let Some(timeout_ms) = combat.settings.qte_timeout_ms {
        combat.qte_timeout = Some(combat.scheduler.schedule(timeout_ms, CombatStep::QteTimeout));
    }
}

/// Tears the fight down and returns its outcome, if it had one.
///
/// Callers run this only after they have acted on the outcome, so the
/// arena stays on screen until the map takes over.
pub fn end_combat(state: &mut GameState) -> Option<CombatOutcome> {
    let mut combat = state.combat.take()?;
    combat.scheduler.cancel_all();
    combat.turn_timer = None;
    combat.qte = None;
    combat.outcome
}
