use std::collections::BTreeSet;

use super::qte::QteState;
use crate::audio::{AudioCue, MusicTrack};
use crate::core::config::CombatSettings;
use crate::core::constants::{ENEMY_BASE_DAMAGE, QTE_SPEED, QTE_SPEED_STRONGEST};
use crate::core::schedule::{Scheduler, TaskHandle};
use crate::world::types::Question;

/// Fixed enemy stat block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyTemplate {
    pub name: &'static str,
    pub hp: i32,
    pub icon: &'static str,
}

/// Enemy roster, weakest first. The last entry is the boss.
pub const ENEMY_TYPES: [EnemyTemplate; 5] = [
    EnemyTemplate {
        name: "Frail Zombie",
        hp: 2,
        icon: "fa-person-falling",
    },
    EnemyTemplate {
        name: "Zombie",
        hp: 3,
        icon: "fa-biohazard",
    },
    EnemyTemplate {
        name: "Skeleton",
        hp: 3,
        icon: "fa-skull",
    },
    EnemyTemplate {
        name: "Tough Undead",
        hp: 4,
        icon: "fa-dungeon",
    },
    EnemyTemplate {
        name: "Syntax Guardian",
        hp: 5,
        icon: "fa-dragon",
    },
];

/// Number of common templates at the front of [`ENEMY_TYPES`]
pub const COMMON_TEMPLATE_COUNT: usize = 3;
pub const ELITE_TEMPLATE: usize = 3;
pub const STRONGEST_TEMPLATE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    pub name: String,
    pub max_hp: i32,
    pub current_hp: i32,
    pub damage: i32,
    pub icon: &'static str,
    /// Index into [`ENEMY_TYPES`]
    pub template: usize,
}

impl Enemy {
    pub fn from_template(index: usize) -> Self {
        let template = ENEMY_TYPES[index.min(ENEMY_TYPES.len() - 1)];
        Self {
            name: template.name.to_string(),
            max_hp: template.hp,
            current_hp: template.hp,
            damage: ENEMY_BASE_DAMAGE,
            icon: template.icon,
            template: index.min(ENEMY_TYPES.len() - 1),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.current_hp = (self.current_hp - amount).max(0);
    }

    pub fn is_strongest(&self) -> bool {
        self.template == STRONGEST_TEMPLATE
    }

    /// Cursor speed of the block minigame against this enemy
    pub fn qte_speed(&self) -> f64 {
        if self.is_strongest() {
            QTE_SPEED_STRONGEST
        } else {
            QTE_SPEED
        }
    }
}

/// How the player's turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Correct,
    Wrong,
    TimedOut,
}

/// Where the fight currently is. Only one phase is active at a time and
/// every entry point checks it before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatPhase {
    /// Waiting for an answer; the turn timer is running
    PlayerTurn,
    /// Answer given (or time ran out), waiting for the follow-up delay
    Resolving(Resolution),
    /// Enemy winding up before the block minigame
    EnemyTurn,
    /// Block minigame running
    Qte,
    /// Block result shown, waiting before the next turn
    QteSettling,
    Victory,
    Defeat,
}

/// Terminal result of a fight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    Victory,
    Defeat,
}

/// Delayed continuations inside a fight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatStep {
    ApplyAttackDamage,
    BeginEnemyTurn,
    EnemyStrike,
    QteTimeout,
    FinishQte,
    AnnounceVictory,
    FinishVictory,
}

/// Countdown for the player's answer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnTimer {
    pub limit_ms: u64,
    pub elapsed_ms: u64,
}

impl TurnTimer {
    pub fn new(limit_ms: u64) -> Self {
        Self {
            limit_ms,
            elapsed_ms: 0,
        }
    }

    pub fn remaining_ms(&self) -> u64 {
        self.limit_ms.saturating_sub(self.elapsed_ms)
    }

    pub fn percent(&self) -> f64 {
        if self.limit_ms == 0 {
            return 0.0;
        }
        self.remaining_ms() as f64 / self.limit_ms as f64 * 100.0
    }

    pub fn expired(&self) -> bool {
        self.remaining_ms() == 0
    }
}

/// Everything the presentation and audio layers need to know about.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    EnemySetup {
        name: String,
        icon: &'static str,
        hp: i32,
    },
    BattleStart,
    StatsChanged,
    TurnIndicator {
        player_turn: bool,
    },
    QuestionShown(Question),
    TimerTick {
        percent: f64,
    },
    Feedback {
        text: &'static str,
        success: bool,
    },
    PlayerAttack,
    /// Enemy took a hit; shake the sprite
    EnemyHit {
        remaining_hp: i32,
    },
    EnemyAttack,
    QteStarted {
        target_start: f64,
        speed: f64,
    },
    QteResolved {
        blocked: bool,
        damage: i32,
    },
    QteTimedOut,
    DamageFlash,
    OptionRemoved(usize),
    Sound(AudioCue),
    Music(MusicTrack),
    Victory,
    Defeat,
}

/// State of one fight. Recreated for every encounter and dropped once the
/// caller has consumed the outcome.
#[derive(Debug, Clone)]
pub struct Combat {
    pub enemy: Enemy,
    pub node_id: u32,
    pub is_boss: bool,
    pub is_ambush: bool,
    pub pool: Vec<Question>,
    pub used_question_ids: BTreeSet<u32>,
    pub current_question: Option<Question>,
    /// Answer buttons removed by hints for the current question
    pub disabled_options: BTreeSet<usize>,
    pub phase: CombatPhase,
    pub turn_timer: Option<TurnTimer>,
    pub qte: Option<QteState>,
    pub qte_timeout: Option<TaskHandle>,
    pub scheduler: Scheduler<CombatStep>,
    pub settings: CombatSettings,
    pub outcome: Option<CombatOutcome>,
}

impl Combat {
    pub fn new(
        enemy: Enemy,
        node_id: u32,
        is_boss: bool,
        pool: Vec<Question>,
        settings: CombatSettings,
    ) -> Self {
        Self {
            enemy,
            node_id,
            is_boss,
            is_ambush: false,
            pool,
            used_question_ids: BTreeSet::new(),
            current_question: None,
            disabled_options: BTreeSet::new(),
            phase: CombatPhase::PlayerTurn,
            turn_timer: None,
            qte: None,
            qte_timeout: None,
            scheduler: Scheduler::new(),
            settings,
            outcome: None,
        }
    }

    pub fn is_player_turn(&self) -> bool {
        self.phase == CombatPhase::PlayerTurn
    }

    pub fn is_qte_active(&self) -> bool {
        self.phase == CombatPhase::Qte && self.qte.is_some()
    }

    /// Answer and hint handlers only act when this is true.
    pub fn accepts_input(&self) -> bool {
        self.is_player_turn() && !self.is_qte_active()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<CombatOutcome> {
        self.outcome
    }

    pub fn is_option_enabled(&self, index: usize) -> bool {
        !self.disabled_options.contains(&index)
    }

    /// Remaining turn time as a percentage, if the timer is running
    pub fn timer_percent(&self) -> Option<f64> {
        self.turn_timer.map(|t| t.percent())
    }
}
