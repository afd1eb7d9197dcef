// Tick and timing
pub const FRAME_MS: u64 = 16; // ~60 FPS, one QTE cursor step per frame
pub const TICK_INTERVAL_MS: u64 = FRAME_MS;

// Combat pacing (milliseconds)
pub const DELAY_ATTACK_ANIM_MS: u64 = 800;
pub const DELAY_DAMAGE_MS: u64 = 1200;
pub const DELAY_TURN_SWITCH_MS: u64 = 1400;
pub const DELAY_TIMEOUT_SWITCH_MS: u64 = 1000;
pub const DELAY_ENEMY_WINDUP_MS: u64 = 1500;
pub const DELAY_VICTORY_OUTRO_MS: u64 = 1500;
pub const QTE_SETTLE_MS: u64 = 600 + 500; // result flash + slide-out

// Turn timer
pub const TURN_TIME_LIMIT_MS: u64 = 15_000;

// QTE tuning
pub const QTE_CURSOR_MIN: f64 = 0.0;
pub const QTE_CURSOR_MAX: f64 = 98.0;
pub const QTE_TARGET_WIDTH: f64 = 20.0;
pub const QTE_TARGET_MIN_START: u32 = 20;
pub const QTE_TARGET_MAX_START: u32 = 80; // exclusive
pub const QTE_SPEED: f64 = 1.5;
pub const QTE_SPEED_STRONGEST: f64 = 2.2;
pub const QTE_TIMEOUT_MS: u64 = 5_000;

// Question selection
pub const BOSS_HARD_QUESTION_CHANCE: f64 = 0.7;

// Player defaults
pub const PLAYER_BASE_HP: i32 = 3;
pub const PLAYER_STARTING_HINTS: u32 = 1;
pub const PLAYER_MAX_HINTS: u32 = 5;
pub const ENEMY_BASE_DAMAGE: i32 = 1;

// Map
pub const ROOT_NODE_ID: u32 = 0;
pub const FIRST_NODE_ID: u32 = 1;
pub const OBSCURED_NODE_LABEL: &str = "???";

// Narrative interludes
pub const INTERLUDE_EXPLORE_MS: u64 = 2_000;
pub const INTERLUDE_REVEAL_MS: u64 = 1_500;
pub const LARGE_POTION_CHANCE: f64 = 0.3;
pub const WILDCARD_AMBUSH_CHANCE: f64 = 0.5;

// Save system
pub const SAVE_VERSION_MAGIC: u64 = 0x4B4E494748545131; // "KNIGHTQ1"
pub const SAVE_FORMAT_VERSION: u32 = 1;
pub const SAVE_FILE_NAME: &str = "save.dat";
pub const LOG_FILE_NAME: &str = "knight.log";

// World data
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_START_WORLD: &str = "world_1";
pub const MAPS_FILE: &str = "maps.json";
pub const QUESTIONS_FILE: &str = "questions.json";
pub const LESSONS_FILE: &str = "lessons.json";
