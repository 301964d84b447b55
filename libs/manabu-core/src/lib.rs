//! Core progress library for the Manabu learning backend.
//!
//! Provides:
//! - Progress update rule (mastery, streak/XP, daily activity)
//! - Aggregate progress view and activity series
//! - Clock abstraction so callers inject "now"
//! - Shared types (ItemProgress, StreakState, DailyActivity, etc.)

pub mod clock;
pub mod error;
pub mod rules;
pub mod summary;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, ValidationError};
pub use rules::{apply_answer, xp_for, ProgressOutcome};
pub use summary::{activity_series, summarize, ActivityDay, ProgressSummary, StatusBuckets, TypeBuckets};
pub use types::{
    Answer, DailyActivity, ItemProgress, ItemType, MasteryLevel, ProgressStatus, QuizResult,
    StreakState,
};
