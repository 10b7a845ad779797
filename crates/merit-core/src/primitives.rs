//! # Innate Primitives
//!
//! Hardcoded runtime constants for the Merit CORE.
//!
//! Merit starts with zero data but fixed rules. These constants are compiled
//! into the binary and are immutable at runtime; every bound the validation
//! engine enforces is named here.

/// Required total of all attached goal weightages once an appraisal leaves Draft.
///
/// The validation engine rejects a submit whose total differs from this value
/// and an attach whose running total would exceed it.
pub const WEIGHTAGE_TOTAL: u32 = 100;

/// Lowest admissible weightage for a single goal.
pub const MIN_WEIGHTAGE: u8 = 1;

/// Highest admissible weightage for a single goal.
pub const MAX_WEIGHTAGE: u8 = 100;

/// Lowest admissible rating value.
pub const MIN_RATING: u8 = 1;

/// Highest admissible rating value.
pub const MAX_RATING: u8 = 5;

/// Default review term applied when a create request omits the end date.
///
/// 365 days in seconds. Richer period arithmetic (fiscal calendars, custom
/// cycles) is a collaborator concern, not the core's.
pub const DEFAULT_REVIEW_TERM_SECS: i64 = 365 * 24 * 60 * 60;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for rating comments.
///
/// Comments longer than this (16KB) are rejected by the validation engine.
/// This prevents memory exhaustion from malicious or malformed input.
pub const MAX_COMMENT_LENGTH: usize = 16384;

/// Maximum length for goal titles.
pub const MAX_TITLE_LENGTH: usize = 256;

/// Maximum length for goal descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 4096;

/// Maximum length for the optional review-range label.
pub const MAX_RANGE_LABEL_LENGTH: usize = 128;

/// Maximum number of goals attached to one appraisal.
///
/// With `MIN_WEIGHTAGE = 1` the weightage total already caps the goal set at
/// 100; this limit keeps the bound explicit and independent of the arithmetic.
pub const MAX_GOALS_PER_APPRAISAL: usize = 100;
