//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (artist names, museum tokens, etc.),
//! update only this file.

// ============================================================================
// Test Gallery IDs
// ============================================================================

/// Artist ID for "Гончарова Н.С."
pub const ARTIST_1_ID: i64 = 1;

/// Artist ID for "Родченко А.М."
pub const ARTIST_2_ID: i64 = 2;

/// Museum ID for the Russian Museum
pub const MUSEUM_1_ID: i64 = 1;

/// Museum ID for the Tretyakov Gallery
pub const MUSEUM_2_ID: i64 = 2;

/// ID no fixture record uses
pub const MISSING_ID: i64 = 9999;

// ============================================================================
// Test Gallery Metadata
// ============================================================================

pub const ARTIST_1_SHORT_NAME: &str = "Гончарова Н.С.";
pub const ARTIST_1_LONG_NAME: &str = "Гончарова Наталья Сергеевна";

pub const ARTIST_2_SHORT_NAME: &str = "Родченко А.М.";
pub const ARTIST_2_LONG_NAME: &str = "Родченко Александр Михайлович";

pub const MUSEUM_1_NAME: &str = "Государственный Русский музей";
pub const MUSEUM_1_NAME_UNIQUE: &str = "russian_museum";

pub const MUSEUM_2_NAME: &str = "Государственная Третьяковская галерея";
pub const MUSEUM_2_NAME_UNIQUE: &str = "tretyakov_gallery";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
