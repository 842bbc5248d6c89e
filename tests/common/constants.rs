//! Shared constants for end-to-end tests
//!
//! When test data changes (ideas, canned model replies, timeouts),
//! update only this file and fixtures.rs.

// ============================================================================
// Timeouts
// ============================================================================

/// How long to wait for a spawned server to answer `GET /`
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness probes
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Test Inputs
// ============================================================================

/// Idea submitted for comprehensive analysis
pub const SAD_PIANO_IDEA: &str = "a sad piano song";

/// First element of the canned analysis
pub const ELEMENT_MODAL_INTERCHANGE: &str = "Modal Interchange";

/// Second element of the canned analysis
pub const ELEMENT_OSTINATO: &str = "Ostinato";

/// Market trends query
pub const MARKET_QUERY: &str = "lo-fi hip hop streaming";

// ============================================================================
// Error Messages
// ============================================================================

pub const QUOTA_MESSAGE: &str =
    "API quota has been exceeded. Please check your billing or try again later.";

pub const NETWORK_MESSAGE: &str =
    "A network error occurred. Please check your connection and try again.";
