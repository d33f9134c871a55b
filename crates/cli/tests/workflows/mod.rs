//! Workflow integration tests
//!
//! Tests for complete workflows that exercise multiple commands
//! and validate end-to-end behavior.

pub mod configuration;
pub mod feature_toggle;
pub mod quota_lifecycle;
pub mod watch_session;
