//! Extension runtime for Trimless
//!
//! This crate wires the core logic, the scheduler and the storage layer
//! into the two long-lived extension contexts:
//! - `page`: one session per open webmail tab (content script)
//! - `background`: the single worker that owns payment and install events
//!
//! Both talk to the outside through small traits (`PageHost`,
//! `PaymentProvider`, `TabNotifier`) so hosts and tests can plug in.

pub mod background;
pub mod error;
pub mod message;
pub mod page;

// Re-exports
pub use background::{
    Background, BackgroundConfig, IconState, InstallReason, PaymentConfig, PaymentProvider,
    PaymentUser, TabNotifier,
};
pub use error::RuntimeError;
pub use message::{Plan, Response, RuntimeMessage};
pub use page::{PageEvent, PageHost, PageSession, SessionConfig};

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
