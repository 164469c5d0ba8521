//! affinyx-common — Shared error type and sandboxed HTTP client used across all Affinyx crates.

pub mod error;
pub mod sandbox;

// Re-export commonly used types
pub use error::{AffinyxError, Result};
pub use sandbox::SandboxClient;
