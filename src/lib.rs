//! VibeSplit - a four-agent Valentine's experience
//!
//! Session orchestration for three experiences and a finale:
//!
//! - **Analyst:** vibe-check a pasted chat or uploaded screenshots
//! - **Duelist:** two debaters argue a topic over successive rounds
//! - **Creator:** a short interview that ends in generated content
//! - **Finale:** the Ultimate Vibe Report, unlocked once all three are done
//!
//! Agents are reached through the [`agents::AgentInvoker`] trait; replies are
//! untrusted and normalized before any interaction looks at them. A replay
//! mode substitutes reference results so the whole flow runs offline.
//!
//! ## Quick Start
//!
//! ```bash
//! # Offline walkthrough
//! vibesplit replay
//!
//! # Vibe-check a chat from stdin
//! vibesplit analyze < chat.txt
//!
//! # Everything, then the finale
//! vibesplit report --chat "..." --topic "Texting first?" --answer "Sam" --answer "A poem"
//! ```

pub mod agents;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod utils;

pub use error::{AgentError, InteractionError, NavigationError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
