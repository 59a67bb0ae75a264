//! Server liveness subsystem.
//!
//! # Data Flow
//! ```text
//! Active polling (active.rs):
//!     Periodic timer
//!     → Probe the server
//!     → state.rs (flap filter)
//!     → Notifier on confirmed transition
//!
//! Passive reports (passive.rs):
//!     Webhook push (up/down/testing)
//!     → Notifier directly, filter untouched
//!
//! State machine (state.rs):
//!     Unknown → Up ←→ Down
//!     With a stability threshold to prevent flapping
//! ```
//!
//! # Design Decisions
//! - Transitions require consecutive agreeing samples
//! - The filter is owned by its poll loop; nothing else mutates it
//! - An unreachable status API is a down sample; a timed-out probe is a
//!   skipped tick

pub mod active;
pub mod passive;
pub mod state;

pub use active::PollLoop;
pub use passive::ExternalReport;
pub use state::{ConfirmationState, FlapFilter, LivenessSample, ServerState, Transition};
