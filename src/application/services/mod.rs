//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Prompter)
//! but are themselves concrete structs, not traits.

mod game;
mod session;
mod store;

pub use game::{GameService, Round, RoundState};
pub use session::{SessionService, SessionSummary, PLAY_AGAIN_PROMPT};
pub use store::TreeStore;
