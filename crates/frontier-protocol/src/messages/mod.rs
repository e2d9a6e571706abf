//! Concrete message types.
//!
//! Each file holds one message: its record schema and its dispatch pair.
//! [`LoginMessage`] and [`WelcomeMessage`] are records only; they belong to
//! the connection handshake and never reach a controller.

mod error;
mod high_score;
mod login;
mod nation_summary;
mod retire;

pub use error::ErrorMessage;
pub use high_score::HighScoreMessage;
pub use login::{LoginMessage, WelcomeMessage};
pub use nation_summary::NationSummaryMessage;
pub use retire::RetireMessage;
