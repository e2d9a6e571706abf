//! # Frontier client
//!
//! The client half of the protocol. A [`ClientSession`] logs in and moves
//! messages; an [`InGameClient`] receives them through the protocol's
//! [`ClientController`](frontier_protocol::ClientController) hook and hands
//! the results to a [`Presenter`], whatever the UI happens to be.

mod config;
mod controller;
mod error;
mod presenter;
mod report;
mod session;

pub use config::ClientConfig;
pub use controller::InGameClient;
pub use error::ClientError;
pub use presenter::{ChannelPresenter, Presenter, PresenterEvent};
pub use report::{ForeignAffairsReport, NationReport, ReportRow};
pub use session::ClientSession;
