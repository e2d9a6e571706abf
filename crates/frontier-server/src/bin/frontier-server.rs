//! Development server.
//!
//! Binds to `FRONTIER_BIND` (default `127.0.0.1:7300`) and seats four
//! sample players. Tokens are the bare player numbers, so `1` logs in as
//! the first player. Anyone else who logs in with a number is a
//! spectator. Set `RUST_LOG=debug` for per-message logging.

use frontier_protocol::{NationSummary, PlayerId, Stance};
use frontier_server::{Authenticator, FrontierServer, ServerConfig, ServerError};
use tracing_subscriber::EnvFilter;

/// Accepts any numeric token as that player number.
struct NumericTokens;

impl Authenticator for NumericTokens {
    async fn authenticate(&self, token: &str) -> Result<PlayerId, ServerError> {
        token
            .parse()
            .map_err(|_| ServerError::AuthFailed(format!("token {token:?} is not a player number")))
    }
}

const ROSTER: [(u64, &str, &str); 4] = [
    (1, "Ana", "Portuguese"),
    (2, "Bo", "Swedish"),
    (3, "Cleo", "French"),
    (4, "Dag", "Danish"),
];

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let server = FrontierServer::builder()
        .config(config)
        .build(NumericTokens)
        .await?;

    server.handle().controller().with_state(|state| {
        for (id, name, nation) in ROSTER {
            state.add_player(PlayerId(id), name, nation);
            state.set_summary(
                PlayerId(id),
                NationSummary {
                    stance: Stance::Peace,
                    number_of_settlements: 1,
                    number_of_units: 3,
                    gold: 1000,
                    tax: 0,
                    ..NationSummary::default()
                },
            );
        }
    });

    tracing::info!(addr = %server.local_addr()?, players = ROSTER.len(), "sample game ready");
    server.run().await
}
