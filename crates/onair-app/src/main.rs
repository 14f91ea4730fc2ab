//! Headless shell: wires config, permission gate, session controller and
//! the LiveKit engine together, and logs the view layout as it changes.

use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;

use onair_core::{
    CallEvent, CallEventListener, PermissionGate, SessionConfig, SessionController, TokenService,
};
use onair_engine::{EngineSettings, LiveKitEngine};

/// Everything the shell needs to place a call.
#[derive(Debug, Deserialize)]
struct AppConfig {
    application_id: String,
    channel_name: String,
    #[serde(default)]
    access_token: String,
    /// Token server to ask when no token is configured.
    #[serde(default)]
    token_url: Option<String>,
    /// WebSocket endpoint of the RTC server.
    server_url: String,
}

fn load_app_config(path: &str) -> anyhow::Result<AppConfig> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {path}"))
}

/// Consumes session state for display: the local tile is implied, remote
/// tiles are listed in roster order. Log lines stand in for surfaces.
struct ViewComposer {
    session: Arc<SessionController<LiveKitEngine>>,
}

impl CallEventListener for ViewComposer {
    fn on_event(&self, event: CallEvent) {
        tracing::debug!("session event: {event:?}");
        let session = self.session.clone();
        tokio::spawn(async move {
            match session.layout().await {
                Some(layout) => tracing::info!(
                    channel = %layout.channel,
                    remotes = ?layout.remotes,
                    "view updated"
                ),
                None => tracing::info!("view idle"),
            }
        });
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "onair_core=info,onair_engine=info,onair_app=info"
                    .parse()
                    .unwrap()
            }),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "onair.json".to_string());
    let app_config = load_app_config(&path)?;

    let access_token = if app_config.access_token.is_empty() {
        match &app_config.token_url {
            Some(url) => TokenService::request_token(url, &app_config.channel_name, 0).await?,
            None => String::new(),
        }
    } else {
        app_config.access_token.clone()
    };

    let config = SessionConfig::new(
        app_config.application_id,
        app_config.channel_name,
        access_token,
    )?;

    let session = Arc::new(SessionController::<LiveKitEngine>::new(
        config,
        EngineSettings {
            server_url: app_config.server_url,
        },
        PermissionGate::platform_default(),
    ));
    session.add_listener(Arc::new(ViewComposer {
        session: session.clone(),
    }));

    session.init().await?;
    session.start_call().await?;

    tokio::signal::ctrl_c().await?;
    session.end_call().await?;
    Ok(())
}
