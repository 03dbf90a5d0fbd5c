use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;

use uni_assist::config::{AssistConfig, DatabaseConfig};
use uni_assist::dialogue::DialogueManager;
use uni_assist::notify::WebhookNotifier;
use uni_assist::server::{AppState, chat_routes};
use uni_assist::session::{self, SessionStore};
use uni_assist::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AssistConfig::from_env()?;

    eprintln!("🎓 Uni Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Chat API: http://0.0.0.0:{}/chat", config.port);

    // ── Database ─────────────────────────────────────────────────────────
    let db: Arc<dyn Database> = match &config.database {
        DatabaseConfig::Local { path } => {
            eprintln!("   Database: {}", path.display());
            Arc::new(LibSqlBackend::new_local(path).await?)
        }
        DatabaseConfig::Remote { url, auth_token } => {
            eprintln!("   Database: {url} (remote)");
            Arc::new(LibSqlBackend::new_remote(url.clone(), auth_token.expose_secret().to_string()).await?)
        }
    };

    // ── Sessions ─────────────────────────────────────────────────────────
    let store = Arc::new(SessionStore::new(config.session_ttl));
    let _sweep_handle = session::spawn_expiry_task(Arc::clone(&store), Duration::from_secs(60));
    eprintln!(
        "   Sessions: expire after {} min idle",
        config.session_ttl.as_secs() / 60
    );

    // ── Webhook ──────────────────────────────────────────────────────────
    let notifier = WebhookNotifier::new(config.webhook_url.clone());
    eprintln!(
        "   Webhook: {}",
        config.webhook_url.as_deref().unwrap_or("disabled")
    );

    // ── Server ───────────────────────────────────────────────────────────
    let manager = Arc::new(DialogueManager::new(Arc::clone(&store), db, notifier));
    let app = chat_routes(
        AppState {
            manager,
            store,
        },
        &config.allowed_origin,
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Chat server started");
    axum::serve(listener, app).await?;

    Ok(())
}
