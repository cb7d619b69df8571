use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use uweek::{
    config::create_app,
    email::{Mailer, SmtpMailer, UnconfiguredMailer},
    permission::ProcedureAllowlist,
    rpc::runner::MysqlRunner,
    settings::{Profile, Settings},
    state::{AppState, build_pool},
};

#[derive(Parser)]
#[command(about = "University Week tabulation backend")]
pub struct Serve {
    /// Path to a TOML configuration file.
    #[clap(long, short)]
    config: Option<PathBuf>,
    /// Overrides the bind address from the configuration.
    #[clap(long)]
    bind: Option<SocketAddr>,
    /// Selects the DEV_* or PROD_* database variables.
    #[clap(long, env = "APP_PROFILE", default_value = "dev")]
    profile: Profile,
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Serve::parse();

    let mut settings = Settings::load(args.config.as_deref(), args.profile)
        .unwrap_or_else(|e| panic!("failed to load settings: {e}"));
    if let Some(bind) = args.bind {
        settings.bind = bind;
    }

    let database_url = settings
        .database
        .url()
        .unwrap_or_else(|e| panic!("invalid database settings: {e}"));
    let pool = build_pool(&database_url, settings.database.pool_size);
    info!(
        profile = %args.profile,
        host = %settings.database.host,
        "database pool ready (connections open on first use)"
    );

    let mailer: Arc<dyn Mailer> = if settings.smtp.is_configured() {
        match SmtpMailer::new(&settings.smtp) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                warn!("smtp is misconfigured, otp email is disabled: {e}");
                Arc::new(UnconfiguredMailer::new(e.to_string()))
            }
        }
    } else {
        Arc::new(UnconfiguredMailer::new("SMTP credentials are not configured"))
    };

    let allowlist = ProcedureAllowlist::new(settings.procedures.allow.clone());
    if !allowlist.is_open() {
        info!(
            count = settings.procedures.allow.len(),
            "procedure allowlist enabled"
        );
    }

    let state =
        AppState::new(Arc::new(MysqlRunner::new(pool)), mailer).allowlist(allowlist);
    let app = create_app(state);

    let listener = TcpListener::bind(settings.bind)
        .await
        .unwrap_or_else(|e| panic!("could not bind {}: {e}", settings.bind));
    info!("listening on {}", settings.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));

    info!("server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
