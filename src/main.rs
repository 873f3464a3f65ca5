use anyhow::Context;
use clap::{Parser, Subcommand};
use rankboard::leaderboard::config::LeaderboardConfig;
use rankboard::leaderboard::coordinator::Leaderboard;
use rankboard::leaderboard::handlers::router;
use rankboard::leaderboard::seed::{DEFAULT_SEED_GROUPS, seed_members};
use rankboard::storage::backend::RankingBackend;
use rankboard::storage::handlers::{self as store_handlers, StoreToken};
use rankboard::storage::memory::MemoryBackend;
use rankboard::storage::remote::RemoteBackend;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const STATS_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "rankboard")]
#[command(about = "Global and per-group leaderboards", long_about = None)]
struct Cli {
    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the leaderboard HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,

        /// TOML file with leaderboard settings
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        namespace: Option<String>,

        /// Size of top-K listings
        #[arg(long)]
        k: Option<usize>,

        /// Keep fractional scores instead of truncating them
        #[arg(long)]
        float_scores: bool,

        /// Store node address; omitted runs against an in-process store
        #[arg(long)]
        store_addr: Option<String>,

        #[arg(long)]
        store_token: Option<String>,

        /// Insert this many random members before serving
        #[arg(long, default_value_t = 0)]
        seed_members: usize,

        /// Groups assigned to seeded members
        #[arg(long, value_delimiter = ',')]
        seed_groups: Vec<String>,
    },
    /// Serve an in-memory ranking store for remote leaderboards
    Store {
        #[arg(long, default_value = "127.0.0.1:6400")]
        bind: SocketAddr,

        /// Bearer token clients must present
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .init();

    match cli.command {
        Command::Serve {
            bind,
            config,
            namespace,
            k,
            float_scores,
            store_addr,
            store_token,
            seed_members: seed_count,
            seed_groups,
        } => {
            let mut settings = match config {
                Some(path) => LeaderboardConfig::load(&path)?,
                None => LeaderboardConfig::default(),
            };
            if let Some(namespace) = namespace {
                settings.namespace = namespace;
            }
            if let Some(k) = k {
                settings.k = k;
            }
            if float_scores {
                settings.float_scores = true;
            }
            if store_addr.is_some() {
                settings.store_addr = store_addr;
            }
            if store_token.is_some() {
                settings.store_token = store_token;
            }
            let settings = settings.normalized();

            let seed_groups = if seed_groups.is_empty() {
                DEFAULT_SEED_GROUPS.iter().map(|g| g.to_string()).collect()
            } else {
                seed_groups
            };

            serve(bind, settings, seed_count, seed_groups).await
        }
        Command::Store { bind, token } => run_store(bind, token).await,
    }
}

async fn serve(
    bind: SocketAddr,
    settings: LeaderboardConfig,
    seed_count: usize,
    seed_groups: Vec<String>,
) -> anyhow::Result<()> {
    // 1. Backend:
    let backend: Arc<dyn RankingBackend> = match &settings.store_addr {
        Some(addr) => {
            tracing::info!("Using store node at {}", addr);
            Arc::new(RemoteBackend::new(addr, settings.store_token.clone()))
        }
        None => {
            tracing::info!("Using in-process store");
            Arc::new(MemoryBackend::new())
        }
    };

    // 2. Leaderboard:
    let leaderboard = Arc::new(
        Leaderboard::connect(settings, backend)
            .await
            .context("Failed to start leaderboard")?,
    );

    // 3. Mock data:
    if seed_count > 0 {
        seed_members(&leaderboard, seed_count, &seed_groups).await?;
    }

    // 4. Spawn stats reporter:
    let stats_leaderboard = leaderboard.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATS_INTERVAL);

        loop {
            interval.tick().await;
            match stats_leaderboard.stats().await {
                Ok(stats) => {
                    tracing::info!(
                        "Leaderboard stats: {} members in {} groups",
                        stats.members,
                        stats.groups
                    );
                    if stats.over_member_limit() {
                        tracing::warn!(
                            "Member count {} exceeds advisory limit {}",
                            stats.members,
                            stats.max_members
                        );
                    }
                    if stats.over_group_limit() {
                        tracing::warn!(
                            "Group count {} exceeds advisory limit {}",
                            stats.groups,
                            stats.max_groups
                        );
                    }
                }
                Err(e) => tracing::warn!("Stats unavailable: {}", e),
            }
        }
    });

    // 5. Start HTTP server:
    let app = router(leaderboard);

    tracing::info!("Leaderboard listening on {}", bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_store(bind: SocketAddr, token: Option<String>) -> anyhow::Result<()> {
    let store = Arc::new(MemoryBackend::new());
    if token.is_none() {
        tracing::warn!("Store node running without a token; any client is accepted");
    }
    let app = store_handlers::router(store, StoreToken(token));

    tracing::info!("Store node listening on {}", bind);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
