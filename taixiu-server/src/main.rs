use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use taixiu_db::db::{count_by_outcome, count_rounds, db_path, fetch_all_rounds, fetch_last_rounds, migrate, open_db};
use taixiu_db::history::HISTORY_CAPACITY;
use taixiu_db::models::Outcome;
use taixiu_db::rusqlite::Connection;
use taixiu_engine::backtest::walk_forward;
use taixiu_engine::display::{display_backtest, display_prediction, display_rules};
use taixiu_engine::engine::RuleEngine;
use taixiu_server::config::{FetchMode, ServeArgs};
use taixiu_server::display::{display_import_summary, display_pattern, display_rounds};
use taixiu_server::fetch::HttpRoundSource;
use taixiu_server::import::import_csv;
use taixiu_server::poller::spawn_poller;
use taixiu_server::server::create_router;
use taixiu_server::service::PredictorService;

#[derive(Parser)]
#[command(name = "taixiu", about = "Prédicteur Tài/Xỉu à règles")]
struct Cli {
    /// Base SQLite d'archive des tours
    #[arg(long, global = true, env = "ARCHIVE_PATH")]
    archive: Option<PathBuf>,

    /// Niveau de log (surchargé par RUST_LOG)
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lancer le service HTTP et la récupération des tours
    Serve(ServeArgs),

    /// Lister les derniers tours archivés
    History {
        /// Nombre de tours à afficher
        #[arg(short, long, default_value = "20")]
        last: u32,
    },

    /// Importer des tours depuis un fichier CSV (id,dice1,dice2,dice3[,total])
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Rejouer la chaîne de règles sur l'archive
    Backtest {
        /// Nombre de tours précédents visibles à chaque évaluation
        #[arg(short, long, default_value_t = HISTORY_CAPACITY)]
        window: usize,

        /// Seed du tirage de repli
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Afficher la chaîne de règles et ses paramètres
    Rules,

    /// Afficher le chemin de la base d'archive
    DbPath,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taixiu_server={level},taixiu={level},info")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let path = cli.archive.clone().unwrap_or_else(db_path);

    match cli.command {
        Command::Serve(args) => cmd_serve(args, &path).await,
        Command::History { last } => cmd_history(&open_archive(&path)?, last),
        Command::Import { file } => cmd_import(&open_archive(&path)?, &file),
        Command::Backtest { window, seed } => cmd_backtest(&open_archive(&path)?, window, seed),
        Command::Rules => {
            display_rules(&RuleEngine::default());
            Ok(())
        }
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn open_archive(path: &Path) -> Result<Connection> {
    let conn = open_db(path)?;
    migrate(&conn)?;
    Ok(conn)
}

async fn cmd_serve(args: ServeArgs, archive_path: &Path) -> Result<()> {
    let source = HttpRoundSource::new(&args.upstream_url)
        .context("Impossible de créer le client HTTP")?;

    let archive = match open_archive(archive_path) {
        Ok(conn) => Some(conn),
        Err(e) => {
            warn!("Archive indisponible, les tours ne seront pas archivés : {:#}", e);
            None
        }
    };

    let service = Arc::new(PredictorService::new(args.service_config(), Arc::new(source), archive));

    let poller = match args.fetch_mode {
        FetchMode::Poll => Some(spawn_poller(
            service.clone(),
            Duration::from_secs(args.poll_interval_secs),
        )),
        FetchMode::OnRequest => None,
    };

    let app = create_router(service);
    let addr = args.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Impossible d'écouter sur {}", addr))?;

    info!(%addr, upstream = %args.upstream_url, fetch_mode = ?args.fetch_mode, "Service démarré");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Erreur du serveur HTTP")?;

    if let Some(handle) = poller {
        handle.abort();
    }
    info!("Arrêt du service");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Écoute du signal d'arrêt impossible : {}", e);
        std::future::pending::<()>().await;
    }
}

fn cmd_history(conn: &Connection, last: u32) -> Result<()> {
    let n = count_rounds(conn)?;
    if n == 0 {
        println!("Archive vide. Lancez d'abord : taixiu serve ou taixiu import");
        return Ok(());
    }
    let rounds = fetch_last_rounds(conn, last)?;
    display_rounds(&rounds);
    display_pattern(&rounds);
    println!(
        "{} tours archivés au total ({} Tài / {} Xỉu).",
        n,
        count_by_outcome(conn, Outcome::Over)?,
        count_by_outcome(conn, Outcome::Under)?
    );
    Ok(())
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let result = import_csv(conn, file, &Utc::now().to_rfc3339())?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_backtest(conn: &Connection, window: usize, seed: u64) -> Result<()> {
    let rounds = fetch_all_rounds(conn)?;
    if rounds.is_empty() {
        println!("Archive vide. Lancez d'abord : taixiu serve ou taixiu import");
        return Ok(());
    }

    let engine = RuleEngine::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let report = walk_forward(&engine, &rounds, window.max(1), &mut rng);
    display_backtest(&report);

    // Prédiction pour le tour suivant la fin de l'archive
    let start = rounds.len().saturating_sub(window.max(1));
    let next = engine.evaluate(&rounds[start..], &mut rng);
    println!("\nProchain tour après l'archive :");
    display_prediction(&next);
    Ok(())
}
