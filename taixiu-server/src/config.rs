//! Configuration du service : arguments CLI avec repli sur les variables d'environnement.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use taixiu_db::history::HISTORY_CAPACITY;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_OPERATOR: &str = "taixiu-predictor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum FetchMode {
    /// Tâche périodique indépendante des requêtes
    #[default]
    Poll,
    /// Une récupération par requête GET /predict
    OnRequest,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Adresse d'écoute
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Port d'écoute (remplace celui de --listen)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// URL de la source amont des résultats
    #[arg(long, env = "UPSTREAM_URL")]
    pub upstream_url: String,

    /// Intervalle entre deux récupérations (secondes)
    #[arg(
        long,
        env = "POLL_INTERVAL_SECS",
        default_value_t = DEFAULT_POLL_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_secs: u64,

    /// Mode de récupération
    #[arg(long, env = "FETCH_MODE", value_enum, default_value_t = FetchMode::Poll)]
    pub fetch_mode: FetchMode,

    /// Fichier snapshot JSON (historique + compteurs). Sans lui, rien n'est persisté.
    #[arg(long, env = "SNAPSHOT_PATH")]
    pub snapshot: Option<PathBuf>,

    /// Identifiant renvoyé dans chaque réponse
    #[arg(long, env = "OPERATOR_ID", default_value = DEFAULT_OPERATOR)]
    pub operator: String,

    /// Seed du tirage de repli (aléatoire par défaut)
    #[arg(long, env = "RNG_SEED")]
    pub seed: Option<u64>,
}

impl ServeArgs {
    pub fn listen_addr(&self) -> SocketAddr {
        let mut addr = self.listen;
        if let Some(port) = self.port {
            addr.set_port(port);
        }
        addr
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            capacity: HISTORY_CAPACITY,
            snapshot_path: self.snapshot.clone(),
            operator: self.operator.clone(),
            seed: self.seed,
            fetch_mode: self.fetch_mode,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub capacity: usize,
    pub snapshot_path: Option<PathBuf>,
    pub operator: String,
    pub seed: Option<u64>,
    pub fetch_mode: FetchMode,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
            snapshot_path: None,
            operator: DEFAULT_OPERATOR.to_string(),
            seed: None,
            fetch_mode: FetchMode::Poll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    fn parse(args: &[&str]) -> Result<ServeArgs, clap::Error> {
        let mut argv = vec!["taixiu"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).map(|cli| cli.serve)
    }

    #[test]
    fn test_port_overrides_listen() {
        let args = parse(&[
            "--upstream-url", "http://localhost:9999/api",
            "--listen", "127.0.0.1:3000",
            "--port", "8081",
        ]).unwrap();
        assert_eq!(args.listen_addr(), "127.0.0.1:8081".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_explicit_values() {
        let args = parse(&[
            "--upstream-url", "http://localhost:9999/api",
            "--poll-interval-secs", "2",
            "--fetch-mode", "on-request",
            "--snapshot", "data/snap.json",
            "--operator", "@ops",
            "--seed", "9",
        ]).unwrap();
        assert_eq!(args.poll_interval_secs, 2);
        assert_eq!(args.fetch_mode, FetchMode::OnRequest);

        let config = args.service_config();
        assert_eq!(config.capacity, HISTORY_CAPACITY);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("data/snap.json")));
        assert_eq!(config.operator, "@ops");
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(parse(&["--upstream-url", "http://x", "--poll-interval-secs", "0"]).is_err());
    }
}
