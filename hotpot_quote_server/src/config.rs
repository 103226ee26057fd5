use std::{env, path::PathBuf};

use hotpot_quote_engine::QuoteRules;
use hpq_common::{helpers::parse_boolean_flag, Fen};
use log::*;

const DEFAULT_HPQ_HOST: &str = "127.0.0.1";
const DEFAULT_HPQ_PORT: u16 = 8370;
const DEFAULT_QUOTE_LOG_FILE: &str = "data/hotpot_quotes.jsonl";
const DEFAULT_EXPORT_DIR: &str = "data/exports";
const DEFAULT_MIN_ORDER_TOTAL_YUAN: i64 = 100;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// The append-only JSON-lines file that accepted quotes are written to.
    pub quote_log_file: PathBuf,
    /// Spreadsheet exports are written to, and served from, this directory.
    pub export_dir: PathBuf,
    /// Quotes whose item subtotals add up to less than this are rejected.
    pub min_order_total: Fen,
    /// Request bodies larger than this are rejected without being parsed.
    pub max_body_bytes: usize,
    /// If false, the access log middleware is not installed.
    pub access_log: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HPQ_HOST.to_string(),
            port: DEFAULT_HPQ_PORT,
            quote_log_file: PathBuf::from(DEFAULT_QUOTE_LOG_FILE),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            min_order_total: Fen::from_yuan(DEFAULT_MIN_ORDER_TOTAL_YUAN),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            access_log: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("HPQ_HOST").ok().unwrap_or_else(|| DEFAULT_HPQ_HOST.into());
        let port = env::var("HPQ_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for HPQ_PORT. {e} Using the default, {DEFAULT_HPQ_PORT}, instead."
                    );
                    DEFAULT_HPQ_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_HPQ_PORT);
        let quote_log_file =
            env::var("HPQ_LOG_FILE").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_QUOTE_LOG_FILE));
        let export_dir =
            env::var("HPQ_EXPORT_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_EXPORT_DIR));
        let min_order_total = configure_min_order_total();
        let max_body_bytes = env::var("HPQ_MAX_BODY_BYTES")
            .ok()
            .map(|s| match s.parse::<usize>() {
                Ok(0) | Err(_) => {
                    warn!(
                        "🪛️ {s} is not a valid size for HPQ_MAX_BODY_BYTES. Using the default, {DEFAULT_MAX_BODY_BYTES} \
                         bytes, instead."
                    );
                    DEFAULT_MAX_BODY_BYTES
                },
                Ok(n) => n,
            })
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);
        let access_log = parse_boolean_flag(env::var("HPQ_ACCESS_LOG").ok(), true);
        info!("🪛️ Quotes will be logged to {}", quote_log_file.display());
        info!("🪛️ Spreadsheet exports will be written to {}", export_dir.display());
        Self { host, port, quote_log_file, export_dir, min_order_total, max_body_bytes, access_log }
    }

    pub fn quote_rules(&self) -> QuoteRules {
        QuoteRules::new(self.min_order_total)
    }
}

fn configure_min_order_total() -> Fen {
    let default = Fen::from_yuan(DEFAULT_MIN_ORDER_TOTAL_YUAN);
    let value = match env::var("HPQ_MIN_ORDER_TOTAL") {
        Ok(s) => s,
        Err(_) => {
            info!("🪛️ HPQ_MIN_ORDER_TOTAL is not set. Using the default minimum order of {default}.");
            return default;
        },
    };
    let parsed = value.trim().parse::<f64>().map_err(|e| e.to_string()).and_then(|yuan| {
        if yuan < 0.0 {
            return Err("The minimum cannot be negative".to_string());
        }
        Fen::from_decimal(yuan).map_err(|e| e.to_string())
    });
    match parsed {
        Ok(minimum) => {
            info!("🪛️ Minimum order total set to {minimum}");
            minimum
        },
        Err(e) => {
            warn!("🪛️ {value} is not a valid amount for HPQ_MIN_ORDER_TOTAL. {e} Using the default, {default}, instead.");
            default
        },
    }
}

/// Per-request limits that the route handlers need at hand.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub max_body_bytes: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { max_body_bytes: DEFAULT_MAX_BODY_BYTES }
    }
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { max_body_bytes: config.max_body_bytes }
    }
}
