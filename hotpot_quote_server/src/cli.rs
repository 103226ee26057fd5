//! The server takes no command line arguments. Any argument prints the help text and the configuration the server
//! would start with, and the server exits without binding.
use std::env;

use crate::config::ServerConfig;

const HELP: &str = include_str!("./cli-help.txt");

/// Returns true when there is nothing to do but print help. `args` includes the program name, as [`env::args`] does.
pub fn wants_help<I: IntoIterator<Item = String>>(args: I) -> bool {
    args.into_iter().nth(1).is_some()
}

pub fn print_help() {
    println!("\n{HELP}\n");
    let config = ServerConfig::from_env_or_default();
    println!("{}", describe_config(&config, |name| env::var(name).ok()));
}

/// Lists every setting with the value the server will use. Settings that are not in the environment are marked as
/// defaults, so a typo in a variable name is easy to spot.
pub fn describe_config<F>(config: &ServerConfig, lookup: F) -> String
where F: Fn(&str) -> Option<String> {
    let settings = [
        ("HPQ_HOST", config.host.clone()),
        ("HPQ_PORT", config.port.to_string()),
        ("HPQ_LOG_FILE", config.quote_log_file.display().to_string()),
        ("HPQ_EXPORT_DIR", config.export_dir.display().to_string()),
        ("HPQ_MIN_ORDER_TOTAL", config.min_order_total.to_string()),
        ("HPQ_MAX_BODY_BYTES", format!("{} bytes", config.max_body_bytes)),
        ("HPQ_ACCESS_LOG", if config.access_log { "on" } else { "off" }.to_string()),
    ];
    let mut out = String::from("Effective configuration:\n");
    for (name, value) in settings {
        let source = if lookup(name).is_some() { "" } else { " (default)" };
        out.push_str(&format!("  {name:<22}{value}{source}\n"));
    }
    let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "not set".into());
    out.push_str(&format!("  {:<22}{rust_log}\n", "RUST_LOG"));
    out
}
