use dotenvy::dotenv;
use hotpot_quote_server::{
    cli::{print_help, wants_help},
    config::ServerConfig,
    server::run_server,
};
use log::info;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    if wants_help(std::env::args()) {
        print_help();
        return;
    }
    let config = ServerConfig::from_env_or_default();

    info!("🚀️ Starting server on {}:{}", config.host, config.port);
    match run_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}
