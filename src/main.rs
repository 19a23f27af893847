use secrecy::SecretString;
use std::sync::Arc;

use avatar_fetcher::config::{AppState, Config};
use avatar_fetcher::discord::DiscordClient;
use avatar_fetcher::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; real environment variables still apply
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let token = SecretString::from(cfg.bot_token().unwrap_or_default().to_string());
    let client = DiscordClient::new(&cfg.discord.api_base, &token, &cfg.discord.user_agent)?;

    let listener = server::create_listener(addr, cfg.server.backlog)?;
    logger::log_server_start(&listener.local_addr()?, &cfg);

    let state = Arc::new(AppState::new(cfg, Arc::new(client)));
    server::signal::start_signal_handler(Arc::clone(&state));
    server::start_server_loop(listener, state).await;
    Ok(())
}
