use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linnet_gazetteer::{Gazetteer, LoadMode};
use linnet_server::rate_limit::RateLimiterLayer;
use linnet_server::{AppState, router};
use linnet_text::NumberLexicon;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_GAZETTEER_DIR: &str = "res/ner";
const DEFAULT_MAX_TEXT_LEN: usize = 16 * 1024;
const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "using gazetteers at {} (mode: {:?})",
        config.gazetteer_dir.display(),
        config.gazetteer_mode
    );
    if config.disable_cache {
        info!("cache headers disabled");
    }
    info!(
        "rate limit: {} req/s (burst {})",
        config.rate_limit_rps, config.rate_limit_burst
    );

    let start = Instant::now();
    let gazetteer = Gazetteer::load_with_mode(&config.gazetteer_dir, config.gazetteer_mode)
        .with_context(|| format!("loading gazetteers from {}", config.gazetteer_dir.display()))?;
    info!(
        "{} phrases loaded in {} ms",
        gazetteer.len(),
        start.elapsed().as_millis()
    );

    let state = AppState {
        gazetteer: Arc::new(gazetteer),
        lexicon: Arc::new(NumberLexicon::default()),
        max_text_len: config.max_text_len,
        disable_cache: config.disable_cache,
    };

    let rate_limiter = RateLimiterLayer::new(config.rate_limit_rps, config.rate_limit_burst);
    let app = router(state)
        .layer(rate_limiter)
        .layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen address")?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    gazetteer_dir: PathBuf,
    gazetteer_mode: LoadMode,
    max_text_len: usize,
    disable_cache: bool,
    rate_limit_rps: u32,
    rate_limit_burst: u32,
}

fn load_config() -> Config {
    let mut disable_cache = false;
    let mut cli_gazetteer_dir: Option<PathBuf> = None;
    let mut cli_gazetteer_mode: Option<LoadMode> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-cache" => disable_cache = true,
            "--gazetteer-dir" => {
                if let Some(path) = args.next() {
                    cli_gazetteer_dir = Some(PathBuf::from(path));
                }
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--gazetteer-dir=") {
                    cli_gazetteer_dir = Some(PathBuf::from(path));
                } else if let Some(mode) = arg.strip_prefix("--gazetteer-mode=") {
                    cli_gazetteer_mode = parse_load_mode(mode);
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let gazetteer_dir = cli_gazetteer_dir
        .or_else(|| env::var("GAZETTEER_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_GAZETTEER_DIR));
    let gazetteer_mode = cli_gazetteer_mode
        .or_else(|| {
            env::var("GAZETTEER_LOAD_MODE")
                .ok()
                .as_deref()
                .and_then(parse_load_mode)
        })
        .unwrap_or(LoadMode::Mmap);
    let max_text_len = env::var("MAX_TEXT_LEN")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_MAX_TEXT_LEN);
    let rate_limit_rps = env::var("RATE_LIMIT_RPS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_RPS);
    let rate_limit_burst = env::var("RATE_LIMIT_BURST")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_BURST);

    Config {
        host,
        port,
        gazetteer_dir,
        gazetteer_mode,
        max_text_len,
        disable_cache,
        rate_limit_rps,
        rate_limit_burst,
    }
}

fn parse_load_mode(raw: &str) -> Option<LoadMode> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Some(LoadMode::Mmap),
        "owned" => Some(LoadMode::Owned),
        _ => None,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
