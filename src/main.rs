mod config;
mod errors;
mod logging;
mod scenario;
mod security;
mod server;

use crate::config::Config;
use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path = PathBuf::from("curator.toml");
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("--config requires a path");
                    std::process::exit(2);
                }
                config_path = PathBuf::from(&args[i]);
            }
            _ => {}
        }
        i += 1;
    }

    let cfg = Config::load(&config_path).context("loading config")?;
    cfg.validate().context("validating config")?;

    let validator =
        security::validator::PathValidator::new(&cfg).context("building path validator")?;
    let loader = scenario::loader::ScenarioLoader::new(&cfg);

    let addr = format!("{}:{}", cfg.server.bind_addr, cfg.server.port);
    info!(
        addr = %addr,
        root = %cfg.root.root_dir.display(),
        required_files = ?cfg.manifest.required,
        max_depth = cfg.limits.max_depth,
        "curator ready"
    );
    println!(
        "curator ready addr={} root={}",
        addr,
        cfg.root.root_dir.display()
    );

    server::serve(cfg, validator, loader).await
}
