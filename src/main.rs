use anyhow::{Context, Result};
use procmem::config::{load_config, validate_config, Config};
use procmem::{runtime, AsyncProcess, ProcessTarget};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("procmem={}", config.logging.level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.logging.with_target)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_target(arg: &str) -> ProcessTarget {
    match arg.parse::<u32>() {
        Ok(pid) => ProcessTarget::Pid(pid),
        Err(_) => ProcessTarget::Name(arg.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("failed to load configuration")?;
    validate_config(&config).context("invalid configuration")?;
    init_logging(&config);

    info!(
        "procmem v{} on {}",
        procmem::VERSION,
        std::env::consts::ARCH
    );

    let output = match std::env::args().nth(1) {
        Some(arg) => {
            let process = AsyncProcess::open_with_config(parse_target(&arg), config).await?;
            let modules = process.list_modules().await?;
            process.close().await?;
            serde_json::to_string_pretty(&modules)?
        }
        None => serde_json::to_string_pretty(&runtime::list_processes().await?)?,
    };

    println!("{}", output);
    Ok(())
}
