mod cli;

use splitforge::{config, server};
use splitforge_av::{check_tool, ChunkSplitter, FFMPEG};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config(config_path)?;

    // CLI flags win over file and environment
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting Splitforge server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "splitforge=trace,splitforge_av=trace,splitforge_common=debug,tower_http=debug".to_string()
        } else {
            "splitforge=debug,splitforge_av=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Split {
            input,
            out_dir,
            chunk_seconds,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(split_file(
                &input,
                &out_dir,
                chunk_seconds,
                cli.config.as_deref(),
            ))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate => validate_config(cli.config.as_deref()),
        Commands::Version => {
            println!("splitforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load configuration for offline commands, where storage credentials are irrelevant.
fn load_local_config(config_path: Option<&Path>) -> Result<config::Config> {
    let mut config = match config_path {
        Some(path) => config::read_config_file(path)?,
        None => config::Config::default(),
    };
    config::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

async fn split_file(
    input: &Path,
    out_dir: &Path,
    chunk_seconds: Option<u64>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_local_config(config_path)?;

    if !input.is_file() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;

    let chunk_seconds = chunk_seconds.unwrap_or(config.split.default_chunk_seconds);
    let ffmpeg = splitforge_av::locate_tool(FFMPEG, config.tools.ffmpeg_path.as_deref())?;
    let splitter = ChunkSplitter::new(Some(ffmpeg), config.audio.encoding())
        .with_timeout(config.tools.timeout());

    tracing::info!("Splitting {:?} into {}s chunks", input, chunk_seconds);
    let chunks = splitter.split(input, out_dir, chunk_seconds).await?;

    for chunk in &chunks {
        println!("{}", chunk.display());
    }
    println!("\n{} chunks written to {}", chunks.len(), out_dir.display());

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = load_local_config(config_path)?;

    println!("Checking external tools...\n");

    let tool = check_tool(FFMPEG, config.tools.ffmpeg_path.as_deref());
    let status = if tool.available { "✓" } else { "✗" };
    print!("{} {}", status, tool.name);

    if let Some(ref version) = tool.version {
        print!(" ({})", version);
    }
    if let Some(ref path) = tool.path {
        print!(" - {}", path.display());
    }
    println!();

    println!();
    if tool.available {
        println!("All required tools are available!");
        Ok(())
    } else {
        anyhow::bail!("ffmpeg is missing. Install it or set FFMPEG_PATH.")
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => println!("Validating config: {:?}", p),
        None => println!("Validating config from default locations and environment"),
    }

    let config = config::load_config(path)?;
    let redact = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", if config.server.cors { "any origin" } else { "disabled" });
    println!("  Storage backend: {}", config.storage.backend);
    match config.storage.backend {
        config::StorageBackend::Supabase => {
            println!("    URL: {}", config.storage.url.as_deref().unwrap_or("<unset>"));
            println!("    Service key: {}", redact(&config.storage.service_key));
        }
        config::StorageBackend::Local => {
            if let Some(ref root) = config.storage.local_root {
                println!("    Root: {}", root.display());
            }
        }
    }
    println!("  Default bucket: {}", config.split.default_bucket);
    println!("  Default chunk seconds: {}", config.split.default_chunk_seconds);
    println!("  Default output prefix: {}", config.split.default_output_prefix);
    println!(
        "  Encoding: {}ch {} Hz {} {}",
        config.audio.channels, config.audio.sample_rate, config.audio.codec, config.audio.bitrate
    );
    println!("  ffmpeg timeout: {}s", config.tools.timeout_secs);

    Ok(())
}
