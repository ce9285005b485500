use anyhow::Context;
use clap::{Parser, Subcommand};
use lib::cafe24::InboundPayload;
use lib::slack::{format_message, SlackClient};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(name = "hookrelay")]
#[command(about = "Relay cafe24 webhooks to Slack", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: HOOKRELAY_CONFIG_PATH or ~/.hookrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the webhook server. The Slack bot token comes from SLACK_BOT_TOKEN or slack.botToken.
    Serve {
        /// Config file path (default: HOOKRELAY_CONFIG_PATH or ~/.hookrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from config or 3000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Bind address (default from config or 127.0.0.1)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Print the Slack message a webhook payload would produce, without sending it.
    Format {
        /// Payload JSON file (default: stdin)
        file: Option<PathBuf>,
    },

    /// Format a webhook payload and post it to Slack once.
    Send {
        /// Config file path (default: HOOKRELAY_CONFIG_PATH or ~/.hookrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Payload JSON file (default: stdin)
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("hookrelay {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Init { config }) => run_init(config),
        Some(Commands::Serve { config, port, bind }) => run_serve(config, port, bind).await,
        Some(Commands::Format { file }) => run_format(file).await,
        Some(Commands::Send { config, file }) => run_send(config, file).await,
        None => {
            println!("Run with --help for usage");
            Ok(())
        }
    };
    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    lib::init::init_config_file(&path)?;
    println!("initialized configuration at {}", path.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
) -> anyhow::Result<()> {
    let (mut config, path) = lib::config::load_config(config_path)?;
    log::debug!("loaded config from {}", path.display());
    if let Some(p) = port {
        config.server.port = p;
    }
    if let Some(b) = bind {
        config.server.bind = b;
    }
    log::info!("starting webhook server on {}:{}", config.server.bind, config.server.port);
    lib::gateway::run_server(config).await
}

/// Read a payload from a file or stdin, parsed the same way the server parses a request body.
async fn read_payload(file: Option<PathBuf>) -> anyhow::Result<InboundPayload> {
    let body = match file {
        Some(path) => tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("reading payload from stdin")?;
            buf
        }
    };
    Ok(InboundPayload::from_body(&body))
}

async fn run_format(file: Option<PathBuf>) -> anyhow::Result<()> {
    let payload = read_payload(file).await?;
    let message = format_message(&payload);
    println!("{}", serde_json::to_string_pretty(&message)?);
    Ok(())
}

async fn run_send(config_path: Option<PathBuf>, file: Option<PathBuf>) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let payload = read_payload(file).await?;
    let message = format_message(&payload);
    let slack = SlackClient::from_config(&config)?;
    let ack = slack.post_message(&message).await?;
    println!(
        "sent to {} (ts {})",
        ack.channel.as_deref().unwrap_or("?"),
        ack.ts.as_deref().unwrap_or("?")
    );
    Ok(())
}
