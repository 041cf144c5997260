mod commands;
mod config;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{DEFAULT_DATA_FILE, DEFAULT_UPLOAD_DIR, PORT_ENV};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Voice check-in backend.
#[derive(Parser)]
#[command(name = "checkin", version, about = "Voice check-in backend")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// JSON document holding all entries
    #[arg(long, global = true, default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP JSON API server
    Serve {
        /// Port to listen on (falls back to $PORT, then 8787)
        #[arg(long)]
        port: Option<u16>,
        /// Directory that receives uploaded audio
        #[arg(long, default_value = DEFAULT_UPLOAD_DIR)]
        upload_dir: PathBuf,
    },

    /// List stored entries, newest first
    List,

    /// Print one entry as JSON
    Show {
        /// Entry id
        id: String,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .ok();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(
                &format!("failed to create tokio runtime: {}", e),
                cli.output,
                cli.quiet,
            );
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Serve { port, upload_dir } => {
            let env_port = std::env::var(PORT_ENV).ok();
            let config = serve::ServeConfig {
                port: config::resolve_port(port, env_port.as_deref()),
                data_file: cli.data_file,
                upload_dir,
            };
            if let Err(e) = rt.block_on(serve::start_server(config)) {
                report_error(&format!("server error: {}", e), cli.output, cli.quiet);
                process::exit(1);
            }
        }
        Commands::List => {
            rt.block_on(commands::cmd_list(&cli.data_file, cli.output, cli.quiet));
        }
        Commands::Show { id } => {
            rt.block_on(commands::cmd_show(&cli.data_file, &id, cli.output, cli.quiet));
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
