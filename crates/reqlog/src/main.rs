mod output;
mod query_server;
mod telemetry;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use reqlog_core::config::Config;
use reqlog_core::query::SearchParams;
use reqlog_store::{CaptureLog, CapturePolicy, LogDir};

use crate::output::{print_files_human, print_search_human};
use crate::telemetry::{LogFormat, init_cli_tracing, init_run_tracing};

#[derive(Parser, Debug)]
#[command(name = "reqlog")]
#[command(about = "Capture arbitrary HTTP requests to JSON lines and search them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Record every inbound request into a new log file")]
    Capture {
        #[arg(long)]
        addr: Option<String>,
        #[arg(long)]
        include_body_in_json: Option<bool>,
        #[arg(long)]
        body_as_base64: Option<bool>,
        #[arg(long)]
        max_body_bytes: Option<usize>,
    },
    #[command(about = "Serve the log browser and search API")]
    View {
        #[arg(long)]
        addr: Option<String>,
        #[arg(long)]
        public_dir: Option<PathBuf>,
    },
    #[command(about = "List captured log files")]
    Files,
    #[command(about = "Search one log file with text, time and page filters")]
    Search {
        #[arg(long)]
        file: String,
        #[arg(short = 'q', long)]
        query: Option<String>,
        #[arg(long)]
        start_time: Option<String>,
        #[arg(long)]
        end_time: Option<String>,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        page_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::load().context("load config")?;
    if let Some(v) = cli.logs_dir {
        cfg.logs_dir = v;
    }

    match cli.command {
        Commands::Capture {
            addr,
            include_body_in_json,
            body_as_base64,
            max_body_bytes,
        } => {
            init_run_tracing(LogFormat::from_env());
            if let Some(v) = addr {
                cfg.capture_addr = v;
            }
            if let Some(v) = include_body_in_json {
                cfg.include_body_in_json = v;
            }
            if let Some(v) = body_as_base64 {
                cfg.body_as_base64 = v;
            }
            if let Some(v) = max_body_bytes {
                cfg.max_body_bytes = v;
            }
            run_capture(cfg).await
        }
        Commands::View { addr, public_dir } => {
            init_run_tracing(LogFormat::from_env());
            if let Some(v) = addr {
                cfg.query_addr = v;
            }
            if let Some(v) = public_dir {
                cfg.public_dir = v;
            }
            run_view(cfg).await
        }
        Commands::Files => {
            init_cli_tracing();
            let files = LogDir::new(&cfg.logs_dir)
                .list()
                .context("list log files")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&files)?);
            } else {
                print_files_human(&files);
            }
            Ok(())
        }
        Commands::Search {
            file,
            query,
            start_time,
            end_time,
            page,
            page_size,
        } => {
            init_cli_tracing();
            let params = SearchParams {
                file: Some(file),
                q: query,
                start_time,
                end_time,
                page: page.map(|v| v.to_string()),
                page_size: page_size.map(|v| v.to_string()),
            };
            let page = LogDir::new(&cfg.logs_dir).search(&params)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print_search_human(&page);
            }
            Ok(())
        }
    }
}

async fn run_capture(cfg: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = cfg
        .capture_addr
        .parse()
        .with_context(|| format!("bad capture address {}", cfg.capture_addr))?;
    let dir = LogDir::create(&cfg.logs_dir)?;
    let policy = CapturePolicy {
        include_body_in_json: cfg.include_body_in_json,
        body_as_base64: cfg.body_as_base64,
    };
    let log = CaptureLog::create(&dir, policy)?;

    eprintln!("reqlog capture");
    eprintln!("  log file: {} (id {})", log.path().display(), log.id());
    eprintln!("  listen: {addr}");
    eprintln!("  include body in json: {}", log.policy().include_body_in_json);
    eprintln!("  body as base64: {}", log.policy().body_as_base64);

    tokio::select! {
        res = reqlog_capture::server::run_capture_server(log, addr, cfg.max_body_bytes) => {
            res.context("capture server stopped")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }
    Ok(())
}

async fn run_view(cfg: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = cfg
        .query_addr
        .parse()
        .with_context(|| format!("bad query address {}", cfg.query_addr))?;
    let dir = LogDir::new(&cfg.logs_dir);

    eprintln!("reqlog view");
    eprintln!("  logs: {}", dir.root().display());
    eprintln!("  public: {}", cfg.public_dir.display());
    eprintln!("  listen: http://{addr}");

    tokio::select! {
        res = query_server::run_query_http_server(dir, cfg.public_dir.clone(), addr) => {
            res?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }
    Ok(())
}
