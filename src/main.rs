use clap::Parser;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use trackscan::analyzer::HttpAnalyzer;
use trackscan::batch::{run_batch, BatchSummary};
use trackscan::cli::{Cli, Commands};
use trackscan::config::Config;
use trackscan::error::TrackscanError;
use trackscan::session::{run_cycle, run_interactive, CycleOutcome};
use trackscan::upload::FileCandidate;
use trackscan::workflow::UploadWorkflow;
use trackscan::{render, scanner};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "trackscan=debug" } else { "trackscan=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;
    let service_url = config.resolve_service_url(cli.server.as_deref());
    let timeout = Duration::from_secs(config.timeout_seconds);
    debug!(%service_url, ?timeout, "resolved service");

    match cli.command {
        Commands::Analyze { image, json } => {
            let candidate = FileCandidate::from_path(&image)?;
            let workflow = UploadWorkflow::new(HttpAnalyzer::new(&service_url, timeout)?);

            match run_cycle(&workflow, candidate, !json).await {
                CycleOutcome::Ignored => {
                    println!("Not an image file, ignored: {}", image.display());
                }
                CycleOutcome::Analyzed(result) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    } else {
                        if let Some(preview) = workflow.state().preview {
                            render::print_preview(&preview);
                        }
                        render::print_result(&result);
                        render::animate_meter(&result).await;
                    }
                }
                CycleOutcome::Failed(message) => {
                    if json {
                        println!("{}", serde_json::json!({ "error": message }));
                    } else {
                        render::print_error(&message);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Batch { folder, recursive, json } => {
            let images = scanner::scan_folder(&folder, recursive)?;
            if images.is_empty() {
                println!("No images found: {}", folder.display());
                return Ok(());
            }

            if !json {
                println!("📷 {} images, service: {}\n", images.len(), service_url);
            }
            info!(count = images.len(), folder = %folder.display(), "starting batch");

            let workflow = UploadWorkflow::new(HttpAnalyzer::new(&service_url, timeout)?);
            let total = images.len();
            let entries = run_batch(&workflow, &images, !json, |index, entry| {
                if !json {
                    println!("[{}/{}] {}", index + 1, total, entry.line());
                }
            })
            .await;

            let summary = BatchSummary::from_entries(&entries);
            if json {
                let report = serde_json::json!({ "entries": entries, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "\n✅ {} analyzed: {} cracked, {} clear, {} failed",
                    summary.total(),
                    summary.cracked,
                    summary.clear,
                    summary.failed
                );
            }
        }

        Commands::Session => {
            println!("🚆 trackscan - service: {}\n", service_url);
            let workflow = UploadWorkflow::new(HttpAnalyzer::new(&service_url, timeout)?);
            run_interactive(&workflow).await?;
        }

        Commands::Health => {
            let analyzer = HttpAnalyzer::new(&service_url, timeout)?;
            let health = analyzer.health().await?;
            println!("Service: {}", analyzer.base_url());
            println!("  status: {}", health.status);
            println!("  model loaded: {}", health.model_loaded);
            if !health.is_ready() {
                return Err(TrackscanError::Health("サービスの準備ができていません".into()).into());
            }
        }

        Commands::Config { set_server_url, show } => {
            if let Some(url) = set_server_url {
                config.set_service_url(url)?;
                println!("✔ Service URL saved");
            }

            if show {
                println!("Config: {}", Config::config_path()?.display());
                println!(
                    "  service_url: {}",
                    config.service_url.as_deref().unwrap_or("(unset)")
                );
                println!("  timeout_seconds: {}", config.timeout_seconds);
                println!("  effective URL: {}", config.resolve_service_url(cli.server.as_deref()));
            }
        }
    }

    Ok(())
}
