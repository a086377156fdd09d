use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "scanlens", version, about = "Scan a file with a remote analysis service")]
struct Cli {
    /// File to upload right away (otherwise press 'o' in the UI)
    file: Option<PathBuf>,

    /// Analysis service host
    #[arg(long)]
    host: Option<String>,

    /// Analysis service port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Talk to the service over HTTPS
    #[arg(long)]
    tls: bool,

    /// Attempts for fetching the final result
    #[arg(long)]
    attempts: Option<u32>,

    /// Extra result fetches while the service still reports "scanning"
    #[arg(long)]
    repoll: Option<u32>,

    /// Run without the terminal UI and print events to stdout
    #[arg(long)]
    headless: bool,

    /// Export the verdict as JSON to file (implies --headless)
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Write a Markdown report to file (implies --headless)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write logs to this file (the TUI logs nothing without it)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let headless = cli.headless || cli.export_json.is_some() || cli.report.is_some();

    // Initialize tracing: log file if given, stderr when headless, off in the TUI
    scanlens::config::logging::LogTarget::select(cli.log_file.clone(), !headless).init()?;

    // Build settings
    let mut settings = scanlens::config::settings::Settings::default();
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    settings.tls = cli.tls;
    if let Some(attempts) = cli.attempts {
        settings.fetch_attempts = attempts;
    }
    if let Some(repoll) = cli.repoll {
        settings.still_scanning_repolls = repoll;
    }

    let (event_tx, event_rx) = scanlens::core::events::create_event_channel();
    let session = scanlens::core::session::Session::new(settings, event_tx)?;

    // Non-interactive mode: scan, print and optionally export
    if headless {
        let Some(path) = cli.file else {
            anyhow::bail!("headless mode needs a FILE to scan");
        };
        let completed = scanlens::app::run_headless(
            session,
            event_rx,
            &path,
            cli.export_json.as_deref(),
            cli.report.as_deref(),
        )
        .await?;
        if !completed {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Interactive mode: launch TUI
    let mut app = scanlens::app::App::new(session, cli.file);
    app.run(event_rx).await
}
