use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use base64::Engine;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;

use meetscribe_core::{Config, GeminiClient, PollPolicy, analyze_meeting, format_record_readable};

#[derive(Parser)]
#[command(name = "meetscribe")]
#[command(about = "Analyze a meeting video with Gemini and render a PDF report")]
struct Cli {
    /// Path to the meeting video
    video: PathBuf,

    /// Directory for report.json and report.pdf (defaults to the video's directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the Gemini model
    #[arg(short, long)]
    model: Option<String>,

    /// Seconds between remote processing checks
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", secs / 60.0, secs % 60.0)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Validate configuration early
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    if let Some(model) = cli.model {
        config.model = model;
    }

    if !cli.video.is_file() {
        eprintln!(
            "{} {} is not a file",
            style("Error:").red().bold(),
            cli.video.display()
        );
        std::process::exit(1);
    }

    let output_dir = cli.output.unwrap_or_else(|| {
        cli.video
            .parent()
            .map(|dir| dir.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    });
    fs::create_dir_all(&output_dir).await?;

    println!(
        "\n{}  {}\n",
        style("meetscribe").cyan().bold(),
        style("Meeting Analyzer").dim()
    );
    println!("{}", style("─".repeat(60)).dim());

    let client = GeminiClient::new(&config)?;
    let policy = PollPolicy {
        interval: Duration::from_secs(cli.poll_interval),
        ..PollPolicy::default()
    };

    let total_start = Instant::now();
    let spinner = create_spinner(&format!(
        "Analyzing {} with {}...",
        cli.video
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| cli.video.display().to_string()),
        config.model
    ));
    let analysis = analyze_meeting(&client, &policy, &cli.video).await?;
    spinner.finish_with_message(format!(
        "{} Analysis complete {}",
        style("✓").green().bold(),
        style(format!("[{}]", format_duration(total_start.elapsed()))).dim()
    ));

    // Save outputs
    let report_json = output_dir.join("report.json");
    fs::write(
        &report_json,
        serde_json::to_string_pretty(&analysis.report_data)?,
    )
    .await?;

    let report_pdf = output_dir.join("report.pdf");
    let pdf_bytes = base64::engine::general_purpose::STANDARD.decode(&analysis.pdf_data)?;
    fs::write(&report_pdf, &pdf_bytes).await?;

    println!(
        "\n{} {}",
        style("Saved:").dim(),
        style(report_json.display()).cyan()
    );
    println!(
        "{} {}\n",
        style("Saved:").dim(),
        style(report_pdf.display()).cyan()
    );
    println!("{}", style("─".repeat(60)).dim());

    // Human-readable output
    println!("{}", format_record_readable(&analysis.report_data));

    Ok(())
}
