use std::collections::HashSet;
use std::path::PathBuf;

use clap::Parser;

use diskring::config::settings::Settings;
use diskring::core::annotate::annotate_percentages;
use diskring::core::events::{self, Event};
use diskring::core::scanner::Scanner;
use diskring::layout::rings::build_rings;
use diskring::models::entry::human_readable_size;

#[derive(Parser, Debug)]
#[command(name = "diskring", version, about = "Disk usage analyzer with a radial layout core")]
struct Cli {
    /// Path to analyze (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Measure logical file length instead of allocated on-disk size
    #[arg(long)]
    apparent_size: bool,

    /// Print the annotated tree as JSON
    #[arg(long)]
    json: bool,

    /// Print slice geometry for up to N rings
    #[arg(long, value_name = "N")]
    rings: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = Settings {
        use_apparent_size: cli.apparent_size,
        ..Settings::default()
    };
    let base_depth = settings.base_depth;

    let path = std::fs::canonicalize(&cli.path)?;

    let (event_tx, mut event_rx) = events::create_event_channel();
    let progress_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                Event::Progress {
                    fraction,
                    current_name,
                } => {
                    eprint!("\r\x1b[2K{:>5.1}%  {}", fraction * 100.0, current_name);
                }
                Event::ScanCompleted {
                    total_size,
                    duration_ms,
                } => {
                    eprintln!(
                        "\r\x1b[2Kscanned {} in {} ms",
                        human_readable_size(total_size),
                        duration_ms
                    );
                }
                _ => {}
            }
        }
    });

    let scanner = Scanner::new(settings, event_tx);
    let outcome = scanner.scan(path).await?;
    // Release the scanner's event sender so the progress task can finish.
    drop(scanner);
    let _ = progress_task.await;

    let Some(mut result) = outcome else {
        anyhow::bail!("scan cancelled");
    };
    annotate_percentages(&mut result.root);

    if cli.json {
        serde_json::to_writer_pretty(std::io::stdout().lock(), &result)?;
        println!();
        return Ok(());
    }

    println!(
        "{}  {}",
        result.scan_path.display(),
        human_readable_size(result.total_size)
    );
    for child in &result.root.children {
        println!(
            "{:>10}  {:>5.1}%  {}",
            child.human_readable_size(),
            child.percent_of_total,
            child.name
        );
    }
    if !result.warnings.is_empty() {
        eprintln!("{} entries could not be read", result.warnings.len());
    }

    if let Some(max_rings) = cli.rings {
        let rings = build_rings(&result.root, &HashSet::new(), base_depth, max_rings);
        for (i, ring) in rings.iter().enumerate() {
            println!("ring {i}:");
            for slice in ring {
                println!(
                    "  [{:>8.2} deg, {:>8.2} deg)  {}",
                    slice.start_deg, slice.end_deg, slice.entry.name
                );
            }
        }
    }

    Ok(())
}
