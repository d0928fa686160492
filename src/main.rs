mod cli;

use folioforge::{
    config,
    events::EventLog,
    job::{ConversionJob, JobGuard, JobStage},
    sanitizer::Sanitizer,
};
use folioforge_common::{AggregateStats, SanitizationReport, SanitizeStatus};
use folioforge_container::ContainerCodec;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "folioforge=trace,folioforge_image=trace,folioforge_container=debug,folioforge_common=debug".to_string()
        } else {
            "folioforge=info,folioforge_image=warn,folioforge_container=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Sanitize {
            input,
            output,
            json,
        } => sanitize_epub(&input, output, cli.config.as_deref(), json),
        Commands::Scan { dir, json } => scan_dir(&dir, cli.config.as_deref(), json),
        Commands::Unpack { input, dest } => unpack(&input, &dest, cli.config.as_deref()),
        Commands::Pack { src, output } => pack(&src, &output, cli.config.as_deref()),
        Commands::Sniff { files } => sniff_files(&files),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("folioforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn sanitize_epub(
    input: &Path,
    output: Option<std::path::PathBuf>,
    config_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let mut job = ConversionJob::new(input);
    if let Some(output) = output {
        job = job.with_output(output);
    }

    let events = Arc::new(EventLog::with_sink(
        &config.log,
        Box::new(|line| eprintln!("{}", line.render())),
    ));
    let guard = JobGuard::new();
    let result = job.run(&guard, &config, Some(Arc::clone(&events)), &|p| {
        if p.stage != JobStage::Sanitize {
            tracing::info!("{:?} ({:.0}%)", p.stage, p.percent);
        }
    });
    // Flush buffered events before reporting, including on failure.
    if let Ok(events) = Arc::try_unwrap(events) {
        events.close();
    }
    let outcome = result?;

    print_reports(&outcome.reports, &outcome.stats, json)?;
    if !json {
        println!("Output: {}", outcome.output.display());
    }
    Ok(())
}

fn scan_dir(dir: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Directory does not exist: {:?}", dir);
    }
    let config = config::load_config_or_default(config_path)?;
    let reports = Sanitizer::from_config(&config).sanitize_tree_with_progress(dir, &|p| {
        tracing::info!("{}/{} images", p.done, p.total);
    });
    let stats = AggregateStats::from_reports(&reports);
    print_reports(&reports, &stats, json)
}

fn print_reports(reports: &[SanitizationReport], stats: &AggregateStats, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        if report.status != SanitizeStatus::Ok {
            println!(
                "{:<8} {} [{}]",
                report.status.to_string(),
                report.path.display(),
                report.actions.join(" | ")
            );
            if let Some(error) = &report.error {
                println!("         {}", error);
            }
        }
    }
    for line in stats.summary_lines() {
        println!("{}", line);
    }
    Ok(())
}

fn unpack(input: &Path, dest: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let summary = ContainerCodec::new(config.container.stream_buffer_size)
        .unzip(input, dest)
        .with_context(|| format!("Failed to unpack {:?}", input))?;

    println!(
        "Extracted {} files, {} directories ({} bytes)",
        summary.files, summary.directories, summary.bytes
    );
    for name in &summary.skipped {
        println!("Skipped unsafe path: {}", name);
    }
    Ok(())
}

fn pack(src: &Path, output: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let summary = ContainerCodec::new(config.container.stream_buffer_size)
        .zip_strict(src, output)
        .with_context(|| format!("Failed to pack {:?}", src))?;

    println!("Packed {} entries ({} bytes)", summary.entries, summary.bytes);
    if !summary.mimetype_from_source {
        println!("No mimetype in source; wrote {}", folioforge_container::EPUB_MIMETYPE);
    }
    Ok(())
}

fn sniff_files(files: &[std::path::PathBuf]) -> Result<()> {
    for file in files {
        match folioforge_image::sniff(file) {
            Ok(format) => match folioforge_image::detect_spoof(file, format) {
                Some(tag) => println!("{}: {} ({})", file.display(), format, tag),
                None => println!("{}: {}", file.display(), format),
            },
            Err(e) => println!("{}: {}", file.display(), e),
        }
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_config(&config::Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &config::Config) {
    println!("  Target DPI: {}", config.sanitize.target_dpi);
    println!("  Max long side: {}", config.sanitize.max_long_side);
    println!("  JPEG quality: {}", config.sanitize.jpeg_quality);
    println!("  Max workers: {}", config.sanitize.max_workers);
    println!("  Max dimension: {}", config.limits.max_dimension);
    println!("  Max pixels: {}", config.limits.max_pixels);
}
