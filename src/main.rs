//! PatchForge CLI - Incremental Update Publisher
//!
//! Builds a content-hash manifest of an update directory and publishes
//! the changed files to a remote store.

use clap::Parser;
use crossbeam_channel::unbounded;
use patchforge::config::{CliArgs, PublishConfig, RemoteConfig};
use patchforge::error::Result;
use patchforge::pipeline::Publisher;
use patchforge::progress::ProgressReporter;
use patchforge::remote::SftpStore;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    // Parse CLI arguments
    let args = CliArgs::parse();

    // Handle result
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<()> {
    let config = PublishConfig::from_cli(&args)?;

    // Print configuration if verbose
    if args.verbose > 0 {
        print_config(&config);
    }

    if args.manifest_only {
        // Manifest-only mode never opens a connection
        let publisher: Publisher<SftpStore> =
            Publisher::new(config.clone(), || {
                Err(patchforge::PatchForgeError::config(
                    "no remote configured in manifest-only mode",
                ))
            });
        let (manifest, total_files) = publisher.generate_manifest()?;

        if !args.quiet {
            println!(
                "Manifest {} written to {} ({} files, {} records)",
                manifest.version,
                config.manifest_path.display(),
                total_files,
                manifest.record_count(),
            );
        }
        return Ok(());
    }

    let remote = RemoteConfig::from_cli(&args)?;

    let (sender, receiver) = unbounded();
    let reporter = if args.quiet {
        ProgressReporter::disabled()
    } else {
        ProgressReporter::new()
    };
    let reporter_thread = reporter.attach(receiver);

    let publisher = Publisher::new(config, move || SftpStore::connect(&remote))
        .with_events(sender);

    let summary = publisher.run_publish();
    drop(publisher);
    let _ = reporter_thread.join();

    let summary = summary?;
    if !args.quiet {
        summary.print_summary();
        if summary.is_partial() {
            println!("\nRerun to retry the failed files.");
        }
    }

    if summary.is_partial() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_config(config: &PublishConfig) {
    println!("=== PatchForge Configuration ===");
    println!("Root:         {}", config.root.display());
    println!("Version file: {}", config.version_file.display());
    println!("Manifest:     {}", config.manifest_path.display());
    println!("Control dir:  {}", config.control_dir);
    println!("Content dir:  {}", config.content_dir);
    println!("Concurrency:  {}", config.concurrency);
    println!();
}
