pub mod args;

use clap::CommandFactory;
use csaf_tool::types::ExtraConfig;
use std::path::Path;

fn build_config(arg: &args::Arg) -> ExtraConfig {
    let mut cfg = ExtraConfig {
        verify_checksum: arg.verify_checksum,
        ..ExtraConfig::default()
    };
    if let Some(workers) = arg.workers {
        cfg.workers = workers.max(1);
    }
    cfg
}

fn main() {
    let arg = args::parse_args();
    if arg.backtrace {
        unsafe { std::env::set_var("RUST_LIB_BACKTRACE", "1") };
    }
    tracing_subscriber::fmt()
        .with_max_level(if arg.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .init();
    let archive = match &arg.archive {
        Some(archive) => archive,
        None => {
            if let Err(e) = args::Arg::command().print_help() {
                eprintln!("Failed to print usage: {}", e);
            }
            return;
        }
    };
    let output = match &arg.output {
        Some(output) => output.clone(),
        None => format!("{}_extract", archive),
    };
    let cfg = build_config(&arg);
    tracing::debug!("Using {} worker threads", cfg.workers);
    match csaf_tool::csaf::extract_file(Path::new(archive), Path::new(&output), &cfg) {
        Ok(summary) => {
            if !summary.is_complete() {
                tracing::warn!(
                    "{} of {} entries failed to extract",
                    summary.failures.len(),
                    summary.total
                );
            }
        }
        Err(e) => {
            tracing::error!("Error extracting {}: {:#}", archive, e);
            if arg.backtrace {
                eprintln!("Backtrace: {}", e.backtrace());
            }
            std::process::exit(1);
        }
    }
}
