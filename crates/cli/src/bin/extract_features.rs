use anyhow::Result;
use clap::Parser;
use cli::ExtractArgs;
use tracing::info;
use tweet_core::config;
use tweet_core::pipeline;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = ExtractArgs::parse();
    let cfg = config::load(args.config.as_deref())?;
    info!(
        "config loaded from {}",
        args.config.as_deref().unwrap_or("config/default (optional)")
    );
    let summary = pipeline::run_extraction(&cfg, &args.options())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Extracted {} features for {} tweets into {}",
            summary.feature_names.len(),
            summary.rows,
            args.output_file.display()
        );
    }
    Ok(())
}
