use anyhow::Result;
use clap::Parser;
use cli::{report_lines, ClassifyArgs};
use tracing::info;
use tweet_core::config;
use tweet_core::pipeline;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = ClassifyArgs::parse();
    let cfg = config::load(args.config.as_deref())?;
    info!(
        "config loaded from {}",
        args.config.as_deref().unwrap_or("config/default (optional)")
    );
    let report = pipeline::run_classification(&cfg, &args.options())?;
    info!("{} scored on {} samples", report.classifier, report.samples);

    if args.json {
        let scores: serde_json::Map<String, serde_json::Value> = report
            .scores
            .iter()
            .map(|(metric, value)| (metric.name().to_string(), serde_json::json!(value)))
            .collect();
        let out = serde_json::json!({
            "classifier": report.classifier,
            "imported": report.imported,
            "samples": report.samples,
            "scores": scores,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in report_lines(&report) {
            println!("{line}");
        }
    }
    Ok(())
}
