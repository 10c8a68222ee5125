//! Stats command - load once and report the telemetry it produced

use crate::cache::StartupCache;
use crate::cli::args::{OutputFormat, StatsArgs};
use crate::config::Config;
use crate::error::StartupCacheResult;
use crate::telemetry::{FanoutSink, MemorySink, Recorded, Telemetry, TelemetrySink};
use std::sync::Arc;

/// Execute the stats command
pub async fn execute(args: StatsArgs, config: &Config) -> StartupCacheResult<()> {
    let memory = Arc::new(MemorySink::new());
    let configured = Telemetry::from_config(&config.telemetry).sink();
    let sinks: Vec<Arc<dyn TelemetrySink>> = vec![memory.clone(), configured];

    let cache = StartupCache::from_config(config)
        .with_telemetry(Telemetry::new(Arc::new(FanoutSink::new(sinks))));

    cache.load().await;
    if args.save {
        cache.save().await?;
    }

    let recorded = memory.take();
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recorded)?),
        OutputFormat::Table | OutputFormat::Plain => print_recorded(&recorded),
    }

    Ok(())
}

fn print_recorded(recorded: &Recorded) {
    println!("{:<10} {:<48} {:>12}", "KIND", "NAME", "VALUE");
    println!("{}", "-".repeat(72));

    for (name, value) in &recorded.metrics {
        println!("{:<10} {:<48} {:>12}", "metric", name, value);
    }
    for (name, value) in &recorded.scalars {
        println!("{:<10} {:<48} {:>12}", "scalar", name, value);
    }
    for (name, keyed) in &recorded.keyed_scalars {
        for (key, value) in keyed {
            println!("{:<10} {:<48} {:>12}", "keyed", format!("{}[{}]", name, key), value);
        }
    }
}
