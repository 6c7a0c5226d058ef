use anyhow::Result;
use clap::Parser;
use incr_version::{arguments::Arguments, config::Config, hook};
use log::{LevelFilter, debug};

fn main() -> Result<()> {
    let args = Arguments::parse();
    pretty_env_logger::env_logger::builder()
        .filter_level(if args.debug { LevelFilter::Debug } else { LevelFilter::Info })
        .format_timestamp(None)
        .format_target(false)
        .init();

    let config = Config::from_arguments(&args)?;
    let today = chrono::Local::now().date_naive();

    match hook::run(&config, today)? {
        Some(update) => debug!("Updated {} to {}", update.path.display(), update.new),
        None => debug!("No version update was needed"),
    }

    Ok(())
}
