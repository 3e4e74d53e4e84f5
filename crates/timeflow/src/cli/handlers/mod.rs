use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::ArgMatches;
use timeflow_core::ScoringConfig;

use crate::{
    commands::{
        self,
        apply::ApplyOptions,
        award::AwardOptions,
        init::InitOptions,
        Report,
    },
    config,
};

pub fn dispatch(matches: &ArgMatches) -> Result<()> {
    let json = matches.get_flag("json");
    let explicit = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);

    match matches.subcommand() {
        Some(("init", sub_m)) => handle_init(sub_m, json),
        Some(("apply", sub_m)) => handle_apply(sub_m, &load(explicit)?, json),
        Some(("level", sub_m)) => handle_level(sub_m, &load(explicit)?, json),
        Some(("award", sub_m)) => handle_award(sub_m, &load(explicit)?, json),
        Some(("catalog", sub_m)) => handle_catalog(sub_m, json),
        Some(("stats", sub_m)) => handle_stats(sub_m, json),
        _ => anyhow::bail!("Unknown command. Run 'timeflow --help' for usage."),
    }
}

fn load(explicit: Option<&std::path::Path>) -> Result<ScoringConfig> {
    config::load_config(explicit).context("Failed to load scoring config")
}

fn print(report: &impl Report, json: bool) -> Result<()> {
    println!("{}", commands::render(report, json)?);
    Ok(())
}

fn required_path(matches: &ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .with_context(|| format!("--{name} is required"))
}

fn handle_init(sub_m: &ArgMatches, json: bool) -> Result<()> {
    let options = InitOptions {
        user: sub_m
            .get_one::<String>("user")
            .cloned()
            .context("--user is required")?,
        out: required_path(sub_m, "out")?,
        force: sub_m.get_flag("force"),
    };
    print(&commands::init::run(&options, Utc::now())?, json)
}

fn handle_apply(sub_m: &ArgMatches, config: &ScoringConfig, json: bool) -> Result<()> {
    let options = ApplyOptions {
        snapshot: required_path(sub_m, "snapshot")?,
        events: required_path(sub_m, "events")?,
        write: sub_m.get_flag("write"),
        expect_revision: sub_m.get_one::<u64>("expect-revision").copied(),
    };
    let report = commands::apply::run(&options, config, Utc::now())
        .with_context(|| format!("Failed to apply {}", options.events.display()))?;
    print(&report, json)
}

fn handle_level(sub_m: &ArgMatches, config: &ScoringConfig, json: bool) -> Result<()> {
    let xp = sub_m
        .get_one::<i64>("xp")
        .copied()
        .context("xp is required")?;
    print(&commands::level::run(xp, &config.level)?, json)
}

fn handle_award(sub_m: &ArgMatches, config: &ScoringConfig, json: bool) -> Result<()> {
    let options = AwardOptions {
        source: sub_m
            .get_one::<String>("source")
            .cloned()
            .context("source is required")?,
        minutes: sub_m.get_one::<u64>("minutes").copied(),
        streak: sub_m.get_one::<u32>("streak").copied(),
        percent: sub_m.get_one::<u8>("percent").copied(),
        title: sub_m.get_one::<String>("title").cloned(),
    };
    print(&commands::award::run(&options, &config.awards)?, json)
}

fn handle_catalog(sub_m: &ArgMatches, json: bool) -> Result<()> {
    let category = sub_m.get_one::<String>("category").map(String::as_str);
    print(&commands::catalog::run(category)?, json)
}

fn handle_stats(sub_m: &ArgMatches, json: bool) -> Result<()> {
    let events = required_path(sub_m, "events")?;
    print(&commands::stats::run(&events)?, json)
}
