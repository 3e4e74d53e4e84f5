pub mod handlers;
pub mod setup;

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("timeflow")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Score TimeFlow activity: XP, levels and achievements")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Scoring config TOML (overrides TIMEFLOW_CONFIG and the global config)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print machine-readable JSON"),
        )
        .subcommand(cmd_init())
        .subcommand(cmd_apply())
        .subcommand(cmd_level())
        .subcommand(cmd_award())
        .subcommand(cmd_catalog())
        .subcommand(cmd_stats())
}

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .required(true)
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn cmd_init() -> Command {
    Command::new("init")
        .about("Create a fresh gamification snapshot")
        .arg(
            Arg::new("user")
                .long("user")
                .required(true)
                .value_name("ID")
                .help("Owning user id"),
        )
        .arg(path_arg("out", "Where to write the snapshot"))
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Overwrite an existing snapshot"),
        )
}

fn cmd_apply() -> Command {
    Command::new("apply")
        .about("Apply activity events to a snapshot")
        .arg(path_arg("snapshot", "Snapshot JSON file"))
        .arg(path_arg("events", "Activity events, one JSON object per line"))
        .arg(
            Arg::new("write")
                .long("write")
                .action(ArgAction::SetTrue)
                .help("Write the updated snapshot back"),
        )
        .arg(
            Arg::new("expect-revision")
                .long("expect-revision")
                .value_name("N")
                .value_parser(value_parser!(u64))
                .help("Fail unless the snapshot is at this revision"),
        )
}

fn cmd_level() -> Command {
    Command::new("level")
        .about("Show the level for an XP total")
        .arg(
            Arg::new("xp")
                .required(true)
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64))
                .help("Cumulative XP"),
        )
}

fn cmd_award() -> Command {
    Command::new("award")
        .about("Look up the XP reward for a source")
        .arg(
            Arg::new("source")
                .required(true)
                .help("XP source tag, e.g. task_completed_high"),
        )
        .arg(
            Arg::new("minutes")
                .long("minutes")
                .value_parser(value_parser!(u64))
                .help("Minutes tracked (time_tracked)"),
        )
        .arg(
            Arg::new("streak")
                .long("streak")
                .value_parser(value_parser!(u32))
                .help("Streak length in days (habit_streak_milestone)"),
        )
        .arg(
            Arg::new("percent")
                .long("percent")
                .value_parser(value_parser!(u8))
                .help("Milestone percent (goal_milestone)"),
        )
        .arg(
            Arg::new("title")
                .long("title")
                .help("Task, habit, goal or achievement title"),
        )
}

fn cmd_catalog() -> Command {
    Command::new("catalog")
        .about("List achievement definitions")
        .arg(
            Arg::new("category")
                .long("category")
                .help("Only show one category (tasks, habits, goals, time, streaks, special)"),
        )
}

fn cmd_stats() -> Command {
    Command::new("stats")
        .about("Rebuild activity stats from an event file")
        .arg(path_arg("events", "Activity events, one JSON object per line"))
}
