use anyhow::Result;
use timeflow::cli::{build_cli, setup};

fn main() -> Result<()> {
    setup::init_tracing()?;
    let matches = build_cli().get_matches();
    timeflow::cli::handlers::dispatch(&matches)
}
