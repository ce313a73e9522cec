use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use deepfake_labeling_cli::{generate, init_logging, GenerateArgs};

fn main() -> Result<ExitCode> {
    init_logging();
    let args = GenerateArgs::parse();

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let status = generate(
        &args,
        stdin.lock(),
        std::io::stderr(),
        &mut stdout,
        &mut rand::thread_rng(),
    )?;

    Ok(if status.is_failure() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}
