use anyhow::Result;
use clap::Parser;

use deepfake_labeling_cli::{init_logging, show, ShowArgs};

fn main() -> Result<()> {
    init_logging();
    let args = ShowArgs::parse();
    show(&args, &mut std::io::stdout().lock())
}
