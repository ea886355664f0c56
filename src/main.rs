// src/main.rs

use opine::discovery::ModuleCatalog;
use opine::{cli, logging, run};

fn main() {
    if let Err(err) = run_main() {
        eprintln!("opine error: {err:?}");
        std::process::exit(1);
    }
}

fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    // Host binaries embed their modules here; the stock binary has none.
    let catalog = ModuleCatalog::new();
    run(args, &catalog)
}
