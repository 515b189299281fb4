use std::io;

use anyhow::Result;

use pocket_ledger::accounting::ledger::Ledger;
use pocket_ledger::cli::Session;
use pocket_ledger::config::Config;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        },
    };

    let ledger = Ledger::new(&config.master_file);
    let stdin = io::stdin();
    let mut session = Session::new(ledger, stdin.lock(), io::stdout());
    session.run(config.import_file.as_deref())?;

    Ok(())
}
