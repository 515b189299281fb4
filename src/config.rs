use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};

pub const DEFAULT_MASTER_FILE: &str = "transactions.txt";
pub const MASTER_FILE_ENV: &str = "LEDGER_MASTER_FILE";

pub const USAGE: &str = "Usage: pocket_ledger [--master <file>] [import_file]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Every new or imported transaction is appended here.
    pub master_file: PathBuf,
    /// Imported before the menu starts; when absent the user is asked.
    pub import_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            master_file: PathBuf::from(DEFAULT_MASTER_FILE),
            import_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Config::parse(env::var_os(MASTER_FILE_ENV).map(PathBuf::from), env::args().skip(1))
    }

    /// `args` excludes the program name. A `--master` flag wins over `master_file`.
    pub fn parse(master_file: Option<PathBuf>, args: impl IntoIterator<Item = String>) -> Result<Config> {
        let mut config = Config::default();
        if let Some(path) = master_file {
            config.master_file = path;
        }

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--master" | "-m" => match args.next() {
                    Some(path) => config.master_file = PathBuf::from(path),
                    None => bail!("missing value for {}\n{}", arg, USAGE),
                },
                flag if flag.starts_with('-') => bail!("unknown option {}\n{}", flag, USAGE),
                _ if config.import_file.is_some() => bail!("unexpected argument {}\n{}", arg, USAGE),
                _ => config.import_file = Some(PathBuf::from(&arg)),
            }
        }

        Ok(config)
    }
}
