//! cnx-upgrade entry point
//!
//! Parses arguments, dispatches to the CLI module, prints errors to
//! stderr and exits with non-zero on failure. All logic lives in `cli`.

use cnxupgrade::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
