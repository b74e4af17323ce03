#![warn(clippy::all)]

use std::io::{self, Write as _};
use std::process;

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use djsync::{Console, Opt, SyncError};

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let opt = Opt::from_args();
    init_tracing(opt.is_debug());
    let mut cnsl = Console::term(opt.console_config());
    if let Err(err) = opt.run(&mut io::stdout(), &mut cnsl) {
        io::stdout().flush().unwrap_or(());
        eprintln!();
        eprintln!("Error: {:?}", err);
        let code = SyncError::find_in(&err).map_or(1, SyncError::exit_code);
        process::exit(code);
    }
}
