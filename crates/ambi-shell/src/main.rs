#![forbid(unsafe_code)]

//! ambi-shell binary entry point.

use std::io::{self, Write};

use ambi::prelude::*;
use ambi_shell::{cli, logging};

fn main() {
    let opts = cli::Opts::parse();
    logging::init();

    if let Err(e) = run(&opts) {
        eprintln!("ambi-shell: {e}");
        std::process::exit(1);
    }
}

fn run(opts: &cli::Opts) -> Result<()> {
    // Reject bad options before touching the terminal.
    let config = opts.session_config();
    config.validate()?;

    let mut session = TerminalSession::new(config, io::stdout(), RawMode::new())?
        .with_on_submit(|query| {
            let mut out = io::stdout().lock();
            let echoed = write!(out, "{query}\r\n").and_then(|()| out.flush());
            if let Err(err) = echoed {
                tracing::warn!(%err, "failed to echo submission");
            }
        });
    session.run(io::stdin())?;
    Ok(())
}
