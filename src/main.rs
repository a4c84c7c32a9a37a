mod cli;
mod console;
mod credentials;
mod engine;
mod error;
mod logging;
mod model;
mod orchestrator;
mod snapshot;
mod tui;

use clap::Parser;

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();

    // The cursor has already been restored by the time `run` returns.
    let code = match cli::run(args).await {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("{e:#}");
            cli::exit_code(&e)
        }
    };
    // Exit explicitly so a poller still blocked on the cookie prompt
    // cannot hold the runtime open.
    std::process::exit(code);
}
