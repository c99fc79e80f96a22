//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use saferoute_cli::CliError;

fn main() {
    env_logger::init();
    match saferoute_cli::run() {
        Ok(()) => {}
        // Help and version output are reported through clap's own exit path.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("saferoute: {err}");
            std::process::exit(1);
        }
    }
}
