mod cli;

use crate::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("isosum error: {:#}", err);
            std::process::exit(1);
        }
    }
}
