//! SnapKV CLI Client
//!
//! Command-line interface for interacting with SnapKV.

use std::io::BufReader;
use std::net::TcpStream;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use snapkv::protocol::{read_response, write_request, Command};

/// SnapKV CLI
#[derive(Parser, Debug)]
#[command(name = "snapkv-cli")]
#[command(about = "CLI for SnapKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:4000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let command = match args.command {
        Commands::Get { key } => Command::Get { key },
        Commands::Set { key, value } => Command::Set { key, value },
    };

    match send(&args.server, &command) {
        Ok(response) if response.is_ok() => {
            if !response.body.is_empty() {
                println!("{}", String::from_utf8_lossy(&response.body));
            }
            ExitCode::SUCCESS
        }
        Ok(response) => {
            eprintln!(
                "{} {}: {}",
                response.status.code(),
                response.status.reason(),
                String::from_utf8_lossy(&response.body)
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Request to {} failed: {}", args.server, e);
            ExitCode::FAILURE
        }
    }
}

fn send(server: &str, command: &Command) -> snapkv::Result<snapkv::protocol::Response> {
    let mut stream = TcpStream::connect(server)?;
    write_request(&mut stream, command, server)?;
    read_response(&mut BufReader::new(stream))
}
