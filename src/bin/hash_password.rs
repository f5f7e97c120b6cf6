//! CLI tool to produce `CODESPEED_USERS` entries.
//!
//! Usage:
//!   cargo run --bin hash-password -- --username ci-runner --password 's3cret'
//!   echo 's3cret' | cargo run --bin hash-password -- --username ci-runner

use std::env;
use std::io::{self, BufRead};

use codespeed_lib::auth::{UserDirectory, hash_password};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut username: Option<String> = None;
    let mut password: Option<String> = None;
    let mut inactive = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--username" | "-u" => {
                i += 1;
                if i < args.len() {
                    username = Some(args[i].clone());
                }
            }
            "--password" | "-p" => {
                i += 1;
                if i < args.len() {
                    password = Some(args[i].clone());
                }
            }
            "--inactive" => inactive = true,
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let username = match username {
        Some(u) if !u.is_empty() && !u.contains([':', ',']) => u,
        Some(_) => {
            eprintln!("Error: --username must be non-empty and contain no ':' or ','");
            std::process::exit(1);
        }
        None => {
            eprintln!("Error: --username is required");
            print_usage();
            std::process::exit(1);
        }
    };

    // Read the password from stdin when not given, keeping it out of shell history
    let password = match password {
        Some(p) => p,
        None => {
            let mut line = String::new();
            if let Err(e) = io::stdin().lock().read_line(&mut line) {
                eprintln!("Error reading password from stdin: {}", e);
                std::process::exit(1);
            }
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        eprintln!("Error: password must not be empty");
        std::process::exit(1);
    }

    let mut entry = format!("{}:{}", username, hash_password(&password));
    if inactive {
        entry.push_str(":inactive");
    }

    // The entry must round-trip through the same parser the server uses
    if let Err(e) = UserDirectory::parse(&entry) {
        eprintln!("Error: generated entry is invalid: {}", e);
        std::process::exit(1);
    }

    println!("{}", entry);
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: hash-password --username <name> [--password <password>] [--inactive]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --username, -u    Account name (required)");
    eprintln!("  --password, -p    Password (read from stdin when omitted)");
    eprintln!("  --inactive        Mark the account as deactivated");
    eprintln!("  --help, -h        Show this help");
    eprintln!();
    eprintln!("Append the printed entry to CODESPEED_USERS, separated by commas.");
    eprintln!();
}
