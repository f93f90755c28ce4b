use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use payboard::{AccountId, Money, create_account, initialize_db};

/// A utility for creating a test database for the REST API server of payboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// The demo accounts as (ID, email, balance in cents).
const TEST_ACCOUNTS: [(&str, &str, i64); 3] = [
    ("user_alice", "alice@example.com", 10_000),
    ("user_bob", "bob@example.com", 5_000),
    ("user_carol", "carol@example.com", 0),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    for (id, email, balance) in TEST_ACCOUNTS {
        let balance = Money::from_cents(balance);
        println!("Creating account {email} with a balance of {balance}...");
        create_account(&AccountId::new(id), email, balance, &conn)?;
    }

    println!("Success!");

    Ok(())
}
