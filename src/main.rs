use anyhow::Result;
use log::info;
use std::env;
use std::io::{self, BufRead, Write};

use krua_ledger::cache::{NameIndexCache, DEFAULT_TTL};
use krua_ledger::orchestrator::Orchestrator;
use krua_ledger::store::SqliteStore;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    info!("Starting Krua Ledger");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "krua_ledger.db".to_string());
    info!("Opening ledger database at: {}", database_url);

    let store = SqliteStore::open(&database_url)?;
    let cache = NameIndexCache::new(DEFAULT_TTL);
    let orchestrator = Orchestrator::new(&store, &cache);

    info!("Ledger ready, reading commands from stdin");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "ออก" || line == "exit" || line == "quit" {
            break;
        }

        let response = orchestrator.handle_command(line);
        println!("{}", response.message);
    }

    info!("Krua Ledger shutting down");
    Ok(())
}
