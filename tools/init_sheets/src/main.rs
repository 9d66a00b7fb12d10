use std::sync::Arc;

use club_attendance::clock::SystemClock;
use club_attendance::config::{SheetsConfig, WindowConfig};
use club_attendance::sheets::SheetsHttpClient;
use dotenvy::dotenv;

fn is_dry_run() -> bool {
    !std::env::args().any(|a| a == "--apply")
}

fn has_headers(current: &[String], expected: &[&str]) -> bool {
    current.len() >= expected.len()
        && current
            .iter()
            .zip(expected)
            .all(|(have, want)| have.trim() == *want)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let config = SheetsConfig::new_from_env()?;
    let window = WindowConfig::new_from_env()?;
    let clock = Arc::new(SystemClock::new(window.utc_offset));
    let client = SheetsHttpClient::new(config, clock)?;

    let dry_run = is_dry_run();
    let mut written = 0;

    for (sheet, expected) in client.expected_headers() {
        let current = client.header_row(sheet).await?;
        if has_headers(&current, expected) {
            println!("{}: header row OK ({} columns)", sheet, current.len());
            continue;
        }

        if dry_run {
            println!(
                "[DRY RUN] Would write headers to {}: {:?} (found {:?})",
                sheet, expected, current
            );
        } else {
            client.write_header_row(sheet, expected).await?;
            println!("{}: wrote headers {:?}", sheet, expected);
        }
        written += 1;
    }

    println!("Sheets needing headers: {}", written);
    if dry_run && written > 0 {
        println!("Re-run with --apply to write them.");
    }

    Ok(())
}
