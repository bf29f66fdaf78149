/*!
 * Console output for trial runs
 */

use crate::core::orchestrator::{Event, Reporter, Session, Terminal};
use crate::core::password_gen::SourceKind;
use colored::Colorize;
use std::time::Duration;

/// Prints one line per step of the run
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    kind: Option<SourceKind>,
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: &Event<'_>) {
        match event {
            Event::Started {
                network_id,
                kind,
                total,
            } => {
                self.kind = Some(*kind);
                println!(
                    "\n{}",
                    format!("🔓 Starting attempts against '{network_id}'").bold().cyan()
                );
                match kind {
                    SourceKind::Exhaustive => {
                        println!("Total combinations: {}", group_digits(*total).cyan())
                    }
                    SourceKind::Dictionary => {
                        println!("Passwords loaded: {}", group_digits(*total).cyan())
                    }
                }
            }
            Event::AttemptStarted {
                number,
                total,
                candidate,
                fallback,
            } => {
                if *fallback {
                    println!("\n{}", "❌ No password was successful".red());
                    println!(
                        "\n{}",
                        format!("🔁 Retrying last password '{candidate}' with connectivity check...")
                            .yellow()
                    );
                } else if self.kind == Some(SourceKind::Dictionary) {
                    println!("\nAttempt {number}/{total}: trying password '{}'", candidate.bold());
                } else {
                    println!("\nAttempt {number}: trying password '{}'", candidate.bold());
                }
            }
            Event::Associated { candidate } => {
                println!("{}", format!("✅ Connected using password: {candidate}").green());
                println!("{}", "Waiting for connection stabilization...".dimmed());
                println!("{}", "Checking internet connectivity...".dimmed());
            }
            Event::AssociationFailed { .. } => println!("{}", "❌ Connection failed".red()),
            Event::ReachabilityFailed { .. } => {
                println!("{}", "⚠️  Connected but no internet access".yellow());
            }
            Event::Succeeded { .. } => {
                println!("{}", "✅ Internet connection confirmed".green().bold());
            }
            Event::CleanupFailed { error } => {
                println!("{}", format!("  (profile cleanup failed: {error})").dimmed());
            }
            Event::CleanedUp { .. } | Event::Finished { .. } => {}
        }
    }
}

/// Print the final verdict of a run
pub fn print_summary(session: &Session, elapsed: Duration) {
    println!();
    match session.terminal {
        Some(Terminal::Found) => {
            let secret = session.found_secret().unwrap_or_default();
            println!("{} {}", "🎉 Password found:".bold().green(), secret.bold().cyan());
        }
        Some(Terminal::Interrupted) => {
            println!("{}", "🛑 Stopped before all candidates were tried".yellow());
        }
        Some(Terminal::Exhausted) | None => {
            println!("{}", "✗ No candidate granted internet access".red());
        }
    }

    println!("\n{}", "Statistics:".bold());
    println!("  Network: {}", session.network_id.cyan());
    println!("  Attempts: {}", session.attempts_made.to_string().cyan());
    println!("  Duration: {:.2}s", elapsed.as_secs_f64());
}

/// `1234567` -> `1,234,567`
fn group_digits(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
