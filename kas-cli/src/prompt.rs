use anyhow::Result;
use kas_store::{Confirm, Decision, DestructiveIntent};
use std::io::{self, BufRead, Write};

/// Asks on stdin/stdout. Anything other than y/yes aborts, as does EOF.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, intent: &DestructiveIntent) -> Decision {
        match ask(intent, &mut io::stdin().lock(), &mut io::stdout()) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("confirmation prompt failed, aborting: {e}");
                Decision::Abort
            }
        }
    }
}

fn ask(intent: &DestructiveIntent, input: &mut impl BufRead, out: &mut impl Write) -> Result<Decision> {
    writeln!(out, "{}", intent.title())?;
    write!(out, "{} Continue? [y/N]: ", intent.warning())?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(parse_answer(&line))
}

fn parse_answer(line: &str) -> Decision {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Decision::Proceed,
        _ => Decision::Abort,
    }
}
