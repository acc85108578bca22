//! Live session: the decay timer runs in the background while step readings
//! and actions arrive as lines on stdin. Every event is printed to stdout as
//! one JSON object per line.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use walkfeed_core::steps::parse_step_count;
use walkfeed_core::{Config, Database, Event, PetGender, PetIdentity, PetKind, PetSession};

use super::CmdResult;

/// One line of stdin input.
#[derive(Debug, PartialEq)]
pub enum LineCommand {
    Steps(i64),
    Delta(i64),
    Feed(String),
    Adopt(PetIdentity),
    Reset,
    Status,
    Quit,
}

const USAGE: &str =
    "commands: steps N | delta N | feed ITEM | adopt KIND NAME GENDER | reset | status | quit";

/// Parse a line of input. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<LineCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "steps" => LineCommand::Steps(i64::try_from(parse_step_count(rest)).unwrap_or(i64::MAX)),
        "delta" => LineCommand::Delta(rest.parse::<i64>().unwrap_or(0)),
        "feed" if !rest.is_empty() => LineCommand::Feed(rest.to_string()),
        "adopt" => {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            if parts.len() < 3 {
                return Err("usage: adopt KIND NAME GENDER".into());
            }
            let kind: PetKind = parts[0].parse().map_err(|e| format!("{e}"))?;
            let gender: PetGender = parts[parts.len() - 1]
                .parse()
                .map_err(|e| format!("{e}"))?;
            let name = parts[1..parts.len() - 1].join(" ");
            LineCommand::Adopt(PetIdentity::new(kind, &name, gender).map_err(|e| e.to_string())?)
        }
        "reset" => LineCommand::Reset,
        "status" => LineCommand::Status,
        "quit" | "exit" => LineCommand::Quit,
        _ => return Err(USAGE.into()),
    };
    Ok(Some(cmd))
}

fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "failed to serialize event"),
    }
}

pub fn run(verbose: bool) -> CmdResult {
    let config = Config::load()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(config, verbose))
}

async fn session(config: Config, verbose: bool) -> CmdResult {
    let store = Database::open()?;
    let (handle, task) = PetSession::start(store, config.economy.clone())?;
    info!("live session started");

    let mut events = handle.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) if verbose || !event.is_decay() => print_event(&event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event output fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    print_event(&Event::snapshot(&handle.snapshot().await?));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let cmd = match parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("error: {msg}");
                continue;
            }
        };

        match cmd {
            LineCommand::Steps(n) => handle.ingest_steps(n).await,
            LineCommand::Delta(n) => handle.ingest_step_delta(n).await,
            LineCommand::Feed(name) => match config.catalog.find(&name) {
                Some(item) => {
                    handle.feed(item.clone()).await?;
                }
                None => eprintln!("error: unknown food '{name}'"),
            },
            LineCommand::Adopt(pet) => {
                if !handle.adopt(pet).await? {
                    eprintln!("error: a pet is already adopted, or the current one is dead");
                }
            }
            LineCommand::Reset => {
                if !handle.reset().await?.applied {
                    eprintln!("error: only a dead pet can be reset");
                }
            }
            LineCommand::Status => print_event(&Event::snapshot(&handle.snapshot().await?)),
            LineCommand::Quit => break,
        }
    }

    handle.shutdown().await;
    let final_state = task.await?;
    // The printer stops once every event sender is gone.
    drop(handle);
    printer.await?;
    print_event(&Event::snapshot(&final_state));
    info!("live session stopped");
    Ok(())
}
