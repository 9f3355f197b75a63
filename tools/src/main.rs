//! sandbox-runner: headless driver for the interlocking scenario sandbox.
//!
//! Usage:
//!   sandbox-runner --topology station.json --scenario preset.json --at 12
//!   sandbox-runner --topology station.json --random-seed 7 --steps 20 --export steps
//!   sandbox-runner --topology station.json --ipc-mode

use anyhow::{anyhow, Result};
use sandbox_core::{
    codec::ExportForm,
    event::EntityKind,
    generator::generate_scenario,
    session::ScenarioSession,
    topology::TopologyGraph,
    types::{EventId, StateCode, Tick},
};
use serde_json::{json, Value};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Add {
        kind:  EntityKind,
        name:  String,
        t:     Tick,
        state: StateCode,
    },
    Edit {
        id:    EventId,
        state: StateCode,
    },
    Delete {
        id: EventId,
    },
    Stage {
        kind:  EntityKind,
        name:  String,
        t:     Tick,
        state: StateCode,
    },
    Commit,
    Discard,
    StateAt {
        t: Tick,
    },
    Export {
        #[serde(default = "default_form")]
        form: String,
    },
    Import {
        text: String,
    },
    Quit,
}

fn default_form() -> String {
    "both".to_string()
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let topology_path = arg_value(&args, "--topology")
        .ok_or_else(|| anyhow!("--topology <file> is required"))?;
    let topology = TopologyGraph::load(topology_path)?;

    let mut session = match arg_value(&args, "--random-seed").and_then(|s| s.parse::<u64>().ok()) {
        Some(seed) => {
            let steps = parse_arg(&args, "--steps", 10u64);
            let store = generate_scenario(&topology, seed, steps)?;
            ScenarioSession::with_store(topology, store)
        }
        None => ScenarioSession::new(topology),
    };

    if let Some(path) = arg_value(&args, "--scenario") {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read {path}: {e}"))?;
        let count = session
            .import_json(&text)
            .map_err(|e| anyhow!("Cannot import {path}: {e}"))?;
        log::info!("scenario {path}: {count} events");
    }

    if ipc_mode {
        return run_ipc_loop(&mut session);
    }

    if let Some(t) = arg_value(&args, "--at").and_then(|s| s.parse::<Tick>().ok()) {
        println!("{}", serde_json::to_string_pretty(&state_reply(&session, t))?);
        return Ok(());
    }

    if let Some(form) = arg_value(&args, "--export") {
        let form: ExportForm = form.parse().map_err(|e: String| anyhow!(e))?;
        println!("{}", session.export_json(form)?);
        return Ok(());
    }

    print_summary(&session);
    Ok(())
}

fn run_ipc_loop(session: &mut ScenarioSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let reply = match handle_command(session, cmd) {
            Ok(v) => v,
            Err(e) => json!({ "error": e.to_string() }),
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(session: &mut ScenarioSession, cmd: IpcCommand) -> Result<Value> {
    let reply = match cmd {
        IpcCommand::Add { kind, name, t, state } => {
            let id = session.add(kind, &name, t, state)?;
            json!({ "id": id })
        }
        IpcCommand::Edit { id, state } => {
            session.edit(id, state)?;
            json!({ "ok": true })
        }
        IpcCommand::Delete { id } => {
            let removed = session.delete(id)?;
            json!({ "deleted": removed.id })
        }
        IpcCommand::Stage { kind, name, t, state } => {
            let pinned = session.stage(kind, &name, t, state)?;
            json!({ "t": pinned, "staged": session.staged().len() })
        }
        IpcCommand::Commit => {
            let ids = session.commit_batch();
            json!({ "ids": ids })
        }
        IpcCommand::Discard => {
            session.discard_batch();
            json!({ "ok": true })
        }
        IpcCommand::StateAt { t } => state_reply(session, t),
        IpcCommand::Export { form } => {
            let form: ExportForm = form.parse().map_err(|e: String| anyhow!(e))?;
            serde_json::to_value(session.export(form))?
        }
        IpcCommand::Import { text } => {
            let count = session.import_json(&text)?;
            json!({ "events": count })
        }
        IpcCommand::Quit => json!({ "ok": true }),
    };
    Ok(reply)
}

fn state_reply(session: &ScenarioSession, t: Tick) -> Value {
    json!({
        "t": t,
        "state": session.state_maps_at(t),
        "appearance": session.appearance_at(t),
    })
}

fn print_summary(session: &ScenarioSession) {
    let store = session.store();
    let windows = store.step_windows();

    println!("=== SCENARIO SUMMARY ===");
    println!("  station:  {}", session.header().station);
    println!("  events:   {}", store.len());
    println!("  steps:    {}", windows.len());
    for w in &windows {
        let count = store.events_at(w.start).count();
        println!("  t={:<5} dt={:<3} events={count}", w.start, w.dt);
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    arg_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
