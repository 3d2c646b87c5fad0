//! CSM Editor CLI - load a description, summarize it, optionally re-emit PKL

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use csm_editor::config::EditorConfig;
use csm_editor::graph::EdgeKind;
use csm_editor::{load_file, EditorSession, StateMachine};

struct Args {
    input: PathBuf,
    emit: bool,
    config: Option<PathBuf>,
}

fn print_usage() {
    println!("CSM Editor CLI - Collaborative State Machine loader");
    println!("Usage: csm-cli <file.pkl|file.json> [--emit] [--config <file>]");
    println!();
    println!("Example: csm-cli demos/factory.pkl --emit");
}

fn parse_args() -> Result<Args, String> {
    let mut input = None;
    let mut emit = false;
    let mut config = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--emit" => emit = true,
            "--config" => match args.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => return Err("--config needs a file".to_string()),
            },
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{flag}'")),
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => return Err(format!("Unexpected argument '{arg}'")),
        }
    }

    let input = input.ok_or_else(|| "Missing input file".to_string())?;
    Ok(Args { input, emit, config })
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig, String> {
    let config = match path {
        Some(path) => EditorConfig::load(path),
        None => EditorConfig::from_env(),
    };
    config.map_err(|e| e.to_string())
}

fn print_machine(machine: &StateMachine, depth: usize) {
    let indent = "  ".repeat(depth + 1);
    println!();
    println!("{indent}State machine: {}", machine.name);
    println!("{indent}States: {}", machine.states().count());
    for state in machine.states() {
        let mut flags = Vec::new();
        if state.initial {
            flags.push("initial");
        }
        if state.terminal {
            flags.push("terminal");
        }
        if flags.is_empty() {
            println!("{indent}  - {}", state.name);
        } else {
            println!("{indent}  - {} ({})", state.name, flags.join(", "));
        }
    }

    let transitions = machine
        .states()
        .flat_map(|state| state.transitions())
        .collect::<Vec<_>>();
    println!("{indent}Transitions: {}", transitions.len());
    for t in transitions {
        println!("{indent}  {} --> {} : {}", t.source, t.target, t.label());
    }

    for nested in machine.state_machines() {
        print_machine(nested, depth + 1);
    }
}

fn main() -> ExitCode {
    env_logger::init();

    if env::args().len() < 2 {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("❌ {}", e);
            print_usage();
            return ExitCode::from(2);
        }
    };

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::from(2);
        }
    };

    let description = match load_file(&args.input) {
        Ok(description) => description,
        Err(e) => {
            eprintln!("❌ Could not load '{}': {}", args.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut session = EditorSession::new(config);
    let machines = match session.from_collaborative_statemachine_description(&description) {
        Ok(machines) => machines,
        Err(e) => {
            eprintln!("❌ Import error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "✅ Loaded '{}' v{} with {} state machine(s):",
        session.name,
        session.version,
        machines.len()
    );
    for machine in &machines {
        print_machine(machine, 0);
    }

    match session.infer_event_edges() {
        Ok(links) => {
            println!();
            println!("Event links: {}", links.len());
            for edge in session.edges() {
                if let EdgeKind::EventLink { event } = &edge.kind {
                    let name = |id| session.node(id).map(|node| node.name.as_str()).unwrap_or("?");
                    println!("  {} ~~> {} : {}", name(edge.source), name(edge.target), event);
                }
            }
        }
        Err(e) => eprintln!("❌ Event inference failed: {}", e),
    }

    let mut status = ExitCode::SUCCESS;
    match session.to_collaborative_state_machine() {
        Ok(csm) => {
            if let Err(problems) = csm.validate() {
                println!();
                println!("❌ {} validation problem(s):", problems.len());
                for problem in &problems {
                    println!("  - {}", problem);
                }
                status = ExitCode::FAILURE;
            }
        }
        Err(e) => {
            eprintln!("❌ Export error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if args.emit {
        match session.to_pkl() {
            Ok(pkl) => {
                println!();
                print!("{}", pkl);
            }
            Err(e) => {
                eprintln!("❌ Emit error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    status
}
