use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use dialoguer::{BasicHistory, Input};
use nix::unistd::Pid;
use tracing::{error, info, trace};

use uefiload::addr::Addr;
use uefiload::command::{self, CommandSet};
use uefiload::errors::Result;
use uefiload::feedback::Feedback;
use uefiload::host::dump::DumpHost;
use uefiload::host::process::ProcessHost;
use uefiload::host::DebuggerHost;

/// Locate a UEFI payload in memory and generate the LLDB commands that
/// attach its debug symbols
///
/// Scans backward from a reference address (a literal or a register of the
/// target process) until it finds the PE magic marker, then prints the
/// 'target symbols add', 'target modules load --slide' and 'expr' commands
/// that map the symbols and release the payload's spin-wait. The target is
/// either a live process or a raw memory image captured from the virtual
/// machine.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about,
    group = ArgGroup::new("target").required(true).args(["pid", "dump"])
)]
struct Args {
    /// Attach to a live process
    #[arg(short, long)]
    pid: Option<i32>,

    /// Scan a raw memory image instead of a live process
    #[arg(short, long)]
    dump: Option<PathBuf>,

    /// Address the first byte of the memory image maps to (decimal or 0x-hex)
    #[arg(long, default_value = "0", value_parser = parse_address, requires = "dump")]
    offset: usize,

    /// Run a single command line and exit, e.g. 'uefi load-symbols $rip'
    #[arg(short, long)]
    command: Option<String>,

    /// Print results as JSON
    #[arg(short, long)]
    json: bool,

    /// Write the generated debugger commands to this file, ready for 'lldb -s'
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    human_panic::setup_panic!();
    setup_logger();

    let args = Args::parse();

    if let Some(pid) = args.pid {
        run(ProcessHost::attach(Pid::from_raw(pid))?, &args)
    } else if let Some(dump) = &args.dump {
        run(DumpHost::open(dump, Addr::from(args.offset))?, &args)
    } else {
        unreachable!() // clap requires one of the two
    }
}

fn run<H: DebuggerHost>(mut host: H, args: &Args) -> Result<()> {
    let mut set: CommandSet<H> = CommandSet::new();
    command::register(&mut set)?;

    let mut script: Vec<String> = Vec::new();
    if let Some(line) = &args.command {
        let feedback = set.dispatch(&mut host, line)?;
        emit(&feedback, args.json);
        script.extend(host.drain_script());
    } else {
        repl(&mut host, &set, args, &mut script)?;
    }

    if let Some(out) = &args.out {
        if script.is_empty() {
            info!("no debugger commands were generated, not writing {}", out.display());
        } else {
            std::fs::write(out, script.join("\n") + "\n")?;
            info!("wrote {} commands to {}", script.len(), out.display());
        }
    }

    Ok(())
}

fn repl<H: DebuggerHost>(
    host: &mut H,
    set: &CommandSet<H>,
    args: &Args,
    script: &mut Vec<String>,
) -> Result<()> {
    let mut history = BasicHistory::new().max_entries(32).no_duplicates(true);

    loop {
        let line: String = match Input::<String>::new()
            .with_prompt("(uefiload)")
            .history_with(&mut history)
            .interact_text()
        {
            Ok(line) => line,
            Err(e) => {
                error!("could not read a command line: {e}");
                break;
            }
        };

        let Some(tokens) = shlex::split(&line) else {
            error!("could not tokenize the command line");
            continue;
        };
        match tokens.first().map(String::as_str) {
            None => continue,
            Some("quit" | "exit" | "q") => break,
            Some("help" | "h") => {
                help();
                continue;
            }
            _ => {}
        }
        trace!("dispatching: {tokens:?}");

        let feedback: Feedback = set.dispatch(host, &tokens.join(" ")).into();
        emit(&feedback, args.json);
        script.extend(host.drain_script());
    }

    Ok(())
}

fn emit(feedback: &Feedback, json: bool) {
    if json {
        let value = match feedback {
            Feedback::Plan(plan) => serde_json::json!({ "feedback": plan }),
            other => serde_json::json!({ "feedback": other.to_string() }),
        };
        println!("{value}");
    } else {
        println!("{feedback}");
    }
}

fn help() {
    println!("commands:");
    println!("  uefi load-symbols <address-or-$register> [wait-variable] [binary-path] [symbols-path]");
    println!("  help");
    println!("  quit");
}

fn parse_address(s: &str) -> std::result::Result<usize, String> {
    let res = if let Some(hex) = s.strip_prefix("0x") {
        usize::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    res.map_err(|e| format!("'{s}' is not an address: {e}"))
}

fn setup_logger() {
    // construct a subscriber that prints formatted traces to stdout
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_file(false)
        .with_target(false)
        .finish();
    // use that subscriber to process traces emitted after this point
    tracing::subscriber::set_global_default(subscriber).expect("could not setup logger");
    trace!("set up the logger");
}
