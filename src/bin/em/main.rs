//! # Em
//!
//! The interpreter binary for the M language. It wires a runtime with the
//! standard operators and built-ins, then feeds it code from `-c`, source
//! files, a pipe, or the interactive prompt.

mod cli;
mod repl;

use std::fs;
use std::io::{IsTerminal, Read};
use std::process::ExitCode;

use anyhow::Context;
use log::{debug, error};
use m_lang::ops;
use m_lang::runtime::{ExecError, Runtime};

use cli::Cli;

fn main() -> ExitCode {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Cli) -> anyhow::Result<ExitCode> {
    let mut runtime = Runtime::new();
    ops::install(&mut runtime);
    runtime.set_disasm(args.disasm);

    if let Some(code) = &args.code {
        return Ok(exit_code(execute(&mut runtime, "<command-line>", code)));
    }

    if !args.files.is_empty() {
        for path in &args.files {
            let source = fs::read_to_string(path)
                .with_context(|| format!("could not read '{}'", path.display()))?;
            let name = path.display().to_string();
            if !execute(&mut runtime, &name, &source) {
                return Ok(ExitCode::FAILURE);
            }
        }
        if args.interactive {
            repl::run(&mut runtime)?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    if args.interactive || stdin_is_tty() {
        repl::run(&mut runtime)?;
        Ok(ExitCode::SUCCESS)
    } else {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("<stdin>")?;
        Ok(exit_code(execute(&mut runtime, "<stdin>", &source)))
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn stdin_is_tty() -> bool {
    if !std::io::stdin().is_terminal() {
        return false;
    }
    match std::env::var("TERM") {
        Ok(term) => !term.is_empty() && term != "dumb",
        Err(_) => false,
    }
}

/// Run one source to completion, reporting errors the non-interactive way.
fn execute(runtime: &mut Runtime, name: &str, source: &str) -> bool {
    debug!("executing {name}");
    match runtime.execute(name, source) {
        Ok(()) => true,
        Err(ExecError::Compile(err)) => {
            match err.line_col(source) {
                Some((line, col)) => eprintln!("{name}:{line}:{col}: {}", err.message),
                None => eprintln!("{name}: {}", err.message),
            }
            false
        }
        // the VM already printed the message and back-trace
        Err(ExecError::Runtime(_)) => false,
    }
}
