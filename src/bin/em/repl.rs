//! The interactive prompt. Each line is one execution against the shared
//! session runtime, so globals accumulate from line to line.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use m_lang::compiler::ParseError;
use m_lang::runtime::{ExecError, Runtime};

const PROMPT: &str = "≈≈> ";

pub fn run(runtime: &mut Runtime) -> io::Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            eprintln!();
            return Ok(());
        }

        match runtime.execute("<stdin>", &line) {
            Ok(()) => {}
            Err(ExecError::Compile(err)) => report(&line, &err),
            // message and back-trace are already on stderr
            Err(ExecError::Runtime(_)) => {}
        }
    }
}

/// Echo the offending line and draw a caret under the bad token.
fn report(line: &str, err: &ParseError) {
    let Some(span) = &err.span else {
        eprintln!("{}", err.message);
        return;
    };
    let start = span.offset;
    let end = (span.offset + span.len).max(start + 1);
    let marker = format!("{}^{}", " ".repeat(start), "~".repeat(end - start - 1));
    eprintln!("> {}", line.trim_end_matches('\n'));
    eprintln!("  {} {}", marker.red(), err.message);
}
