//! Interactive shell.
//!
//! Reads one command per line and runs it against the open store. The
//! command word is case-insensitive and may be abbreviated (`a`, `l`, ...).
//! Errors are reported and the loop continues; `exit`, `quit` or EOF ends it.

use std::io::{self, BufRead, Write};

use clap::{CommandFactory, Parser};

use crate::cli::{report_load, TaskCommand};
use crate::error::{Error, Result};
use crate::output::{emit_error, OutputOptions};
use crate::store::{LoadReport, TaskStore};

/// One line typed at the prompt
#[derive(Parser, Debug)]
#[command(name = "todo", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: TaskCommand,
}

const PROMPT: &str = ">> ";

/// Run the shell until `exit` or end of input
pub fn run(
    store: &mut TaskStore,
    report: &LoadReport,
    options: OutputOptions,
    mut input: impl BufRead,
) -> Result<()> {
    let interactive = !options.json && !options.quiet;

    report_load(store, report);
    if interactive {
        println!(
            "todo {} - type 'help' for commands, 'exit' to quit",
            env!("CARGO_PKG_VERSION")
        );
        let overdue = store.overdue_count();
        if overdue > 0 {
            println!("You have {overdue} overdue task(s); see 'list --due'");
        }
    }

    let mut line = String::new();
    loop {
        if interactive {
            print!("{PROMPT}");
            io::stdout().flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            if interactive {
                println!();
            }
            break;
        }

        let mut args = match split_line(line.trim()) {
            Ok(args) => args,
            Err(err) => {
                emit_error("shell", &err, options.json)?;
                continue;
            }
        };
        if args.is_empty() {
            continue;
        }
        args[0] = args[0].to_lowercase();

        match args[0].as_str() {
            "exit" | "quit" => break,
            "help" | "h" if args.len() == 1 => {
                println!("{}", ShellLine::command().render_help());
                continue;
            }
            _ => {}
        }

        match ShellLine::try_parse_from(&args) {
            Ok(parsed) => {
                let name = parsed.command.name();
                if let Err(err) = super::task::run(store, parsed.command, options) {
                    emit_error(name, &err, options.json)?;
                }
            }
            Err(err) => {
                let _ = err.print();
            }
        }
    }

    Ok(())
}

/// Split a command line into words. Single or double quotes group words.
pub fn split_line(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(Error::Validation("unterminated quote".to_string()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
