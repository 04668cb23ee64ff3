use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;

use phantasia::Error;
use phantasia::ast::Program;
use phantasia::ast::printer::TreeNode;
use phantasia::interpreter::{Interpreter, WriterSink};
use phantasia::parser;

/// Phantasia is a small dynamically typed scripting language. Without a
/// subcommand the program is read from stdin.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Print the syntax tree before running.
    #[arg(long, global = true)]
    show_ast: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program file, stopping at the first error.
    Run { file: PathBuf },
    /// Read and run one line at a time, echoing expression values.
    Repl,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("PHANTASIA_LOG", "warn"))
        .init();
    let args = Args::parse();

    match args.command {
        Some(Command::Run { file }) => {
            let source = fs::read_to_string(&file)
                .with_context(|| format!("Reading {}", file.display()))?;
            Ok(run_batch(&source, args.show_ast))
        }
        Some(Command::Repl) => {
            repl(args.show_ast)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Reading stdin")?;
            Ok(run_batch(&source, args.show_ast))
        }
    }
}

fn run_batch(source: &str, show_ast: bool) -> ExitCode {
    let result = parser::parse(source)
        .map_err(Error::from)
        .and_then(|program| {
            if show_ast {
                print_tree(&program);
            }
            let mut interpreter = Interpreter::new(WriterSink(io::stdout()));
            interpreter.run(&program).map_err(Error::from)
        });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn repl(show_ast: bool) -> Result<()> {
    let mut interpreter = Interpreter::new(WriterSink(io::stdout()));
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Flushing prompt")?;
        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Reading stdin")?;
        debug!("REPL line: {line:?}");

        let program = match parser::parse(&line) {
            Ok(program) => program,
            Err(error) => {
                eprintln!("{}", Error::from(error));
                continue;
            }
        };
        if show_ast {
            print_tree(&program);
        }
        if let Err(error) = interpreter.run_interactive(&program) {
            eprintln!("{}", Error::from(error));
        }
    }
    Ok(())
}

fn print_tree(program: &Program) {
    print!("{}", TreeNode::from(program));
}
