// ABOUTME: CLI front-end: argument parsing, file evaluation, AOT emission, and the REPL

use clap::Parser;
use paren::aot::{self, EmitKind};
use paren::config::{WELCOME_FOOTER, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use paren::kernel;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;

const HISTORY_FILE: &str = ".paren_history";

/// A small Lisp-family interpreter
#[derive(Parser, Debug)]
#[command(name = "paren")]
#[command(version = paren::config::VERSION)]
#[command(about = "A small Lisp-family interpreter")]
struct CliArgs {
    /// Source file to evaluate (omit to start the REPL)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Switch to ahead-of-time emission mode instead of evaluating
    #[arg(short = 'c', long = "compile")]
    compile: bool,

    /// Output path for AOT emission (`-` for standard output)
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: String,

    /// File to import before evaluation (repeatable)
    #[arg(short = 'i', long = "import", value_name = "FILE", action = clap::ArgAction::Append)]
    imports: Vec<PathBuf>,

    /// Emit an LLVM IR driver (AOT mode)
    #[arg(long = "emit-llvm", conflicts_with = "emit_asm")]
    emit_llvm: bool,

    /// Emit an assembly driver (AOT mode)
    #[arg(long = "emit-asm")]
    emit_asm: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    if args.compile {
        return run_aot(&args);
    }

    let kernel = kernel::init();
    for path in &args.imports {
        kernel.import(&path.to_string_lossy());
    }

    match &args.input {
        Some(path) => {
            let src = std::fs::read_to_string(path)?;
            kernel.eval_str(&src);
            Ok(())
        }
        None => run_repl(),
    }
}

fn run_aot(args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let Some(input) = &args.input else {
        return Err("compile mode requires an input file".into());
    };
    let src = std::fs::read_to_string(input)?;
    let kind = match (args.emit_llvm, args.emit_asm) {
        (_, true) => EmitKind::Asm,
        _ => EmitKind::Llvm,
    };
    let driver = aot::emit(&src, kind);

    if args.output == "-" {
        print!("{driver}");
    } else {
        std::fs::write(&args.output, driver)?;
    }
    Ok(())
}

fn run_repl() -> Result<(), Box<dyn std::error::Error>> {
    let kernel = kernel::init();

    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<()> = Editor::with_config(config)?;
    let _ = rl.load_history(HISTORY_FILE);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");
    println!("{WELCOME_FOOTER}");

    let mut buffer = String::new();
    let mut unclosed: i64 = 0;

    loop {
        let prompt = if unclosed > 0 { "... " } else { "paren> " };
        match rl.readline(prompt) {
            Ok(line) => {
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                let ts = paren::tokenizer::tokenize(&buffer);
                unclosed = ts.unclosed;
                if unclosed > 0 {
                    continue;
                }
                if buffer.trim().is_empty() {
                    buffer.clear();
                    unclosed = 0;
                    continue;
                }

                for form in kernel.read(&buffer) {
                    let compiled = kernel.compile(&form);
                    let result = paren::eval::eval(&compiled, &kernel.env);
                    println!("{} : {}", result, result.type_name());
                }
                buffer.clear();
                unclosed = 0;
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                unclosed = 0;
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}
