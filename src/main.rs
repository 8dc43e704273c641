use std::path::PathBuf;
use std::process;

use clap::Parser;

use moebius::diagnostics::{self, Diagnostic};
use moebius::grammar::{parse_program, SynValue};
use moebius::interpreter;
use moebius::parser::Outcome;
use moebius::source::Source;

#[derive(Debug, Parser)]
#[command(
    name = "moebius",
    version,
    about = "Parser and evaluator for the Moebius expression language."
)]
struct Args {
    /// Path to a Moebius source file.
    #[arg(required_unless_present = "eval")]
    file: Option<PathBuf>,

    /// Inline source text instead of a file.
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "file")]
    eval: Option<String>,
}

fn load_source(args: &Args) -> anyhow::Result<Source> {
    if let Some(text) = &args.eval {
        return Ok(Source::inline(text.clone()));
    }
    if let Some(path) = &args.file {
        return Ok(Source::open(path)?);
    }
    anyhow::bail!("no input: pass a file or --eval");
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let source = load_source(&args)?;

    let report = parse_program(&source);
    match report.outcome {
        Outcome::Success => {}
        Outcome::Failure => {
            eprintln!("failure");
            process::exit(1);
        }
        Outcome::Error => {
            if let Some(diagnostic) = &report.diagnostic {
                diagnostics::render_stderr(diagnostic, &source)?;
            }
            process::exit(1);
        }
    }

    let Some(SynValue::Expr(expr)) = report.value else {
        eprintln!("failure");
        process::exit(1);
    };

    match interpreter::run(&expr) {
        Ok(value) => println!("{value}"),
        Err(error) => {
            let diagnostic = Diagnostic::new(error.span().start, error.to_string());
            diagnostics::render_stderr(&diagnostic, &source)?;
            process::exit(1);
        }
    }

    Ok(())
}
