//! Interactive read-eval-print loop, built on `rustyline` for line editing
//! and persistent history.

use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use computorv2_core::value::Environment;
use computorv2_core::{process, Outcome};

fn history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".computorv2_history"))
}

/// Run the interactive REPL until `exit` or end-of-input.
pub fn run() -> rustyline::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let history = history_path();
    if let Some(path) = &history {
        // A missing or unreadable history file is not fatal: start empty.
        let _ = editor.load_history(path);
    }

    let mut env = Environment::new();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "exit" {
                    break;
                }
                let _ = editor.add_history_entry(trimmed);
                match process(trimmed, &mut env) {
                    Ok(outcome) => print_outcome(&outcome),
                    Err(err) => eprintln!("Error: {err}"),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    if let Some(path) = &history {
        let _ = editor.save_history(path);
    }
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Bound { name, value } => println!("{name} = {value}"),
        Outcome::Value(value) => println!("{value}"),
        Outcome::Solved(result) => print_solve_result(result),
    }
}

fn print_solve_result(result: &computorv2_core::solve::SolveResult) {
    use computorv2_core::solve::SolveResult;
    match result {
        SolveResult::Identity => println!("The equation is true for every value."),
        SolveResult::Contradiction => println!("The equation has no solution."),
        SolveResult::Linear(root) => println!("The solution is:\n{root}"),
        SolveResult::TwoReal(a, b) => println!("Discriminant is strictly positive, the two solutions are:\n{a}\n{b}"),
        SolveResult::RepeatedRoot(root) => println!("Discriminant is zero, the solution is:\n{root}"),
        SolveResult::TwoComplex(a, b) => println!("Discriminant is strictly negative, the two complex solutions are:\n{a}\n{b}"),
    }
}
