//! `computorv2` command-line entry point: an interactive REPL with no
//! arguments, or a one-shot evaluation of a single expression.

mod repl;

use std::process::ExitCode;

use clap::Parser;

use computorv2_core::value::Environment;
use computorv2_core::{process, Outcome};

/// An interactive mathematical interpreter: exact rational, complex, and
/// matrix arithmetic, symbolic polynomial simplification, and degree <= 2
/// equation solving.
#[derive(Parser, Debug)]
#[command(name = "computorv2", version, about)]
struct Cli {
    /// A single expression or statement to evaluate, e.g. `"2 + 3 * 4"`.
    /// With no argument, starts the interactive REPL.
    expr: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.expr {
        Some(line) => run_one_shot(&line),
        None => match repl::run() {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_one_shot(line: &str) -> ExitCode {
    let mut env = Environment::new();
    match process(line, &mut env) {
        Ok(Outcome::Bound { name, value }) => {
            println!("{name} = {value}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Value(value)) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Solved(result)) => {
            print_solve_result(&result);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
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
