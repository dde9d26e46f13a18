mod render;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use easylp_lang::{CompileError, CompiledProblem, compile_source};
use easylp_solver::{Sense, SolutionStatus, SolveReport, Solver};
use env_logger::Builder;

#[derive(Parser)]
#[command(name = "easylp", version)]
#[command(about = "Step-by-step tableau Simplex for easy-form linear programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a problem file and output the AST
    Parse {
        /// The file to parse
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Solve every problem in a file
    Solve {
        /// The file containing the problems
        file: PathBuf,
        /// Print every tableau along the way
        #[arg(short, long)]
        trace: bool,
        /// Wait for Enter between problems
        #[arg(short, long)]
        pause: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Pivot budget per problem (default: 20 per variable and constraint)
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Values within this distance of zero count as zero
        #[arg(long, default_value_t = 1e-9, value_parser = parse_tolerance)]
        tolerance: f64,
    },
    /// Check a problem file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let succeeded = match cli.command {
        Commands::Parse { file, format } => parse(&file, format)?,
        Commands::Solve {
            file,
            trace,
            pause,
            format,
            max_iterations,
            tolerance,
        } => {
            let mut solver = Solver::new().with_tolerance(tolerance);
            if let Some(max) = max_iterations {
                solver = solver.with_max_iterations(max);
            }
            let options = SolveOptions { trace, pause, format };
            solve(&file, &solver, &options)?
        }
        Commands::Check { file } => check(&file)?,
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

/// A tolerance must be a finite, non-negative number
fn parse_tolerance(text: &str) -> Result<f64, String> {
    let value: f64 = text
        .parse()
        .map_err(|_| format!("'{}' is not a number", text))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("tolerance must be finite and >= 0, got {}", text));
    }
    Ok(value)
}

fn read_source(file: &Path) -> Result<String> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Error reading file {}", file.display()))?;
    log::info!("read {} bytes from {}", source.len(), file.display());
    Ok(source)
}

fn parse(file: &Path, format: Format) -> Result<bool> {
    let source = read_source(file)?;
    let results = easylp_lang::Parser::parse_each(&source);

    match format {
        Format::Json => {
            let mut entries = Vec::with_capacity(results.len());
            for result in &results {
                entries.push(match result {
                    Ok(problem) => serde_json::to_value(problem)?,
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                });
            }
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Format::Pretty => {
            for result in &results {
                match result {
                    Ok(problem) => println!("{:#?}", problem),
                    Err(e) => eprintln!("Parse error: {}", e),
                }
            }
        }
    }

    Ok(results.iter().any(|r| r.is_ok()))
}

struct SolveOptions {
    trace: bool,
    pause: bool,
    format: Format,
}

fn solve(file: &Path, solver: &Solver, options: &SolveOptions) -> Result<bool> {
    let source = read_source(file)?;
    let results = compile_source(&source);
    if results.is_empty() {
        eprintln!("No problems found in {}", file.display());
        return Ok(false);
    }

    let mut solved = 0;
    let mut json = Vec::new();

    for (i, compiled) in results.iter().enumerate() {
        if options.pause && i > 0 {
            wait_for_enter()?;
        }

        let outcome = compiled
            .as_ref()
            .map_err(|e| e.to_string())
            .and_then(|c| solver.solve(&c.lp_problem).map_err(|e| e.to_string()));
        if outcome.is_ok() {
            solved += 1;
        }

        match options.format {
            Format::Pretty => print_problem(i + 1, compiled, &outcome, options.trace),
            Format::Json => {
                let mut entry = serde_json::Map::new();
                if let Ok(c) = compiled {
                    entry.insert("heading".into(), c.heading().into());
                    entry.insert("line".into(), c.line.into());
                }
                match &outcome {
                    Ok(report) => {
                        entry.insert("status".into(), report.solution.status.to_string().into());
                        entry.insert("solution".into(), serde_json::to_value(&report.solution)?);
                        if options.trace {
                            entry.insert("trace".into(), serde_json::to_value(&report.trace)?);
                        }
                    }
                    Err(e) => {
                        entry.insert("error".into(), e.clone().into());
                    }
                }
                json.push(serde_json::Value::Object(entry));
            }
        }
    }

    if options.format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&json)?);
    }

    log::info!("{} of {} problems solved", solved, results.len());
    Ok(solved > 0)
}

fn print_problem(
    number: usize,
    compiled: &Result<CompiledProblem, CompileError>,
    outcome: &Result<SolveReport, String>,
    trace: bool,
) {
    println!("Problem {}", number);

    let compiled = match compiled {
        Ok(c) => c,
        Err(_) => {
            if let Err(e) = outcome {
                eprintln!("Error: {}", e);
            }
            println!();
            return;
        }
    };

    println!("{}", compiled.heading());
    println!("Subject to:");
    for constraint in &compiled.constraint_sources {
        println!("  {}", constraint);
    }
    println!();

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            println!();
            return;
        }
    };

    if trace {
        for snapshot in &report.trace {
            match &snapshot.pivot {
                None => println!("Initial tableau"),
                Some(record) => println!(
                    "Iteration {}: {}",
                    snapshot.iteration,
                    render::pivot_caption(record, &snapshot.columns)
                ),
            }
            println!("{}", render::tableau(snapshot, &compiled.objective_name));
            println!(
                "{}",
                render::vertex(snapshot, &compiled.objective_name, compiled.sense)
            );
            println!();
        }
    }

    let solution = &report.solution;
    let z = &compiled.objective_name;
    println!("Status: {}", solution.status);

    match solution.status {
        SolutionStatus::Unbounded => {
            let direction = match compiled.sense {
                Sense::Maximize => "increase",
                Sense::Minimize => "decrease",
            };
            match &solution.unbounded_variable {
                Some(var) => println!(
                    "{} can {} without bound as {} grows.",
                    z, direction, var
                ),
                None => println!("{} can {} without bound.", z, direction),
            }
        }
        SolutionStatus::OptimalUnique | SolutionStatus::OptimalAlternate => {
            println!(
                "{} = {} at {}",
                z,
                render::number(solution.objective_value),
                render::point(&solution.values)
            );
            if solution.degenerate {
                println!("The optimal vertex is degenerate (a basic variable is 0).");
            }
            if solution.status == SolutionStatus::OptimalAlternate {
                match &solution.alternative {
                    Some(other) => {
                        println!("Another optimal vertex: {}", render::point(other));
                        println!(
                            "Every point t·{} + (1 - t)·{} with 0 <= t <= 1 is optimal.",
                            render::tuple(&solution.values),
                            render::tuple(other)
                        );
                    }
                    None => println!("Other vertices reach the same objective value."),
                }
            }

            let prices: Vec<String> = solution
                .analysis
                .shadow_prices
                .iter()
                .map(|sp| format!("{} = {}", sp.constraint, render::number(sp.value)))
                .collect();
            if !prices.is_empty() {
                println!("Shadow prices: {}", prices.join(", "));
            }
            if !solution.analysis.binding_constraints.is_empty() {
                println!(
                    "Binding constraints: {}",
                    solution.analysis.binding_constraints.join(", ")
                );
            }
        }
    }
    println!();
}

fn wait_for_enter() -> Result<()> {
    eprint!("Press Enter to continue...");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Error reading from stdin")?;
    Ok(())
}

fn check(file: &Path) -> Result<bool> {
    let source = read_source(file)?;
    let results = compile_source(&source);

    let mut valid = 0;
    for result in &results {
        match result {
            Ok(compiled) => {
                valid += 1;
                println!(
                    "✓ line {}: {} ({} variables, {} constraints)",
                    compiled.line,
                    compiled.heading(),
                    compiled.lp_problem.num_variables(),
                    compiled.lp_problem.num_constraints()
                );
            }
            Err(e) => eprintln!("✗ {}", e),
        }
    }

    println!(
        "{}: {} of {} problems valid",
        file.display(),
        valid,
        results.len()
    );
    Ok(valid > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_must_be_finite_and_non_negative() {
        assert_eq!(parse_tolerance("1e-6"), Ok(1e-6));
        assert_eq!(parse_tolerance("0"), Ok(0.0));
        assert!(parse_tolerance("-1e-9").is_err());
        assert!(parse_tolerance("NaN").is_err());
        assert!(parse_tolerance("inf").is_err());
        assert!(parse_tolerance("tiny").is_err());
    }

    #[test]
    fn test_cli_rejects_negative_tolerance() {
        let args = ["easylp", "solve", "lp.txt", "--tolerance", "-1"];
        assert!(Cli::try_parse_from(args).is_err());

        let args = ["easylp", "solve", "lp.txt", "--tolerance", "0.001"];
        match Cli::try_parse_from(args).map(|cli| cli.command) {
            Ok(Commands::Solve { tolerance, .. }) => assert_eq!(tolerance, 0.001),
            _ => panic!("Expected a solve command"),
        }
    }
}
