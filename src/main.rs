//! logos CLI: run, check and explore LOGOS-κ programs.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use logos_kappa::axioms::Axioms;
use logos_kappa::context::Context;
use logos_kappa::eval::{CycleOptions, Interpreter};
use logos_kappa::export::export_cycle;
use logos_kappa::parser::parse_program;
use logos_kappa::repl::Session;

#[derive(Parser)]
#[command(name = "logos", version, about = "LOGOS-κ interpreter")]
struct Cli {
    /// Axioms file (TOML) overriding the built-in limits and rules.
    #[arg(long, global = true)]
    axioms: Option<PathBuf>,

    /// Name of the graph context.
    #[arg(long, global = true, default_value = "default")]
    context: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a program file and print each result.
    Run {
        /// Path to the program.
        file: PathBuf,

        /// Operator identity recorded on grants and the cycle record.
        #[arg(long)]
        operator: Option<String>,

        /// Enable FAIR+CARE validation for this cycle.
        #[arg(long)]
        fair_care: bool,

        /// Write the cycle record as JSON to this path.
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Parse a program file and print its AST and intentions.
    Check {
        /// Path to the program.
        file: PathBuf,
    },

    /// Start an interactive session.
    Repl {
        /// Directory for cycles saved with `save_cycle`.
        #[arg(long, default_value = "cycles")]
        export_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let axioms = match &cli.axioms {
        Some(path) => Axioms::load(path)?,
        None => Axioms::default(),
    };

    match cli.command {
        Commands::Run {
            file,
            operator,
            fair_care,
            export,
        } => {
            let source = std::fs::read_to_string(&file).into_diagnostic()?;
            let program = parse_program(&source, &file.display().to_string(), &axioms)?;

            let context = Context::new(cli.context, axioms)?;
            let mut interp = Interpreter::new(context);
            let options = CycleOptions {
                operator_id: operator,
                fair_care,
            };
            let outcome = interp.eval_program(&program.expressions, &program.intentions, &options);

            for (i, result) in outcome.results.iter().enumerate() {
                println!("{:3}. {result}", i + 1);
            }
            println!(
                "\n{}/{} successful, coherence {:.3}",
                outcome.cycle.successful_evaluations,
                outcome.cycle.expressions_evaluated,
                outcome.cycle.final_coherence
            );

            if let Some(path) = export {
                export_cycle(&outcome.cycle, interp.context_mut(), &path)?;
                println!("Cycle written to {}", path.display());
            }
        }

        Commands::Check { file } => {
            let source = std::fs::read_to_string(&file).into_diagnostic()?;
            let program = parse_program(&source, &file.display().to_string(), &axioms)?;

            println!("{} expression(s):", program.expressions.len());
            for expr in &program.expressions {
                println!("  {}", expr.quoted());
            }
            if !program.intentions.is_empty() {
                println!("Intentions:");
                for intention in &program.intentions {
                    println!("  ;; {intention}");
                }
            }
        }

        Commands::Repl { export_dir } => {
            std::fs::create_dir_all(&export_dir).into_diagnostic()?;
            let context = Context::new(cli.context, axioms)?;
            let mut session = Session::new(Interpreter::new(context), export_dir);
            let stdin = io::stdin();
            session
                .run(stdin.lock(), &mut io::stdout())
                .into_diagnostic()?;
        }
    }

    Ok(())
}
