use clap::{Parser as ClapParser, Subcommand};
use prepper_expression::cli::{self, CheckOptions, CheckResult, CliError, RouteOptions};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "prepper")]
#[command(about = "Prepper - evaluate event conditions and route records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and evaluate a statement against one JSON event
    Check {
        /// The statement to evaluate
        statement: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Print the parsed expression tree
        #[arg(long)]
        tree: bool,
    },

    /// Route newline-delimited JSON records through a route file
    Route {
        /// Path to a JSON route file
        #[arg(short, long)]
        routes: String,

        /// Records (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'prepper docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            statement,
            input,
            pretty,
            syntax_only,
            tree,
        } => run_check(statement, input, pretty, syntax_only, tree),
        Commands::Route {
            routes,
            input,
            pretty,
        } => run_route(routes, input, pretty),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Use the explicit input, or stdin when something is piped in
fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    println!("{}", json);
    Ok(())
}

fn run_check(
    statement: String,
    input: Option<String>,
    pretty: bool,
    syntax_only: bool,
    tree: bool,
) -> Result<(), CliError> {
    let input = if syntax_only { input } else { read_input(input)? };

    let options = CheckOptions {
        statement,
        input,
        syntax_only,
        tree,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid { tree } => {
            if let Some(tree) = tree {
                print!("{}", tree);
            }
            println!("Syntax is valid");
        }
        CheckResult::Success { result, tree } => {
            if let Some(tree) = tree {
                print!("{}", tree);
            }
            print_json(&result, pretty)?;
        }
    }
    Ok(())
}

fn run_route(routes_path: String, input: Option<String>, pretty: bool) -> Result<(), CliError> {
    let routes = std::fs::read_to_string(&routes_path)?;
    let input = read_input(input)?;

    let output = cli::execute_route(&RouteOptions { routes, input })?;
    print_json(&output, pretty)
}
