use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser as ClapParser, Subcommand};
use layerfilter::{
    Dialect, FilterConfig,
    cli::{self, CheckOptions, CheckResult, CliError, ConvertOptions, SqlOptions},
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "layerfilter")]
#[command(about = "Parse map-layer filter expressions, compile them to SQL/CQL or test them against JSON records")]
#[command(version)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// TOML config with dialect, table, field map and variables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a filter against a JSON record or collection
    Check {
        /// The filter expression
        expression: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Session variable as name=value (repeatable)
        #[arg(long = "var")]
        vars: Vec<String>,

        /// Pretty-print selected records
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,
    },

    /// Print the WHERE fragment for a filter
    Sql {
        expression: String,

        /// SQL or CQL (overrides the config)
        #[arg(short, long)]
        dialect: Option<Dialect>,

        /// Table name handed to spatial clauses (overrides the config)
        #[arg(short, long)]
        table: Option<String>,

        /// Session variable as name=value (repeatable)
        #[arg(long = "var")]
        vars: Vec<String>,
    },

    /// List the fields a filter references
    Fields { expression: String },

    /// Dump the parsed tree
    Tree { expression: String },

    /// Turn a {type, operator, operands} description into an expression
    Convert {
        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Fail on unknown parts instead of replacing them with true
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = FilterConfig::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            expression,
            input,
            vars,
            pretty,
            syntax_only,
        } => {
            let options = CheckOptions {
                expression,
                input: if syntax_only { input } else { read_input(input)? },
                variables: cli::session_variables(&config, &vars)?,
                syntax_only,
            };
            match cli::execute_check(&options)? {
                CheckResult::SyntaxValid => println!("Syntax is valid"),
                CheckResult::Matched(matched) => println!("{}", matched),
                CheckResult::Selected(records) => {
                    let records = serde_json::Value::Array(records);
                    let json = if pretty {
                        serde_json::to_string_pretty(&records)?
                    } else {
                        serde_json::to_string(&records)?
                    };
                    println!("{}", json);
                }
            }
        }
        Commands::Sql {
            expression,
            dialect,
            table,
            vars,
        } => {
            let variables = cli::session_variables(&config, &vars)?;
            let output = cli::execute_sql(&SqlOptions {
                expression,
                dialect,
                table,
                config,
                variables,
            })?;
            println!("{}", output.sql);
            if !output.params.is_empty() {
                println!("{}", serde_json::Value::Object(output.params));
            }
        }
        Commands::Fields { expression } => {
            for name in cli::execute_fields(&expression)? {
                println!("{}", name);
            }
        }
        Commands::Tree { expression } => print!("{}", cli::execute_tree(&expression)?),
        Commands::Convert { input, strict } => {
            let options = ConvertOptions {
                input: read_input(input)?,
                strict,
            };
            println!("{}", cli::execute_convert(&options)?);
        }
    }
    Ok(())
}

/// Falls back to stdin when it is piped.
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
