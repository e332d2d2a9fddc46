use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tugen::{chain, generate, DescriptionLoader, StateNaming};

/// Generates Turing machine descriptions.
///
/// Without a subcommand, reads one line of space-separated symbols from stdin and prints
/// a machine that copies the symbol under the head one cell to the left.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  echo '0 1' | tugen
  echo 'a b' | tugen --naming symbol > copy.tu
  tugen chain first.tu copy.tu --output both.tu
  tugen check both.tu")]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,

    /// How per-symbol states are named: `index` (q0, q1, ...) or `symbol` (q_, qa, ...)
    #[clap(short, long, default_value_t = StateNaming::Index, global = true)]
    naming: StateNaming,

    /// Log more details to stderr (repeat for more)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Read symbols from stdin and print the copy-left machine (the default)
    Generate,
    /// Combine two description files into one that runs them in sequence
    Chain {
        /// The description that runs first
        first: PathBuf,
        /// The description that runs second; its file name prefixes clashing states
        second: PathBuf,
        /// Where to write the combined description
        #[clap(short, long)]
        output: PathBuf,
    },
    /// Parse and validate a description file
    Check {
        /// The description file to check
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        None | Some(Command::Generate) => {
            run_generate(&mut io::stdin().lock(), &mut io::stdout().lock(), cli.naming)?
        }
        Some(Command::Chain {
            first,
            second,
            output,
        }) => println!("{}", run_chain(&first, &second, &output)?),
        Some(Command::Check { file }) => println!("{}", run_check(&file)?),
    }

    Ok(())
}

/// Logs go to stderr so that stdout carries nothing but the description.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Reads a single line from `input` and writes the generated description to `output`.
///
/// A missing line is the same as an empty one.
fn run_generate<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    naming: StateNaming,
) -> Result<()> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read symbols from stdin")?;
    debug!(bytes = read, "Read input line");

    output
        .write_all(generate(&line, naming).as_bytes())
        .context("failed to write description")?;
    output.flush().context("failed to write description")?;

    Ok(())
}

fn run_chain(first: &Path, second: &Path, output: &Path) -> Result<String> {
    let first_description = DescriptionLoader::load_description(first)
        .with_context(|| format!("failed to load {}", first.display()))?;
    let second_description = DescriptionLoader::load_description(second)
        .with_context(|| format!("failed to load {}", second.display()))?;

    let prefix = DescriptionLoader::machine_name(second);
    info!(prefix = %prefix, "Chaining descriptions");

    let chained = chain(&first_description, &second_description, &prefix);
    DescriptionLoader::save_description(&chained, output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    Ok(format!(
        "Wrote new turing machine to '{}'.",
        output.display()
    ))
}

fn run_check(file: &Path) -> Result<String> {
    let description = DescriptionLoader::load_description(file)
        .with_context(|| format!("failed to load {}", file.display()))?;

    Ok(format!(
        "{}: {} states, {} symbols, {} transitions",
        file.display(),
        description.states.len(),
        description.symbols.len(),
        description.table.len()
    ))
}
