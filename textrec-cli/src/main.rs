use anyhow::Result;
use clap::{Parser, Subcommand};
use textrec_cli::{commands, Profile};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "textrec")]
#[command(about = "Textrec - Read, convert and pack text records", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read records with one format and write them with another
    Convert {
        /// Input file, `-` for stdin
        #[arg(short, long)]
        input: String,

        /// Output file, `-` for stdout
        #[arg(short, long)]
        output: String,

        /// JSON file with the spec of the input
        #[arg(long)]
        read_spec: String,

        /// JSON file with the spec of the output
        #[arg(long)]
        write_spec: String,
    },

    /// Pack records of any shape into container records
    Pack {
        /// Input file, `-` for stdin
        #[arg(short, long)]
        input: String,

        /// Output file, `-` for stdout
        #[arg(short, long)]
        output: String,

        /// JSON file with the spec of the input
        #[arg(long)]
        read_spec: String,

        /// JSON file with the spec of the packed output
        #[arg(long)]
        write_spec: String,

        /// Container metadata to carry
        #[arg(long, value_enum, default_value = "medium")]
        profile: Profile,
    },

    /// Restore records from container records
    Unpack {
        /// Input file with packed records, `-` for stdin
        #[arg(short, long)]
        input: String,

        /// Output file, `-` for stdout
        #[arg(short, long)]
        output: String,

        /// JSON file with the spec of the packed input
        #[arg(long)]
        read_spec: String,

        /// JSON file with the spec of the output
        #[arg(long)]
        write_spec: String,

        /// Container metadata the input carries
        #[arg(long, value_enum, default_value = "medium")]
        profile: Profile,

        /// Fail on the first record that cannot be fully unpacked
        #[arg(long)]
        strict: bool,

        /// Write the unpack counts as JSON to this file
        #[arg(long)]
        summary_json: Option<String>,
    },

    /// Print records and the ignored raw data of a file
    Inspect {
        /// Input file, `-` for stdin
        #[arg(short, long)]
        input: String,

        /// JSON file with the spec of the input
        #[arg(long)]
        read_spec: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            read_spec,
            write_spec,
        } => commands::convert::execute(&input, &output, &read_spec, &write_spec),

        Commands::Pack {
            input,
            output,
            read_spec,
            write_spec,
            profile,
        } => commands::pack::execute(&input, &output, &read_spec, &write_spec, profile),

        Commands::Unpack {
            input,
            output,
            read_spec,
            write_spec,
            profile,
            strict,
            summary_json,
        } => commands::unpack::execute(
            &input,
            &output,
            &read_spec,
            &write_spec,
            profile,
            strict,
            summary_json.as_deref(),
        )
        .map(|_| ()),

        Commands::Inspect { input, read_spec } => {
            commands::inspect::execute(&input, &read_spec).map(|_| ())
        }
    }
}
