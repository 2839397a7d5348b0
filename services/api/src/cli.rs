use crate::batch::run_evaluate;
use crate::server;
use clap::{Args, Parser, Subcommand, ValueEnum};
use record_analytic::config::AnalyticOptions;
use record_analytic::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "record-analytic",
    about = "Evaluate predictive models against records over HTTP or from files",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate a CSV or JSON-lines file and print one JSON result per line
    Evaluate(EvaluateArgs),
}

/// Overrides for the `ANALYTIC_*` settings.
#[derive(Args, Debug, Default)]
pub(crate) struct AnalyticArgs {
    /// Name of the model to select from the document
    #[arg(long)]
    pub(crate) model_name: Option<String>,
    /// Location of the model document (path, file: or file:// URI)
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Input field mapping, e.g. `Sepal.Length,Sepal.Width` or `len:Petal.Length`
    #[arg(long)]
    pub(crate) input_mapping: Option<String>,
    /// Output field mapping, e.g. `predictedValue:label`
    #[arg(long)]
    pub(crate) output_mapping: Option<String>,
}

impl AnalyticArgs {
    pub(crate) fn apply(&self, options: &mut AnalyticOptions) {
        if let Some(model_name) = &self.model_name {
            options.model_name = Some(model_name.clone());
        }
        if let Some(location) = &self.location {
            options.location = Some(location.clone());
        }
        if let Some(mapping) = &self.input_mapping {
            options.input_field_mapping = Some(mapping.clone());
        }
        if let Some(mapping) = &self.output_mapping {
            options.output_field_mapping = Some(mapping.clone());
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) analytic: AnalyticArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum InputFormat {
    Csv,
    Jsonl,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// File holding the records to evaluate
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Record format; inferred from the file extension when omitted
    #[arg(long, value_enum)]
    pub(crate) format: Option<InputFormat>,
    #[command(flatten)]
    pub(crate) analytic: AnalyticArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
    }
}
