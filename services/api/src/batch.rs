use crate::cli::{EvaluateArgs, InputFormat};
use crate::infra::{build_analytic, RecordAnalytic};
use record_analytic::analytic::{FieldValue, Record};
use record_analytic::config::AppConfig;
use record_analytic::error::AppError;
use record_analytic::telemetry;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BatchSummary {
    pub(crate) evaluated: usize,
    pub(crate) failed: usize,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    args.analytic.apply(&mut config.analytic);
    telemetry::init(&config.telemetry)?;

    let analytic = build_analytic(&config.analytic)?;
    info!(%analytic, input = %args.input.display(), "evaluating records");

    let format = args
        .format
        .unwrap_or_else(|| InputFormat::from_path(&args.input));
    let file = File::open(&args.input)?;
    let records = read_records(BufReader::new(file), format)?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let summary = evaluate_records(&analytic, records, &mut writer)?;
    writer.flush()?;

    eprintln!(
        "evaluated {} record(s), {} failed",
        summary.evaluated, summary.failed
    );
    Ok(())
}

/// Lazily decoded records; a malformed row surfaces as an `Input` error when it is reached.
pub(crate) type RecordStream<'r> = Box<dyn Iterator<Item = Result<Record, AppError>> + 'r>;

pub(crate) fn read_records<'r, R: Read + 'r>(
    reader: R,
    format: InputFormat,
) -> Result<RecordStream<'r>, AppError> {
    match format {
        InputFormat::Csv => read_csv(reader),
        InputFormat::Jsonl => Ok(read_json_lines(reader)),
    }
}

/// Header row names the fields; every cell is kept as a string and empty cells are absent.
fn read_csv<'r, R: Read + 'r>(reader: R) -> Result<RecordStream<'r>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|err| AppError::Input(format!("unable to read CSV header: {err}")))?
        .clone();

    let rows = reader
        .into_records()
        .enumerate()
        .map(move |(line, row)| -> Result<Record, AppError> {
            let row =
                row.map_err(|err| AppError::Input(format!("CSV row {}: {err}", line + 1)))?;
            Ok(headers
                .iter()
                .zip(row.iter())
                .map(|(name, cell)| {
                    let value = if cell.is_empty() {
                        FieldValue::Absent
                    } else {
                        FieldValue::Present(Value::String(cell.to_string()))
                    };
                    (name.to_string(), value)
                })
                .collect())
        });
    Ok(Box::new(rows))
}

fn read_json_lines<'r, R: Read + 'r>(reader: R) -> RecordStream<'r> {
    let lines = BufReader::new(reader)
        .lines()
        .enumerate()
        .filter(|(_, line)| !matches!(line, Ok(text) if text.trim().is_empty()))
        .map(|(index, line)| -> Result<Record, AppError> {
            let line = line?;
            serde_json::from_str::<Record>(&line)
                .map_err(|err| AppError::Input(format!("line {}: {err}", index + 1)))
        });
    Box::new(lines)
}

/// Writes one JSON result per line as records arrive. Records that fail evaluation are logged
/// and skipped; a malformed record or a failing writer stops the run.
pub(crate) fn evaluate_records<I, W>(
    analytic: &RecordAnalytic,
    records: I,
    writer: &mut W,
) -> Result<BatchSummary, AppError>
where
    I: IntoIterator<Item = Result<Record, AppError>>,
    W: Write,
{
    let mut summary = BatchSummary::default();

    for (index, record) in records.into_iter().enumerate() {
        let record = record?;
        match analytic.evaluate(&record) {
            Ok(result) => {
                serde_json::to_writer(&mut *writer, &result).map_err(io::Error::from)?;
                writeln!(writer)?;
                summary.evaluated += 1;
            }
            Err(err) => {
                warn!(index, error = %err, "record evaluation failed");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

impl InputFormat {
    pub(crate) fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Jsonl,
        }
    }
}
