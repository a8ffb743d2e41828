//! ShiftFlux CLI - Command-line interface for the ShiftFlux engine
//!
//! Commands:
//! - process: Run shift records through the pipeline
//! - cards: Report which calculation card each flow class and role resolves to
//! - doctor: Diagnose configuration and card coverage
//! - schema: Print input, output and configuration schemas

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use shiftflux::cards::{
    BucketSums, CardLookup, CardRegistry, FlowCardTable, FlowClass, JobOverheadSource,
    JOB_INIT_CARD_ID,
};
use shiftflux::config::EngineConfig;
use shiftflux::pipeline::{parse_records, process_records};
use shiftflux::types::{
    ActivityObject, EngineOutput, EngineWarning, ShiftRecord, TaskObject, TaskRole,
};
use shiftflux::{EngineError, PRODUCER_NAME, SHIFTFLUX_VERSION};

/// ShiftFlux - Warehouse task normalization and engineered labor standards
#[derive(Parser)]
#[command(name = "shiftflux")]
#[command(version = SHIFTFLUX_VERSION)]
#[command(about = "Turn warehouse shift records into tasks, activities and labor standards", long_about = None)]
struct Cli {
    /// Log pipeline stages to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run shift records through the pipeline
    Process {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Calculation card registry (JSON array or object keyed by id)
        #[arg(short, long)]
        cards: PathBuf,

        /// Engine configuration file (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Report card resolution for every flow class and role
    Cards {
        /// Calculation card registry
        #[arg(short, long)]
        cards: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and card coverage
    Doctor {
        /// Check a calculation card registry
        #[arg(long)]
        cards: Option<PathBuf>,

        /// Check an engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (tasks, then activities, then warnings)
    Ndjson,
    /// Single JSON document
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Shift record input
    Input,
    /// Engine output
    Output,
    /// Engine configuration
    Config,
    /// Calculation card registry
    Cards,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so stdout stays pure JSON
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "shiftflux=debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), ShiftCliError> {
    match cli.command {
        Commands::Process {
            input,
            cards,
            config,
            output,
            input_format,
            output_format,
        } => cmd_process(
            &input,
            &cards,
            config.as_deref(),
            &output,
            input_format,
            output_format,
        ),
        Commands::Cards { cards, json } => cmd_cards(&cards, json),
        Commands::Doctor { cards, config, json } => {
            cmd_doctor(cards.as_deref(), config.as_deref(), json)
        }
        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_process(
    input: &Path,
    cards: &Path,
    config: Option<&Path>,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), ShiftCliError> {
    // Read input
    let input_data = read_input(input)?;

    let records = match input_format {
        InputFormat::Ndjson => parse_ndjson(&input_data)?,
        InputFormat::Json => parse_records(&input_data)?,
    };

    if records.is_empty() {
        return Err(ShiftCliError::NoRecords);
    }

    let registry = load_registry(cards)?;
    let config = match config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };

    let result = process_records(&records, &config, &registry);
    tracing::info!(
        run_id = %result.run_id,
        tasks = result.tasks.len(),
        activities = result.activities.len(),
        warnings = result.warnings.len(),
        "processed shift records"
    );

    // Write output
    let output_data = format_output(&result, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_cards(cards: &Path, json: bool) -> Result<(), ShiftCliError> {
    let registry = load_registry(cards)?;
    let report = coverage_report(&registry);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Card Coverage");
    println!("=============");
    println!("Cards loaded:  {}", report.cards_loaded);
    println!(
        "Shared {} card: {}",
        JOB_INIT_CARD_ID,
        if report.has_job_init { "present" } else { "absent" }
    );
    println!();
    for entry in &report.entries {
        let resolved = match entry.status {
            ResolutionStatus::Found => entry.card_id.clone(),
            ResolutionStatus::GenericFallback => format!(
                "{} (fallback: {})",
                entry.card_id,
                entry.resolved_card_id.as_deref().unwrap_or("-")
            ),
            ResolutionStatus::Missing => format!("{} (missing)", entry.card_id),
        };
        let overhead = match (entry.job_overhead, entry.job_overhead_source) {
            (Some(seconds), Some(source)) => format!("{:.1}s via {:?}", seconds, source),
            _ => "-".to_string(),
        };
        println!(
            "  {:<10} {:<8} {:<40} job overhead: {}",
            format!("{:?}", entry.flow_class),
            entry.role.as_str(),
            resolved,
            overhead
        );
    }

    Ok(())
}

fn cmd_doctor(
    cards: Option<&Path>,
    config: Option<&Path>,
    json: bool,
) -> Result<(), ShiftCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "shiftflux_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("ShiftFlux version {}", SHIFTFLUX_VERSION),
    });

    // Check configuration file if provided
    if let Some(config_path) = config {
        let check = match fs::read_to_string(config_path) {
            Ok(content) => match EngineConfig::from_json(&content) {
                Ok(config) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid (tolerance {}s, break {}s, {} job type mappings)",
                        config.smoothing_tolerance_sec,
                        config.break_threshold_sec,
                        config.job_type_map.len()
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read config file: {}", e),
            },
        };
        checks.push(check);
    }

    // Check card registry if provided
    if let Some(cards_path) = cards {
        match fs::read_to_string(cards_path)
            .map_err(ShiftCliError::from)
            .and_then(|content| CardRegistry::from_json(&content).map_err(ShiftCliError::from))
        {
            Ok(registry) => {
                let report = coverage_report(&registry);
                let missing = report
                    .entries
                    .iter()
                    .filter(|e| e.flow_class != FlowClass::Generic)
                    .filter(|e| matches!(e.status, ResolutionStatus::Missing))
                    .count();
                let fallback = report
                    .entries
                    .iter()
                    .filter(|e| matches!(e.status, ResolutionStatus::GenericFallback))
                    .count();

                checks.push(DoctorCheck {
                    name: "cards".to_string(),
                    status: if missing > 0 { CheckStatus::Warning } else { CheckStatus::Ok },
                    message: format!(
                        "{} cards loaded; {} flow-class roles missing, {} on generic fallback",
                        report.cards_loaded, missing, fallback
                    ),
                });
                checks.push(DoctorCheck {
                    name: "job_init".to_string(),
                    status: if report.has_job_init { CheckStatus::Ok } else { CheckStatus::Warning },
                    message: if report.has_job_init {
                        format!("Shared {} card present", JOB_INIT_CARD_ID)
                    } else {
                        format!("No shared {} card; cards must carry Job Overhead", JOB_INIT_CARD_ID)
                    },
                });
            }
            Err(e) => checks.push(DoctorCheck {
                name: "cards".to_string(),
                status: CheckStatus::Error,
                message: CliError::from(e).message,
            }),
        }
    }

    // Check whether stdin can feed `process --input -`
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for --input -)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: SHIFTFLUX_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("ShiftFlux Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(ShiftCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), ShiftCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input: array of shift records (PascalCase fields)");
                println!();
                println!("- User, Client, Warehouse, WaveCode, JobCode: string (default \"\")");
                println!("- JobType: flow-class acronym, remapped through job_type_map");
                println!("- OrderCode, TaskType, SKU, Zone, Location: string (default \"\")");
                println!("- Quantity: number (default 0)");
                println!("- Start, Finish: RFC 3339 timestamps (required)");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output: {{ run_id, tasks, activities, warnings }}");
                println!();
                println!("- tasks: input fields plus Kind, Role, FlowClass, durations,");
                println!("  batch/cluster provenance, Flags and the seven Standard*Sec fields");
                println!("- activities: contiguous (User, JobCode, Kind) blocks with counts,");
                println!("  duration sums and StandardSec");
                println!("- warnings: unknown_flow_class, card_not_found,");
                println!("  generic_card_fallback, job_overhead_missing");
            }
        }
        SchemaType::Config => {
            if json_schema {
                println!("{}", get_config_json_schema());
            } else {
                let defaults = EngineConfig::default();
                println!("Engine configuration (snake_case JSON, every field optional)");
                println!();
                println!("- smoothing_tolerance_sec: {}", defaults.smoothing_tolerance_sec);
                println!("- break_threshold_sec: {}", defaults.break_threshold_sec);
                println!("- max_gap_sec: {}", defaults.max_gap_sec);
                println!("- picking_direct_ratio: {}", defaults.picking_direct_ratio);
                println!("- job_type_map: {{ JobType: acronym }}");
                println!("- shift_starts: {{ User: timestamp }}");
            }
        }
        SchemaType::Cards => {
            if json_schema {
                println!("{}", get_cards_json_schema());
            } else {
                println!("Card registry: array of cards, or object keyed by card id");
                println!();
                println!("- id: <role>_<flow>, e.g. picking_micp, packing_putwall, sorting_duration");
                println!("- activities: [{{ name, bucket, default_sec, target_sec? }}]");
                println!("- bucket: Job Overhead, Activity Overhead, Location Based, SKU Base,");
                println!("  Line Based, Order Base, Unit Variable, or any label containing \"travel\"");
                println!("- {}: shared card with per-role job overhead activities", JOB_INIT_CARD_ID);
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, ShiftCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_registry(path: &Path) -> Result<CardRegistry, ShiftCliError> {
    let content = fs::read_to_string(path)?;
    Ok(CardRegistry::from_json(&content)?)
}

fn parse_ndjson(data: &str) -> Result<Vec<ShiftRecord>, ShiftCliError> {
    let mut records = Vec::new();
    for (index, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: ShiftRecord = serde_json::from_str(trimmed).map_err(|e| {
            ShiftCliError::ParseError(format!("Line {}: failed to parse record: {}", index + 1, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

#[derive(serde::Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
enum OutputLine<'a> {
    Task(&'a TaskObject),
    Activity(&'a ActivityObject),
    Warning(&'a EngineWarning),
}

fn format_output(result: &EngineOutput, format: &OutputFormat) -> Result<String, ShiftCliError> {
    match format {
        OutputFormat::Ndjson => {
            let lines = result
                .tasks
                .iter()
                .map(OutputLine::Task)
                .chain(result.activities.iter().map(OutputLine::Activity))
                .chain(result.warnings.iter().map(OutputLine::Warning))
                .map(|line| serde_json::to_string(&line))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(result)?),
    }
}

fn coverage_report(registry: &CardRegistry) -> CoverageReport {
    let table = FlowCardTable::build(registry);
    let mut entries = Vec::new();

    for flow_class in FlowClass::ALL {
        for role in TaskRole::ALL {
            let card_id = flow_class.card_id(role);
            let lookup = table.lookup(flow_class, role);
            let status = match lookup {
                CardLookup::Found(_) => ResolutionStatus::Found,
                CardLookup::GenericFallback { .. } => ResolutionStatus::GenericFallback,
                CardLookup::Missing { .. } => ResolutionStatus::Missing,
            };
            let card = lookup.card();

            entries.push(CoverageEntry {
                flow_class,
                role,
                card_id,
                status,
                resolved_card_id: card.map(|c| c.card_id.clone()),
                job_overhead: card.map(|c| c.job_overhead),
                job_overhead_source: card.map(|c| c.job_overhead_source),
                process: card.map(|c| c.process),
                travel: card.map(|c| c.travel),
            });
        }
    }

    CoverageReport {
        cards_loaded: registry.len(),
        has_job_init: registry.get(JOB_INIT_CARD_ID).is_some(),
        entries,
    }
}

fn get_input_json_schema() -> String {
    let text = serde_json::json!({ "type": "string" });
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "shiftflux.shift_records",
        "description": "Validated shift records",
        "type": "array",
        "items": {
            "type": "object",
            "required": ["Start", "Finish"],
            "properties": {
                "User": text,
                "Client": text,
                "Warehouse": text,
                "WaveCode": text,
                "JobCode": text,
                "JobType": text,
                "OrderCode": text,
                "TaskType": text,
                "SKU": text,
                "Quantity": { "type": "number", "minimum": 0 },
                "Zone": text,
                "Location": text,
                "Start": { "type": "string", "format": "date-time" },
                "Finish": { "type": "string", "format": "date-time" }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "shiftflux.output",
        "description": "ShiftFlux engine output",
        "type": "object",
        "required": ["run_id", "tasks", "activities", "warnings"],
        "properties": {
            "run_id": { "type": "string", "format": "uuid" },
            "tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "Kind": { "enum": ["Work", "NoActivity", "Break"] },
                        "Role": { "enum": ["Picking", "Sorting", "Packing", null] },
                        "ProductiveDurationSec": { "type": "number" },
                        "UnproductiveDurationSec": { "type": "number" },
                        "TaskDirectTimeSec": { "type": "number" },
                        "TaskTravelTimeSec": { "type": "number" },
                        "StandardPickingInitSec": { "type": "number" },
                        "StandardPickingProcessSec": { "type": "number" },
                        "StandardPickingTravelSec": { "type": "number" },
                        "StandardSortingInitSec": { "type": "number" },
                        "StandardSortingProcessSec": { "type": "number" },
                        "StandardPackingInitSec": { "type": "number" },
                        "StandardPackingProcessSec": { "type": "number" },
                        "ProductiveDurationStandardSec": { "type": "number" }
                    }
                }
            },
            "activities": { "type": "array", "items": { "type": "object" } },
            "warnings": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["warning"],
                    "properties": {
                        "warning": {
                            "enum": [
                                "unknown_flow_class",
                                "card_not_found",
                                "generic_card_fallback",
                                "job_overhead_missing"
                            ]
                        }
                    }
                }
            }
        }
    })
    .to_string()
}

fn get_config_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "shiftflux.config",
        "type": "object",
        "properties": {
            "smoothing_tolerance_sec": { "type": "number", "minimum": 0 },
            "break_threshold_sec": { "type": "number", "minimum": 0 },
            "max_gap_sec": { "type": "number", "minimum": 0 },
            "picking_direct_ratio": { "type": "number", "minimum": 0, "maximum": 1 },
            "job_type_map": { "type": "object", "additionalProperties": { "type": "string" } },
            "shift_starts": {
                "type": "object",
                "additionalProperties": { "type": "string", "format": "date-time" }
            }
        }
    })
    .to_string()
}

fn get_cards_json_schema() -> String {
    let card = serde_json::json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "name": { "type": "string" },
            "activities": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "bucket"],
                    "properties": {
                        "name": { "type": "string" },
                        "bucket": { "type": "string" },
                        "default_sec": { "type": "number", "minimum": 0 },
                        "target_sec": { "type": "number", "minimum": 0 }
                    }
                }
            }
        }
    });
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "shiftflux.cards",
        "oneOf": [
            { "type": "array", "items": card },
            { "type": "object", "additionalProperties": card }
        ]
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum ShiftCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    NoRecords,
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for ShiftCliError {
    fn from(e: io::Error) -> Self {
        ShiftCliError::Io(e)
    }
}

impl From<EngineError> for ShiftCliError {
    fn from(e: EngineError) -> Self {
        ShiftCliError::Engine(e)
    }
}

impl From<serde_json::Error> for ShiftCliError {
    fn from(e: serde_json::Error) -> Self {
        ShiftCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ShiftCliError> for CliError {
    fn from(e: ShiftCliError) -> Self {
        match e {
            ShiftCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ShiftCliError::Engine(e) => {
                let (code, hint) = match e {
                    EngineError::InvalidConfig(_) => ("CONFIG_ERROR", "Run 'shiftflux schema config' for valid fields"),
                    EngineError::InvalidCard(_) => ("CARD_ERROR", "Run 'shiftflux schema cards' for the card format"),
                    EngineError::NothingToReprocess => ("NOTHING_TO_REPROCESS", "Process records before reprocessing"),
                    EngineError::ParseError(_) | EngineError::JsonError(_) => {
                        ("PARSE_ERROR", "Ensure input matches 'shiftflux schema input'")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            ShiftCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ShiftCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No shift records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            ShiftCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            ShiftCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct CoverageReport {
    cards_loaded: usize,
    has_job_init: bool,
    entries: Vec<CoverageEntry>,
}

#[derive(serde::Serialize)]
struct CoverageEntry {
    flow_class: FlowClass,
    role: TaskRole,
    card_id: String,
    status: ResolutionStatus,
    resolved_card_id: Option<String>,
    job_overhead: Option<f64>,
    job_overhead_source: Option<JobOverheadSource>,
    process: Option<BucketSums>,
    travel: Option<BucketSums>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "snake_case")]
enum ResolutionStatus {
    Found,
    GenericFallback,
    Missing,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
