use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use formkit_engine::{ControlKind, FieldType, FormDocument, FormEngine, FormValues, parse_form_file};
use formkit_util::{expand_tilde, redact_values};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "formkit", version, about = "Check integration and MCP server settings forms")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply edits to a form document and report values and validation errors
    Check(CheckArgs),
    /// List the control each field renders as
    Describe(DocumentArgs),
}

#[derive(Args, Debug)]
struct DocumentArgs {
    /// Path to the form document (YAML or JSON)
    #[arg(env = "FORMKIT_DOCUMENT")]
    file: String,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    document: DocumentArgs,
    /// Field edit in `id=value` form; applied in order
    #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_assignment)]
    assignments: Vec<(String, String)>,
    /// Build the form read-only; any --set is rejected
    #[arg(long)]
    disabled: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Check(args) => run_check(args),
        Command::Describe(args) => run_describe(args).map(|_| ExitCode::SUCCESS),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_document(args: &DocumentArgs) -> Result<FormDocument> {
    let path = expand_tilde(&args.file);
    let document = parse_form_file(&path)?;
    info!(path = %path.display(), fields = document.fields.len(), "Loaded form document");
    Ok(document)
}

fn run_check(args: CheckArgs) -> Result<ExitCode> {
    let document = load_document(&args.document)?;
    let mut form = FormEngine::new(
        document.fields.clone(),
        &document.values,
        !args.disabled,
        |values: &FormValues, is_valid: bool| debug!(fields = values.len(), is_valid, "Form changed"),
    )?;

    for (id, raw) in &args.assignments {
        apply_assignment(&mut form, id, raw).with_context(|| format!("Failed to apply --set {}={}", id, raw))?;
    }

    let is_valid = form.validate_all();
    let values = redact_values(&document.fields, form.values());

    if args.json {
        let report = serde_json::json!({
            "title": document.title,
            "valid": is_valid,
            "values": values,
            "errors": form.errors(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(title) = &document.title {
            println!("{}", title);
        }
        for field in form.fields() {
            let rendered = values.get(&field.id).map(|value| value.to_string()).unwrap_or_else(|| "<unset>".to_string());
            match form.error(&field.id) {
                Some(error) => println!("  {} = {}  ✗ {}", field.id, rendered, error),
                None => println!("  {} = {}", field.id, rendered),
            }
        }
        println!("{}", if is_valid { "valid" } else { "invalid" });
    }

    Ok(if is_valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn run_describe(args: DocumentArgs) -> Result<()> {
    let document = load_document(&args)?;
    let form = FormEngine::without_listener(document.fields, &document.values)?;
    if let Some(title) = &document.title {
        println!("{}", title);
    }
    for control in form.controls() {
        let marker = if control.required_marker { "*" } else { "" };
        let detail = match &control.kind {
            ControlKind::TextEntry { input_mode } => format!("text/{:?}", input_mode).to_lowercase(),
            ControlKind::Dropdown { options, .. } => {
                let labels: Vec<&str> = options.iter().map(|option| option.label.as_str()).collect();
                format!("dropdown [{}]", labels.join(", "))
            }
            ControlKind::UnsupportedNotice { field_type } => format!("unsupported field type '{}'", field_type),
            other => other.name().to_string(),
        };
        println!("  {}{}  ({})", control.label, marker, detail);
        if let Some(description) = &control.description {
            println!("      {}", description);
        }
    }
    Ok(())
}

/// Applies one `--set` edit through the control the field renders as.
fn apply_assignment(form: &mut FormEngine, id: &str, raw: &str) -> Result<()> {
    let field = form.field(id).cloned().with_context(|| format!("Unknown field '{}'", id))?;
    match &field.field_type {
        FieldType::Boolean => {
            let checked = parse_flag(raw).with_context(|| format!("Expected true or false for '{}'", id))?;
            form.set_checked(id, checked)?;
        }
        FieldType::Select => {
            let by_label = field.options.iter().position(|option| option.label.eq_ignore_ascii_case(raw));
            match by_label {
                Some(index) => form.select_option(id, index)?,
                None => form.select_value(id, &serde_json::Value::String(raw.to_string()))?,
            }
        }
        _ => form.set_text(id, raw)?,
    }
    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let Some((id, value)) = raw.split_once('=') else {
        bail!("expected ID=VALUE, got '{}'", raw);
    };
    let id = id.trim();
    if id.is_empty() {
        bail!("field id cannot be empty in '{}'", raw);
    }
    Ok((id.to_string(), value.to_string()))
}
