use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use schemaform::{FieldNode, FormOptions, FormShell, Locale};
use schemaform_state::{FieldError, Op, Patch, Path, SelfHealing, Value};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "schemaform", about = "Replay form edits against a JSON Schema and validate the result")]
struct Args {
    /// JSON Schema file; its root type must be `object` or `array`.
    #[arg(long, env = "SCHEMAFORM_SCHEMA")]
    schema: PathBuf,

    /// Initial document. Defaults to `{}`.
    #[arg(long)]
    value: Option<PathBuf>,

    /// Edit script: a JSON array of operations such as
    /// `{"op": "set", "path": ["user", "name"], "value": "Alice"}`.
    #[arg(long)]
    edits: Option<PathBuf>,

    /// Apply the whole edit script as one transition.
    #[arg(long)]
    batch: bool,

    /// Buffer changes until submit instead of notifying per edit.
    #[arg(long)]
    submit_buffering: bool,

    #[arg(long, default_value = "en_US")]
    locale: Locale,

    /// Dotted path the form is rooted at, e.g. `payload.form`.
    #[arg(long, default_value = "")]
    data_path: Path,

    #[arg(long, value_enum, default_value_t = HealingArg::Parent)]
    self_healing: HealingArg,

    /// Include the headless render tree in the output.
    #[arg(long)]
    render: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HealingArg {
    Parent,
    Ancestors,
}

impl From<HealingArg> for SelfHealing {
    fn from(value: HealingArg) -> Self {
        match value {
            HealingArg::Parent => SelfHealing::Parent,
            HealingArg::Ancestors => SelfHealing::Ancestors,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    valid: bool,
    value: Value,
    errors: Vec<FieldError>,
    notifications: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    submit_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<FieldNode>,
}

fn read_json(path: &std::path::Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {} as JSON", path.display()))
}

fn run(args: Args) -> Result<Report> {
    let schema = read_json(&args.schema)?;
    let value = args.value.as_deref().map(read_json).transpose()?;
    let edits: Vec<Op> = match args.edits.as_deref() {
        Some(path) => serde_json::from_value(read_json(path)?)
            .with_context(|| format!("{} is not a list of edit operations", path.display()))?,
        None => Vec::new(),
    };

    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    let mut builder = FormShell::builder()
        .schema(schema)
        .options(FormOptions {
            data_path: args.data_path,
            enable_submit_buffering: args.submit_buffering,
            locale: args.locale,
            self_healing: args.self_healing.into(),
        })
        .on_change(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
    if let Some(value) = value {
        builder = builder.value(value);
    }
    let form = builder.build().context("failed to build form")?;

    if args.batch {
        form.controller()
            .apply(&Patch::with_ops(edits))
            .context("edit script rejected")?;
    } else {
        for (i, op) in edits.iter().enumerate() {
            debug!(index = i, op = op.name(), path = %op.path(), "applying edit");
            form.store()
                .apply_op(op)
                .with_context(|| format!("edit #{i} ({} at `{}`) rejected", op.name(), op.path()))?;
        }
    }

    let outcome = form.blur().context("validation failed to run")?;
    info!(valid = outcome.is_valid(), errors = outcome.errors().len(), "validated");

    Ok(Report {
        valid: outcome.is_valid(),
        value: form.submit(),
        errors: outcome.errors().to_vec(),
        notifications: notifications.load(Ordering::Relaxed),
        submit_label: form.submit_label(),
        tree: args.render.then(|| form.render()),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let report = run(args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.valid {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_json(td: &TempDir, name: &str, value: &Value) -> PathBuf {
        let path = td.path().join(name);
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn base_args(schema: PathBuf) -> Args {
        Args::parse_from(["schemaform", "--schema", schema.to_str().unwrap()])
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "user": {"type": "object", "required": ["name"]},
                "rows": {"type": "array", "items": {"type": "string"}}
            }
        })
    }

    #[test]
    fn test_flags_parse() {
        let parsed = Args::parse_from([
            "schemaform",
            "--schema",
            "s.json",
            "--locale",
            "zh_CN",
            "--data-path",
            "payload.items[0]",
            "--self-healing",
            "ancestors",
            "--submit-buffering",
        ]);
        assert_eq!(parsed.locale, Locale::ZhCn);
        assert_eq!(parsed.data_path.to_string(), "payload.items[0]");
        assert!(matches!(parsed.self_healing, HealingArg::Ancestors));
        assert!(parsed.submit_buffering);
        assert!(!parsed.batch);
    }

    #[test]
    fn test_edits_are_replayed_and_validated() {
        let td = TempDir::new().unwrap();
        let mut args = base_args(write_json(&td, "schema.json", &schema()));
        args.value = Some(write_json(&td, "value.json", &json!({"rows": ["a", "b"]})));
        args.edits = Some(write_json(
            &td,
            "edits.json",
            &json!([
                {"op": "move_item", "path": ["rows"], "from": 0, "to": 1},
                {"op": "set", "path": ["user", "name"], "value": "Alice"},
                {"op": "add_item", "path": ["rows"], "value": "c"}
            ]),
        ));

        let report = run(args).unwrap();
        assert!(report.valid);
        assert_eq!(report.value, json!({"rows": ["b", "a", "c"], "user": {"name": "Alice"}}));
        assert_eq!(report.notifications, 3);
        assert!(report.tree.is_none());
    }

    #[test]
    fn test_invalid_document_is_reported() {
        let td = TempDir::new().unwrap();
        let mut args = base_args(write_json(&td, "schema.json", &schema()));
        args.value = Some(write_json(&td, "value.json", &json!({"user": {}})));
        args.render = true;

        let report = run(args).unwrap();
        assert!(!report.valid);
        assert_eq!(report.errors[0].path.to_string(), "user.name");
        assert!(report.tree.unwrap().find(&"user".parse().unwrap()).unwrap().has_errors());
    }

    #[test]
    fn test_batch_and_buffering() {
        let td = TempDir::new().unwrap();
        let mut args = base_args(write_json(&td, "schema.json", &schema()));
        args.batch = true;
        args.edits = Some(write_json(
            &td,
            "edits.json",
            &json!([
                {"op": "set", "path": ["rows"], "value": []},
                {"op": "add_item", "path": ["rows"], "value": "x"}
            ]),
        ));
        let report = run(args).unwrap();
        assert_eq!(report.notifications, 1);
        assert_eq!(report.submit_label, None);

        let mut args = base_args(write_json(&td, "schema2.json", &schema()));
        args.submit_buffering = true;
        args.edits = Some(write_json(
            &td,
            "edits2.json",
            &json!([{"op": "set", "path": ["rows"], "value": []}]),
        ));
        let report = run(args).unwrap();
        assert_eq!(report.notifications, 0);
        assert_eq!(report.submit_label, Some("Submit"));
    }

    #[test]
    fn test_data_path_scopes_validation() {
        let td = TempDir::new().unwrap();
        let mut args = base_args(write_json(&td, "schema.json", &schema()));
        args.data_path = "payload".parse().unwrap();
        args.value = Some(write_json(&td, "value.json", &json!({"payload": {"user": {}}})));

        let report = run(args).unwrap();
        assert!(!report.valid);
        assert_eq!(report.errors[0].path.to_string(), "payload.user.name");

        let mut args = base_args(write_json(&td, "schema.json", &schema()));
        args.data_path = "payload".parse().unwrap();
        args.value = Some(write_json(
            &td,
            "value2.json",
            &json!({"payload": {"user": {"name": "Alice"}}}),
        ));
        assert!(run(args).unwrap().valid);
    }

    #[test]
    fn test_rejected_edit_is_an_error() {
        let td = TempDir::new().unwrap();
        let mut args = base_args(write_json(&td, "schema.json", &schema()));
        args.edits = Some(write_json(
            &td,
            "edits.json",
            &json!([{"op": "remove_item", "path": ["rows"], "index": 0}]),
        ));
        let err = run(args).unwrap_err();
        assert!(err.to_string().contains("edit #0"));
    }

    #[test]
    fn test_unsupported_root_type() {
        let td = TempDir::new().unwrap();
        let args = base_args(write_json(&td, "schema.json", &json!({"type": "string"})));
        let err = run(args).unwrap_err();
        assert!(format!("{err:#}").contains("unsupported root schema type"));
    }
}
