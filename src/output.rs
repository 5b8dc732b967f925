//! Shared output formatting for taskboard CLI commands.

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "taskboard.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Plain-text rendering of a command result.
///
/// ```text
/// Task created
///   ID      task-1
///   Column  todo
///
///   task-1 [todo] Write docs
///
/// warning: column 'review' embeds 2 task(s); they are ignored
/// ```
#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    title: String,
    fields: Vec<(String, String)>,
    lines: Vec<String>,
    warnings: Vec<String>,
}

impl HumanOutput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Key/value line under the title. An empty value prints the key alone.
    pub fn field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// Free-form listing line (a task, a column, a change).
    pub fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.warnings.push(text.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|human| human.warnings.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
            #[serde(skip_serializing_if = "Option::is_none")]
            hint: Option<&'a str>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
                kind: err.kind(),
                details: err.details(),
            },
            hint,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut out = output.title.clone();

    let width = output
        .fields
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);
    for (key, value) in &output.fields {
        let line = format!("  {key:<width$}  {value}");
        out.push('\n');
        out.push_str(line.trim_end());
    }

    if !output.lines.is_empty() {
        out.push('\n');
        for line in &output.lines {
            out.push_str("\n  ");
            out.push_str(line);
        }
    }

    if !output.warnings.is_empty() {
        out.push('\n');
        for warning in &output.warnings {
            out.push_str("\nwarning: ");
            out.push_str(warning);
        }
    }

    out
}

pub fn infer_command_name_from_args() -> String {
    let mut raw = std::env::args().skip(1);
    let mut positional = Vec::new();
    while let Some(arg) = raw.next() {
        if arg == "--config" || arg == "--author" {
            raw.next();
            continue;
        }
        if !arg.starts_with('-') {
            positional.push(arg);
        }
    }
    let mut args = positional.into_iter();

    let command = match args.next() {
        Some(cmd) => cmd,
        None => return "taskboard".to_string(),
    };

    if matches!(command.as_str(), "task" | "board") {
        if let Some(sub) = args.next() {
            return format!("{command} {sub}");
        }
    }
    command
}

fn error_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::NotFound(_) | Error::TaskNotFound(_) => Some("taskboard task list"),
        Error::InvalidConfig(_) => Some("fix the board config front matter then retry"),
        Error::InvalidRecord(_) => Some("the file needs `---` front matter with id and title"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_human_aligns_fields() {
        let mut human = HumanOutput::new("Task created");
        human.field("ID", "task-1");
        human.field("Column", "todo");
        human.field("Archived", "");
        human.line("todo (1)");
        human.warning("duplicate column");

        assert_eq!(
            format_human(&human),
            "Task created\n  ID        task-1\n  Column    todo\n  Archived\n\n  todo (1)\n\nwarning: duplicate column"
        );
    }

    #[test]
    fn title_only_output() {
        assert_eq!(format_human(&HumanOutput::new("Done")), "Done");
    }
}
