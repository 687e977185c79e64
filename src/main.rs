#![allow(unused_assignments)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};

use formexpr::{ExprError, ExprResult, Form, State};

/// Form Expression Engine
///
/// Evaluate and inspect the condition and default-value expressions embedded
/// in form definitions.
#[derive(Parser)]
#[command(name = "formexpr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a condition and print true or false
    Condition {
        /// Condition, e.g. "{status} icontains 'yes'"
        expr: String,

        #[command(flatten)]
        state: StateArgs,

        /// Treat any skipped input as an error (the condition becomes false)
        #[arg(long)]
        strict: bool,
    },

    /// Evaluate a default-value expression and print the result as JSON
    Value {
        /// Expression, e.g. "'Hi ' + {first}"
        expr: String,

        #[command(flatten)]
        state: StateArgs,

        /// Treat any skipped input as an error (the text is passed through)
        #[arg(long)]
        strict: bool,
    },

    /// Parse an expression and print its canonical form and warnings
    Check {
        expr: String,

        /// Which language the expression is written in
        #[arg(long, value_enum, default_value = "condition")]
        lang: Lang,

        /// Fail on any skipped input
        #[arg(long)]
        strict: bool,
    },

    /// Tokenize an expression (debugging)
    Lex {
        expr: String,

        #[arg(long, value_enum, default_value = "condition")]
        lang: Lang,
    },

    /// Print the initial state seeded from a form's default values
    InitState {
        /// Form definition (.json, .yaml or .yml)
        form: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// List visible sections, or the visible fields of one section
    Visible {
        /// Form definition (.json, .yaml or .yml)
        form: PathBuf,

        #[command(flatten)]
        state: StateArgs,

        /// Section index to list fields for
        #[arg(long)]
        section: Option<usize>,
    },
}

#[derive(Args)]
struct StateArgs {
    /// Answers as a JSON or YAML object (format chosen by extension)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Set an answer (can be used multiple times)
    #[arg(long = "set", value_parser = parse_key_value)]
    set: Vec<(String, String)>,

    /// Set a multi-value answer from comma-separated items (applied after --set)
    #[arg(long = "set-list", value_parser = parse_key_value)]
    set_list: Vec<(String, String)>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Lang {
    Condition,
    Value,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

/// Parse a key=value pair
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=value: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn main() -> ExitCode {
    // Set up miette for nice error output
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))
    .ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Condition {
            expr,
            state,
            strict,
        } => cmd_condition(expr, state, strict),
        Commands::Value {
            expr,
            state,
            strict,
        } => cmd_value(expr, state, strict),
        Commands::Check { expr, lang, strict } => cmd_check(expr, lang, strict),
        Commands::Lex { expr, lang } => cmd_lex(expr, lang),
        Commands::InitState { form, format } => cmd_init_state(form, format),
        Commands::Visible {
            form,
            state,
            section,
        } => cmd_visible(form, state, section),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let exit_code = match &e {
                ExprError::IoError { .. } => ExitCode::from(3),
                _ => ExitCode::from(1),
            };
            eprintln!("{:?}", miette::Report::new(e));
            exit_code
        }
    }
}

fn evaluator(strict: bool) -> formexpr::Evaluator {
    let mut evaluator = formexpr::Evaluator::new();
    evaluator.set_strict(strict);
    evaluator
}

fn cmd_condition(expr: String, state: StateArgs, strict: bool) -> ExprResult<()> {
    let state = load_state(&state)?;
    println!("{}", evaluator(strict).condition(&expr, &state));
    Ok(())
}

fn cmd_value(expr: String, state: StateArgs, strict: bool) -> ExprResult<()> {
    let state = load_state(&state)?;
    let value = evaluator(strict).value(&expr, &state);
    println!("{}", value.to_serde_json());
    Ok(())
}

fn cmd_check(expr: String, lang: Lang, strict: bool) -> ExprResult<()> {
    let evaluator = evaluator(strict);

    let (tree, warnings) = match lang {
        Lang::Condition => {
            let report = evaluator.check_condition(&expr)?;
            (report.tree.to_string(), report.warnings)
        }
        Lang::Value => {
            let report = evaluator.check_value_expression(&expr)?;
            (report.tree.to_string(), report.warnings)
        }
    };

    println!("{}", tree);
    for w in &warnings {
        eprintln!("warning: {} (<expr>:{}:{})", w.message, w.line, w.column);
    }

    Ok(())
}

fn cmd_lex(expr: String, lang: Lang) -> ExprResult<()> {
    let (rows, anomalies) = match lang {
        Lang::Condition => {
            let mut lexer = formexpr::ConditionLexer::new(&expr);
            let rows: Vec<_> = lexer
                .tokenize()
                .into_iter()
                .map(|t| (t.location, t.kind.to_string()))
                .collect();
            (rows, lexer.take_anomalies())
        }
        Lang::Value => {
            let mut lexer = formexpr::ExpressionLexer::new(&expr);
            let rows: Vec<_> = lexer
                .tokenize()
                .into_iter()
                .map(|t| (t.location, t.kind.to_string()))
                .collect();
            (rows, lexer.take_anomalies())
        }
    };

    for (location, kind) in rows {
        println!("{:>4}:{:<3}  {}", location.line, location.column, kind);
    }
    for anomaly in &anomalies {
        let w = formexpr::Warning::from_anomaly(anomaly);
        eprintln!("warning: {} (<expr>:{}:{})", w.message, w.line, w.column);
    }

    Ok(())
}

fn cmd_init_state(form: PathBuf, format: OutputFormat) -> ExprResult<()> {
    let form = load_form(&form)?;
    let state = formexpr::create_form_state(&form);

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&state.to_json())
            .map_err(|e| ExprError::io_error(format!("failed to write JSON: {}", e)))?,
        OutputFormat::Yaml => serde_yaml::to_string(&state)
            .map_err(|e| ExprError::io_error(format!("failed to write YAML: {}", e)))?,
    };
    println!("{}", output.trim_end());

    Ok(())
}

fn cmd_visible(form: PathBuf, state: StateArgs, section: Option<usize>) -> ExprResult<()> {
    let form = load_form(&form)?;
    let state = load_state(&state)?;

    let Some(index) = section else {
        for (index, section) in formexpr::visible_sections(&form, &state) {
            println!("{:>3}  {}", index, section.title);
        }
        return Ok(());
    };

    let section = form.sections.get(index).ok_or_else(|| {
        ExprError::invalid_form(format!(
            "no section {} (the form has {})",
            index,
            form.sections.len()
        ))
    })?;

    for field in formexpr::visible_fields(section, &state) {
        let mut line = format!("{}  {}", field.data_name, field.label);
        if formexpr::field_required(field, &state) {
            line.push_str(" [required]");
        }
        if formexpr::field_read_only(field, &state) {
            line.push_str(" [read-only]");
        }
        println!("{}", line.trim_end());
    }

    Ok(())
}

fn read_file(path: &Path) -> ExprResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ExprError::io_error(format!("failed to read {}: {}", path.display(), e)))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn load_form(path: &Path) -> ExprResult<Form> {
    let text = read_file(path)?;
    if is_yaml(path) {
        Form::from_yaml(&text)
    } else {
        Form::from_json(&text)
    }
}

fn load_state(args: &StateArgs) -> ExprResult<State> {
    let mut state = match &args.state {
        Some(path) => {
            let text = read_file(path)?;
            if is_yaml(path) {
                State::from_yaml(&text)?
            } else {
                State::from_json(&text)?
            }
        }
        None => State::new(),
    };

    for (key, value) in &args.set {
        state.set(key.clone(), value.as_str());
    }
    for (key, items) in &args.set_list {
        let items: Vec<String> = if items.is_empty() {
            Vec::new()
        } else {
            items.split(',').map(|s| s.trim().to_string()).collect()
        };
        state.set(key.clone(), items);
    }

    Ok(state)
}
