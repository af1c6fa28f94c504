use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use mathproc::{
    EquationCategory, MathProcessor, NumberFormat, ProcessorConfig, Scope, SymbolicEngine, Value,
};

#[derive(Parser, Debug)]
#[command(name = "mathproc", version, about = "Notation-aware equation processor")]
struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[arg(long, global = true, help = "Processor config (TOML)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite locale notation into engine syntax.
    Preprocess { input: String },
    Evaluate {
        expression: String,
        /// Variable binding, e.g. `--var x=2`.
        #[arg(long = "var", value_parser = parse_binding)]
        vars: Vec<(String, f64)>,
    },
    Solve {
        equation: String,
        #[arg(long, default_value = "algebraic")]
        category: EquationCategory,
        /// Detect the equation type and explain the solution instead.
        #[arg(long, default_value_t = false)]
        explain: bool,
    },
    Classify { equation: String },
    Simplify { expression: String },
    Factor { expression: String },
    Expand { expression: String },
    Latex { expression: String },
    Validate {
        equation: String,
        #[arg(long, default_value = "algebraic")]
        category: EquationCategory,
    },
    Preview {
        equation: String,
        #[arg(long, default_value = "algebraic")]
        category: EquationCategory,
    },
    Format {
        #[arg(allow_hyphen_values = true)]
        number: f64,
        #[arg(long, default_value_t = 2)]
        precision: usize,
        /// Use `.` decimals without grouping.
        #[arg(long, default_value_t = false)]
        plain: bool,
    },
    Convert {
        #[arg(allow_hyphen_values = true)]
        value: f64,
        from: String,
        to: String,
        #[arg(long)]
        kind: String,
    },
    Special {
        group: String,
        name: String,
        #[arg(allow_hyphen_values = true)]
        args: Vec<f64>,
    },
    /// Print the effective configuration.
    Config,
}

#[derive(Serialize)]
struct JsonOut<T: Serialize> {
    ok: bool,
    data: T,
}

fn parse_binding(text: &str) -> Result<(String, f64), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{text}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid value for `{name}`: {err}"))?;
    Ok((name.trim().to_string(), value))
}

fn emit<T: Serialize>(json: bool, data: T, text: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", text(&data));
    }
    Ok(())
}

fn load_processor(path: Option<&PathBuf>) -> anyhow::Result<MathProcessor<SymbolicEngine>> {
    let config = match path {
        Some(path) => ProcessorConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ProcessorConfig::default(),
    };
    Ok(MathProcessor::from_config(config)?)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let processor = load_processor(cli.config.as_ref())?;
    let json = cli.json;

    match cli.command {
        Commands::Preprocess { input } => {
            let output = processor.preprocess_expression(&input);
            emit(json, output, Clone::clone)?;
        }
        Commands::Evaluate { expression, vars } => {
            let scope: Scope = vars
                .into_iter()
                .map(|(name, value)| (name, Value::Number(value)))
                .collect();
            let value = processor.evaluate_expression(&expression, &scope)?;
            emit(json, value, ToString::to_string)?;
        }
        Commands::Solve {
            equation,
            explain: true,
            ..
        } => {
            let explanation = processor.explain_equation(&equation)?;
            let data = json!({
                "type": explanation.equation_type,
                "solution": explanation.solution.to_string(),
                "steps": explanation.steps,
            });
            emit(json, data, |_| explanation.steps.join("\n"))?;
        }
        Commands::Solve {
            equation, category, ..
        } => {
            let report = processor.solve_equation(&equation, category)?;
            let data = json!({
                "category": report.category,
                "solution": report.solution.to_string(),
                "steps": report.steps,
                "validation": report.validation,
            });
            emit(json, data, |_| {
                let mut lines = report.steps.clone();
                lines.push(format!("Verified: {}", report.validation));
                lines.join("\n")
            })?;
        }
        Commands::Classify { equation } => {
            let equation_type = processor.detect_equation_type(&equation);
            let data = json!({
                "type": equation_type,
                "degree": processor.polynomial_degree(&equation),
            });
            emit(json, data, |_| {
                processor.format_equation_type(equation_type).to_string()
            })?;
        }
        Commands::Simplify { expression } => {
            emit(json, processor.simplify_expression(&expression)?, Clone::clone)?;
        }
        Commands::Factor { expression } => {
            emit(json, processor.factor_expression(&expression)?, Clone::clone)?;
        }
        Commands::Expand { expression } => {
            emit(json, processor.expand_expression(&expression)?, Clone::clone)?;
        }
        Commands::Latex { expression } => {
            emit(json, processor.generate_latex(&expression)?, Clone::clone)?;
        }
        Commands::Validate { equation, category } => {
            let validation = processor.validate_equation(&equation, category);
            let valid = validation.is_valid;
            emit(json, validation, |v| {
                let mut lines = vec![if v.is_valid { "valid" } else { "invalid" }.to_string()];
                lines.extend(v.errors.iter().map(|e| format!("error: {e}")));
                lines.extend(v.warnings.iter().map(|w| format!("warning: {w}")));
                lines.join("\n")
            })?;
            if !valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Preview { equation, category } => {
            let preview = processor.generate_preview(&equation, category);
            let text = serde_json::to_string_pretty(&preview)?;
            emit(json, preview, |_| text)?;
        }
        Commands::Format {
            number,
            precision,
            plain,
        } => {
            let format = NumberFormat {
                precision,
                use_eu_format: !plain,
            };
            emit(json, processor.format_number(number, format), Clone::clone)?;
        }
        Commands::Convert {
            value,
            from,
            to,
            kind,
        } => {
            let converted = processor.convert_unit(value, &from, &to, &kind)?;
            let text = processor.format_unit(converted, &to, &kind)?;
            emit(json, json!({ "value": converted, "unit": to }), |_| text)?;
        }
        Commands::Special { group, name, args } => {
            let value = processor.special_function(&group, &name, &args)?;
            emit(json, value, |v| mathproc::format::show_float(*v))?;
        }
        Commands::Config => {
            let text = processor.config().to_toml_string()?;
            emit(json, processor.config().clone(), |_| text)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
