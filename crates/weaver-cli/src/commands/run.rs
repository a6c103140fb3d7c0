use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use weaver_core::{MessageKind, RunReport, StepEvent, WeaverConfig};
use weaver_execution::{LogFormat, TaskExecutor, init_tracing};

/// Runs `objective` to completion. Returns whether the run reached FINISH.
pub async fn execute(
    objective: &str,
    max_steps: Option<usize>,
    config_path: Option<&Path>,
    json: bool,
) -> Result<bool> {
    let format = if json { LogFormat::Json } else { LogFormat::Pretty };
    init_tracing(format, "warn")?;

    let mut config =
        WeaverConfig::load_or_default(config_path).context("Failed to load configuration")?;
    if let Some(max_steps) = max_steps {
        config.engine.max_steps = max_steps;
    }
    let executor = TaskExecutor::from_config(&config).context("Failed to build engine")?;

    let mut handle = executor.submit_task(objective);
    if !json {
        println!("{} {}", "run".bright_black(), handle.run_id().bright_black());
    }
    while let Some(event) = handle.next_event().await {
        if !json {
            print_event(&event);
        }
    }
    let report = handle.wait().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(report.succeeded())
}

fn print_event(event: &StepEvent) {
    let author = format!("{:>10}", event.author);
    let author = if event.is_supervisor() {
        author.as_str().bright_cyan().bold()
    } else {
        author.as_str().bold()
    };
    let text = event.text.as_str();
    let text = match event.kind {
        MessageKind::Info => text.normal(),
        MessageKind::Process => text.blue(),
        MessageKind::Success => text.green(),
        MessageKind::Warning => text.yellow(),
    };
    println!("[{:>2}] {} {}", event.step, author, text);
}

fn print_summary(report: &RunReport) {
    match &report.error {
        None => {
            let artifact = report
                .context
                .get("artifact")
                .and_then(|value| value.as_str())
                .unwrap_or("-");
            println!(
                "{} {} worker steps, artifact {}",
                "completed:".green().bold(),
                report.worker_steps(),
                artifact
            );
        }
        Some(error) => {
            eprintln!("{} {}", format!("{:?}:", report.status).red().bold(), error);
        }
    }
}
