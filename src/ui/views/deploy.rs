//! Human-readable rendering of deploy events and the run summary.

use scd::application::{HostOutcome, RunSummary};
use scd::domain::ports::DeployEvent;

use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use crate::ui::terminal::TerminalCapabilities;

/// Items listed in a stage header before the rest is summarized.
const MAX_LISTED_ITEMS: usize = 5;

/// Render one event as zero or more lines.
///
/// Successful batch output is only shown with `-v`. Failed batch output is
/// always shown in full.
pub fn render_event(event: &DeployEvent, caps: &TerminalCapabilities, verbose: u8) -> Vec<String> {
    let color = caps.supports_color;
    let unicode = caps.supports_unicode;

    match event {
        DeployEvent::HostStarted { address } => vec![format!(
            "{} {}",
            Icon::Remote.colored(color, unicode),
            ColoredText::plain(address).bold().render(color)
        )],
        DeployEvent::HostResolved { address, name } if address != name => vec![format!(
            "  {} {}",
            Icon::Arrow.colored(color, unicode),
            ColoredText::dim(format!("{} is {}", address, name)).render(color)
        )],
        DeployEvent::HostResolved { .. } => Vec::new(),
        DeployEvent::WorkComputed {
            programs,
            files,
            scripts,
            shell_change,
            ..
        } => {
            if verbose == 0 {
                return Vec::new();
            }
            let mut parts = vec![
                plural(*programs, "program"),
                plural(*files, "file"),
                plural(*scripts, "script"),
            ];
            if *shell_change {
                parts.push("shell change".to_string());
            }
            vec![format!(
                "  {}",
                ColoredText::dim(format!("outstanding: {}", parts.join(", "))).render(color)
            )]
        }
        DeployEvent::HostUpToDate { host } => vec![format!(
            "  {} {}",
            Icon::Success.colored(color, unicode),
            ColoredText::success(format!("{} is up to date", host)).render(color)
        )],
        DeployEvent::StageStarted { stage, items, .. } => {
            let title = ColoredText::info(capitalize(stage.as_str())).render(color);
            if items.is_empty() {
                vec![format!("  {} {}", Icon::Progress.colored(color, unicode), title)]
            } else {
                vec![format!(
                    "  {} {}: {}",
                    Icon::Progress.colored(color, unicode),
                    title,
                    summarize_items(items)
                )]
            }
        }
        DeployEvent::StageSucceeded { stage, output, .. } => {
            let mut lines = Vec::new();
            if verbose > 0 {
                lines.extend(render_output(output, false, color));
            }
            lines.push(format!(
                "  {} {}",
                Icon::Success.colored(color, unicode),
                ColoredText::success(format!("{} done", capitalize(stage.as_str()))).render(color)
            ));
            lines
        }
        DeployEvent::StageFailed {
            stage,
            exit_code,
            output,
            ..
        } => {
            let mut lines = render_output(output, true, color);
            lines.push(format!(
                "  {} {}",
                Icon::Error.colored(color, unicode),
                ColoredText::error(format!(
                    "{} failed with exit code {}",
                    capitalize(stage.as_str()),
                    exit_code
                ))
                .render(color)
            ));
            lines
        }
        DeployEvent::ScriptSkipped { script, reason, .. } => vec![format!(
            "  {} {}",
            Icon::Warning.colored(color, unicode),
            ColoredText::warning(format!("skipped {}: {}", script, reason)).render(color)
        )],
        DeployEvent::HostCompleted { host } => vec![format!(
            "  {} {}",
            Icon::Success.colored(color, unicode),
            ColoredText::success(format!("{} deployed", host)).bold().render(color)
        )],
        DeployEvent::HostFailed {
            host,
            stage,
            message,
        } => {
            let location = match stage {
                Some(stage) => format!("{} ({})", host, stage),
                None => host.clone(),
            };
            vec![format!(
                "  {} {}",
                Icon::Error.colored(color, unicode),
                ColoredText::error(format!("{}: {}", location, message))
                    .bold()
                    .render(color)
            )]
        }
    }
}

/// Remote output lines. Commands echoed by `set -x` start with `+` and are
/// dimmed; the rest is red when the batch failed.
pub fn render_output(output: &[String], failed: bool, supports_color: bool) -> Vec<String> {
    output
        .iter()
        .map(|line| {
            let text = if line.starts_with('+') {
                ColoredText::dim(line.as_str())
            } else if failed {
                ColoredText::error(line.as_str())
            } else {
                ColoredText::plain(line.as_str())
            };
            format!("    {}", text.render(supports_color))
        })
        .collect()
}

pub fn render_summary(summary: &RunSummary, caps: &TerminalCapabilities) -> Vec<String> {
    let color = caps.supports_color;
    let unicode = caps.supports_unicode;

    let mut deployed = 0;
    let mut up_to_date = 0;
    for outcome in &summary.outcomes {
        match outcome {
            HostOutcome::Deployed { .. } => deployed += 1,
            HostOutcome::UpToDate { .. } => up_to_date += 1,
            HostOutcome::Failed(_) => {}
        }
    }
    let failed = summary.failed_count();

    let mut lines = vec![String::new()];
    let counts = format!(
        "{} deployed, {} up to date, {} failed",
        deployed, up_to_date, failed
    );
    if failed == 0 {
        lines.push(format!(
            "{} {}",
            Icon::Success.colored(color, unicode),
            ColoredText::success(counts).bold().render(color)
        ));
        return lines;
    }

    lines.push(format!(
        "{} {}",
        Icon::Error.colored(color, unicode),
        ColoredText::error(counts).bold().render(color)
    ));
    for failure in summary.failures() {
        let stage = failure
            .stage
            .map(|s| format!(" during {}", s))
            .unwrap_or_default();
        lines.push(format!(
            "  {} {}{}: {}",
            Icon::Arrow.colored(color, unicode),
            failure.address,
            stage,
            failure.error
        ));
    }
    lines
}

fn summarize_items(items: &[String]) -> String {
    if items.len() <= MAX_LISTED_ITEMS {
        return items.join(", ");
    }
    format!(
        "{} and {} more",
        items[..MAX_LISTED_ITEMS].join(", "),
        items.len() - MAX_LISTED_ITEMS
    )
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
