//! Evacuation log commands.

use anyhow::Result;
use chrono::Local;
use dialoguer::Confirm;
use sagip_core::evac::{EvacuationLog, LogFilter, NewEvacuationLog};

use super::{LogsArgs, LogsCommand};
use crate::context::Context;

const WIDTHS: [usize; 7] = [6, 7, 17, 10, 10, 5, 6];

/// Run the logs command.
pub async fn run(args: LogsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        LogsCommand::List {
            center,
            ordering,
            page,
        } => {
            let filter = LogFilter {
                center,
                ordering,
                page,
            };
            list_logs(&filter, ctx).await
        }
        LogsCommand::Create {
            center,
            families_in,
            individuals_in,
            families_out,
            individuals_out,
            vulnerable,
            remarks,
        } => {
            let mut log = NewEvacuationLog::new(center)
                .arrived(families_in, individuals_in)
                .departed(families_out, individuals_out)
                .with_vulnerable(vulnerable);
            if let Some(remarks) = remarks {
                log = log.with_remarks(remarks);
            }
            create_log(&log, ctx).await
        }
        LogsCommand::Delete { id, yes } => delete_log(id, yes, ctx).await,
        LogsCommand::Summary => summary(ctx).await,
        LogsCommand::Latest { center } => latest(center, ctx).await,
    }
}

async fn list_logs(filter: &LogFilter, ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let spinner = ctx.output.spinner("Loading logs...");
    let result = app.logs().list(filter).await;
    spinner.finish_and_clear();
    let logs = result?;

    if ctx.output.is_json() {
        ctx.output.json(&logs);
        return Ok(());
    }

    if logs.is_empty() {
        ctx.output.info("No evacuation logs found.");
        return Ok(());
    }

    ctx.output.table_row(
        &["ID", "CENTER", "RECORDED", "IN", "OUT", "VULN", "TOTAL"],
        &WIDTHS,
    );
    for log in &logs {
        print_row(log, ctx);
    }
    ctx.output.info("");
    ctx.output.info(&format!("Total: {} log(s)", logs.len()));

    Ok(())
}

fn print_row(log: &EvacuationLog, ctx: &Context) {
    ctx.output.table_row(
        &[
            &log.id.to_string(),
            &log.center.to_string(),
            &recorded(log),
            &format!("{}/{}", log.families_in, log.individuals_in),
            &format!("{}/{}", log.families_out, log.individuals_out),
            &log.vulnerable_individuals.to_string(),
            &log.total_current.to_string(),
        ],
        &WIDTHS,
    );
}

fn recorded(log: &EvacuationLog) -> String {
    log.date_recorded
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

async fn create_log(log: &NewEvacuationLog, ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let created = app.logs().create(log).await?;

    if ctx.output.is_json() {
        ctx.output.json(&created);
        return Ok(());
    }

    ctx.output.success(&format!(
        "Recorded log {} for center {}",
        created.id, created.center
    ));
    ctx.output.kv("recorded", &recorded(&created));
    ctx.output
        .kv("now in center", &created.total_current.to_string());

    Ok(())
}

async fn delete_log(id: u64, yes: bool, ctx: &Context) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete evacuation log {}?", id))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Cancelled");
            return Ok(());
        }
    }

    let app = ctx.app()?;
    app.logs().delete(id).await?;
    ctx.output.success(&format!("Deleted evacuation log {}", id));

    Ok(())
}

async fn summary(ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let summary = app.logs().staff_summary().await?;

    if !ctx.output.is_json() {
        ctx.output.header("Staff summary");
    }
    ctx.output.json(&summary);

    Ok(())
}

async fn latest(center: u64, ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let latest = app.logs().latest_by_center(center).await?;

    if ctx.output.is_json() {
        ctx.output.json(&latest);
        return Ok(());
    }

    match latest {
        Some(log) => {
            ctx.output.header(&format!("Latest log, center {}", center));
            ctx.output.table_row(
                &["ID", "CENTER", "RECORDED", "IN", "OUT", "VULN", "TOTAL"],
                &WIDTHS,
            );
            print_row(&log, ctx);
            if let Some(remarks) = log.remarks.as_deref().filter(|r| !r.is_empty()) {
                ctx.output.kv("remarks", remarks);
            }
        }
        None => ctx
            .output
            .info(&format!("No logs recorded for center {}", center)),
    }

    Ok(())
}
