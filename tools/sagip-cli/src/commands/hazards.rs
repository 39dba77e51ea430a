//! Hazard report commands.

use anyhow::{Error, Result};
use sagip_core::evac::{HazardType, NewHazardReport, Severity};

use super::{HazardsArgs, HazardsCommand};
use crate::context::Context;

/// Run the hazards command.
pub async fn run(args: HazardsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        HazardsCommand::Types => list_types(ctx),
        HazardsCommand::Report {
            hazard_type,
            title,
            lat,
            lon,
            severity,
            description,
            address,
            municipality,
            contact_name,
            contact_phone,
        } => {
            let hazard_type: HazardType = hazard_type.parse().map_err(Error::msg)?;
            let severity: Severity = severity.parse().map_err(Error::msg)?;

            let mut report =
                NewHazardReport::new(hazard_type, title, lat, lon).with_severity(severity);
            if let Some(description) = description {
                report = report.with_description(description);
            }
            if let Some(address) = address {
                report = report.with_address(address);
            }
            if let Some(municipality) = municipality {
                report = report.with_municipality(municipality);
            }
            if contact_name.is_some() || contact_phone.is_some() {
                report = report.with_contact(
                    contact_name.unwrap_or_default(),
                    contact_phone.unwrap_or_default(),
                );
            }
            submit(&report, ctx).await
        }
    }
}

fn list_types(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&HazardType::ALL);
        return Ok(());
    }

    ctx.output.header("Hazard types");
    for hazard in HazardType::ALL {
        ctx.output
            .table_row(&[hazard.code(), hazard.label()], &[16, 20]);
    }
    Ok(())
}

async fn submit(report: &NewHazardReport, ctx: &Context) -> Result<()> {
    if !(-90.0..=90.0).contains(&report.latitude) || !(-180.0..=180.0).contains(&report.longitude)
    {
        anyhow::bail!(
            "Coordinates out of range: {}, {}",
            report.latitude,
            report.longitude
        );
    }

    let app = ctx.app()?;
    let spinner = ctx.output.spinner("Submitting report...");
    let result = app.hazards().submit(report).await;
    spinner.finish_and_clear();
    let created = result?;

    if ctx.output.is_json() {
        ctx.output.json(&created);
        return Ok(());
    }

    ctx.output
        .success(&format!("Reported {} (#{})", created.hazard_type.label(), created.id));
    ctx.output.kv("title", &created.title);
    ctx.output.kv("severity", &format!("{:?}", created.severity));
    ctx.output.kv("status", &format!("{:?}", created.status));

    Ok(())
}
