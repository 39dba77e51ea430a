//! Evacuation center commands.

use anyhow::{anyhow, Result};
use sagip_core::evac::services::CenterRecord;
use sagip_core::evac::{demo_centers, EvacuationCenter, OccupancyStatus};
use sagip_core::SagipApp;

use super::{CentersArgs, CentersCommand};
use crate::context::Context;
use crate::output::{format_bar, format_fraction, risk_badge, status_badge};

const WIDTHS: [usize; 6] = [4, 32, 16, 11, 12, 14];

/// Run the centers command.
pub async fn run(args: CentersArgs, ctx: &Context) -> Result<()> {
    match args.command {
        Some(CentersCommand::List) | None if args.remote => list_remote(ctx).await,
        Some(CentersCommand::List) | None => list_demo(ctx),
        Some(CentersCommand::Show { id }) if args.remote => show_remote(id, ctx).await,
        Some(CentersCommand::Show { id }) => show_demo(id, ctx),
        Some(CentersCommand::Risk {
            id,
            window,
            horizon,
        }) => risk(id, window, horizon, ctx).await,
    }
}

fn list_demo(ctx: &Context) -> Result<()> {
    let centers = demo_centers();

    if ctx.output.is_json() {
        ctx.output.json(&centers);
        return Ok(());
    }

    ctx.output.header("Evacuation Centers (demo data)");
    ctx.output.table_row(
        &["ID", "NAME", "MUNICIPALITY", "OCCUPANCY", "LOAD", "STATUS"],
        &WIDTHS,
    );
    for center in &centers {
        ctx.output.table_row(
            &[
                &center.id.to_string(),
                &center.name,
                &center.municipality,
                &format!("{}/{}", center.occupants, center.capacity),
                &format_bar(center.occupancy_percent()),
                &status_badge(center.occupancy_status()),
            ],
            &WIDTHS,
        );
    }

    let critical = centers
        .iter()
        .filter(|c| c.occupancy_status() == OccupancyStatus::Critical)
        .count();
    ctx.output.info("");
    ctx.output.info(&format!(
        "{} center(s), {} critical",
        centers.len(),
        critical
    ));

    Ok(())
}

fn show_demo(id: u64, ctx: &Context) -> Result<()> {
    let center = demo_centers()
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| anyhow!("No demo center with ID {}", id))?;

    if ctx.output.is_json() {
        ctx.output.json(&center);
        return Ok(());
    }

    print_center(&center, ctx);
    Ok(())
}

fn print_center(center: &EvacuationCenter, ctx: &Context) {
    ctx.output.header(&center.name);
    ctx.output.kv("municipality", &center.municipality);
    ctx.output.kv(
        "location",
        &format!("{:.4}, {:.4}", center.coordinates.lat, center.coordinates.lon),
    );
    ctx.output.kv(
        "occupancy",
        &format!(
            "{}/{} ({:.0}%), {} slot(s) free",
            center.occupants,
            center.capacity,
            center.occupancy_percent(),
            center.available_slots()
        ),
    );
    ctx.output
        .kv("status", &status_badge(center.occupancy_status()));
    if center.status != center.occupancy_status() {
        ctx.output.kv("reported", &status_badge(center.status));
    }
    ctx.output.kv("contact", &center.contact);
    ctx.output.kv(
        "updated",
        &center.last_update.format("%Y-%m-%d %H:%M").to_string(),
    );

    ctx.output.info("Supplies:");
    for (name, level) in center.supplies.iter() {
        ctx.output.kv(
            name,
            &format!("{} {:>3}%", format_bar(f64::from(level)), level),
        );
    }
}

async fn list_remote(ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let spinner = ctx.output.spinner("Loading centers...");
    let result = app.centers().list().await;
    spinner.finish_and_clear();
    let centers = result?;

    if ctx.output.is_json() {
        ctx.output.json(&centers);
        return Ok(());
    }

    ctx.output.header("Evacuation Centers");
    let widths = [6, 32, 10, 10, 10, 8];
    ctx.output.table_row(
        &["ID", "NAME", "FAMILIES", "PERSONS", "KIND", "FLOOD"],
        &widths,
    );
    for center in &centers {
        ctx.output.table_row(
            &[
                &center.id.map(|id| id.to_string()).unwrap_or_default(),
                &center.name,
                &center.family_capacity_max.to_string(),
                &center.individual_capacity_max.to_string(),
                &format!("{:?}", center.status),
                &format!("{:?}", center.flood_susceptibility),
            ],
            &widths,
        );
    }
    ctx.output.info("");
    ctx.output.info(&format!("Total: {} center(s)", centers.len()));

    Ok(())
}

async fn show_remote(id: u64, ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let center = app.centers().get(id).await?;

    if ctx.output.is_json() {
        ctx.output.json(&center);
        return Ok(());
    }

    print_record(&center, ctx);
    latest_head_count(&app, id, ctx).await
}

fn print_record(center: &CenterRecord, ctx: &Context) {
    ctx.output.header(&center.name);
    if let Some(ref province) = center.province {
        ctx.output.kv("province", province);
    }
    ctx.output.kv("municipality", &center.municipality.to_string());
    if let (Some(lat), Some(lon)) = (center.latitude, center.longitude) {
        ctx.output.kv("location", &format!("{:.4}, {:.4}", lat, lon));
    }
    ctx.output.kv(
        "capacity",
        &format!(
            "{} families, {} individuals",
            center.family_capacity_max, center.individual_capacity_max
        ),
    );
    ctx.output.kv("kind", &format!("{:?}", center.status));
    ctx.output.kv(
        "susceptibility",
        &format!(
            "flood {:?}, landslide {:?}",
            center.flood_susceptibility, center.landslide_susceptibility
        ),
    );
    if let Some(remarks) = center.remarks.as_deref().filter(|r| !r.is_empty()) {
        ctx.output.kv("remarks", remarks);
    }
}

async fn latest_head_count(app: &SagipApp, id: u64, ctx: &Context) -> Result<()> {
    match app.logs().latest_by_center(id).await? {
        Some(log) => ctx.output.kv(
            "head count",
            &format!(
                "{} ({})",
                log.total_current,
                log.date_recorded.format("%Y-%m-%d %H:%M UTC")
            ),
        ),
        None => ctx.output.kv("head count", "no logs yet"),
    }
    Ok(())
}

async fn risk(id: u64, window: Option<u32>, horizon: Option<u32>, ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let spinner = ctx.output.spinner("Forecasting congestion...");
    let result = app.analytics().congestion_risk_with(id, window, horizon).await;
    spinner.finish_and_clear();
    let risk = result?;

    if ctx.output.is_json() {
        ctx.output.json(&risk);
        return Ok(());
    }

    ctx.output.header(&format!("Congestion risk, center {}", risk.center_id));
    ctx.output.kv("risk", &risk_badge(risk.risk_level));
    ctx.output.kv("score", &format!("{:.2}", risk.risk_score));
    ctx.output.kv(
        "now",
        &format!(
            "{}/{} ({})",
            risk.current_total,
            risk.capacity,
            format_fraction(risk.occupancy)
        ),
    );
    ctx.output.kv(
        &format!("in {} min", risk.horizon_minutes),
        &format!(
            "{} ({})",
            risk.predicted_total,
            format_fraction(risk.predicted_occupancy)
        ),
    );
    ctx.output.kv(
        &format!("last {} min", risk.window_minutes),
        &format!(
            "+{} / -{} ({:+.2}/min)",
            risk.total_in_window, risk.total_out_window, risk.net_rate_per_min
        ),
    );
    ctx.output.kv(
        "vulnerable",
        &format!(
            "{} ({})",
            risk.vulnerable_total,
            format_fraction(risk.vulnerability_ratio)
        ),
    );
    ctx.output.info(&risk.recommendation);

    Ok(())
}
