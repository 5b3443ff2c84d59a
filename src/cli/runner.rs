use anyhow::{anyhow, Result};
use std::io::Write;
use tracing::info;

use crate::cli::formatters::{format_plan_json, format_plan_table};
use crate::cli::Cli;
use crate::config::Config;
use crate::exporters::export_stocks_csv;
use crate::importers;
use crate::planner::HarvestPlan;

/// Run the whole pipeline for parsed arguments, writing the report to `out`.
pub fn run<W: Write>(cli: &Cli, mut out: W) -> Result<()> {
    let input = cli
        .input()
        .ok_or_else(|| anyhow!("No input file given"))?;
    let config = Config::load(cli.config.as_deref())?;

    let table = importers::import_file(input, &config)?;
    let plan = HarvestPlan::build(&table.holdings);

    info!(
        "Harvest plan: {} of {} positions to sell, realized {}",
        plan.sell.count,
        plan.position_count(),
        plan.realized
    );

    if cli.json {
        writeln!(out, "{}", format_plan_json(&plan))?;
    } else {
        write!(out, "{}", format_plan_table(&plan))?;
    }

    if let Some(export) = &cli.export {
        let path = export
            .clone()
            .unwrap_or_else(|| config.export.file_name.clone());
        export_stocks_csv(&path, &table, &plan, &config.export.drop_columns)?;
        if !cli.json {
            writeln!(out, "\nWrote {}", path.display())?;
        }
    }

    Ok(())
}
