use anyhow::Context;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::importers::HoldingsTable;
use crate::planner::HarvestPlan;
use crate::utils::format_currency;

const SELL_COLUMN: &str = "sell";

/// Write the holdings table in plan order to `path`.
///
/// `plan` must have been built from `table.holdings`.
pub fn export_stocks_csv<P: AsRef<Path>>(
    path: P,
    table: &HoldingsTable,
    plan: &HarvestPlan,
    drop_columns: &[String],
) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    write_stocks_csv(file, table, plan, drop_columns)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Exported {} holdings to {:?}", plan.position_count(), path);
    Ok(())
}

/// Write the source columns (minus `drop_columns`) with market value and
/// gain/loss re-rendered as currency, followed by the `sell` tag.
pub fn write_stocks_csv<W: Write>(
    writer: W,
    table: &HoldingsTable,
    plan: &HarvestPlan,
    drop_columns: &[String],
) -> Result<()> {
    let kept: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !drop_columns.iter().any(|d| d.eq_ignore_ascii_case(header)))
        .map(|(idx, _)| idx)
        .collect();

    let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);
    wtr.write_record(
        kept.iter()
            .map(|&idx| &table.headers[idx])
            .chain(std::iter::once(SELL_COLUMN)),
    )?;

    for tagged in &plan.holdings {
        let record = table
            .records
            .get(tagged.source_index)
            .context("Plan does not match the holdings table")?;

        let mut row: Vec<String> = kept
            .iter()
            .map(|&idx| {
                if idx == table.columns.market_value {
                    format_currency(tagged.holding.market_value)
                } else if idx == table.columns.gain_loss_abs {
                    format_currency(tagged.holding.gain_loss_abs)
                } else {
                    record.get(idx).unwrap_or("").to_string()
                }
            })
            .collect();
        row.push(if tagged.sell { "True" } else { "False" }.to_string());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
