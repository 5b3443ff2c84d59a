//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of plan calculation from presentation.

use crate::planner::{GroupSummary, HarvestPlan};
use crate::utils::{format_currency, format_percent};
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

/// Format a harvest plan for JSON output
pub fn format_plan_json(plan: &HarvestPlan) -> String {
    #[derive(Serialize)]
    struct JsonGroup {
        count: usize,
        sum: String,
        pct: String,
    }

    #[derive(Serialize)]
    struct JsonPosition {
        symbol: String,
        name: String,
        market_value: String,
        gain_loss: String,
        gain_loss_pct: String,
    }

    #[derive(Serialize)]
    struct JsonPlan {
        total: String,
        positions: usize,
        sell: JsonGroup,
        keep: JsonGroup,
        realized: String,
        to_sell: Vec<JsonPosition>,
    }

    let group = |g: &GroupSummary| JsonGroup {
        count: g.count,
        sum: g.sum.to_string(),
        pct: g.pct.round_dp(2).to_string(),
    };

    let json_plan = JsonPlan {
        total: plan.total.to_string(),
        positions: plan.position_count(),
        sell: group(&plan.sell),
        keep: group(&plan.keep),
        realized: plan.realized.to_string(),
        to_sell: plan
            .to_sell()
            .map(|h| JsonPosition {
                symbol: h.symbol.clone(),
                name: h.name.clone(),
                market_value: h.market_value.to_string(),
                gain_loss: h.gain_loss_abs.to_string(),
                gain_loss_pct: h.gain_loss_pct.to_string(),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&json_plan)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

fn colored_amount(value: Decimal) -> String {
    let text = format_currency(value);
    if value < Decimal::ZERO {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

/// Format a harvest plan for terminal output
pub fn format_plan_table(plan: &HarvestPlan) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} {}\n",
        "Total money:".bold(),
        format_currency(plan.total)
    ));
    output.push_str(&format!(
        "{} {}\n\n",
        "Total stocks:".bold(),
        plan.position_count()
    ));

    if plan.position_count() == 0 || plan.total.is_zero() {
        output.push_str(&format_empty_holdings());
        output.push('\n');
    }

    #[derive(Tabled)]
    struct GroupRow {
        #[tabled(rename = "Group")]
        group: &'static str,
        #[tabled(rename = "Count")]
        count: usize,
        #[tabled(rename = "Sum")]
        sum: String,
        #[tabled(rename = "Pct")]
        pct: String,
    }

    let group_row = |label: &'static str, g: &GroupSummary| GroupRow {
        group: label,
        count: g.count,
        sum: format_currency(g.sum),
        pct: format_percent(g.pct),
    };
    let groups = vec![group_row("Sell", &plan.sell), group_row("Keep", &plan.keep)];

    let mut table = Table::new(&groups);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());

    output.push_str(&format!("{}\n{}\n\n", "Sell/keep:".bold(), table));

    output.push_str(&format!(
        "{} {}\n\n",
        "Loss left to harvest:".bold(),
        colored_amount(plan.realized)
    ));

    if !plan.has_sales() {
        output.push_str(&format!("{} No stocks to sell\n", "ℹ".blue().bold()));
        return output;
    }

    #[derive(Tabled)]
    struct SellRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Market Value")]
        market_value: String,
        #[tabled(rename = "Gain/Loss($)")]
        gain_loss: String,
    }

    let rows: Vec<SellRow> = plan
        .to_sell()
        .map(|h| SellRow {
            symbol: h.symbol.clone(),
            name: h.name.clone(),
            market_value: format_currency(h.market_value),
            gain_loss: colored_amount(h.gain_loss_abs),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    // Right-align the amount columns
    table.modify(Columns::new(2..), Alignment::right());

    output.push_str(&format!("{}\n{}\n", "Stocks to sell:".bold(), table));

    output
}

/// Format the note shown when there is no market value to divide by
pub fn format_empty_holdings() -> String {
    format!(
        "{} No holdings found, percentages are reported as 0%\n",
        "ℹ".blue().bold()
    )
}
