//! Tax-loss harvest planner
//!
//! Sells the worst percentage losers first and keeps selling while the
//! running realized gain/loss stays negative. Everything here is a pure
//! function of the parsed holdings.

use rust_decimal::Decimal;
use tracing::debug;

/// One row of the unrealized gains/losses report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingRecord {
    pub symbol: String,
    pub name: String,
    pub market_value: Decimal,
    pub gain_loss_abs: Decimal,
    pub gain_loss_pct: Decimal,
}

impl HoldingRecord {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        market_value: Decimal,
        gain_loss_abs: Decimal,
        gain_loss_pct: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            market_value,
            gain_loss_abs,
            gain_loss_pct,
        }
    }
}

/// A holding in planner order, tagged for sale or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedHolding {
    pub holding: HoldingRecord,
    /// Position of the holding in the input sequence
    pub source_index: usize,
    /// Running gain/loss up to and including this holding
    pub cumulative_gain_loss: Decimal,
    pub sell: bool,
}

/// Count, market value and share of the total for one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupSummary {
    pub count: usize,
    pub sum: Decimal,
    pub pct: Decimal,
}

/// Sum of market value across all holdings
pub fn compute_total(records: &[HoldingRecord]) -> Decimal {
    records.iter().map(|r| r.market_value).sum()
}

/// Sort by gain/loss percentage (worst first) and tag each holding whose
/// inclusive running gain/loss is still negative.
///
/// The sort is stable: holdings with equal percentages keep their input
/// order.
pub fn partition_for_sale(records: &[HoldingRecord]) -> Vec<TaggedHolding> {
    let mut order: Vec<(usize, &HoldingRecord)> = records.iter().enumerate().collect();
    order.sort_by(|(_, a), (_, b)| a.gain_loss_pct.cmp(&b.gain_loss_pct));

    let mut cumulative = Decimal::ZERO;
    order
        .into_iter()
        .map(|(source_index, holding)| {
            cumulative += holding.gain_loss_abs;
            TaggedHolding {
                holding: holding.clone(),
                source_index,
                cumulative_gain_loss: cumulative,
                sell: cumulative < Decimal::ZERO,
            }
        })
        .collect()
}

/// Aggregate the sell and keep groups as `(sell, keep)`.
///
/// Percentages are of `total`; a zero total reports 0% for both groups.
pub fn summarize(tagged: &[TaggedHolding], total: Decimal) -> (GroupSummary, GroupSummary) {
    let mut sell = GroupSummary::default();
    let mut keep = GroupSummary::default();

    for entry in tagged {
        let group = if entry.sell { &mut sell } else { &mut keep };
        group.count += 1;
        group.sum += entry.holding.market_value;
    }

    for group in [&mut sell, &mut keep] {
        group.pct = percent_of(group.sum, total);
    }

    (sell, keep)
}

/// Realized gain/loss if every tagged holding is sold
pub fn realized_loss(tagged: &[TaggedHolding]) -> Decimal {
    tagged
        .iter()
        .filter(|t| t.sell)
        .map(|t| t.holding.gain_loss_abs)
        .sum()
}

fn percent_of(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        Decimal::ONE_HUNDRED * part / total
    }
}

/// Complete harvest plan for one holdings report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestPlan {
    pub total: Decimal,
    /// All holdings in planner order
    pub holdings: Vec<TaggedHolding>,
    pub sell: GroupSummary,
    pub keep: GroupSummary,
    pub realized: Decimal,
}

impl HarvestPlan {
    pub fn build(records: &[HoldingRecord]) -> Self {
        let total = compute_total(records);
        let holdings = partition_for_sale(records);
        let (sell, keep) = summarize(&holdings, total);
        let realized = realized_loss(&holdings);

        debug!(
            "Planned {} holdings: sell {}, keep {}, realized {}",
            holdings.len(),
            sell.count,
            keep.count,
            realized
        );

        Self {
            total,
            holdings,
            sell,
            keep,
            realized,
        }
    }

    pub fn position_count(&self) -> usize {
        self.holdings.len()
    }

    /// Holdings to sell, worst percentage first
    pub fn to_sell(&self) -> impl Iterator<Item = &HoldingRecord> {
        self.holdings
            .iter()
            .filter(|t| t.sell)
            .map(|t| &t.holding)
    }

    pub fn has_sales(&self) -> bool {
        self.sell.count > 0
    }
}
