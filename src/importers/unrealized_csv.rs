use anyhow::Context;
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::{ColumnNames, Config};
use crate::error::{HarvestError, Result};
use crate::planner::HoldingRecord;
use crate::utils::parse_amount;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Largest accepted cell magnitude (1e15). Sums and percentages over any
/// realistic number of rows stay inside `Decimal` range.
const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Parsed holdings report.
///
/// `records` keeps every source row that produced a holding, so the table
/// can be written back out; `holdings[i]` was parsed from `records[i]`.
#[derive(Debug, Clone)]
pub struct HoldingsTable {
    pub headers: StringRecord,
    pub columns: ColumnIndices,
    pub records: Vec<StringRecord>,
    pub holdings: Vec<HoldingRecord>,
}

/// Positions of the planner columns within `HoldingsTable::headers`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    pub symbol: usize,
    pub name: usize,
    pub market_value: usize,
    pub gain_loss_abs: usize,
    pub gain_loss_pct: usize,
}

/// Read an exported unrealized gains/losses CSV file
pub fn read_unrealized<P: AsRef<Path>>(file_path: P, config: &Config) -> Result<HoldingsTable> {
    let path = file_path.as_ref();
    info!("Parsing unrealized gains/losses file: {:?}", path);

    let bytes = fs::read(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let content = decode_bytes(&bytes);

    parse_unrealized_str(&content, config)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse report text.
///
/// Lines before the header row are ignored, as are footer rows (blank
/// symbol, or a symbol starting with "Total"/"Account Total").
pub fn parse_unrealized_str(content: &str, config: &Config) -> Result<HoldingsTable> {
    let names = &config.columns;
    let (cleaned, header_index) = strip_preamble(content, names, config.delimiter_byte())?;
    let delimiter = config
        .delimiter_byte()
        .unwrap_or_else(|| detect_delimiter(&cleaned));

    debug!(
        "Header found on line {}, delimiter {:?}",
        header_index + 1,
        delimiter as char
    );

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(cleaned.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();
    debug!("CSV headers: {:?}", headers);

    let columns = find_columns(&headers, names)?;
    debug!("Column mapping: {:?}", columns);

    let mut records = Vec::new();
    let mut holdings = Vec::new();
    let mut skipped = 0;

    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        let line = header_index
            + record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(records.len() + skipped + 2);

        match parse_row(&record, &columns, names, line)? {
            Some(holding) => {
                records.push(record);
                holdings.push(holding);
            }
            None => {
                debug!("Skipping non-holding row {}", line);
                skipped += 1;
            }
        }
    }

    info!(
        "Parsed {} holdings ({} rows skipped)",
        holdings.len(),
        skipped
    );

    Ok(HoldingsTable {
        headers,
        columns,
        records,
        holdings,
    })
}

/// Decode file bytes as UTF-8, falling back to Windows-1252
fn decode_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => {
            debug!("Input is not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Drop everything above the header row; returns the remaining text and
/// the 0-based line index of the header in the original content.
///
/// The header row is the first line with cells named like the Symbol and
/// Market Value columns, compared the same way `find_columns` does.
fn strip_preamble(
    content: &str,
    names: &ColumnNames,
    delimiter: Option<u8>,
) -> Result<(String, usize)> {
    let header_index = content
        .lines()
        .position(|line| {
            let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(line));
            split_cells(line, delimiter).is_some_and(|cells| {
                has_cell(&cells, &names.symbol) && has_cell(&cells, &names.market_value)
            })
        })
        .ok_or_else(|| HarvestError::HeaderNotFound {
            column: names.symbol.clone(),
        })?;

    let cleaned = content
        .lines()
        .skip(header_index)
        .collect::<Vec<_>>()
        .join("\n");
    Ok((cleaned, header_index))
}

fn split_cells(line: &str, delimiter: u8) -> Option<StringRecord> {
    ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(line.as_bytes())
        .records()
        .next()?
        .ok()
}

fn has_cell(cells: &StringRecord, column: &str) -> bool {
    cells.iter().any(|cell| cell.eq_ignore_ascii_case(column))
}

fn detect_delimiter(content: &str) -> u8 {
    let line = content.lines().next().unwrap_or("");
    let semicolons = line.matches(';').count();
    let commas = line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

fn find_columns(headers: &StringRecord, names: &ColumnNames) -> Result<ColumnIndices> {
    let find = |column: &str| -> Result<usize> {
        headers
            .iter()
            .position(|cell| cell.eq_ignore_ascii_case(column))
            .ok_or_else(|| {
                HarvestError::MissingColumn {
                    column: column.to_string(),
                }
                .into()
            })
    };

    Ok(ColumnIndices {
        symbol: find(&names.symbol)?,
        name: find(&names.name)?,
        market_value: find(&names.market_value)?,
        gain_loss_abs: find(&names.gain_loss_abs)?,
        gain_loss_pct: find(&names.gain_loss_pct)?,
    })
}

fn is_footer(symbol: &str) -> bool {
    let lower = symbol.to_lowercase();
    lower.starts_with("total") || lower.starts_with("account total")
}

fn parse_row(
    record: &StringRecord,
    columns: &ColumnIndices,
    names: &ColumnNames,
    line: usize,
) -> Result<Option<HoldingRecord>> {
    let symbol = record.get(columns.symbol).unwrap_or("");
    if symbol.is_empty() || is_footer(symbol) {
        return Ok(None);
    }

    let name = record.get(columns.name).unwrap_or("");
    let market_value = parse_field(record, columns.market_value, &names.market_value, line)?;
    let gain_loss_abs = parse_field(record, columns.gain_loss_abs, &names.gain_loss_abs, line)?;
    let gain_loss_pct = parse_field(record, columns.gain_loss_pct, &names.gain_loss_pct, line)?;

    if market_value < Decimal::ZERO {
        return Err(HarvestError::NegativeMarketValue {
            row: line,
            symbol: symbol.to_string(),
            value: market_value.to_string(),
        }
        .into());
    }

    Ok(Some(HoldingRecord::new(
        symbol,
        name,
        market_value,
        gain_loss_abs,
        gain_loss_pct,
    )))
}

fn parse_field(record: &StringRecord, idx: usize, column: &str, line: usize) -> Result<Decimal> {
    let text = record.get(idx).unwrap_or("");
    let value = parse_amount(text).ok_or_else(|| HarvestError::InvalidNumber {
        column: column.to_string(),
        row: line,
        value: text.to_string(),
    })?;

    if value.abs() > MAX_AMOUNT {
        return Err(HarvestError::AmountOutOfRange {
            column: column.to_string(),
            row: line,
            value: text.to_string(),
        }
        .into());
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const REPORT: &str = "\
Symbol,Name,Market Value,Day Change($),Day Change(%),Gain/Loss($),Gain/Loss(%)
AAA,Alpha Corp,$100.00,$1.00,1%,-$50.00,-10%
BBB,\"Beta, Inc\",\"$1,200.50\",$0.00,0%,$90.00,20%
";

    fn parse(content: &str) -> Result<HoldingsTable> {
        parse_unrealized_str(content, &Config::default())
    }

    #[test]
    fn test_parses_holdings() {
        let table = parse(REPORT).unwrap();

        assert_eq!(table.holdings.len(), 2);
        assert_eq!(table.records.len(), 2);
        assert_eq!(
            table.holdings[0],
            HoldingRecord::new("AAA", "Alpha Corp", dec!(100), dec!(-50), dec!(-10))
        );
        assert_eq!(table.holdings[1].name, "Beta, Inc");
        assert_eq!(table.holdings[1].market_value, dec!(1200.50));
        assert_eq!(table.columns.market_value, 2);
        assert_eq!(table.columns.gain_loss_pct, 6);
    }

    #[test]
    fn test_skips_preamble_and_footer() {
        let content = format!(
            "\"Positions for account Brokerage ...123 as of 04:10 PM ET\"\n\n{}\
Account Total,,\"$1,300.50\",,,$40.00,3%\n",
            REPORT
        );

        let table = parse(&content).unwrap();
        let symbols: Vec<&str> = table.holdings.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "BBB"]);
    }

    #[test]
    fn test_skips_blank_symbol_rows() {
        let content = format!("{},,,,,,\n", REPORT);
        let table = parse(&content).unwrap();
        assert_eq!(table.holdings.len(), 2);
    }

    #[test]
    fn test_semicolon_delimiter_detected() {
        let content = "\
Symbol;Name;Market Value;Gain/Loss($);Gain/Loss(%)
CCC;Gamma;$300.00;$40.00;8%
";
        let table = parse(content).unwrap();
        assert_eq!(table.holdings[0].gain_loss_pct, dec!(8));
    }

    #[test]
    fn test_missing_column_is_named() {
        let content = "Symbol,Name,Market Value,Gain/Loss($)\nAAA,Alpha,$1.00,$1.00\n";
        let err = parse(content).unwrap_err();

        match err.downcast_ref::<HarvestError>() {
            Some(HarvestError::MissingColumn { column }) => assert_eq!(column, "Gain/Loss(%)"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_header_not_found() {
        let err = parse("just,some,text\n1,2,3\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HarvestError>(),
            Some(HarvestError::HeaderNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_number_names_column_and_row() {
        let content = format!("junk line\n{}DDD,Delta,$5.00,,,--,1%\n", REPORT);
        let err = parse(&content).unwrap_err();

        match err.downcast_ref::<HarvestError>() {
            Some(HarvestError::InvalidNumber { column, row, value }) => {
                assert_eq!(column, "Gain/Loss($)");
                assert_eq!(*row, 5);
                assert_eq!(value, "--");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_negative_market_value_rejected() {
        let content = "\
Symbol,Name,Market Value,Gain/Loss($),Gain/Loss(%)
EEE,Epsilon,-$10.00,$1.00,1%
";
        let err = parse(content).unwrap_err();
        assert!(err.to_string().contains("negative market value for EEE at row 2"));
    }

    #[test]
    fn test_custom_column_names() {
        let mut config = Config::default();
        config.columns.symbol = "Ticker".to_string();
        config.columns.gain_loss_pct = "Return %".to_string();

        let content = "\
Ticker,Name,Market Value,Gain/Loss($),Return %
FFF,Foxtrot,$10.00,-$1.00,-9.09%
";
        let table = parse_unrealized_str(content, &config).unwrap();
        assert_eq!(table.holdings[0].symbol, "FFF");
        assert_eq!(table.holdings[0].gain_loss_pct, dec!(-9.09));
    }

    #[test]
    fn test_upper_case_header_is_found() {
        let content = "\
SYMBOL,NAME,MARKET VALUE,GAIN/LOSS($),GAIN/LOSS(%)
A,Alpha,$1.00,-$1.00,-1%
";
        let table = parse(content).unwrap();
        assert_eq!(table.holdings.len(), 1);
        assert_eq!(table.holdings[0].gain_loss_abs, dec!(-1.00));
    }

    #[test]
    fn test_preamble_mentioning_column_names_is_skipped() {
        let content = format!(
            "Sorted by Symbol; Market Value includes accrued interest\n{}",
            REPORT
        );
        let table = parse(&content).unwrap();
        let symbols: Vec<&str> = table.holdings.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "BBB"]);
    }

    #[test]
    fn test_huge_amount_rejected() {
        let content = "\
Symbol,Name,Market Value,Gain/Loss($),Gain/Loss(%)
HUGE,Huge Corp,$1.00,\"-$9,000,000,000,000,000,000,000,000\",-10%
";
        let err = parse(content).unwrap_err();
        match err.downcast_ref::<HarvestError>() {
            Some(HarvestError::AmountOutOfRange { column, row, .. }) => {
                assert_eq!(column, "Gain/Loss($)");
                assert_eq!(*row, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_windows_1252() {
        let bytes = b"Symbol,Name\nNES,Soci\xe9t\xe9 G\xe9n\xe9rale\n";
        let text = decode_bytes(bytes);
        assert!(text.contains("Société Générale"));
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let bytes = b"\xEF\xBB\xBFSymbol,Name\n";
        assert_eq!(decode_bytes(bytes), "Symbol,Name\n");
    }
}
