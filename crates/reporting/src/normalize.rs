//! Schema normalization — turns the three platform logs and the business log
//! into typed records, validated at the boundary.
//!
//! A malformed source aborts the whole normalization; there is no partial
//! recovery.

use campaign_intel_core::{
    BusinessRecord, IntelError, IntelResult, MarketingRecord, Platform, RawTable, SourceTables,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

// ─── Column specs ───────────────────────────────────────────────────────────

/// A required column and the header spellings accepted for it.
struct ColumnSpec {
    name: &'static str,
    aliases: &'static [&'static str],
}

const fn col(name: &'static str, aliases: &'static [&'static str]) -> ColumnSpec {
    ColumnSpec { name, aliases }
}

const MARKETING_COLUMNS: [ColumnSpec; 8] = [
    col("date", &[]),
    col("tactic", &[]),
    col("state", &[]),
    col("campaign", &[]),
    col("impressions", &["impression"]),
    col("clicks", &[]),
    col("spend", &[]),
    col("attributed_revenue", &["attributed revenue"]),
];

const BUSINESS_COLUMNS: [ColumnSpec; 7] = [
    col("date", &[]),
    col("orders", &["# of orders"]),
    col("new_orders", &["# of new orders"]),
    col("new_customers", &["new customers"]),
    col("total_revenue", &["total revenue"]),
    col("gross_profit", &["gross profit"]),
    col("cogs", &[]),
];

const BUSINESS_SOURCE: &str = "Business";

/// Resolved header positions for one table.
struct ColumnIndex {
    positions: Vec<usize>,
}

impl ColumnIndex {
    fn resolve(source: &str, table: &RawTable, specs: &[ColumnSpec]) -> IntelResult<Self> {
        let headers: Vec<String> = table
            .headers
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();

        let mut positions = Vec::with_capacity(specs.len());
        for spec in specs {
            let found = headers.iter().position(|h| {
                h == spec.name || spec.aliases.iter().any(|a| h == &a.to_ascii_lowercase())
            });
            match found {
                Some(pos) => positions.push(pos),
                None => {
                    return Err(IntelError::data_load(
                        source,
                        format!("missing required column '{}'", spec.name),
                    ))
                }
            }
        }
        Ok(Self { positions })
    }

    fn cell<'a>(&self, row: &'a [String], column: usize) -> Option<&'a str> {
        self.positions
            .get(column)
            .and_then(|pos| row.get(*pos))
            .map(String::as_str)
    }
}

// ─── Cell parsing ───────────────────────────────────────────────────────────

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .map_err(|_| format!("invalid date '{raw}'"))
}

fn parse_number(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return Err("empty value".to_string());
    }
    let value: f64 = cleaned
        .parse()
        .map_err(|_| format!("invalid number '{}'", raw.trim()))?;
    if !value.is_finite() {
        return Err(format!("non-finite number '{}'", raw.trim()));
    }
    Ok(value)
}

fn parse_amount(raw: &str) -> Result<f64, String> {
    let value = parse_number(raw)?;
    if value < 0.0 {
        return Err(format!("negative amount '{}'", raw.trim()));
    }
    Ok(value)
}

fn parse_count(raw: &str) -> Result<u64, String> {
    let value = parse_amount(raw)?;
    if value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(format!("invalid count '{}'", raw.trim()));
    }
    Ok(value as u64)
}

/// Tracks which row is being read so failures point at the offending cell.
struct RowContext<'a> {
    source: &'a str,
    index: &'a ColumnIndex,
    specs: &'a [ColumnSpec],
    row: &'a [String],
    line: usize,
}

impl RowContext<'_> {
    fn error(&self, column: usize, reason: impl std::fmt::Display) -> IntelError {
        let name = self.specs.get(column).map_or("?", |spec| spec.name);
        IntelError::data_load(
            self.source,
            format!("row {}, column '{name}': {reason}", self.line),
        )
    }

    fn raw(&self, column: usize) -> IntelResult<&str> {
        self.index
            .cell(self.row, column)
            .ok_or_else(|| self.error(column, "missing cell"))
    }

    fn get<T>(&self, column: usize, parse: fn(&str) -> Result<T, String>) -> IntelResult<T> {
        parse(self.raw(column)?).map_err(|reason| self.error(column, reason))
    }

    fn text(&self, column: usize) -> IntelResult<String> {
        Ok(self.raw(column)?.trim().to_string())
    }
}

fn check_width(source: &str, table: &RawTable, row: &[String], line: usize) -> IntelResult<()> {
    if row.len() != table.headers.len() {
        return Err(IntelError::data_load(
            source,
            format!(
                "row {line} has {} cells, expected {}",
                row.len(),
                table.headers.len()
            ),
        ));
    }
    Ok(())
}

// ─── Normalizers ────────────────────────────────────────────────────────────

/// Normalize one platform log, tagging every row with `platform`.
pub fn normalize_platform(platform: Platform, table: &RawTable) -> IntelResult<Vec<MarketingRecord>> {
    let source = platform.as_str();
    let index = ColumnIndex::resolve(source, table, &MARKETING_COLUMNS)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let line = i + 1;
        check_width(source, table, row, line)?;
        let ctx = RowContext {
            source,
            index: &index,
            specs: &MARKETING_COLUMNS,
            row,
            line,
        };
        records.push(MarketingRecord {
            date: ctx.get(0, parse_date)?,
            platform,
            tactic: ctx.text(1)?,
            state: ctx.text(2)?,
            campaign: ctx.text(3)?,
            impressions: ctx.get(4, parse_count)?,
            clicks: ctx.get(5, parse_count)?,
            spend: ctx.get(6, parse_amount)?,
            attributed_revenue: ctx.get(7, parse_amount)?,
        });
    }
    Ok(records)
}

/// Concatenate the three platform logs in source order (Facebook, Google,
/// TikTok), preserving row order within each.
pub fn normalize_marketing(tables: &SourceTables) -> IntelResult<Vec<MarketingRecord>> {
    let mut all = Vec::new();
    for (platform, table) in tables.marketing() {
        let records = normalize_platform(platform, table)?;
        debug!(platform = %platform, rows = records.len(), "Normalized platform log");
        all.extend(records);
    }
    Ok(all)
}

/// Normalize the business log. Dates must be unique.
pub fn normalize_business(table: &RawTable) -> IntelResult<Vec<BusinessRecord>> {
    let index = ColumnIndex::resolve(BUSINESS_SOURCE, table, &BUSINESS_COLUMNS)?;

    let mut seen = HashSet::with_capacity(table.rows.len());
    let mut records = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let line = i + 1;
        check_width(BUSINESS_SOURCE, table, row, line)?;
        let ctx = RowContext {
            source: BUSINESS_SOURCE,
            index: &index,
            specs: &BUSINESS_COLUMNS,
            row,
            line,
        };
        let record = BusinessRecord {
            date: ctx.get(0, parse_date)?,
            orders: ctx.get(1, parse_count)?,
            new_orders: ctx.get(2, parse_count)?,
            new_customers: ctx.get(3, parse_count)?,
            total_revenue: ctx.get(4, parse_amount)?,
            gross_profit: ctx.get(5, parse_number)?,
            cogs: ctx.get(6, parse_amount)?,
        };
        if !seen.insert(record.date) {
            return Err(IntelError::data_load(
                BUSINESS_SOURCE,
                format!("row {line}: duplicate date {}", record.date),
            ));
        }
        records.push(record);
    }
    debug!(rows = records.len(), "Normalized business log");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MKT_HEADERS: [&str; 8] = [
        "date",
        "tactic",
        "state",
        "campaign",
        "impression",
        "clicks",
        "spend",
        "attributed revenue",
    ];

    fn platform_table(name: &str, rows: &[&[&str]]) -> RawTable {
        RawTable::from_rows(name, &MKT_HEADERS, rows)
    }

    #[test]
    fn test_platform_rows_are_typed_and_tagged() {
        let table = platform_table(
            "Google",
            &[&["2024-05-01", "Search", "NY", "Brand", "1,200", "30", "$45.50", "100"]],
        );
        let records = normalize_platform(Platform::Google, &table).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.platform, Platform::Google);
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(r.impressions, 1200);
        assert_eq!(r.clicks, 30);
        assert!((r.spend - 45.5).abs() < f64::EPSILON);
        assert_eq!(r.campaign, "Brand");
    }

    #[test]
    fn test_concatenation_preserves_source_order() {
        let tables = SourceTables {
            facebook: platform_table(
                "Facebook",
                &[
                    &["2024-05-02", "ASC", "CA", "f1", "10", "1", "1", "1"],
                    &["2024-05-01", "ASC", "CA", "f2", "10", "1", "1", "1"],
                ],
            ),
            google: platform_table("Google", &[&["2024-05-01", "Search", "CA", "g1", "10", "1", "1", "1"]]),
            tiktok: platform_table("TikTok", &[&["2024-05-01", "Spark", "CA", "t1", "10", "1", "1", "1"]]),
            business: RawTable::default(),
        };
        let records = normalize_marketing(&tables).unwrap();
        let campaigns: Vec<_> = records.iter().map(|r| r.campaign.as_str()).collect();
        assert_eq!(campaigns, vec!["f1", "f2", "g1", "t1"]);
        assert_eq!(records[3].platform, Platform::TikTok);
    }

    #[test]
    fn test_missing_column_names_the_source() {
        let table = RawTable::from_rows("TikTok", &["date", "tactic"], &[]);
        let tables = SourceTables {
            facebook: platform_table("Facebook", &[]),
            google: platform_table("Google", &[]),
            tiktok: table,
            business: RawTable::default(),
        };
        let err = normalize_marketing(&tables).unwrap_err();
        assert_eq!(err.source_name(), Some("TikTok"));
        assert!(err.to_string().contains("missing required column 'state'"));
    }

    #[test]
    fn test_bad_number_aborts() {
        let table = platform_table(
            "Facebook",
            &[&["2024-05-01", "ASC", "CA", "f1", "ten", "1", "1", "1"]],
        );
        let err = normalize_platform(Platform::Facebook, &table).unwrap_err();
        assert!(err.to_string().contains("row 1, column 'impressions'"));
    }

    #[test]
    fn test_ragged_row_aborts() {
        let table = platform_table("Facebook", &[&["2024-05-01", "ASC"]]);
        assert!(normalize_platform(Platform::Facebook, &table).is_err());
    }

    #[test]
    fn test_short_row_reports_missing_cell() {
        let table = platform_table("TikTok", &[]);
        let index = ColumnIndex::resolve("TikTok", &table, &MARKETING_COLUMNS).unwrap();
        let row = vec!["2024-05-01".to_string(), "Spark".to_string()];
        assert_eq!(index.cell(&row, 1), Some("Spark"));
        assert_eq!(index.cell(&row, 7), None);
        assert_eq!(index.cell(&row, 99), None);

        let ctx = RowContext {
            source: "TikTok",
            index: &index,
            specs: &MARKETING_COLUMNS,
            row: &row,
            line: 4,
        };
        assert_eq!(ctx.text(1).unwrap(), "Spark");
        let err = ctx.get(6, parse_amount).unwrap_err();
        assert_eq!(err.source_name(), Some("TikTok"));
        assert!(err.to_string().contains("row 4, column 'spend': missing cell"));
    }

    #[test]
    fn test_negative_spend_rejected() {
        let table = platform_table(
            "Facebook",
            &[&["2024-05-01", "ASC", "CA", "f1", "10", "1", "-5", "1"]],
        );
        assert!(normalize_platform(Platform::Facebook, &table).is_err());
    }

    #[test]
    fn test_business_aliases_and_negative_profit() {
        let table = RawTable::from_rows(
            "Business",
            &[
                "date",
                "# of orders",
                "# of new orders",
                "new customers",
                "total revenue",
                "gross profit",
                "COGS",
            ],
            &[&["05/01/2024", "10", "4", "3", "500", "-20", "520"]],
        );
        let records = normalize_business(&table).unwrap();
        assert_eq!(records[0].orders, 10);
        assert_eq!(records[0].new_customers, 3);
        assert!((records[0].gross_profit + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_business_duplicate_date_rejected() {
        let headers = [
            "date",
            "orders",
            "new_orders",
            "new_customers",
            "total_revenue",
            "gross_profit",
            "cogs",
        ];
        let table = RawTable::from_rows(
            "Business",
            &headers,
            &[
                &["2024-05-01", "1", "1", "1", "1", "1", "1"],
                &["2024-05-01", "1", "1", "1", "1", "1", "1"],
            ],
        );
        let err = normalize_business(&table).unwrap_err();
        assert_eq!(err.source_name(), Some("Business"));
        assert!(err.to_string().contains("duplicate date"));
    }

    #[test]
    fn test_fractional_count_rejected() {
        assert!(parse_count("12.0").is_ok());
        assert!(parse_count("12.5").is_err());
    }
}
