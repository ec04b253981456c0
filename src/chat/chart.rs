//! Chart derivation from markdown query results
//!
//! A query tool that answers with a pipe-delimited markdown table can be
//! rendered as a Chart.js chart. Anything that is not a usable table yields
//! `None`.

use serde::{Deserialize, Serialize};

const PRIMARY_COLOR: &str = "#4F7DF3";
const PIE_PALETTE: [&str; 8] = [
    "#4F7DF3", "#ff6384", "#36a2eb", "#ffce56", "#4bc0c0", "#9966ff", "#ff9f40", "#ff6384",
];
const PIE_MAX_ROWS: usize = 6;
const TIME_WORDS: [&str; 4] = ["time", "date", "year", "month"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
}

/// Chart.js-shaped chart description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub title: String,
    pub data: ChartBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBody {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Colors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Colors {
    Single(String),
    Palette(Vec<String>),
}

struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn split_row(line: &str) -> Option<Vec<String>> {
    let line = line.trim();
    let inner = line.strip_prefix('|')?.strip_suffix('|')?;
    Some(inner.split('|').map(|cell| cell.trim().to_string()).collect())
}

fn parse_table(text: &str) -> Option<Table> {
    if text.trim().len() < 10 {
        return None;
    }

    let lines: Vec<&str> = text
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty() && line.contains('|'))
        .collect();
    if lines.len() < 3 {
        return None;
    }

    let headers = split_row(lines[0])?;
    // lines[1] is the separator row
    let rows: Vec<Vec<String>> = lines[2..]
        .iter()
        .filter_map(|line| split_row(line))
        .filter(|row| row.len() == headers.len())
        .collect();

    if rows.is_empty() || headers.len() < 2 {
        return None;
    }
    Some(Table { headers, rows })
}

fn is_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

/// Derive a chart from a tool's text result
pub fn derive_chart(text: &str) -> Option<ChartData> {
    let table = parse_table(text)?;

    let numeric: Vec<usize> = (0..table.headers.len())
        .filter(|&col| table.rows.iter().all(|row| is_numeric(&row[col])))
        .collect();

    let label_col = 0;
    let mut value_col = *numeric.first()?;
    if value_col == 0 && numeric.len() > 1 {
        value_col = numeric[1];
    }

    let labels: Vec<String> = table.rows.iter().map(|row| row[label_col].clone()).collect();
    let values: Vec<f64> = table
        .rows
        .iter()
        .filter_map(|row| row[value_col].parse::<f64>().ok())
        .collect();

    let value_header = &table.headers[value_col];
    let chart_type = if table.rows.len() <= PIE_MAX_ROWS {
        ChartType::Pie
    } else if TIME_WORDS.iter().any(|w| value_header.to_lowercase().contains(w)) {
        ChartType::Line
    } else {
        ChartType::Bar
    };

    let dataset = match chart_type {
        ChartType::Pie => Dataset {
            label: value_header.clone(),
            background_color: Colors::Palette(
                PIE_PALETTE.iter().take(values.len()).map(|c| c.to_string()).collect(),
            ),
            border_color: None,
            border_width: 0,
            data: values,
        },
        _ => Dataset {
            label: value_header.clone(),
            background_color: Colors::Single(PRIMARY_COLOR.to_string()),
            border_color: Some(PRIMARY_COLOR.to_string()),
            border_width: 1,
            data: values,
        },
    };

    log::debug!("Derived {:?} chart with {} points", chart_type, labels.len());

    Some(ChartData {
        chart_type,
        title: format!("{} by {}", value_header, table.headers[label_col]),
        data: ChartBody {
            labels,
            datasets: vec![dataset],
        },
    })
}
