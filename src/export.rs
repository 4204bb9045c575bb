use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CreateTradeInput, Direction, Trade};

/// Column order of the export, equal to the trade field names. Screenshots
/// are deliberately not part of the CSV surface.
const COLUMNS: [&str; 14] = [
    "id",
    "date",
    "instrument",
    "direction",
    "entry",
    "exit",
    "position",
    "pnl",
    "tags",
    "session",
    "timeframe",
    "psychology",
    "notes",
    "risk",
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing CSV column: {0}")]
    MissingColumn(String),
}

/// Result of parsing a CSV file. Rows that fail to parse are reported, not
/// fatal; the good rows still come through.
#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub trades: Vec<CreateTradeInput>,
    pub errors: Vec<String>,
}

/// Outcome of applying a parsed CSV to a store, mirroring what the import
/// screen shows the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicates: usize,
    pub errors: Vec<String>,
}

/// Writes the trade collection as CSV: one header row in stable column
/// order, one row per trade. Tags join with `;` inside a single field;
/// comma-bearing strings are quoted by the writer.
pub fn write_trades_csv<W: Write>(writer: W, trades: &[Trade]) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(COLUMNS)?;

    for trade in trades {
        out.write_record([
            trade.id.to_string(),
            trade.date.format("%Y-%m-%d").to_string(),
            trade.instrument.clone(),
            trade.direction.to_string(),
            trade.entry.to_string(),
            trade.exit.to_string(),
            trade.position.to_string(),
            trade.pnl.to_string(),
            trade.tags.join(";"),
            trade.session.clone().unwrap_or_default(),
            trade.timeframe.clone().unwrap_or_default(),
            trade.psychology.clone().unwrap_or_default(),
            trade.notes.clone().unwrap_or_default(),
            trade.risk.map(|r| r.to_string()).unwrap_or_default(),
        ])?;
    }

    out.flush()?;
    Ok(())
}

/// Parses trades back out of the CSV shape produced by
/// [`write_trades_csv`]. Numeric fields that fail to parse become 0, the
/// same normalization the store applies at write time; rows with an
/// unusable direction or missing date are reported per row.
pub fn read_trades_csv<R: Read>(reader: R) -> Result<ParsedCsv, ExportError> {
    let mut input = csv::Reader::from_reader(reader);

    let headers = input.headers()?.clone();
    let column = |name: &str| -> Result<usize, ExportError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ExportError::MissingColumn(name.to_string()))
    };

    let id_col = column("id")?;
    let date_col = column("date")?;
    let instrument_col = column("instrument")?;
    let direction_col = column("direction")?;
    let entry_col = column("entry")?;
    let exit_col = column("exit")?;
    let position_col = column("position")?;
    let pnl_col = column("pnl")?;
    let tags_col = column("tags")?;
    let session_col = headers.iter().position(|h| h == "session");
    let timeframe_col = headers.iter().position(|h| h == "timeframe");
    let psychology_col = headers.iter().position(|h| h == "psychology");
    let notes_col = headers.iter().position(|h| h == "notes");
    let risk_col = headers.iter().position(|h| h == "risk");

    let mut parsed = ParsedCsv::default();

    for (row, record) in input.records().enumerate() {
        let line = row + 2; // 1-based, after the header row
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                parsed.errors.push(format!("line {}: {}", line, e));
                continue;
            }
        };

        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let optional = |idx: Option<usize>| {
            idx.map(|i| field(i))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let direction = match field(direction_col).parse::<Direction>() {
            Ok(direction) => direction,
            Err(e) => {
                parsed.errors.push(format!("line {}: {}", line, e));
                continue;
            }
        };

        let tags: Vec<String> = field(tags_col)
            .split(';')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        parsed.trades.push(CreateTradeInput {
            id: field(id_col).parse().unwrap_or(0),
            date: field(date_col).to_string(),
            instrument: field(instrument_col).to_string(),
            direction,
            entry: parse_number(field(entry_col)),
            exit: parse_number(field(exit_col)),
            position: parse_number(field(position_col)),
            pnl: parse_number(field(pnl_col)),
            tags,
            session: optional(session_col),
            timeframe: optional(timeframe_col),
            psychology: optional(psychology_col),
            notes: optional(notes_col),
            risk: optional(risk_col).map(|r| parse_number(&r)),
            screenshots: None,
        });
    }

    Ok(parsed)
}

fn parse_number(raw: &str) -> f64 {
    let value: f64 = raw.parse().unwrap_or(0.0);
    if value.is_finite() { value } else { 0.0 }
}
