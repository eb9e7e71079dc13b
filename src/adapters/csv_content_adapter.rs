//! Widget content backed by a quotes CSV file.
//!
//! Expected header: `symbol,last,change`. The watchlist lists every quote in
//! file order and the screener ranks them by change; other widgets show
//! their label.

use crate::domain::error::TradeboardError;
use crate::domain::widget::WidgetId;
use crate::ports::content_port::ContentPort;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const SCREENER_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub last: f64,
    pub change: f64,
}

#[derive(Debug)]
pub struct CsvContentAdapter {
    quotes: Vec<Quote>,
}

impl CsvContentAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradeboardError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| invalid(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_csv(&content)
    }

    pub fn from_csv(content: &str) -> Result<Self, TradeboardError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut quotes = Vec::new();
        for result in rdr.deserialize() {
            let quote: Quote = result.map_err(|e| invalid(format!("CSV parse error: {}", e)))?;
            quotes.push(quote);
        }
        Ok(Self { quotes })
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    fn watchlist(&self) -> String {
        if self.quotes.is_empty() {
            return "(no quotes)".to_string();
        }
        self.quotes
            .iter()
            .map(format_quote)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn screener(&self) -> String {
        let mut ranked: Vec<&Quote> = self.quotes.iter().collect();
        ranked.sort_by(|a, b| b.change.total_cmp(&a.change));
        if ranked.is_empty() {
            return "(no quotes)".to_string();
        }
        ranked
            .into_iter()
            .take(SCREENER_ROWS)
            .map(format_quote)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ContentPort for CsvContentAdapter {
    fn render(&self, widget: WidgetId) -> String {
        match widget {
            WidgetId::Watchlist => self.watchlist(),
            WidgetId::Screener => self.screener(),
            other => format!("[{}]", other.label()),
        }
    }
}

fn format_quote(q: &Quote) -> String {
    format!("{:<8} {:>10.2} {:>+7.2}%", q.symbol, q.last, q.change)
}

fn invalid(reason: String) -> TradeboardError {
    TradeboardError::ConfigInvalid {
        section: "content".into(),
        key: "quotes".into(),
        reason,
    }
}
