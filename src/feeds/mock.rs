use crate::feeds::market_data::Quote;

struct MockRow {
    symbol: &'static str,
    price: f64,
    change: f64,
    change_percent: f64,
    volume: u64,
    high: f64,
    low: f64,
    open: f64,
    previous_close: f64,
}

const MOCK_DAY: &str = "2024-06-09";

/// Demo quotes served when no API key is configured or the live source fails.
static MOCK_QUOTES: &[MockRow] = &[
    MockRow {
        symbol: "AAPL",
        price: 175.50,
        change: 2.30,
        change_percent: 1.33,
        volume: 45_678_900,
        high: 176.80,
        low: 173.20,
        open: 174.00,
        previous_close: 173.20,
    },
    MockRow {
        symbol: "MSFT",
        price: 420.15,
        change: -3.85,
        change_percent: -0.91,
        volume: 23_456_789,
        high: 425.00,
        low: 418.50,
        open: 424.00,
        previous_close: 424.00,
    },
    MockRow {
        symbol: "GOOGL",
        price: 2750.80,
        change: 15.60,
        change_percent: 0.57,
        volume: 1_234_567,
        high: 2760.00,
        low: 2735.00,
        open: 2740.00,
        previous_close: 2735.20,
    },
    MockRow {
        symbol: "TSLA",
        price: 185.25,
        change: -8.75,
        change_percent: -4.51,
        volume: 67_890_123,
        high: 195.00,
        low: 183.50,
        open: 194.00,
        previous_close: 194.00,
    },
    MockRow {
        symbol: "SPY",
        price: 525.40,
        change: 1.20,
        change_percent: 0.23,
        volume: 89_012_345,
        high: 526.50,
        low: 523.80,
        open: 524.20,
        previous_close: 524.20,
    },
];

/// Case-insensitive lookup in the demo table.
pub fn mock_quote(symbol: &str) -> Option<Quote> {
    MOCK_QUOTES
        .iter()
        .find(|row| row.symbol.eq_ignore_ascii_case(symbol))
        .map(|row| Quote {
            symbol: row.symbol.to_string(),
            price: row.price,
            change: row.change,
            change_percent: row.change_percent,
            volume: row.volume,
            high: row.high,
            low: row.low,
            open: row.open,
            previous_close: row.previous_close,
            timestamp: MOCK_DAY.to_string(),
        })
}

pub fn mock_symbols() -> impl Iterator<Item = &'static str> {
    MOCK_QUOTES.iter().map(|row| row.symbol)
}
