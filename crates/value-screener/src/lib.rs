//! Batch value screening: fetch, score and rank a list of symbols.

pub mod cache;
pub mod export;
pub mod report;
pub mod scanner;
pub mod universe;

pub use cache::{CachedProvider, FundamentalsCache};
pub use export::{save_csv, to_csv_string, write_csv, CSV_HEADERS};
pub use report::{render_table, render_top_picks};
pub use scanner::{rank, resolve_ticker, ScanReport, ScannerConfig, SkippedSymbol, ValueScreener};
pub use universe::StockUniverse;
