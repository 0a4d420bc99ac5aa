/// CSV export of plot data.
pub mod export;
