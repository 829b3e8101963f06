//! Service layer module

pub mod batch_service;
pub mod runner;
pub mod statistics;
pub mod types;

pub use batch_service::BatchService;
pub use runner::{BatchRunner, CancellationFlag, RunOptions};
pub use statistics::{AggregateStatistics, StatisticEntry, StatisticsAccumulator};
pub use types::*;
