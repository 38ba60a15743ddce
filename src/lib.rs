pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod output;
pub mod parser;
pub mod report;
pub mod series;
pub mod stats;
