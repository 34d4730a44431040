pub mod backtest;
pub mod display;
pub mod engine;
pub mod rules;
pub mod tracker;
