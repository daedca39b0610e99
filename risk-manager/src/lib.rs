pub mod config;
pub mod command;
pub mod event_engine;
pub mod order;
pub mod risk_control;
