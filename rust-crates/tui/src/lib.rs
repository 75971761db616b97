pub mod client;
pub mod config;
pub mod contract;
pub mod errors;
pub mod game;
pub mod logging;
pub mod provider;
pub mod ui;
pub mod wallets;
