pub mod alpaca;
mod coerce;
pub mod error;
mod http;
pub mod provider;
pub mod yahoo;
