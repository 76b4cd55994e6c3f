pub mod bar;
pub mod error;
pub mod history;
pub mod quote;
pub mod symbol;
