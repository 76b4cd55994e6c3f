pub mod error;
pub mod response;
pub mod routes;
pub mod service;

#[cfg(test)]
pub(crate) mod fixture;
