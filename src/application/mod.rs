pub mod context;
pub mod dto;
pub mod ports;
pub mod query;
pub mod services;
pub mod use_cases;
