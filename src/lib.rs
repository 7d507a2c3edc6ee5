pub mod config;
pub mod error;
pub mod form;
pub mod mapper;
pub mod reconciler;
pub mod registry;
pub mod schema;
pub mod service;
pub mod utils;
pub mod validation;
