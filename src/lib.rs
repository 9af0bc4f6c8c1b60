pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod init;
pub mod models;
pub mod services;
pub mod utils;
pub mod vocabulary;

pub use error::ClassifierError;
