pub mod archive;
pub mod cli;
pub mod config;
pub mod container;
pub mod crypto;
pub mod errors;
pub mod journal;
pub mod session;
