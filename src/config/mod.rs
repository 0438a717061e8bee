//! Configuration loaded from `.journalbear.toml`.

pub mod settings;

pub use settings::Settings;
