//! One module per subcommand, each exposing `execute`.

pub mod add;
pub mod check_password;
pub mod convert;
pub mod export;
pub mod images;
pub mod list;
pub mod new;
pub mod passwd;
pub mod remove;
pub mod show;
