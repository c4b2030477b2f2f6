pub mod calculator;
pub mod config;
pub mod error;
pub mod expression;
pub mod task;

pub use calculator::{Calculator, Token};
pub use config::Config;
pub use error::*;
pub use expression::*;
pub use task::*;
