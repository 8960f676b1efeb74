#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cli;
mod error;
pub mod extract;
pub mod files;
pub mod process;
pub mod settings;
pub mod util;
pub use error::{Error, Result};
