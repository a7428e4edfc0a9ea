//! Helper functions for templates

mod date;
mod url;

pub use self::date::*;
pub use self::url::*;
