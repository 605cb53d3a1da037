//! Common types used across the application.

pub mod dates;
pub mod id;
pub mod money;
pub mod pagination;

pub use dates::{format_br_date, parse_br_date};
pub use id::*;
pub use money::{Currency, Money};
pub use pagination::{PageRequest, PageResponse};
