#![forbid(unsafe_code)]

//! Reference data for freightdesk widgets.
//!
//! - [`option`]: the normalized [`SelectOption`] every selector renders.
//! - [`adapter`]: turning typed records or loose JSON into options.
//! - [`records`]: parties, carriers, ports, transport modes and users as the
//!   backend sends them.
//! - [`feed`]: default list plus debounced search results for one selector.

pub mod adapter;
pub mod feed;
pub mod option;
pub mod records;

pub use adapter::{FieldExtra, FieldMap, OptionSource, normalize, normalize_value, records_in};
pub use feed::{FetchRequest, OptionFeed};
pub use option::{OptionFields, SelectOption};
