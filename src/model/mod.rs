//! # Record Model
//!
//! Plain data types shared by the schema, the store and the propagation
//! engine. This module is pure data — no I/O, no state, no async.

pub mod record;
pub mod value;
pub mod property_map;

pub use record::{Record, RecordId, RecordRef};
pub use value::{Value, is_blank};
pub use property_map::PropertyMap;
