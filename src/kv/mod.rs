//! Plain key-value objects: fetching, storing, and deleting them.

mod delete;
mod fetch;
mod object;
mod store;

pub use self::delete::{DeleteValue, DeleteValueBuilder, DeleteValueOptions};
pub use self::fetch::{FetchValue, FetchValueBuilder, FetchValueOptions, FetchValueResponse};
pub use self::object::{Link, Object, Pair};
pub use self::store::{StoreValue, StoreValueBuilder, StoreValueOptions, StoreValueResponse};
