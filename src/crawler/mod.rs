pub mod collection;

pub use collection::{collection_id_for, discover, scan_collection};
