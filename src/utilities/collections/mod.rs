mod index_set;
pub use self::index_set::*;
