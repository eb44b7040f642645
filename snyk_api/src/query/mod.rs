mod common;
pub use self::common::{BaseOptions, Query};

mod list;
pub use self::list::ListOptions;
