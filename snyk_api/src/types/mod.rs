mod links;
pub use self::links::PaginatedLinks;

mod page;
pub use self::page::{decode_page, Page};

mod resource;
pub use self::resource::{Document, Resource};
