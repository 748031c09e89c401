//! Domain records and the validated inputs that create them.

mod category;
mod post;
mod product;

pub use category::{default_url_path, CategoryInput, CategoryRecord, CategoryRef, CategoryStats};
pub use post::{Post, PostInput};
pub use product::{Product, ProductInput, Specification, Variant};
