//! Content module - view models shaped from CMS documents

mod page;
mod post;

pub use page::Page;
pub use post::{parse_publication_date, ContentSection, PostDetail, PostSummary, TextBlock};
