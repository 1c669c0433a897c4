pub mod constants;
pub mod page;

pub use constants::*;
pub use page::{current_url, settle, with_page_timeout};
