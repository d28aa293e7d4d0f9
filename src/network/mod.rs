pub mod handlers;

pub use handlers::{HtmlResponse, NetworkControl};
