mod short_link;

pub use short_link::{redirect_handler, resolve_to_response, shorten_handler};
