mod cors;
mod redirect;
mod shorten;
mod statics;

pub use cors::cors;
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use statics::{index_handler, static_handler};
