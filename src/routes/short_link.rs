use actix_web::web;

use crate::handlers::{redirect_handler, shorten_handler};

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").route("/shorten", web::post().to(shorten_handler)));
    cfg.route("/s/{code}", web::get().to(redirect_handler));
}
