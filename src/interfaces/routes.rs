use actix_web::web;

use crate::handlers::{home::home, system::health_check};

mod admin;
mod contact;
mod content;
mod json_error;
mod media;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(health_check);

    cfg.configure(contact::config_routes);
    cfg.configure(media::config_routes);

    cfg.service(
        web::scope("/api/v1")
            .configure(content::config_routes)
            .configure(admin::config_routes)
    );

    cfg.configure(json_error::config_routes);
}
