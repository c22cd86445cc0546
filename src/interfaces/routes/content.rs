use actix_web::web;

use crate::{
    entities::{
        document::ContentKind,
        experience::Experience,
        photo::Photo,
        project::{GameProject, WebsiteProject},
        tool::{Skill, Tech, Tool},
    },
    errors::AppError,
    handlers::content,
};

fn collection_routes<K: ContentKind>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(&format!("/{}", K::COLLECTION))
            .service(
                web::resource("")
                    .route(web::get().to(content::list_documents::<K>))
            )
            .service(
                web::resource("/live")
                    .route(web::get().to(content::live_documents::<K>))
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(content::get_document::<K>))
            )
    );
}

async fn unknown_collection() -> Result<&'static str, AppError> {
    Err(AppError::NotFound("Unknown collection".into()))
}

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/content")
            .configure(collection_routes::<WebsiteProject>)
            .configure(collection_routes::<GameProject>)
            .configure(collection_routes::<Experience>)
            .configure(collection_routes::<Tool>)
            .configure(collection_routes::<Skill>)
            .configure(collection_routes::<Tech>)
            .configure(collection_routes::<Photo>)
            .default_service(web::to(unknown_collection))
    );
}
