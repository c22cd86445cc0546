use actix_web::web;

use crate::{
    entities::{
        document::ContentKind,
        experience::Experience,
        photo::Photo,
        project::{GameProject, WebsiteProject},
        tool::{Skill, Tech, Tool},
    },
    handlers::{admin, content},
};

fn collection_routes<K: ContentKind>(cfg: &mut web::ServiceConfig) {
    let mut scope = web::scope(&format!("/{}", K::COLLECTION))
        .service(
            web::resource("")
                .route(web::post().to(content::create_document::<K>))
        )
        .service(
            web::resource("/submit")
                .route(web::post().to(content::submit_document::<K>))
        );

    if K::ACCEPTS_UPLOADS {
        scope = scope
            .service(
                web::resource("/submit/upload")
                    .route(web::post().to(content::submit_document_with_upload::<K>))
            )
            .service(
                web::resource("/uploads")
                    .route(web::post().to(content::upload_image::<K>))
            );
    }

    cfg.service(
        scope.service(
            web::resource("/{id}")
                .route(web::put().to(content::update_document::<K>))
                .route(web::delete().to(content::delete_document::<K>))
        )
    );
}

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(admin::store_status)
            .service(admin::dashboard_live)
            .configure(collection_routes::<WebsiteProject>)
            .configure(collection_routes::<GameProject>)
            .configure(collection_routes::<Experience>)
            .configure(collection_routes::<Tool>)
            .configure(collection_routes::<Skill>)
            .configure(collection_routes::<Tech>)
            .configure(collection_routes::<Photo>)
    );
}
