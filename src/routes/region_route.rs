use actix_web::{get, web, HttpResponse};

use crate::services::RegionDirectory;

#[get("/estados")]
async fn list_states(regions: web::Data<RegionDirectory>) -> HttpResponse {
    HttpResponse::Ok().json(regions.list_states().await)
}

#[get("/estados/{sigla}/municipios")]
async fn list_municipalities(
    regions: web::Data<RegionDirectory>,
    sigla: web::Path<String>,
) -> HttpResponse {
    HttpResponse::Ok().json(regions.list_municipalities(sigla.as_str()).await)
}

#[get("/municipios")]
async fn list_all_municipalities(regions: web::Data<RegionDirectory>) -> HttpResponse {
    HttpResponse::Ok().json(regions.list_all_municipalities().await)
}
