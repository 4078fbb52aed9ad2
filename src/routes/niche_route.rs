use actix_web::{get, put, web, HttpResponse};

use crate::services::NicheStore;

#[get("")]
async fn get_niches(store: web::Data<NicheStore>) -> HttpResponse {
    match store.load() {
        Ok(niches) => HttpResponse::Ok().json(niches),
        Err(e) => {
            log::error!("Failed to load the niche list: {:?}", e);
            HttpResponse::InternalServerError()
                .body(format!("Arquivo de nichos inválido: {}", e))
        }
    }
}

#[put("")]
async fn put_niches(store: web::Data<NicheStore>, body: web::Json<Vec<String>>) -> HttpResponse {
    match store.save(body.as_slice()) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => {
            log::error!("Failed to save the niche list: {:?}", e);
            HttpResponse::InternalServerError().body(format!("Erro ao salvar nichos: {}", e))
        }
    }
}
