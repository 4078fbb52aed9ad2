use actix_web::{get, HttpResponse, Responder};

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().body(concat!("garimpo ", env!("CARGO_PKG_VERSION")))
}
