use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use crate::services::{ExportFormat, ScrapeController, StartError};

#[derive(Deserialize)]
pub struct StartScrapeBody {
    pub niches: Vec<String>,
    pub cities: Vec<String>,
    #[serde(default)]
    pub format: Option<ExportFormat>,
}

#[post("/start")]
async fn start_scrape(
    controller: web::Data<ScrapeController>,
    body: web::Json<StartScrapeBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let format = body.format.unwrap_or(ExportFormat::Xlsx);

    let controller = controller.into_inner();
    match controller.try_start(body.niches, body.cities, format) {
        Ok(job) => HttpResponse::Ok().json(serde_json::json!({
            "job_id": job.job_id.to_string(),
            "output_path": job.output_path.display().to_string(),
            "total_targets": job.total_targets,
        })),
        Err(StartError::AlreadyRunning) => {
            HttpResponse::Conflict().body("Já existe uma coleta em andamento")
        }
        Err(StartError::EmptySelection) => {
            HttpResponse::BadRequest().body("Adicione pelo menos um nicho e uma cidade")
        }
    }
}

#[post("/stop")]
async fn stop_scrape(controller: web::Data<ScrapeController>) -> HttpResponse {
    match controller.stop() {
        true => HttpResponse::Ok().body("Interrompendo após o alvo atual"),
        false => HttpResponse::Conflict().body("Nenhuma coleta em andamento"),
    }
}

#[get("/status")]
async fn scrape_status(controller: web::Data<ScrapeController>) -> HttpResponse {
    HttpResponse::Ok().json(controller.status())
}
