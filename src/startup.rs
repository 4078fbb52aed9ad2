use std::net::TcpListener;

use actix_web::{
    dev::Server,
    middleware::Logger,
    web::{self, Data},
    App, HttpServer,
};

use crate::{
    routes::{default_route, niche_route, region_route, scrape_route},
    services::{NicheStore, RegionDirectory, ScrapeController},
};

pub fn run(
    listener: TcpListener,
    controller: ScrapeController,
    regions: RegionDirectory,
    niche_store: NicheStore,
) -> Result<Server, std::io::Error> {
    let controller = Data::new(controller);
    let regions = Data::new(regions);
    let niche_store = Data::new(niche_store);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(
                web::scope("/regions")
                    .service(region_route::list_states)
                    .service(region_route::list_municipalities)
                    .service(region_route::list_all_municipalities),
            )
            .service(
                web::scope("/niches")
                    .service(niche_route::get_niches)
                    .service(niche_route::put_niches),
            )
            .service(
                web::scope("/scrape")
                    .service(scrape_route::start_scrape)
                    .service(scrape_route::stop_scrape)
                    .service(scrape_route::scrape_status),
            )
            .app_data(controller.clone())
            .app_data(regions.clone())
            .app_data(niche_store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
