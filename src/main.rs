use std::net::TcpListener;

use env_logger::Env;
use garimpo::{
    configuration::get_configuration,
    services::{NicheStore, RegionDirectory, ScrapeController},
    startup::run,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;

    let regions =
        RegionDirectory::new(&configuration.region_api).expect("Invalid region lookup base url.");
    let niche_store = NicheStore::new(configuration.scrape.niches_path.clone());
    let controller = ScrapeController::new(configuration);

    run(listener, controller, regions, niche_store)?.await
}
