use anyhow::Result;
use std::sync::Arc;

use pendelwetter_core::Config;
use pendelwetter_location::geolocate::IP_LOOKUP_URL;
use pendelwetter_location::{
    Geocoder, GeolocationOptions, IpLookupProvider, LocationStorage, LocationStore,
};
use pendelwetter_radar::{tile_at, RadarEngine};
use pendelwetter_weather::{best_slot, plan_departures, ForecastClient};

#[tokio::main]
async fn main() -> Result<()> {
    pendelwetter_core::init()?;
    let (config, _validation) = Config::load_validated()?;

    std::fs::create_dir_all(config.data_dir())?;
    let storage = LocationStorage::new(config.data_dir().join("location.db"))?;
    let provider = Arc::new(IpLookupProvider::new(IP_LOOKUP_URL)?);
    let geocoder = Geocoder::new(
        config.weather.geocoding_url.as_str(),
        config.weather.language.as_str(),
    )?;
    let store = Arc::new(LocationStore::open(
        storage,
        provider,
        geocoder,
        GeolocationOptions::default(),
    ));

    // The configured default place only applies until any GPS or manual
    // location was ever stored.
    let state = store.state();
    let (lat, lon, label) = match state.coordinates() {
        Some((lat, lon)) => (lat, lon, state.city_label.clone()),
        None => (
            config.location.lat,
            config.location.lon,
            config.location.label.clone(),
        ),
    };
    tracing::info!(%label, lat, lon, "Starting with location");

    let engine = RadarEngine::new(&config.radar, Arc::clone(&store))?;
    engine.refresh().await;

    println!("Pendelwetter — {}", label);

    let tile = tile_at(lat, lon, config.radar.zoom);
    println!("Kartenkachel: z{}/{}/{}", tile.zoom, tile.x, tile.y);

    let snapshot = engine.snapshot();
    match (&snapshot.timeline, &snapshot.fetch_error) {
        (Some(timeline), _) => println!(
            "Radar: {} Bilder, {}",
            timeline.frame_count(),
            timeline.status_text()
        ),
        (None, Some(message)) => println!("Radar: {}", message),
        (None, None) => {}
    }

    let weather = ForecastClient::new(config.weather.forecast_url.as_str())?;
    match weather.fetch(lat, lon).await {
        Ok(bundle) => {
            println!(
                "Jetzt: {:.1} °C, {}",
                bundle.current.temperature_c,
                bundle.current.condition.description()
            );

            let now = chrono::Local::now().naive_local();
            let slots = plan_departures(&bundle.hours, now, &[0, 30, 60, 90]);
            if let Some(best) = best_slot(&slots) {
                println!(
                    "Beste Abfahrt: in {} Min ({})",
                    best.offset_minutes,
                    best.condition.description()
                );
            }
        }
        Err(e) => {
            tracing::warn!("Weather fetch failed: {}", e);
            println!("{}", e.user_message());
        }
    }

    Ok(())
}
