mod about;
mod bulk;
mod events;
mod health;
mod selection;
mod sessions;
mod stations;
mod waveforms;

pub use about::about;
pub use bulk::{bulk_download, bulk_status};
pub use events::{
    events_geojson, export_events, fetch_events, import_events, list_events, select_event,
    time_magnitude,
};
pub use health::health_check;
pub use selection::{get_selection, put_geographic_selection, put_mercator_selection};
pub use sessions::{create_session, delete_session};
pub use stations::{export_stations, import_stations, list_stations, search_stations, stations_geojson};
pub use waveforms::{export_mseed, export_sac, import_waveforms, list_waveforms, plot_station};
