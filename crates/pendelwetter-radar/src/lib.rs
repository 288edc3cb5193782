//! Radar timeline engine for Pendelwetter.
//!
//! Fetches the radar frame manifest, assembles the past+forecast frame
//! sequence, maps the shared location to a slippy-map tile at a fixed zoom,
//! and drives the scrubbable, auto-playing timeline.

pub mod engine;
pub mod manifest;
pub mod tile;
pub mod timeline;

pub use engine::{EngineSnapshot, RadarEngine};
pub use manifest::{RadarClient, RadarError, RadarFrame, RadarManifest};
pub use tile::{map_tile_url, radar_tile_url, tile_at, TileCoordinate};
pub use timeline::Timeline;
