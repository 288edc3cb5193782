//! Slippy-map tile math and tile URL construction.
//!
//! The projection must match standard tile-server addressing exactly so the
//! radar overlay aligns with the base map pixel-for-pixel.

use std::f64::consts::PI;

/// Integer index of a 256×256 map tile at a given zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoordinate {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

/// Standard slippy-map projection of WGS-84 coordinates to a tile index.
///
/// `x = floor((lon + 180) / 360 * 2^zoom)`,
/// `y = floor((1 - ln(tan(lat) + 1/cos(lat)) / π) / 2 * 2^zoom)`.
/// Valid for latitudes inside the Web Mercator band (roughly ±85°); the
/// eastern and polar edges clamp to the last tile.
pub fn tile_at(lat: f64, lon: f64, zoom: u8) -> TileCoordinate {
    let n = 2_f64.powi(i32::from(zoom));
    let max = n - 1.0;

    let x = ((lon + 180.0) / 360.0 * n).floor().clamp(0.0, max);

    let lat_rad = lat.to_radians();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n)
        .floor()
        .clamp(0.0, max);

    TileCoordinate {
        x: x as u32,
        y: y as u32,
        zoom,
    }
}

/// URL of a radar overlay tile for one frame.
pub fn radar_tile_url(host: &str, frame_path: &str, tile: TileCoordinate) -> String {
    format!(
        "{}/{}/256/{}/{}/{}/2/1_1.png",
        host.trim_end_matches('/'),
        frame_path.trim_start_matches('/'),
        tile.zoom,
        tile.x,
        tile.y
    )
}

/// URL of a base map tile.
pub fn map_tile_url(host: &str, tile: TileCoordinate) -> String {
    format!(
        "{}/{}/{}/{}.png",
        host.trim_end_matches('/'),
        tile.zoom,
        tile.x,
        tile.y
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_at_matches_reference_vectors_at_zoom_7() {
        // Reference values computed with the canonical slippy-map formula.
        let cases = [
            ((52.52, 13.405), (68, 41)),   // Berlin
            ((48.1374, 11.5755), (68, 44)), // Munich
            ((53.5511, 9.9937), (67, 41)), // Hamburg
            ((50.9375, 6.9603), (66, 42)), // Cologne
            ((40.7128, -74.006), (37, 48)), // New York
            ((-33.8688, 151.2093), (117, 76)), // Sydney
            ((-0.1807, -78.4678), (36, 64)), // Quito
            ((0.0, 0.0), (64, 64)),
        ];

        for ((lat, lon), (x, y)) in cases {
            let tile = tile_at(lat, lon, 7);
            assert_eq!((tile.x, tile.y), (x, y), "lat={} lon={}", lat, lon);
            assert_eq!(tile.zoom, 7);
        }
    }

    #[test]
    fn test_tile_at_near_mercator_band_edges() {
        assert_eq!(tile_at(84.9, 179.9, 7), TileCoordinate { x: 127, y: 0, zoom: 7 });
        assert_eq!(tile_at(-84.9, -179.9, 7), TileCoordinate { x: 0, y: 127, zoom: 7 });
    }

    #[test]
    fn test_eastern_edge_clamps_to_last_tile() {
        let tile = tile_at(0.0, 180.0, 7);
        assert_eq!(tile.x, 127);
    }

    #[test]
    fn test_truncation_not_rounding() {
        // 13.99° east of the tile boundary must still land in tile 68, not 69.
        let a = tile_at(52.52, 13.0, 7);
        let b = tile_at(52.52, 13.99, 7);
        assert_eq!(a.x, b.x);
    }

    #[test]
    fn test_radar_tile_url_shape() {
        let tile = TileCoordinate { x: 66, y: 42, zoom: 7 };
        let url = radar_tile_url(
            "https://tilecache.rainviewer.com/",
            "/v2/radar/1700000000",
            tile,
        );
        assert_eq!(
            url,
            "https://tilecache.rainviewer.com/v2/radar/1700000000/256/7/66/42/2/1_1.png"
        );
    }

    #[test]
    fn test_map_tile_url_shape() {
        let tile = TileCoordinate { x: 66, y: 42, zoom: 7 };
        assert_eq!(
            map_tile_url("https://tile.openstreetmap.org", tile),
            "https://tile.openstreetmap.org/7/66/42.png"
        );
    }
}
