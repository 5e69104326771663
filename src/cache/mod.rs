//! Cache
//!
//! Este módulo contiene los sistemas de cache.

pub mod geocode_cache;

pub use geocode_cache::{cache_key, GeocodeCache, GeocodeCacheStats, GeocodeLookup, GeocodeSource};
