//! Geometry query cache.
//!
//! Remembers the last query result together with the box and mask that
//! produced it. A new query whose box lies inside the cached box with the same
//! mask is answered from the cache. The cache only trims query volume; callers
//! filter candidates geometrically, so results never depend on it.

use tumble_math::Aabb;
use tumble_scene::{GeometrySource, ObjectMask, QueryResult};
use tumble_types::{constants, BodyId};

/// Last-query cache owned by one integrator.
#[derive(Debug, Clone)]
pub struct QueryCache {
    bounds: Aabb,
    mask: ObjectMask,
    result: QueryResult,
    /// Set after an explicit reset; the next fetch must re-query.
    stale: bool,
    enabled: bool,
    refreshes: u32,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            bounds: Aabb::ZERO,
            mask: ObjectMask::NONE,
            result: QueryResult::default(),
            stale: true,
            enabled: true,
            refreshes: 0,
        }
    }

    /// A cache that re-queries on every fetch.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Forces the next fetch to re-query with a fresh box.
    pub fn invalidate(&mut self) {
        self.stale = true;
        self.bounds = Aabb::ZERO;
    }

    /// Number of real queries issued since the last [`QueryCache::reset_counter`].
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }

    pub fn reset_counter(&mut self) {
        self.refreshes = 0;
    }

    /// The cached result.
    pub fn result(&self) -> &QueryResult {
        &self.result
    }

    /// Returns candidates covering `bounds`, querying the source if needed.
    ///
    /// `always_refresh` is set while platforms move within the tick, because
    /// their polygons change between sub-steps.
    pub fn fetch(
        &mut self,
        source: &dyn GeometrySource,
        bounds: &Aabb,
        mask: ObjectMask,
        include_platforms: bool,
        exclude: Option<BodyId>,
        always_refresh: bool,
    ) -> &QueryResult {
        let hit = self.enabled
            && !self.stale
            && !always_refresh
            && mask == self.mask
            && self.bounds.contains(bounds);

        if !hit {
            let padded = bounds.inflated(constants::SWEEP_BOX_SLACK);
            self.bounds = if self.stale || always_refresh || !self.enabled {
                padded
            } else {
                self.bounds.union(&padded)
            };
            self.mask = mask;
            self.stale = false;
            self.refreshes += 1;

            self.result.clear();
            source.query(&self.bounds, mask, include_platforms, exclude, &mut self.result);
            tracing::trace!(
                source = source.name(),
                polys = self.result.soup.len(),
                spheres = self.result.spheres.len(),
                "geometry query refreshed"
            );
        }

        &self.result
    }
}
