//! Scene objects with a lazily built, shared acceleration tree.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::{debug, warn};

use crate::{BuildOptions, Bvh, Result, SceneObject, Shape, SplitMode};

/// Objects of a scene plus the tree last built over them.
///
/// The tree is not rebuilt when `objects` changes, callers ask for a rebuild with
/// `recompute = true`.
#[derive(Debug, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    bvh: RwLock<Option<Arc<Bvh<Shape>>>>,
}

impl Scene {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self {
            objects,
            bvh: RwLock::new(None),
        }
    }

    /// Tree over the scene objects, built with the named split mode and the default depth.
    ///
    /// Builds when `recompute` is set or nothing was built yet, otherwise hands out the
    /// cached tree. An unknown mode leaves the cache untouched.
    pub fn get_bvh(&self, recompute: bool, split_mode: &str) -> Result<Arc<Bvh<Shape>>> {
        let split_mode = SplitMode::parse(split_mode).inspect_err(|err| {
            warn!(%err, "BVH build rejected");
        })?;
        let options = BuildOptions {
            split_mode,
            ..BuildOptions::default()
        };
        Ok(self.get_bvh_with(recompute, &options))
    }

    pub fn get_bvh_with(&self, recompute: bool, options: &BuildOptions) -> Arc<Bvh<Shape>> {
        if recompute {
            return self.build_bvh(options);
        }

        let cache = self.bvh.upgradable_read();
        if let Some(bvh) = cache.as_ref() {
            return Arc::clone(bvh);
        }

        let bvh = Arc::new(Bvh::build(&self.objects, options));
        let mut cache = RwLockUpgradableReadGuard::upgrade(cache);
        *cache = Some(Arc::clone(&bvh));
        bvh
    }

    /// Rebuild unconditionally and replace the cached tree
    pub fn build_bvh(&self, options: &BuildOptions) -> Arc<Bvh<Shape>> {
        debug!(objects = self.objects.len(), "rebuilding scene BVH");
        let bvh = Arc::new(Bvh::build(&self.objects, options));
        *self.bvh.write() = Some(Arc::clone(&bvh));
        bvh
    }

    /// The cached tree, if any
    pub fn cached_bvh(&self) -> Option<Arc<Bvh<Shape>>> {
        self.bvh.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3A;
    use rayon::prelude::*;

    use crate::*;

    fn scene() -> Scene {
        let mesh = TriangleMesh::new(
            vec![
                Vec3A::new(-1.0, -1.0, 0.0),
                Vec3A::new(1.0, -1.0, 0.0),
                Vec3A::new(1.0, 1.0, 0.0),
                Vec3A::new(-1.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let mut cloud = PointCloud::new(vec![Vec3A::new(0.0, 0.0, 3.0), Vec3A::new(5.0, 0.0, 0.0)]);
        cloud.radii = vec![0.5, 0.5];

        Scene::new(vec![
            mesh.into(),
            cloud.into(),
            Sphere::new(Vec3A::new(0.0, 0.0, -4.0), 1.0).into(),
        ])
    }

    #[test]
    fn cached_tree_is_returned() {
        let scene = scene();
        assert!(scene.cached_bvh().is_none());

        let first = scene.get_bvh(false, "spatial").unwrap();
        let second = scene.get_bvh(false, "linear").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.stats().split_mode, SplitMode::Spatial);

        let third = scene.get_bvh_with(false, &BuildOptions::default());
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(first.primitives().len(), 5);
    }

    #[test]
    fn recompute_rebuilds() {
        let scene = scene();
        let first = scene.get_bvh(false, "spatial").unwrap();
        let rebuilt = scene.get_bvh(true, "Linear").unwrap();
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert_eq!(rebuilt.stats().split_mode, SplitMode::Linear);
        assert!(Arc::ptr_eq(&rebuilt, &scene.cached_bvh().unwrap()));
    }

    #[test]
    fn unknown_mode_keeps_cache() {
        let scene = scene();
        let first = scene.get_bvh(false, "linear").unwrap();
        assert_eq!(
            scene.get_bvh(true, "octree").unwrap_err(),
            BvhError::UnknownSplitMode("octree".to_owned())
        );
        assert!(Arc::ptr_eq(&first, &scene.cached_bvh().unwrap()));

        // nothing cached and a bad mode: still nothing cached
        let empty = Scene::default();
        assert!(empty.get_bvh(false, "").is_err());
        assert!(empty.cached_bvh().is_none());
    }

    #[test]
    fn scene_queries() {
        let scene = scene();
        let bvh = scene.get_bvh(false, "spatial").unwrap();

        // point above the quad is hit first
        let hit = bvh
            .closest_hit(&Ray::new(Vec3A::new(0.0, 0.0, 10.0), -Vec3A::Z))
            .unwrap();
        assert!(matches!(bvh.primitive(hit.primitive), Shape::Point(_)));
        assert!((hit.t - 6.5).abs() < 1e-4);

        // from below the sphere comes first
        let hit = bvh
            .closest_hit(&Ray::new(Vec3A::new(0.0, 0.0, -10.0), Vec3A::Z))
            .unwrap();
        assert!(matches!(bvh.primitive(hit.primitive), Shape::Sphere(_)));

        // off center, past the point, onto the quad
        let hit = bvh
            .closest_hit(&Ray::new(Vec3A::new(0.5, -0.5, 1.0), -Vec3A::Z))
            .unwrap();
        assert!(matches!(bvh.primitive(hit.primitive), Shape::Triangle(_)));
    }

    #[test]
    fn concurrent_readers_share_one_tree() {
        let scene = scene();
        let trees: Vec<Arc<Bvh<Shape>>> = (0..16)
            .into_par_iter()
            .map(|_| scene.get_bvh_with(false, &BuildOptions::default()))
            .collect();
        for tree in &trees {
            assert!(Arc::ptr_eq(tree, &trees[0]));
        }
    }
}
