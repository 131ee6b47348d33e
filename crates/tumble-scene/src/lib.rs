//! # tumble-scene
//!
//! World geometry as the collision core sees it.
//!
//! ## Key Types
//!
//! - [`PolySoup`]: World-space polygons with per-polygon plane, material
//!   and owner, returned by every geometry query.
//! - [`GeometrySource`]: The box-query collaborator the collision core calls.
//! - [`MovingPlatform`]: Push/advance/pop kinematic interface of a platform.
//! - [`StaticScene`]: In-memory reference implementation of both, loadable
//!   from a JSON [`SceneFile`].
//! - Procedural generators for tests and benchmarks (quads, boxes, ramps).

pub mod generators;
pub mod mask;
pub mod platform;
pub mod scene_file;
pub mod soup;
pub mod source;
pub mod static_scene;

pub use mask::ObjectMask;
pub use platform::{LinearPlatform, MovingPlatform};
pub use scene_file::SceneFile;
pub use soup::{ObjectKind, Poly, PolySoup};
pub use source::{GeometrySource, QueryResult, SphereProxy};
pub use static_scene::{RadialForce, StaticScene};
