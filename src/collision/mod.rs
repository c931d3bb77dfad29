mod model;
mod ray;
mod raycast;
mod sphere;

pub use model::CollideInfo;
pub use model::CollisionInfo;
pub use model::EntityHit;
pub use model::HitInfo;
pub use model::Sphere;
pub use ray::BoxIntersection;
pub use ray::Ray;
pub use raycast::raycast_chunk;
pub use raycast::raycast_chunk_data;
pub use raycast::raycast_entity;
pub use sphere::get_sphere_aabb_collision_info;
pub use sphere::test_collision;
pub use sphere::test_collision_data;
pub use sphere::test_collision_entity;
