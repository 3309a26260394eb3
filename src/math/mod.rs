pub mod vec3;
pub mod quat;
pub mod curve;

pub use vec3::Vec3;
pub use quat::Quat;
pub use curve::hermite_point;
