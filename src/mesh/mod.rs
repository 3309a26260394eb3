pub mod geometry;

pub use geometry::{Mesh, Vertex};
