pub mod aabb2;
pub mod distances2;
pub mod line2;
pub mod polyline;
pub mod shapes2;
