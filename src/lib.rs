pub mod airfoil;
pub mod algorithms;
pub mod errors;
pub mod geometry;
pub mod kernel;
pub mod mesh;
pub mod serialize;
