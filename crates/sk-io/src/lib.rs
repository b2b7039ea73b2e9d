//! Mesh exchange for polyhedral regions.

pub mod ply;

pub use ply::{parse_ply, read_ply, write_ply, PolyMesh};
