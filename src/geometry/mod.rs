//! Planar and 3-D geometric primitives on [`Vector3`](crate::Vector3).
//!
//! [`segment`] measures distances between line segments and points. [`Polygon`] builds convex
//! hulls in the xy-plane and answers containment, centroid, and extent queries on them, and
//! [`mbr`] finds the smallest rectangle around a point set.

pub mod mbr;
mod polygon;
pub mod segment;

pub use polygon::{BoundingBox, Polygon};
