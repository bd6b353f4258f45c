pub mod ai;
pub mod entity;
pub mod grid;
pub mod rules;
pub mod tile;
pub mod variant;
