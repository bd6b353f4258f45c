pub mod event;
pub mod game;
pub mod level;
pub mod schedule;
pub mod step;
pub mod world;
