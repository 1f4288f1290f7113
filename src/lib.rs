pub mod ai;
pub mod data;
pub mod ecs;
pub mod error;
pub mod map;
pub mod render;
pub mod saveload;
