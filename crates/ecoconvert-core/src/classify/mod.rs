pub mod engine;

pub use engine::classify;
