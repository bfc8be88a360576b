pub mod core;
pub mod effect;
pub mod main;
pub mod render;
pub mod run;
pub mod scheduler;
