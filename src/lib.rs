// Library entry exposing pipeline modules.
pub mod core;
pub mod pipeline;
