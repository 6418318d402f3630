pub mod feedback;
pub mod intake;
pub mod render;
