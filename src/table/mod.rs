pub mod mask;
pub mod visible;
