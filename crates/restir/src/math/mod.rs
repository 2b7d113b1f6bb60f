pub mod bounds;
pub mod distributions;
pub mod float;
pub mod frame;
pub mod point;
pub mod stat;
pub mod vec;
