pub mod bridge;
pub mod manager;
pub mod tap;
