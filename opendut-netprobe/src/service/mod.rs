pub mod attachment;
pub mod network_interface;
pub mod probe;

#[cfg(test)]
mod testing;
