pub mod config;
pub mod error;
pub mod host;
pub mod monitor;
pub mod sim;

#[cfg(test)]
mod test;
