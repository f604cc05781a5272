//! Núcleo do kernel: instância central e logging.

pub mod kernel;
pub mod logging;

mod tests;
