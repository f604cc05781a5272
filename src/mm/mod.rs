//! Gerência de memória do kernel.

pub mod heap;
