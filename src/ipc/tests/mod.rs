#![cfg(test)]

pub mod pipe;
