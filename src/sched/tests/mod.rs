#![cfg(test)]

pub mod proc;
