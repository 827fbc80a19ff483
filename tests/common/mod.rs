#![allow(dead_code)]

pub mod test_utils;

pub use test_utils::*;
