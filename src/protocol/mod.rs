//! Wire protocol

pub mod wire;
