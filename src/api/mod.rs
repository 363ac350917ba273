//! Line-delimited JSON command protocol over TCP.

pub mod dto;
pub mod server;
