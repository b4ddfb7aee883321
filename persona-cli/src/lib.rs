//! Client side of the persona calendar: the server transport, the
//! snapshot stores built on it, and terminal rendering.

pub mod api;
pub mod http;
pub mod market;
pub mod render;
pub mod store;
