//! Interface adapters: the HTTP REST API.

pub mod http;
