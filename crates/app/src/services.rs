//! Host-side services that integrations talk to through the ports.

pub mod registry;
