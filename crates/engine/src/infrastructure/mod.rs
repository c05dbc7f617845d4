//! Infrastructure - ports to external collaborators and their adapters

pub mod clock;
pub mod ports;
pub mod settings;
pub mod static_data;
