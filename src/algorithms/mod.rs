//! Core algorithms: scan registration.

pub mod registration;
