//! Feature layer - HTTP-facing slices of the service

pub mod images;
