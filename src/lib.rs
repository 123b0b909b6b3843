//! parkfinder - Find parking near a map point from OpenStreetMap data and route to it

pub mod api;
pub mod config;
pub mod controller;
pub mod domain;
pub mod geometry;
pub mod navigation;
pub mod osm;
pub mod session;
