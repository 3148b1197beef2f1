//! ServiceFinder Library
//!
//! Everything except the terminal front end: data types, backend adapters,
//! services, pure logic and the application model.

pub mod api;
pub mod backend;
pub mod config;
pub mod logic;
pub mod model;
pub mod services;
pub mod update;

/// Sort key for the listing directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Newest,
    Oldest,
    RatingHigh,
    RatingLow,
    Name,
}

impl SortMode {
    pub fn label(&self) -> &str {
        match self {
            SortMode::Newest => "Newest",
            SortMode::Oldest => "Oldest",
            SortMode::RatingHigh => "Rating ↓",
            SortMode::RatingLow => "Rating ↑",
            SortMode::Name => "A-Z",
        }
    }
}

/// How the listing directory is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid, // cards, rating from reviews
    List, // rows, stored rating
}
