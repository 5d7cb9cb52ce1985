//! Built-in list of topics with broad coverage across the target editions

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::CandidateSource;
use crate::error::Result;

/// Topics that tend to exist under the same title in small editions:
/// places in the archipelago, astronomy, chemistry, everyday nouns.
pub const KNOWN_TOPICS: &[&str] = &[
    // Places
    "Philippines",
    "Manila",
    "Quezon City",
    "Cebu",
    "Cebu City",
    "Davao City",
    "Baguio",
    "Luzon",
    "Visayas",
    "Mindanao",
    "Palawan",
    "Bohol",
    "Leyte",
    "Samar",
    "Panay",
    "Negros",
    "Mindoro",
    "Ilocos Norte",
    "Ilocos Sur",
    "La Union",
    "Pangasinan",
    "Cagayan",
    "Isabela",
    "Batangas",
    "Laguna",
    "Pampanga",
    "Vigan",
    "Laoag",
    "Asia",
    "Europe",
    "Africa",
    "Australia",
    "Japan",
    "China",
    "India",
    "Indonesia",
    "Malaysia",
    "Vietnam",
    "Thailand",
    "Singapore",
    "Spain",
    "Mexico",
    "United States",
    "Pacific Ocean",
    "Atlantic Ocean",
    "Indian Ocean",
    "Mount Apo",
    "Mayon Volcano",
    "Taal Volcano",
    "Pasig River",
    // People
    "Jose Rizal",
    "Andres Bonifacio",
    "Emilio Aguinaldo",
    "Apolinario Mabini",
    "Lapu-Lapu",
    "Ferdinand Magellan",
    "Manuel L. Quezon",
    "Ramon Magsaysay",
    "Corazon Aquino",
    // Astronomy
    "Sun",
    "Moon",
    "Earth",
    "Mercury (planet)",
    "Venus",
    "Mars",
    "Jupiter",
    "Saturn",
    "Uranus",
    "Neptune",
    "Solar System",
    "Milky Way",
    // Chemistry
    "Hydrogen",
    "Oxygen",
    "Carbon",
    "Nitrogen",
    "Iron",
    "Gold",
    "Silver",
    "Copper",
    "Water",
    // Living things and food
    "Rice",
    "Coconut",
    "Mango",
    "Banana",
    "Corn",
    "Sugarcane",
    "Dog",
    "Cat",
    "Chicken",
    "Water buffalo",
    "Carabao",
    "Fish",
    "Bird",
    "Tree",
    "Human",
    // Concepts
    "Language",
    "Mathematics",
    "Science",
    "History",
    "Religion",
    "Christianity",
    "Islam",
    "Music",
    "Computer",
    "Internet",
    "Tagalog language",
    "Cebuano language",
    "Ilocano language",
    "English language",
];

/// Hands out [`KNOWN_TOPICS`] in order, then empty batches
#[derive(Debug, Default)]
pub struct CuratedCandidates {
    cursor: AtomicUsize,
}

impl CuratedCandidates {
    /// Start at the beginning of the list
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of topics not yet handed out
    pub fn remaining(&self) -> usize {
        KNOWN_TOPICS
            .len()
            .saturating_sub(self.cursor.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl CandidateSource for CuratedCandidates {
    async fn next_batch(&self, size: usize) -> Result<Vec<String>> {
        let start = self.cursor.fetch_add(size, Ordering::SeqCst).min(KNOWN_TOPICS.len());
        let end = start.saturating_add(size).min(KNOWN_TOPICS.len());
        Ok(KNOWN_TOPICS[start..end].iter().map(|t| t.to_string()).collect())
    }

    fn name(&self) -> &'static str {
        "curated"
    }
}
