use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

pub const BEDROOM_RANGE: RangeInclusive<u8> = 1..=6;
pub const BATHROOM_RANGE: RangeInclusive<u8> = 1..=4;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RequirementsError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },
}

/// Compass direction used for orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
        };
        f.write_str(label)
    }
}

/// Corner of the plot used for room placement preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quadrant {
    Southwest,
    Northwest,
    Southeast,
    Northeast,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Southwest,
        Quadrant::Northwest,
        Quadrant::Southeast,
        Quadrant::Northeast,
    ];
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Quadrant::Southwest => "Southwest",
            Quadrant::Northwest => "Northwest",
            Quadrant::Southeast => "Southeast",
            Quadrant::Northeast => "Northeast",
        };
        f.write_str(label)
    }
}

/// Ordered list of extra room names. Names are trimmed, non-empty and unique.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct AdditionalRooms(Vec<String>);

impl AdditionalRooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trimmed name. Returns `false` when it was empty or already listed.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|room| room != name);
        self.0.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|room| room == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for AdditionalRooms {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut rooms = Self::new();
        for name in iter {
            rooms.add(name.as_ref());
        }
        rooms
    }
}

impl From<Vec<String>> for AdditionalRooms {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<AdditionalRooms> for Vec<String> {
    fn from(rooms: AdditionalRooms) -> Self {
        rooms.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VastuPreferences {
    pub entrance_direction: Direction,
    pub master_bedroom_position: Quadrant,
    pub kitchen_position: Quadrant,
    pub puja_room: bool,
}

impl Default for VastuPreferences {
    fn default() -> Self {
        Self {
            entrance_direction: Direction::North,
            master_bedroom_position: Quadrant::Southwest,
            kitchen_position: Quadrant::Southeast,
            puja_room: false,
        }
    }
}

/// Preferences sent alongside the processed plot to the plan endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Requirements {
    pub bedrooms: u8,
    pub bathrooms: u8,
    pub kitchen_orientation: Direction,
    pub vastu_preferences: VastuPreferences,
    pub additional_rooms: AdditionalRooms,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            bedrooms: 3,
            bathrooms: 2,
            kitchen_orientation: Direction::East,
            vastu_preferences: VastuPreferences::default(),
            additional_rooms: ["Living Room", "Dining Room"].into_iter().collect(),
        }
    }
}

impl Requirements {
    pub fn validate(&self) -> Result<(), RequirementsError> {
        check_range("bedrooms", self.bedrooms, &BEDROOM_RANGE)?;
        check_range("bathrooms", self.bathrooms, &BATHROOM_RANGE)
    }
}

fn check_range(
    field: &'static str,
    value: u8,
    range: &RangeInclusive<u8>,
) -> Result<(), RequirementsError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(RequirementsError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
