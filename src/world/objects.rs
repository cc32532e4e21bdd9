//! Placed construction objects and their storage

use crate::core::types::ObjectId;
use chrono::{DateTime, Utc};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of object the architect can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    ModularUnit,
    SolarPanel,
    WaterCollector,
    Wall,
    DataSpire,
    LifeSupportHub,
    Roof,
    Door,
    Crop,
    Tree,
}

/// Knowledge category an object type contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    Habitat,
    Energy,
    Water,
    Defense,
    Technology,
    LifeSupport,
    Agriculture,
}

impl ObjectType {
    pub const ALL: [ObjectType; 10] = [
        ObjectType::ModularUnit,
        ObjectType::SolarPanel,
        ObjectType::WaterCollector,
        ObjectType::Wall,
        ObjectType::DataSpire,
        ObjectType::LifeSupportHub,
        ObjectType::Roof,
        ObjectType::Door,
        ObjectType::Crop,
        ObjectType::Tree,
    ];

    /// Wire name, as used in prompts and LLM responses
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::ModularUnit => "modular_unit",
            ObjectType::SolarPanel => "solar_panel",
            ObjectType::WaterCollector => "water_collector",
            ObjectType::Wall => "wall",
            ObjectType::DataSpire => "data_spire",
            ObjectType::LifeSupportHub => "life_support_hub",
            ObjectType::Roof => "roof",
            ObjectType::Door => "door",
            ObjectType::Crop => "crop",
            ObjectType::Tree => "tree",
        }
    }

    pub fn category(&self) -> ObjectCategory {
        match self {
            ObjectType::ModularUnit | ObjectType::Roof | ObjectType::Door => ObjectCategory::Habitat,
            ObjectType::SolarPanel => ObjectCategory::Energy,
            ObjectType::WaterCollector => ObjectCategory::Water,
            ObjectType::Wall => ObjectCategory::Defense,
            ObjectType::DataSpire => ObjectCategory::Technology,
            ObjectType::LifeSupportHub => ObjectCategory::LifeSupport,
            ObjectType::Crop | ObjectType::Tree => ObjectCategory::Agriculture,
        }
    }

    /// Default scale when the decision does not specify one
    pub fn default_scale(&self) -> Vec3 {
        match self {
            ObjectType::ModularUnit => Vec3::new(2.0, 1.5, 2.0),
            ObjectType::SolarPanel => Vec3::new(1.5, 0.2, 1.0),
            ObjectType::WaterCollector => Vec3::new(1.0, 1.2, 1.0),
            ObjectType::Wall => Vec3::new(3.0, 1.5, 0.3),
            ObjectType::DataSpire => Vec3::new(0.6, 4.0, 0.6),
            ObjectType::LifeSupportHub => Vec3::new(2.5, 2.0, 2.5),
            ObjectType::Roof => Vec3::new(2.2, 0.3, 2.2),
            ObjectType::Door => Vec3::new(0.8, 1.4, 0.1),
            ObjectType::Crop => Vec3::new(0.5, 0.4, 0.5),
            ObjectType::Tree => Vec3::new(1.0, 3.0, 1.0),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    /// Lenient parse: case-insensitive, accepts spaces or dashes for underscores
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        ObjectType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Unknown object type: {}", s))
    }
}

impl fmt::Display for ObjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectCategory::Habitat => "habitat",
            ObjectCategory::Energy => "energy",
            ObjectCategory::Water => "water",
            ObjectCategory::Defense => "defense",
            ObjectCategory::Technology => "technology",
            ObjectCategory::LifeSupport => "life support",
            ObjectCategory::Agriculture => "agriculture",
        };
        f.write_str(name)
    }
}

/// A placed object. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldObject {
    pub id: ObjectId,
    pub object_type: ObjectType,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub created_at: DateTime<Utc>,
}

impl WorldObject {
    /// New object with default rotation and the type's default scale
    pub fn new(object_type: ObjectType, position: Vec3, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ObjectId::new(),
            object_type,
            position,
            rotation: Vec3::ZERO,
            scale: object_type.default_scale(),
            created_at,
        }
    }

    /// Horizontal (x/z) distance to a point
    pub fn planar_distance(&self, point: Vec3) -> f32 {
        let dx = self.position.x - point.x;
        let dz = self.position.z - point.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Append-only storage for placed objects
///
/// Keeps insertion order for display and prompts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorldObjects {
    objects: Vec<WorldObject>,
}

impl WorldObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a world object
    pub fn push(&mut self, object: WorldObject) {
        self.objects.push(object);
    }

    /// Iterate in placement order
    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.iter()
    }

    /// The `n` most recently placed objects, oldest first
    pub fn recent(&self, n: usize) -> &[WorldObject] {
        let start = self.objects.len().saturating_sub(n);
        &self.objects[start..]
    }

    /// Closest object to a point on the x/z plane
    pub fn nearest(&self, point: Vec3) -> Option<(&WorldObject, f32)> {
        self.objects
            .iter()
            .map(|o| (o, o.planar_distance(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Count of objects per type, in `ObjectType::ALL` order, zero counts omitted
    pub fn counts_by_type(&self) -> Vec<(ObjectType, usize)> {
        ObjectType::ALL
            .iter()
            .map(|&t| (t, self.objects.iter().filter(|o| o.object_type == t).count()))
            .filter(|&(_, n)| n > 0)
            .collect()
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
