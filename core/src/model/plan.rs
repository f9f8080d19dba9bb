use super::processed::Room;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Plan returned by the generation endpoint. Read-only on the client.
///
/// Serializes back to the response it was decoded from, in whichever shape
/// the backend sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct GeneratedPlan {
    pub rooms: Vec<Room>,
    pub vastu_score: u8,
    pub suggestions: Vec<String>,
    pub svg_content: String,
    pub total_area: f64,
    wire: Value,
}

impl GeneratedPlan {
    pub fn room_area_sum(&self) -> f64 {
        self.rooms.iter().map(|room| room.area_m2).sum()
    }
}

// The backend has shipped both a flat record and one with the scoring fields
// nested under `metadata`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlanWire {
    Flat {
        rooms: Vec<Room>,
        vastu_score: i64,
        #[serde(default)]
        suggestions: Vec<String>,
        #[serde(default)]
        svg_content: String,
        total_area: f64,
    },
    Nested {
        rooms: Vec<Room>,
        metadata: PlanMetadata,
        #[serde(default)]
        svg_data: String,
    },
}

#[derive(Deserialize)]
struct PlanMetadata {
    total_area: f64,
    vastu_score: i64,
    #[serde(default)]
    suggestions: Vec<String>,
}

impl TryFrom<Value> for GeneratedPlan {
    type Error = String;

    fn try_from(wire: Value) -> Result<Self, Self::Error> {
        let fields = PlanWire::deserialize(&wire).map_err(|err| err.to_string())?;
        let (rooms, score, suggestions, svg_content, total_area) = match fields {
            PlanWire::Flat {
                rooms,
                vastu_score,
                suggestions,
                svg_content,
                total_area,
            } => (rooms, vastu_score, suggestions, svg_content, total_area),
            PlanWire::Nested {
                rooms,
                metadata,
                svg_data,
            } => (
                rooms,
                metadata.vastu_score,
                metadata.suggestions,
                svg_data,
                metadata.total_area,
            ),
        };

        let vastu_score = u8::try_from(score)
            .ok()
            .filter(|score| *score <= 100)
            .ok_or_else(|| format!("vastu_score {score} is outside 0..=100"))?;

        Ok(Self {
            rooms,
            vastu_score,
            suggestions,
            svg_content,
            total_area,
            wire,
        })
    }
}

impl From<GeneratedPlan> for Value {
    fn from(plan: GeneratedPlan) -> Self {
        plan.wire
    }
}
