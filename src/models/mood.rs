use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// The closed set of mood labels. This is the only place the set is spelled
/// out: request validation, the JSON form and the `mood_label` column type
/// all go through it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "mood_label", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Anxious,
    Stressed,
    Calm,
    Energetic,
    Depressed,
    Angry,
    Excited,
    Tired,
    Content,
    Frustrated,
    Hopeful,
    Overwhelmed,
    Peaceful,
}

impl Mood {
    pub const ALL: [Mood; 15] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Anxious,
        Mood::Stressed,
        Mood::Calm,
        Mood::Energetic,
        Mood::Depressed,
        Mood::Angry,
        Mood::Excited,
        Mood::Tired,
        Mood::Content,
        Mood::Frustrated,
        Mood::Hopeful,
        Mood::Overwhelmed,
        Mood::Peaceful,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
            Mood::Stressed => "stressed",
            Mood::Calm => "calm",
            Mood::Energetic => "energetic",
            Mood::Depressed => "depressed",
            Mood::Angry => "angry",
            Mood::Excited => "excited",
            Mood::Tired => "tired",
            Mood::Content => "content",
            Mood::Frustrated => "frustrated",
            Mood::Hopeful => "hopeful",
            Mood::Overwhelmed => "overwhelmed",
            Mood::Peaceful => "peaceful",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid mood value: {0}")]
pub struct UnknownMood(pub String);

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

/// Custom validator shared by the create and update bodies.
fn validate_mood_label(value: &str) -> Result<(), ValidationError> {
    match value.parse::<Mood>() {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("mood");
            err.message = Some(Cow::from("Invalid mood value"));
            err.add_param(Cow::from("value"), &value);
            Err(err)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub mood: Mood,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl MoodEntry {
    pub fn new(owner_id: Uuid, mood: Mood, notes: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            mood,
            notes: notes.unwrap_or_default(),
            created_at: Utc::now(),
        }
    }
}

/// Fields a PUT may overwrite. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoodChanges {
    pub mood: Option<Mood>,
    pub notes: Option<String>,
}

impl MoodChanges {
    pub fn apply(&self, entry: &mut MoodEntry) {
        if let Some(mood) = self.mood {
            entry.mood = mood;
        }
        if let Some(notes) = &self.notes {
            entry.notes = notes.clone();
        }
    }
}

/// POST /api/moods
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMoodRequest {
    #[validate(
        required(message = "Mood is required"),
        length(min = 1, message = "Mood is required"),
        custom = "validate_mood_label"
    )]
    pub mood: Option<String>,
    pub notes: Option<String>,
}

/// PUT /api/moods/:id. Absent or null fields are left unchanged; any
/// supplied string is an explicit overwrite. An empty body changes nothing.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMoodRequest {
    #[validate(custom = "validate_mood_label")]
    pub mood: Option<String>,
    pub notes: Option<String>,
}

impl UpdateMoodRequest {
    pub fn into_changes(self) -> Result<MoodChanges, UnknownMood> {
        let mood = self.mood.as_deref().map(str::parse::<Mood>).transpose()?;
        Ok(MoodChanges {
            mood,
            notes: self.notes,
        })
    }
}
