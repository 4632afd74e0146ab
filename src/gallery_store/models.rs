//! Gallery models: artists, museums, paintings and their request payloads.

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Stored records
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub artist_short_name: String,
    pub artist_long_name: String,
    pub dob: Option<String>,
    pub dob_place: Option<String>,
    pub dod: Option<String>,
    pub dod_place: Option<String>,
    pub created_at: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Museum {
    pub id: i64,
    pub name: String,
    pub name_unique: String,
    pub contact: Option<String>,
    pub profile: Option<String>,
    pub profile_path: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<i64>,
    pub zipcode: Option<i64>,
    pub website: Option<String>,
    pub created_at: i64,
}

/// Painting row as stored, with foreign keys only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Painting {
    pub id: i64,
    pub title: String,
    pub unique_title: String,
    #[serde(rename = "type")]
    pub painting_type: Option<String>,
    pub genre: Option<String>,
    pub materials: Option<Vec<String>>,
    pub size: Option<String>,
    pub profile: Option<String>,
    pub profile_path: Option<String>,
    pub year: Option<i32>,
    pub period: Option<String>,
    pub style: Option<Vec<String>>,
    pub artist_id: i64,
    pub museum_id: i64,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

/// Painting with its artist and museum joined in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPainting {
    #[serde(flatten)]
    pub painting: Painting,
    pub artist: Artist,
    pub museum: Museum,
}

// =============================================================================
// Write payloads
// =============================================================================

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewArtist {
    pub artist_short_name: String,
    pub artist_long_name: String,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub dob_place: Option<String>,
    #[serde(default)]
    pub dod: Option<String>,
    #[serde(default)]
    pub dod_place: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewMuseum {
    pub name: String,
    pub name_unique: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<i64>,
    #[serde(default)]
    pub zipcode: Option<i64>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Body of a painting creation request. `unique_title`, id and timestamps
/// are assigned by the store.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewPainting {
    pub title: String,
    #[serde(default, rename = "type")]
    pub painting_type: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub materials: Option<Vec<String>>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub style: Option<Vec<String>>,
    pub artist_id: i64,
    pub museum_id: i64,
}

/// Deserializes a present field (even `null`) as `Some`, so that together
/// with `#[serde(default)]` an absent field stays `None`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Partial painting update.
///
/// Outer `None` means the field was absent from the payload and is left
/// untouched. `Some(None)` is an explicit `null` and clears the field.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PaintingUpdate {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, rename = "type", deserialize_with = "present")]
    pub painting_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub genre: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub materials: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present")]
    pub size: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub profile: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub profile_path: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub period: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub style: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present")]
    pub artist_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub museum_id: Option<Option<i64>>,
}

impl PaintingUpdate {
    /// Title the painting will carry after this update.
    pub fn effective_title<'a>(&'a self, current: &'a Painting) -> &'a str {
        match &self.title {
            Some(Some(title)) => title,
            _ => &current.title,
        }
    }

    /// Year the painting will carry after this update.
    pub fn effective_year(&self, current: &Painting) -> Option<i32> {
        match self.year {
            Some(year) => year,
            None => current.year,
        }
    }

    /// Whether the slug inputs change, comparing effective against stored
    /// values rather than checking which fields were sent.
    pub fn changes_slug_inputs(&self, current: &Painting) -> bool {
        self.effective_title(current) != current.title
            || self.effective_year(current) != current.year
    }

    /// Copies every field present in the payload onto `painting`.
    pub fn apply_to(&self, painting: &mut Painting) {
        if let Some(Some(title)) = &self.title {
            painting.title = title.clone();
        }
        if let Some(value) = &self.painting_type {
            painting.painting_type = value.clone();
        }
        if let Some(value) = &self.genre {
            painting.genre = value.clone();
        }
        if let Some(value) = &self.materials {
            painting.materials = value.clone();
        }
        if let Some(value) = &self.size {
            painting.size = value.clone();
        }
        if let Some(value) = &self.profile {
            painting.profile = value.clone();
        }
        if let Some(value) = &self.profile_path {
            painting.profile_path = value.clone();
        }
        if let Some(value) = self.year {
            painting.year = value;
        }
        if let Some(value) = &self.period {
            painting.period = value.clone();
        }
        if let Some(value) = &self.style {
            painting.style = value.clone();
        }
        if let Some(Some(artist_id)) = self.artist_id {
            painting.artist_id = artist_id;
        }
        if let Some(Some(museum_id)) = self.museum_id {
            painting.museum_id = museum_id;
        }
    }
}

/// Painting in a [`CatalogBatch`]. Its `artist_id` and `museum_id` are
/// replaced by the ids assigned to `artists[artist]` and `museums[museum]`.
#[derive(Clone, Debug)]
pub struct BatchPainting {
    pub painting: NewPainting,
    pub artist: usize,
    pub museum: usize,
}

/// Records inserted together in a single transaction.
#[derive(Clone, Debug, Default)]
pub struct CatalogBatch {
    pub artists: Vec<NewArtist>,
    pub museums: Vec<NewMuseum>,
    pub paintings: Vec<BatchPainting>,
}

// =============================================================================
// Listing
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Response of a delete request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedPainting {
    pub message: String,
    pub deleted_id: i64,
}
