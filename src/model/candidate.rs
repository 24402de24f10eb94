use serde::{Deserialize, Serialize};

/// Size variants the search service publishes for every photo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageVariant {
    Raw,
    Full,
    #[default]
    Regular,
    Small,
    Thumb,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PhotoUrls {
    #[serde(default)]
    pub raw: String,
    #[serde(default)]
    pub full: String,
    #[serde(default)]
    pub regular: String,
    #[serde(default)]
    pub small: String,
    #[serde(default)]
    pub thumb: String,
}

impl PhotoUrls {
    pub fn get(&self, variant: ImageVariant) -> &str {
        match variant {
            ImageVariant::Raw => &self.raw,
            ImageVariant::Full => &self.full,
            ImageVariant::Regular => &self.regular,
            ImageVariant::Small => &self.small,
            ImageVariant::Thumb => &self.thumb,
        }
    }
}

/// One search result for a category. `rank` is the position in the result set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Candidate {
    pub rank: usize,
    pub id: String,
    pub urls: PhotoUrls,
    pub author: Option<String>,
    pub description: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl Candidate {
    /// URL for the requested variant, falling back to `regular` when the
    /// service left the requested one blank.
    pub fn url(&self, variant: ImageVariant) -> &str {
        let url = self.urls.get(variant);
        if url.is_empty() { &self.urls.regular } else { url }
    }

    pub fn caption(&self) -> String {
        match (&self.author, &self.description) {
            (Some(author), Some(desc)) => format!("{} by {}", desc, author),
            (Some(author), None) => format!("by {}", author),
            (None, Some(desc)) => desc.clone(),
            (None, None) => self.id.clone(),
        }
    }
}
