use serde::Deserialize;

use crate::entities::movie;

pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 10.0;

const REQUIRED: &str = "This field is required.";

#[derive(Clone, Debug, PartialEq)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub description: String,
    pub rating: f64,
    /// `None` until the first re-rank after insertion.
    pub ranking: Option<i32>,
    /// `None` until the user submits a review.
    pub review: Option<String>,
    pub img_url: String,
}

impl From<movie::Model> for Movie {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            year: m.year,
            description: m.description,
            rating: m.rating,
            ranking: m.ranking,
            review: m.review,
            img_url: m.img_url,
        }
    }
}

/// A movie about to be inserted. The id comes from TMDB.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub description: String,
    pub rating: f64,
    pub img_url: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MovieCandidate {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddMovieForm {
    #[serde(default)]
    pub title: String,
}

impl AddMovieForm {
    pub fn validate(&self) -> Result<&str, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(REQUIRED.to_string());
        }
        Ok(title)
    }
}

/// Raw edit submission. Fields stay strings so a malformed rating comes back
/// as a field error instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct EditMovieForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RatingUpdate {
    pub rating: f64,
    pub review: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditErrors {
    pub rating: Option<String>,
    pub review: Option<String>,
}

impl EditMovieForm {
    pub fn validate(&self) -> Result<RatingUpdate, EditErrors> {
        let mut errors = EditErrors::default();

        let rating = self.rating.trim();
        let parsed = if rating.is_empty() {
            errors.rating = Some(REQUIRED.to_string());
            None
        } else {
            match rating.parse::<f64>() {
                Ok(r) if (RATING_MIN..=RATING_MAX).contains(&r) => Some(r),
                Ok(_) => {
                    errors.rating = Some(format!(
                        "Rating must be between {RATING_MIN} and {RATING_MAX}."
                    ));
                    None
                },
                Err(_) => {
                    errors.rating = Some("Not a valid number.".to_string());
                    None
                },
            }
        };

        let review = self.review.trim();
        if review.is_empty() {
            errors.review = Some(REQUIRED.to_string());
        }

        match parsed {
            Some(rating) if errors.review.is_none() => {
                Ok(RatingUpdate { rating, review: review.to_string() })
            },
            _ => Err(errors),
        }
    }

    /// Prefill for the edit page. A movie that has never been reviewed gets a
    /// blank form.
    pub fn prefill(movie: &Movie) -> Self {
        match &movie.review {
            Some(review) => Self { rating: movie.rating.to_string(), review: review.clone() },
            None => Self::default(),
        }
    }
}
