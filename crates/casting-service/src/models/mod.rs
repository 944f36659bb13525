//! Casting service models.
//!
//! Record types, request bodies with their validation, and the JSON
//! envelopes returned by the CRUD endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum plausible actor age.
pub const MAX_ACTOR_AGE: i32 = 150;

/// Maximum length of an actor name or movie title.
pub const MAX_NAME_LENGTH: usize = 255;

/// An actor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i32,
    pub name: String,
    pub age: i32,
    /// Single-character gender marker, e.g. "F".
    pub gender: String,
}

/// A movie record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    /// Calendar date, serialized as `YYYY-MM-DD`.
    pub release_date: Option<NaiveDate>,
}

fn validate_name(field: &'static str, value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{field} is required"));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("{field} must be at most {MAX_NAME_LENGTH} characters"));
    }
    Ok(())
}

fn validate_age(age: i32) -> Result<(), String> {
    if !(0..=MAX_ACTOR_AGE).contains(&age) {
        return Err(format!("age must be between 0 and {MAX_ACTOR_AGE}"));
    }
    Ok(())
}

fn validate_gender(gender: &str) -> Result<(), String> {
    if gender.chars().count() != 1 {
        return Err("gender must be a single character".to_string());
    }
    Ok(())
}

/// Request body for `POST /api/actors`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateActorRequest {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

impl CreateActorRequest {
    /// Validate the request fields.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        validate_name("name", &self.name)?;
        validate_age(self.age)?;
        validate_gender(&self.gender)
    }
}

/// Request body for `PATCH /api/actors/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateActorRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

impl UpdateActorRequest {
    /// Check if any field is set.
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.age.is_some() || self.gender.is_some()
    }

    /// Validate the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(age) = self.age {
            validate_age(age)?;
        }
        if let Some(gender) = &self.gender {
            validate_gender(gender)?;
        }
        Ok(())
    }
}

/// Request body for `POST /api/movies`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMovieRequest {
    pub title: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

impl CreateMovieRequest {
    /// Validate the request fields.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        validate_name("title", &self.title)
    }
}

/// Request body for `PATCH /api/movies/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
}

impl UpdateMovieRequest {
    /// Check if any field is set.
    pub fn has_changes(&self) -> bool {
        self.title.is_some() || self.release_date.is_some()
    }

    /// Validate the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            validate_name("title", title)?;
        }
        Ok(())
    }
}

// ============================================================================
// Response envelopes
// ============================================================================

/// `{"success": true, "actors": [...]}`, returned by list and PATCH.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorsResponse {
    pub success: bool,
    pub actors: Vec<Actor>,
}

/// `{"success": true, "actor": {...}}`, returned by detail and POST.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorResponse {
    pub success: bool,
    pub actor: Actor,
}

/// `{"success": true, "movies": [...]}`, returned by list and PATCH.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviesResponse {
    pub success: bool,
    pub movies: Vec<Movie>,
}

/// `{"success": true, "movie": {...}}`, returned by detail and POST.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieResponse {
    pub success: bool,
    pub movie: Movie,
}

/// `{"success": true, "delete": id}`, returned by DELETE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: i32,
}

impl ActorsResponse {
    pub fn new(actors: Vec<Actor>) -> Self {
        Self {
            success: true,
            actors,
        }
    }
}

impl ActorResponse {
    pub fn new(actor: Actor) -> Self {
        Self {
            success: true,
            actor,
        }
    }
}

impl MoviesResponse {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self {
            success: true,
            movies,
        }
    }
}

impl MovieResponse {
    pub fn new(movie: Movie) -> Self {
        Self {
            success: true,
            movie,
        }
    }
}

impl DeleteResponse {
    pub fn new(id: i32) -> Self {
        Self {
            success: true,
            delete: id,
        }
    }
}

/// Readiness check response.
///
/// Returned by the `/ready` endpoint (readiness check).
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// Database connectivity status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,

    /// Error message (generic, no infrastructure details).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn actor_request(name: &str, age: i32, gender: &str) -> CreateActorRequest {
        CreateActorRequest {
            name: name.to_string(),
            age,
            gender: gender.to_string(),
        }
    }

    #[test]
    fn test_create_actor_valid() {
        assert!(actor_request("Tilda Swinton", 62, "F").validate().is_ok());
        assert!(actor_request("Newborn", 0, "M").validate().is_ok());
        assert!(actor_request("Elder", 150, "X").validate().is_ok());
    }

    #[test]
    fn test_create_actor_blank_name() {
        let err = actor_request("   ", 30, "F").validate().unwrap_err();
        assert_eq!(err, "name is required");
    }

    #[test]
    fn test_create_actor_name_too_long() {
        let name = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(actor_request(&name, 30, "F").validate().is_err());
    }

    #[test]
    fn test_create_actor_age_bounds() {
        assert!(actor_request("A", -1, "F").validate().is_err());
        assert!(actor_request("A", 151, "F").validate().is_err());
    }

    #[test]
    fn test_create_actor_gender_single_character() {
        assert!(actor_request("A", 30, "").validate().is_err());
        assert!(actor_request("A", 30, "FM").validate().is_err());
        assert!(actor_request("A", 30, "é").validate().is_ok());
    }

    #[test]
    fn test_create_actor_rejects_unknown_fields() {
        let result: Result<CreateActorRequest, _> = serde_json::from_value(json!({
            "name": "A", "age": 30, "gender": "F", "title": "oops"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_actor_has_changes() {
        assert!(!UpdateActorRequest::default().has_changes());

        let request: UpdateActorRequest = serde_json::from_value(json!({"age": 41})).unwrap();
        assert!(request.has_changes());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_actor_validates_supplied_fields_only() {
        let request: UpdateActorRequest =
            serde_json::from_value(json!({"gender": "female"})).unwrap();
        assert_eq!(
            request.validate().unwrap_err(),
            "gender must be a single character"
        );
    }

    #[test]
    fn test_create_movie_release_date_optional() {
        let request: CreateMovieRequest =
            serde_json::from_value(json!({"title": "Orlando"})).unwrap();
        assert!(request.release_date.is_none());
        assert!(request.validate().is_ok());

        let request: CreateMovieRequest =
            serde_json::from_value(json!({"title": "Orlando", "release_date": "1992-09-01"}))
                .unwrap();
        assert_eq!(
            request.release_date,
            NaiveDate::from_ymd_opt(1992, 9, 1)
        );
    }

    #[test]
    fn test_create_movie_invalid_date() {
        let result: Result<CreateMovieRequest, _> =
            serde_json::from_value(json!({"title": "Orlando", "release_date": "next spring"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_movie_blank_title() {
        let request: UpdateMovieRequest = serde_json::from_value(json!({"title": ""})).unwrap();
        assert!(request.has_changes());
        assert_eq!(request.validate().unwrap_err(), "title is required");
    }

    #[test]
    fn test_envelopes_serialize() {
        let actor = Actor {
            id: 3,
            name: "Tilda Swinton".to_string(),
            age: 62,
            gender: "F".to_string(),
        };
        assert_eq!(
            serde_json::to_value(ActorsResponse::new(vec![actor.clone()])).unwrap(),
            json!({"success": true, "actors": [{"id": 3, "name": "Tilda Swinton", "age": 62, "gender": "F"}]})
        );
        assert_eq!(
            serde_json::to_value(ActorResponse::new(actor)).unwrap()["actor"]["id"],
            3
        );

        let movie = Movie {
            id: 9,
            title: "Orlando".to_string(),
            release_date: NaiveDate::from_ymd_opt(1992, 9, 1),
        };
        assert_eq!(
            serde_json::to_value(MovieResponse::new(movie)).unwrap(),
            json!({"success": true, "movie": {"id": 9, "title": "Orlando", "release_date": "1992-09-01"}})
        );
        assert_eq!(
            serde_json::to_value(DeleteResponse::new(9)).unwrap(),
            json!({"success": true, "delete": 9})
        );
    }

    #[test]
    fn test_readiness_response_serialization() {
        let ready = ReadinessResponse {
            status: "ready",
            database: Some("healthy"),
            error: None,
        };
        let json = serde_json::to_value(&ready).unwrap();
        assert_eq!(json["status"], "ready");
        assert!(json.get("error").is_none());
    }
}
