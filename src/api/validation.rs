use super::ApiError;

pub const POST_TYPES: &[&str] = &["question", "information", "opinion", "knowledge"];

pub const JOB_TYPES: &[&str] = &[
    "Full-time",
    "Part-time",
    "Contract",
    "Internship",
    "Freelance",
];

pub const AVAILABILITIES: &[&str] = &["Available", "Busy", "Not Available"];

pub fn validate_id(id: i32, resource: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {} ID: {}. ID must be a positive integer",
            resource, id
        )));
    }
    Ok(id)
}

/// Clamp a 1-based page number; page sizes are capped server-side.
pub fn normalize_page(page: Option<u64>) -> u64 {
    page.unwrap_or(1).max(1)
}

pub fn normalize_page_size(page_size: Option<u64>) -> u64 {
    const DEFAULT: u64 = 10;
    const MAX: u64 = 100;

    page_size.unwrap_or(DEFAULT).clamp(1, MAX)
}

pub fn validate_title(title: &str) -> Result<&str, ApiError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Title cannot be empty"));
    }
    if trimmed.len() > 200 {
        return Err(ApiError::validation(
            "Title must be 200 characters or less",
        ));
    }
    Ok(trimmed)
}

pub fn validate_content(content: &str) -> Result<&str, ApiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Content cannot be empty"));
    }
    Ok(trimmed)
}

pub fn validate_post_type(post_type: &str) -> Result<&str, ApiError> {
    if !POST_TYPES.contains(&post_type) {
        return Err(ApiError::validation(format!(
            "Invalid post type: {}. Must be one of: {}",
            post_type,
            POST_TYPES.join(", ")
        )));
    }
    Ok(post_type)
}

pub fn validate_job_type(job_type: &str) -> Result<&str, ApiError> {
    if !JOB_TYPES.contains(&job_type) {
        return Err(ApiError::validation(format!(
            "Invalid job type: {}. Must be one of: {}",
            job_type,
            JOB_TYPES.join(", ")
        )));
    }
    Ok(job_type)
}

pub fn validate_availability(availability: &str) -> Result<&str, ApiError> {
    if !AVAILABILITIES.contains(&availability) {
        return Err(ApiError::validation(format!(
            "Invalid availability: {}. Must be one of: {}",
            availability,
            AVAILABILITIES.join(", ")
        )));
    }
    Ok(availability)
}

pub fn validate_rating(rating: i32) -> Result<i32, ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::validation(format!(
            "Invalid rating: {}. Rating must be between 1 and 5",
            rating
        )));
    }
    Ok(rating)
}

pub fn validate_bio(bio: &str) -> Result<&str, ApiError> {
    if bio.len() > 500 {
        return Err(ApiError::validation("Bio must be 500 characters or less"));
    }
    Ok(bio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1, "post").is_ok());
        assert!(validate_id(0, "post").is_err());
        assert!(validate_id(-5, "post").is_err());
    }

    #[test]
    fn test_normalize_page() {
        assert_eq!(normalize_page(None), 1);
        assert_eq!(normalize_page(Some(0)), 1);
        assert_eq!(normalize_page(Some(7)), 7);
    }

    #[test]
    fn test_normalize_page_size() {
        assert_eq!(normalize_page_size(None), 10);
        assert_eq!(normalize_page_size(Some(0)), 1);
        assert_eq!(normalize_page_size(Some(250)), 100);
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("How do I rotate maize crops?").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"a".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_post_type() {
        assert!(validate_post_type("question").is_ok());
        assert!(validate_post_type("rant").is_err());
    }

    #[test]
    fn test_validate_job_type() {
        assert!(validate_job_type("Full-time").is_ok());
        assert!(validate_job_type("full-time").is_err());
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_validate_bio() {
        assert!(validate_bio("Agronomist in Nakuru").is_ok());
        assert!(validate_bio(&"x".repeat(501)).is_err());
    }
}
