use axum::Json;

use super::CategoryDto;

/// The fixed set of knowledge categories shared by posts, jobs, and
/// freelancer profiles.
const CATEGORIES: &[(&str, &str)] = &[
    ("Health & Well-being", "health-well-being"),
    ("Finance & Business", "finance-business"),
    ("Education & Knowledge", "education-knowledge"),
    ("Technology", "technology"),
    ("Law", "law"),
    ("Agriculture & Environment", "agriculture-environment"),
    ("Religion & Ethics", "religion-ethics"),
    ("Community Development", "community-development"),
    ("Sports & Entertainment", "sports-entertainment"),
];

/// GET /categories
pub async fn list_categories() -> Json<Vec<CategoryDto>> {
    let categories = CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, (name, slug))| CategoryDto {
            id: u32::try_from(i).unwrap_or(0) + 1,
            name,
            slug,
        })
        .collect();

    Json(categories)
}
