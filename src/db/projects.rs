//! Project database operations

use sqlx::{Row, SqlitePool};

use crate::error::Result;

/// Project record
#[derive(Debug, Clone)]
pub struct Project {
    pub id: i64,
    pub number: String,
    pub name: String,
    pub description: String,
    pub lang_code: String,
    pub docs_path: String,
}

impl Project {
    /// Default report file name for this project.
    pub fn report_file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}_collection_report.json",
            self.number, self.name, self.description, self.lang_code
        )
    }
}

/// Load a project by id.
pub async fn fetch_project(pool: &SqlitePool, project_id: i64) -> Result<Option<Project>> {
    let row = sqlx::query(
        r#"
        SELECT id, number, name, description, lang_code, docs_path
        FROM projects
        WHERE id = ?
        "#,
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| Project {
        id: row.get("id"),
        number: row.get("number"),
        name: row.get("name"),
        description: row.get("description"),
        lang_code: row.get("lang_code"),
        docs_path: row.get("docs_path"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_file_name() {
        let project = Project {
            id: 1,
            number: "P017".to_string(),
            name: "drive".to_string(),
            description: "in_car".to_string(),
            lang_code: "af-ZA".to_string(),
            docs_path: "/docs".to_string(),
        };

        assert_eq!(
            project.report_file_name(),
            "P017_drive_in_car_af-ZA_collection_report.json"
        );
    }
}
