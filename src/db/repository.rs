//! Database repository for team operations.
//!
//! Uses parameterized statements and one transaction per operation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use super::TeamStore;
use crate::errors::AppError;
use crate::models::{DeleteCounts, Member, Page, Project, Team, TeamFilter};

const TEAM_COLUMNS: &str = "SELECT id, leader, team_name, open_roles, size, last_active FROM teams";

/// SQLite-backed implementation of [`TeamStore`].
#[derive(Clone)]
pub struct TeamRepository {
    pool: SqlitePool,
}

impl TeamRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Hydrate each id in order, skipping teams deleted since the id was read.
    async fn hydrate_all(&self, ids: &[i64]) -> Result<Vec<Team>, AppError> {
        let mut teams = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.get_team_by_id(id).await {
                Ok(team) => teams.push(team),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(team_id = id, "team vanished before hydration");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(teams)
    }
}

#[async_trait]
impl TeamStore for TeamRepository {
    async fn create_team(&self, team: &Team) -> Result<i64, AppError> {
        let last_active = if team.last_active.is_empty() {
            Utc::now().to_rfc3339()
        } else {
            team.last_active.clone()
        };

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO teams (leader, team_name, open_roles, size, last_active) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&team.leader)
        .bind(&team.name)
        .bind(team.open_roles)
        .bind(team.size)
        .bind(&last_active)
        .execute(&mut *tx)
        .await?;
        let team_id = result.last_insert_rowid();

        insert_members(&mut tx, team_id, &team.members).await?;
        insert_skills(&mut tx, team_id, &team.skills).await?;

        tx.commit().await?;

        tracing::debug!(
            team_id,
            members = team.members.len(),
            skills = team.skills.len(),
            "team created"
        );
        Ok(team_id)
    }

    async fn delete_team(&self, team_id: i64) -> Result<DeleteCounts, AppError> {
        let mut tx = self.pool.begin().await?;

        // Children first, then the team row
        let languages = sqlx::query("DELETE FROM languages WHERE team_id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let projects = sqlx::query("DELETE FROM projects WHERE team_id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let members = sqlx::query("DELETE FROM members WHERE team_id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let skills = sqlx::query("DELETE FROM skills WHERE team_id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let teams = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        let counts = DeleteCounts {
            teams,
            members,
            skills,
            projects,
            languages,
        };
        tracing::debug!(team_id, ?counts, "team deleted");
        Ok(counts)
    }

    async fn add_member(&self, team_id: i64, member: &Member) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        // Take a seat first; the conditional update is what keeps open_roles >= 0
        let seat = sqlx::query(
            "UPDATE teams SET open_roles = open_roles - 1, last_active = ? WHERE id = ? AND open_roles > 0",
        )
        .bind(&now)
        .bind(team_id)
        .execute(&mut *tx)
        .await?;

        if seat.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM teams WHERE id = ?")
                .bind(team_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match exists {
                Some(_) => AppError::TeamFull(format!("Team {} has no open roles", team_id)),
                None => AppError::NotFound(format!("Team {} not found", team_id)),
            });
        }

        let result = sqlx::query(
            "INSERT INTO members (user_id, member_email, member_role, team_id) VALUES (?, ?, ?, ?)",
        )
        .bind(member.id)
        .bind(&member.email)
        .bind(&member.role)
        .bind(team_id)
        .execute(&mut *tx)
        .await?;
        let member_number = result.last_insert_rowid();

        tx.commit().await?;

        tracing::debug!(team_id, member_number, user_id = member.id, "member added");
        Ok(member_number)
    }

    async fn remove_member(&self, team_id: i64, member_number: i64) -> Result<u64, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM members WHERE team_id = ? AND id = ?")
            .bind(team_id)
            .bind(member_number)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed > 0 {
            sqlx::query(
                r#"UPDATE teams SET
                    open_roles = CASE WHEN open_roles < size THEN open_roles + 1 ELSE open_roles END,
                    last_active = ?
                WHERE id = ?"#,
            )
            .bind(&now)
            .bind(team_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(team_id, member_number, removed, "member removed");
        Ok(removed)
    }

    async fn upsert_project(&self, team_id: i64, project: &Project) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query("UPDATE teams SET last_active = ? WHERE id = ?")
            .bind(&now)
            .bind(team_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Team {} not found", team_id)));
        }

        // Replace wholesale: the old project and its languages go first
        sqlx::query("DELETE FROM languages WHERE team_id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM projects WHERE team_id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "INSERT INTO projects (goal, project_name, github_link, complexity, duration, team_id) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&project.description)
        .bind(&project.name)
        .bind(&project.github_link)
        .bind(project.complexity)
        .bind(project.duration)
        .bind(team_id)
        .execute(&mut *tx)
        .await?;
        let project_id = result.last_insert_rowid();

        insert_languages(&mut tx, team_id, &project.languages).await?;

        tx.commit().await?;

        tracing::debug!(team_id, project_id, "project upserted");
        Ok(project_id)
    }

    async fn get_team_by_id(&self, team_id: i64) -> Result<Team, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("{TEAM_COLUMNS} WHERE id = ?"))
            .bind(team_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", team_id)))?;
        let team = load_team(&mut tx, &row).await?;

        tx.commit().await?;
        Ok(team)
    }

    async fn get_team_by_name(&self, name: &str) -> Result<Team, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("{TEAM_COLUMNS} WHERE team_name = ?"))
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team '{}' not found", name)))?;
        let team = load_team(&mut tx, &row).await?;

        tx.commit().await?;
        Ok(team)
    }

    async fn get_teams_by_user_id(&self, user_id: i64) -> Result<Vec<Team>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT team_id FROM members WHERE user_id = ? ORDER BY team_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate_all(&ids).await
    }

    async fn get_teams(&self, filter: &TeamFilter, page: Page) -> Result<Vec<Team>, AppError> {
        let offset = page.offset();

        let ids = match filter {
            TeamFilter::Skill(name) => {
                sqlx::query_scalar::<_, i64>(
                    r#"SELECT id FROM teams
                       WHERE id IN (SELECT team_id FROM skills WHERE skill_name = ?)
                          OR id IN (SELECT team_id FROM members WHERE member_role = ?)
                       ORDER BY id LIMIT ? OFFSET ?"#,
                )
                .bind(name)
                .bind(name)
                .bind(page.limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            TeamFilter::Complexity(level) => {
                sqlx::query_scalar::<_, i64>(
                    r#"SELECT id FROM teams
                       WHERE id IN (SELECT team_id FROM projects WHERE complexity = ?)
                       ORDER BY id LIMIT ? OFFSET ?"#,
                )
                .bind(*level)
                .bind(page.limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            TeamFilter::All => {
                sqlx::query_scalar::<_, i64>("SELECT id FROM teams ORDER BY id LIMIT ? OFFSET ?")
                    .bind(page.limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        self.hydrate_all(&ids).await
    }

    async fn count_user_teams(&self, leader: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM teams WHERE leader = ?")
            .bind(leader)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn check_user_owns_team(&self, leader: &str, team_id: i64) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM teams WHERE id = ? AND leader = ?",
        )
        .bind(team_id)
        .bind(leader)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn check_member_exists(&self, user_id: i64, team_id: i64) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM members WHERE user_id = ? AND team_id = ?",
        )
        .bind(user_id)
        .bind(team_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn check_team_size(&self, team_id: i64) -> Result<bool, AppError> {
        let open_roles = sqlx::query_scalar::<_, i64>("SELECT open_roles FROM teams WHERE id = ?")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", team_id)))?;
        Ok(open_roles < 1)
    }
}

// Bulk inserts. Empty lists skip the statement so no degenerate VALUES clause is built.

async fn insert_members(
    conn: &mut SqliteConnection,
    team_id: i64,
    members: &[Member],
) -> Result<(), AppError> {
    if members.is_empty() {
        return Ok(());
    }
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO members (user_id, member_email, member_role, team_id) ");
    builder.push_values(members, |mut b, member| {
        b.push_bind(member.id)
            .push_bind(member.email.clone())
            .push_bind(member.role.clone())
            .push_bind(team_id);
    });
    builder.build().execute(&mut *conn).await?;
    Ok(())
}

async fn insert_skills(
    conn: &mut SqliteConnection,
    team_id: i64,
    skills: &[String],
) -> Result<(), AppError> {
    if skills.is_empty() {
        return Ok(());
    }
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO skills (skill_name, team_id) ");
    builder.push_values(skills, |mut b, skill| {
        b.push_bind(skill.clone()).push_bind(team_id);
    });
    builder.build().execute(&mut *conn).await?;
    Ok(())
}

async fn insert_languages(
    conn: &mut SqliteConnection,
    team_id: i64,
    languages: &[String],
) -> Result<(), AppError> {
    if languages.is_empty() {
        return Ok(());
    }
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO languages (lang_name, team_id) ");
    builder.push_values(languages, |mut b, lang| {
        b.push_bind(lang.clone()).push_bind(team_id);
    });
    builder.build().execute(&mut *conn).await?;
    Ok(())
}

/// Read members, skills, project and languages for a team row on the same connection.
async fn load_team(conn: &mut SqliteConnection, row: &SqliteRow) -> Result<Team, AppError> {
    let team_id: i64 = row.get("id");

    let members = sqlx::query(
        "SELECT user_id, member_email, member_role FROM members WHERE team_id = ? ORDER BY id",
    )
    .bind(team_id)
    .fetch_all(&mut *conn)
    .await?
    .iter()
    .map(member_from_row)
    .collect();

    let skills = sqlx::query_scalar::<_, String>("SELECT skill_name FROM skills WHERE team_id = ?")
        .bind(team_id)
        .fetch_all(&mut *conn)
        .await?;

    let project_row = sqlx::query(
        "SELECT goal, project_name, github_link, complexity, duration FROM projects WHERE team_id = ?",
    )
    .bind(team_id)
    .fetch_optional(&mut *conn)
    .await?;

    // A team without a project is fine
    let project = match project_row {
        Some(project_row) => {
            let languages =
                sqlx::query_scalar::<_, String>("SELECT lang_name FROM languages WHERE team_id = ?")
                    .bind(team_id)
                    .fetch_all(&mut *conn)
                    .await?;
            Some(project_from_row(&project_row, languages))
        }
        None => None,
    };

    Ok(Team {
        id: team_id.to_string(),
        leader: row.get("leader"),
        name: row.get("team_name"),
        open_roles: row.get("open_roles"),
        size: row.get("size"),
        last_active: row.get("last_active"),
        members,
        skills,
        project,
    })
}

fn member_from_row(row: &SqliteRow) -> Member {
    Member {
        id: row.get("user_id"),
        email: row.get("member_email"),
        role: row.get("member_role"),
    }
}

fn project_from_row(row: &SqliteRow, languages: Vec<String>) -> Project {
    Project {
        description: row.get("goal"),
        name: row.get("project_name"),
        github_link: row.get("github_link"),
        complexity: row.get("complexity"),
        duration: row.get("duration"),
        languages,
    }
}
