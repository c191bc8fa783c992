//! Repository for `employees` and their role assignments.

use primefire_core::types::DbId;
use sqlx::PgPool;

use crate::models::employee::{CreateEmployee, Employee, UpdateEmployee};
use crate::models::role::Role;

const COLUMNS: &str =
    "id, first_name, last_name, display_name, email, title, is_active, created_at, updated_at";

pub struct EmployeeRepo;

impl EmployeeRepo {
    pub async fn create(pool: &PgPool, input: &CreateEmployee) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees (first_name, last_name, display_name, email, title)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.display_name)
            .bind(&input.email)
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List employees ordered by last name, then first name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Employee>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM employees ORDER BY last_name ASC, first_name ASC, id ASC");
        sqlx::query_as::<_, Employee>(&query).fetch_all(pool).await
    }

    /// Partial update; bumps `updated_at`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEmployee,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "UPDATE employees SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                display_name = CASE WHEN $4 THEN $5 ELSE display_name END,
                email = COALESCE($6, email),
                title = CASE WHEN $7 THEN $8 ELSE title END,
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(input.display_name.is_some())
            .bind(input.display_name.as_ref().and_then(Option::as_deref))
            .bind(&input.email)
            .bind(input.title.is_some())
            .bind(input.title.as_ref().and_then(Option::as_deref))
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete an employee and their role assignments. Fails with a foreign
    /// key violation while tickets still reference them.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Give an employee a role. Returns `false` if they already held it.
    pub async fn assign_role(
        pool: &PgPool,
        employee_id: DbId,
        role_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO employee_roles (employee_id, role_id) VALUES ($1, $2)
             ON CONFLICT (employee_id, role_id) DO NOTHING",
        )
        .bind(employee_id)
        .bind(role_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `true` if the assignment existed.
    pub async fn revoke_role(
        pool: &PgPool,
        employee_id: DbId,
        role_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM employee_roles WHERE employee_id = $1 AND role_id = $2")
                .bind(employee_id)
                .bind(role_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Roles held by an employee, ordered by role id.
    pub async fn roles_for(pool: &PgPool, employee_id: DbId) -> Result<Vec<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(
            "SELECT r.id, r.name, r.description, r.created_at
             FROM employee_roles er
             JOIN roles r ON r.id = er.role_id
             WHERE er.employee_id = $1
             ORDER BY r.id ASC",
        )
        .bind(employee_id)
        .fetch_all(pool)
        .await
    }
}
