use primefire_db::error::{is_check_violation, is_referential_violation, violated_constraint};
use primefire_db::Migrator;
use sqlx::PgPool;

async fn migrate(pool: &PgPool) {
    Migrator::standard().unwrap().run(pool).await.unwrap();
}

async fn insert_employee(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO employees (first_name, last_name, email) VALUES ('Ada', 'Lovelace', $1)
         RETURNING id",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_ticket(pool: &PgPool, status: &str, created_by: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO tickets (title, status, created_by) VALUES ('Printer jam', $1, $2)
         RETURNING id",
    )
    .bind(status)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

#[sqlx::test(migrations = false)]
async fn permission_for_unknown_module_is_rejected(pool: PgPool) {
    migrate(&pool).await;

    let err = sqlx::query("INSERT INTO role_modules (role_id, module_id) VALUES (1, 999)")
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(is_referential_violation(&err), "{err}");
    assert_eq!(violated_constraint(&err), Some("fk_role_modules_module_id"));
}

#[sqlx::test(migrations = false)]
async fn deleting_role_cascades_to_its_permissions(pool: PgPool) {
    migrate(&pool).await;

    sqlx::query("DELETE FROM roles WHERE id = 2")
        .execute(&pool)
        .await
        .unwrap();

    let manager_rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM role_modules WHERE role_id = 2")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(manager_rows, 0);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM role_modules")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 16);
}

#[sqlx::test(migrations = false)]
async fn deleting_leaf_module_cascades_to_its_permissions(pool: PgPool) {
    migrate(&pool).await;

    sqlx::query("DELETE FROM modules WHERE key = 'countries'")
        .execute(&pool)
        .await
        .unwrap();

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM role_modules WHERE module_id = 9")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[sqlx::test(migrations = false)]
async fn parent_module_cannot_be_deleted_while_children_exist(pool: PgPool) {
    migrate(&pool).await;

    let err = sqlx::query("DELETE FROM modules WHERE key = 'administration'")
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(is_referential_violation(&err), "{err}");
}

#[sqlx::test(migrations = false)]
async fn module_cannot_be_its_own_parent(pool: PgPool) {
    migrate(&pool).await;

    let err = sqlx::query("UPDATE modules SET parent_module_id = id WHERE id = 1")
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(is_check_violation(&err), "{err}");
}

#[sqlx::test(migrations = false)]
async fn duplicate_module_key_is_rejected(pool: PgPool) {
    migrate(&pool).await;

    let err = sqlx::query("INSERT INTO modules (name, key) VALUES ('Other', 'dashboard')")
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(violated_constraint(&err), Some("uq_modules_key"));
}

#[sqlx::test(migrations = false)]
async fn ticket_status_must_be_known(pool: PgPool) {
    migrate(&pool).await;
    let employee = insert_employee(&pool, "ada@example.com").await;

    let err = insert_ticket(&pool, "bogus", employee).await.unwrap_err();
    assert!(is_check_violation(&err), "{err}");
    assert_eq!(violated_constraint(&err), Some("ck_tickets_status"));

    insert_ticket(&pool, "on_hold", employee).await.unwrap();
}

#[sqlx::test(migrations = false)]
async fn ticket_defaults_and_optional_sla(pool: PgPool) {
    migrate(&pool).await;
    let employee = insert_employee(&pool, "ada@example.com").await;

    let (status, priority, sla): (String, String, Option<String>) = sqlx::query_as(
        "INSERT INTO tickets (title, created_by) VALUES ('Badge reader', $1)
         RETURNING status, priority, sla",
    )
    .bind(employee)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!((status.as_str(), priority.as_str(), sla), ("todo", "normal", None));

    let err = sqlx::query("INSERT INTO tickets (title, created_by, sla) VALUES ('x', $1, '3d')")
        .bind(employee)
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(violated_constraint(&err), Some("ck_tickets_sla"));

    let err = sqlx::query("INSERT INTO tickets (title, created_by, priority) VALUES ('x', $1, 'meh')")
        .bind(employee)
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(violated_constraint(&err), Some("ck_tickets_priority"));
}

#[sqlx::test(migrations = false)]
async fn ticket_creator_must_exist_and_is_protected(pool: PgPool) {
    migrate(&pool).await;

    let err = insert_ticket(&pool, "todo", 4242).await.unwrap_err();
    assert!(is_referential_violation(&err), "{err}");

    let employee = insert_employee(&pool, "ada@example.com").await;
    insert_ticket(&pool, "todo", employee).await.unwrap();

    let err = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(employee)
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(violated_constraint(&err), Some("fk_tickets_created_by"));
}

#[sqlx::test(migrations = false)]
async fn ticket_title_length_is_enforced(pool: PgPool) {
    migrate(&pool).await;
    let employee = insert_employee(&pool, "ada@example.com").await;

    let err = sqlx::query("INSERT INTO tickets (title, created_by) VALUES ($1, $2)")
        .bind("x".repeat(201))
        .bind(employee)
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(violated_constraint(&err), Some("ck_tickets_title"));
}
