use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

const POSTGRES_UP: &[&str] = &[
    r#"CREATE OR REPLACE FUNCTION webhook_events_append_only() RETURNS trigger AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        RAISE EXCEPTION 'webhook_events is append-only: delete rejected';
    END IF;
    IF NEW.raw_body IS DISTINCT FROM OLD.raw_body
        OR NEW.content_hash IS DISTINCT FROM OLD.content_hash
        OR NEW.received_at IS DISTINCT FROM OLD.received_at
        OR NEW.created_at IS DISTINCT FROM OLD.created_at THEN
        RAISE EXCEPTION 'webhook_events is append-only: stored fields are immutable';
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql"#,
    "CREATE TRIGGER webhook_events_no_delete BEFORE DELETE ON webhook_events \
     FOR EACH ROW EXECUTE FUNCTION webhook_events_append_only()",
    "CREATE TRIGGER webhook_events_immutable BEFORE UPDATE ON webhook_events \
     FOR EACH ROW EXECUTE FUNCTION webhook_events_append_only()",
];

const POSTGRES_DOWN: &[&str] = &[
    "DROP TRIGGER IF EXISTS webhook_events_immutable ON webhook_events",
    "DROP TRIGGER IF EXISTS webhook_events_no_delete ON webhook_events",
    "DROP FUNCTION IF EXISTS webhook_events_append_only()",
];

const SQLITE_UP: &[&str] = &[
    "CREATE TRIGGER IF NOT EXISTS webhook_events_no_delete BEFORE DELETE ON webhook_events \
     BEGIN SELECT RAISE(ABORT, 'webhook_events is append-only: delete rejected'); END",
    "CREATE TRIGGER IF NOT EXISTS webhook_events_immutable BEFORE UPDATE ON webhook_events \
     WHEN NEW.raw_body IS NOT OLD.raw_body \
       OR NEW.content_hash IS NOT OLD.content_hash \
       OR NEW.received_at IS NOT OLD.received_at \
       OR NEW.created_at IS NOT OLD.created_at \
     BEGIN SELECT RAISE(ABORT, 'webhook_events is append-only: stored fields are immutable'); END",
];

const SQLITE_DOWN: &[&str] = &[
    "DROP TRIGGER IF EXISTS webhook_events_immutable",
    "DROP TRIGGER IF EXISTS webhook_events_no_delete",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let statements = match manager.get_database_backend() {
            DbBackend::Postgres => POSTGRES_UP,
            DbBackend::Sqlite => SQLITE_UP,
            DbBackend::MySql => {
                return Err(DbErr::Migration(
                    "append-only triggers are not implemented for MySQL".to_string(),
                ))
            }
        };

        let db = manager.get_connection();
        for sql in statements {
            db.execute_unprepared(sql).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let statements = match manager.get_database_backend() {
            DbBackend::Postgres => POSTGRES_DOWN,
            DbBackend::Sqlite => SQLITE_DOWN,
            DbBackend::MySql => return Ok(()),
        };

        let db = manager.get_connection();
        for sql in statements {
            db.execute_unprepared(sql).await?;
        }
        Ok(())
    }
}
