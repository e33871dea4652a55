//! Entity store database schema.

/// SQL to create the entities table.
pub const CREATE_ENTITIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS entities (
    kind       VARCHAR(64) NOT NULL,
    id         BIGINT NOT NULL,
    version    BIGINT NOT NULL DEFAULT 0,
    body       JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (kind, id)
);

CREATE INDEX IF NOT EXISTS idx_entities_admin_email
    ON entities ((body ->> 'email'))
    WHERE kind = 'admin';
";
