//! V001: workspaces, categories, iterations.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS workspaces (
    workspace_id TEXT PRIMARY KEY,
    dataset_name TEXT NOT NULL,
    created_at TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_workspaces_dataset
    ON workspaces(dataset_name);

-- One row per category; the change counter lives here so it is updated
-- under the same lock as the category's iterations.
CREATE TABLE IF NOT EXISTS categories (
    workspace_id TEXT NOT NULL
        REFERENCES workspaces(workspace_id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    label_changes_since_train INTEGER NOT NULL DEFAULT 0
        CHECK (label_changes_since_train >= 0),
    PRIMARY KEY (workspace_id, name)
) STRICT;

-- Append-only iteration history. The model columns describe the artifact
-- owned by the provider; the row outlives the artifact.
CREATE TABLE IF NOT EXISTS iterations (
    workspace_id TEXT NOT NULL,
    category TEXT NOT NULL,
    iteration_index INTEGER NOT NULL CHECK (iteration_index >= 0),
    status TEXT NOT NULL,
    model_id TEXT NOT NULL,
    model_status TEXT NOT NULL,
    model_type TEXT NOT NULL,
    model_metadata TEXT NOT NULL,
    model_created_at TEXT NOT NULL,
    statistics TEXT NOT NULL DEFAULT '{}',
    recommendations TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (workspace_id, category, iteration_index),
    FOREIGN KEY (workspace_id, category)
        REFERENCES categories(workspace_id, name) ON DELETE CASCADE
) STRICT;

CREATE INDEX IF NOT EXISTS idx_iterations_status
    ON iterations(workspace_id, category, status);
"#;
