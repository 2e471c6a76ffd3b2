pub const SCHEMA: &str = r#"
-- Users own categories and artefacts
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2id PHC string with embedded salt
    name TEXT NOT NULL,
    guardian_key TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Named groupings of artefacts
CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    category_index INTEGER,        -- display order, 0..=255
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT,
    image_path TEXT,               -- /api/Assets/Categories/<id>.<ext>
    modified_at TEXT
);

-- Leaf records; category is optional and removing it removes its artefacts
CREATE TABLE IF NOT EXISTS artefacts (
    id TEXT PRIMARY KEY,
    artefact_index INTEGER NOT NULL,  -- display order, 0..=65535
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    category_id TEXT REFERENCES categories(id) ON DELETE CASCADE,
    name TEXT,
    image_path TEXT,                  -- /api/Assets/Artefacts/<id>.<ext>
    modified_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id);
CREATE INDEX IF NOT EXISTS idx_artefacts_user ON artefacts(user_id);
CREATE INDEX IF NOT EXISTS idx_artefacts_category ON artefacts(category_id);
"#;
