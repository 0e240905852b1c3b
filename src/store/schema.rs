pub const SCHEMA: &str = r#"
-- Users; invitees without an account exist only as emails on page_roles
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    public_id TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Organizations are the tenant boundary
CREATE TABLE IF NOT EXISTS organizations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    public_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organization_members (
    org_id INTEGER NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role TEXT NOT NULL,           -- owner | admin | member
    created_at TEXT NOT NULL,
    PRIMARY KEY (org_id, user_id)
);

CREATE TABLE IF NOT EXISTS spaces (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    public_id TEXT NOT NULL UNIQUE,
    org_id INTEGER NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    UNIQUE(org_id, slug)
);

-- Space membership gates page visibility before page roles are consulted
CREATE TABLE IF NOT EXISTS space_members (
    space_id INTEGER NOT NULL REFERENCES spaces(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role TEXT NOT NULL,           -- owner | member | guest
    created_at TEXT NOT NULL,
    PRIMARY KEY (space_id, user_id)
);

-- Pages form a tree through parent_id; path holds the ancestor ids, root first
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    public_id TEXT NOT NULL UNIQUE,
    org_id INTEGER NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    space_id INTEGER NOT NULL REFERENCES spaces(id) ON DELETE CASCADE,
    parent_id INTEGER REFERENCES pages(id) ON DELETE CASCADE,
    path TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL,
    view_type TEXT NOT NULL,      -- document | table
    cover_image TEXT,
    node_id TEXT,
    general_role TEXT NOT NULL,   -- fallback role when no grantee row matches
    author_id INTEGER NOT NULL REFERENCES users(id),
    archived_at TEXT,             -- NULL = live
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- A role row targets either a registered user or an invited email
CREATE TABLE IF NOT EXISTS page_roles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id INTEGER NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
    user_id INTEGER REFERENCES users(id) ON DELETE CASCADE,
    email TEXT,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    CHECK ((user_id IS NULL) <> (email IS NULL))
);

-- Opaque page body: document content or table definition
CREATE TABLE IF NOT EXISTS documents (
    page_id INTEGER PRIMARY KEY REFERENCES pages(id) ON DELETE CASCADE,
    content TEXT NOT NULL DEFAULT '{}',
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    public_id TEXT NOT NULL UNIQUE,
    page_id INTEGER NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
    url TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    size_bytes INTEGER NOT NULL DEFAULT 0,
    thumbnail TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS page_stars (
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    page_id INTEGER NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
    order_key REAL NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, page_id)
);

-- Archived tokens are kept for audit; at most one live token per page
CREATE TABLE IF NOT EXISTS public_tokens (
    id TEXT PRIMARY KEY,
    page_id INTEGER NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    archived_at TEXT
);

-- Append-only activity log; rows outlive the pages they mention
CREATE TABLE IF NOT EXISTS activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    public_id TEXT NOT NULL UNIQUE,
    actor_id INTEGER NOT NULL,
    action TEXT NOT NULL,
    snapshot TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS activity_pages (
    activity_id INTEGER NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
    page_id INTEGER NOT NULL,
    PRIMARY KEY (activity_id, page_id)
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_spaces_org ON spaces(org_id);
CREATE INDEX IF NOT EXISTS idx_pages_space ON pages(space_id);
CREATE INDEX IF NOT EXISTS idx_pages_parent ON pages(parent_id);
CREATE INDEX IF NOT EXISTS idx_pages_path ON pages(path);
CREATE UNIQUE INDEX IF NOT EXISTS idx_page_roles_user ON page_roles(page_id, user_id) WHERE user_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_page_roles_email ON page_roles(page_id, email) WHERE email IS NOT NULL;
CREATE INDEX IF NOT EXISTS idx_page_roles_email_lookup ON page_roles(email);
CREATE INDEX IF NOT EXISTS idx_public_tokens_page ON public_tokens(page_id);
CREATE INDEX IF NOT EXISTS idx_stars_user ON page_stars(user_id);
CREATE INDEX IF NOT EXISTS idx_activities_created ON activities(created_at);
CREATE INDEX IF NOT EXISTS idx_activities_actor ON activities(actor_id);
CREATE INDEX IF NOT EXISTS idx_activity_pages_page ON activity_pages(page_id);
"#;
