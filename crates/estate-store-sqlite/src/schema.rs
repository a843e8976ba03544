//! SQL schema for the estate SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS cities (
    city_id TEXT PRIMARY KEY,
    name    TEXT NOT NULL
);

-- An area within a city.
CREATE TABLE IF NOT EXISTS locations (
    location_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    city_id     TEXT REFERENCES cities(city_id)
);

CREATE TABLE IF NOT EXISTS agents (
    agent_id TEXT PRIMARY KEY,
    name     TEXT NOT NULL,
    phone    TEXT,
    email    TEXT
);

CREATE TABLE IF NOT EXISTS property_types (
    type_id TEXT PRIMARY KEY,
    name    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS amenities (
    amenity_id TEXT PRIMARY KEY,
    name       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    project_id TEXT PRIMARY KEY,
    name       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS listings (
    listing_id  TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    price       REAL NOT NULL CHECK (price >= 0),
    purpose     TEXT NOT NULL,   -- 'sale' | 'rent'
    area        REAL NOT NULL,   -- square meters
    bedrooms    INTEGER NOT NULL DEFAULT 0 CHECK (bedrooms >= 0),
    bathrooms   INTEGER NOT NULL DEFAULT 0 CHECK (bathrooms >= 0),
    rooms       INTEGER NOT NULL DEFAULT 0 CHECK (rooms >= 0),
    garage      INTEGER NOT NULL DEFAULT 0,
    balcony     INTEGER NOT NULL DEFAULT 0,
    image       TEXT,            -- primary image reference
    location_id TEXT REFERENCES locations(location_id),
    agent_id    TEXT REFERENCES agents(agent_id),
    type_id     TEXT REFERENCES property_types(type_id),
    project_id  TEXT REFERENCES projects(project_id),
    created_at  TEXT NOT NULL    -- RFC 3339 UTC, fixed microsecond precision
);

-- Gallery, in display order.
CREATE TABLE IF NOT EXISTS listing_images (
    listing_id TEXT NOT NULL REFERENCES listings(listing_id),
    position   INTEGER NOT NULL,
    reference  TEXT NOT NULL,
    PRIMARY KEY (listing_id, position)
);

CREATE TABLE IF NOT EXISTS listing_amenities (
    listing_id TEXT NOT NULL REFERENCES listings(listing_id),
    amenity_id TEXT NOT NULL REFERENCES amenities(amenity_id),
    PRIMARY KEY (listing_id, amenity_id)
);

CREATE TABLE IF NOT EXISTS deals (
    deal_id    TEXT PRIMARY KEY,
    listing_id TEXT NOT NULL REFERENCES listings(listing_id),
    agent_id   TEXT NOT NULL REFERENCES agents(agent_id),
    kind       TEXT NOT NULL,    -- 'sale' | 'rent'
    status     TEXT NOT NULL,    -- 'pending' | 'completed' | 'cancelled'
    created_at TEXT NOT NULL
);

-- One row per user; overwritten on every save.
CREATE TABLE IF NOT EXISTS user_preferences (
    user_id       TEXT PRIMARY KEY,
    purpose       TEXT NOT NULL,  -- 'buy' | 'rent' | 'both'
    city_id       TEXT,
    property_type TEXT,           -- NULL means any type
    style         TEXT NOT NULL,  -- 'normal' | 'project' | 'both'
    min_price     REAL NOT NULL,
    max_price     REAL NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS listings_created_idx ON listings(created_at, listing_id);
CREATE INDEX IF NOT EXISTS listings_agent_idx   ON listings(agent_id);
CREATE INDEX IF NOT EXISTS deals_listing_idx    ON deals(listing_id, status);

PRAGMA user_version = 1;
";
