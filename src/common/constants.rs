/// Backend and client constants shared across the crate

// Default backend location when neither config.toml nor the environment set one
pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const API_URL_ENV: &str = "IDOL_STAGE_API_URL";

// Persisted client state lives under this key (file name stem for the file store)
pub const USER_STORAGE_KEY: &str = "user-storage-for-virtual";

// Responsive breakpoint for cards: widths at or below this are "mobile"
pub const MOBILE_MAX_WIDTH_PX: u32 = 768;

// Ticket export canvas (7:3)
pub const TICKET_WIDTH: u32 = 1400;
pub const TICKET_HEIGHT: u32 = 600;

// Page sizes used by the original screens
pub const COLLECTION_PAGE_SIZE: u32 = 10;
pub const CONCERT_PAGE_SIZE: u32 = 5;
pub const SEARCH_PAGE_SIZE: u32 = 5;
pub const IMMINENT_LIMIT: u32 = 5;

/// Upper bound on pages followed when reading a whole collection
pub const MAX_COLLECTION_PAGES: u32 = 100;

/// How long the imminent-concert list is served from cache
pub const IMMINENT_CACHE_SECS: u64 = 5 * 60;

/// Song duration sent when registering a new song upload
pub const DEFAULT_SONG_DURATION_SECS: u32 = 180;

/// Weekday header for the calendar grid, Sunday first
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
