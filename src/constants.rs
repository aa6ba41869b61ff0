/// Shared literals and tuning knobs used across the workflows.

// Sheet layout
pub const LABELS_SHEET: &str = "Labels";
pub const OUI: &str = "Oui";
pub const NON: &str = "Non";

// Concurrency
pub const DEFAULT_WORKER_COUNT: usize = 5;

// Persistence gateway: spreadsheet API limits differ from site throttling,
// so these stay independent from the fetch-retry settings below.
pub const PERSIST_CHUNK_SIZE: usize = 500;
pub const PERSIST_MAX_ATTEMPTS: u32 = 3;
pub const PERSIST_RETRY_DELAY_SECS: u64 = 2;

// HTTP fetching
pub const MAX_FETCH_RETRIES: u32 = 3;
pub const FETCH_TIMEOUT_SECS: u64 = 10;
pub const FETCH_BACKOFF_START_SECS: u64 = 5;

// Fuzzy matching thresholds
pub const MATCH_THRESHOLD_DEFAULT: u8 = 70;
pub const MATCH_THRESHOLD_MERCH: u8 = 90;
// Near-exact only: keeps similarly named but distinct labels apart.
pub const MATCH_THRESHOLD_RECONCILE: u8 = 99;

// Rank formatting
pub const HYPE_MARKER: &str = "HYPE";

// Activity thresholds for the marketplace release lookback
pub const ACTIF_MIN_RELEASES: usize = 10;
pub const OPEN_MIN_ARTISTS: usize = 3;
pub const RELEASE_LOOKBACK_DAYS: i64 = 365;

// Source endpoints
pub const SONGSTATS_URL: &str = "https://songstats.com";
pub const SONGSTATS_SEARCH_URL: &str = "https://data.songstats.com/api/v1/search/search_all?q=";
pub const BEATSTATS_LIST_GENRE_URL: &str = "https://www.beatstats.com/labels/home/list?genre=";
pub const BEATPORT_BASE_URL: &str = "https://www.beatport.com";
pub const BANDCAMP_URL: &str = "https://bandcamp.com";

pub const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
];
