/// Default ledger file, relative to the working directory
pub(crate) const LEDGER_FILE_NAME: &str = "wbam_ledger.json";

/// Environment variable overriding the ledger path
pub(crate) const LEDGER_ENV: &str = "WBAM_LEDGER";

/// Written to `meta.app` of every fresh ledger
pub(crate) const APP_NAME: &str = "WBAM Training App";

/// Written to `meta.version` of every fresh ledger
pub(crate) const LEDGER_VERSION: &str = "1.0";

/// Standard date-time format for table display: "2025-01-15 09:30"
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Fallback module name when a session is created with an empty module
pub(crate) const DEFAULT_MODULE: &str = "M0";
