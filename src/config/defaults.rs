pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: i64 = 3000;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;
pub const DEFAULT_IMAGE_DIR: &str = "assets/ceit/2024/images";
pub const DEFAULT_IMAGE_PUBLIC_PATH: &str = "/ceit/2024/images";
pub const DEFAULT_MAX_UPLOAD_BYTES: i64 = 16 * 1024 * 1024;
pub const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "*";
