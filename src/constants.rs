pub const DEFAULT_TIMEOUT: u64 = 3;

pub const CGI_PATH: &str = "/index.cgi";
pub const SESSION_PATTERN: &str = r#"session=(.{4})""#;

pub const DEFAULT_USERNAME: &str = "ADMIN";
pub const DEFAULT_PASSWORD: &str = "6633222";
pub const DEFAULT_MAX_PARALLEL: usize = 8;
