use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = ".roster";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: Option<String>,
    pub data_dir: PathBuf,
}

impl Config {
    /// Reads `DATABASE_URL` and `ROSTER_DATA_DIR`, after loading a `.env` file if one exists.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = lookup("DATABASE_URL").filter(|value| !value.trim().is_empty());
        let data_dir = lookup("ROSTER_DATA_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Self {
            database_url,
            data_dir,
        }
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_file_backend() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.database_url, None);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = Config::from_lookup(|name| match name {
            "DATABASE_URL" => Some("  ".to_string()),
            "ROSTER_DATA_DIR" => Some("/var/lib/roster".to_string()),
            _ => None,
        });
        assert_eq!(config.database_url, None);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/roster"));
    }

    #[test]
    fn flag_overrides_environment_directory() {
        let config = Config::from_lookup(|name| {
            (name == "ROSTER_DATA_DIR").then(|| "from-env".to_string())
        })
        .with_data_dir(Some(PathBuf::from("from-flag")));
        assert_eq!(config.data_dir, PathBuf::from("from-flag"));
    }
}
