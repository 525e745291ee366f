use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Server listening address
    pub addr: String,

    /// Directory whose contents are served to clients
    pub data_dir: PathBuf,

    /// Frontend assets served on unmatched routes
    pub static_dir: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::from_args(std::env::args())
    }

    fn from_args(args: impl Iterator<Item = String>) -> Self {
        let mut addr = std::env::var("ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let mut data_dir =
            PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()));
        let mut static_dir =
            PathBuf::from(std::env::var("STATIC_DIR").unwrap_or_else(|_| "./frontend".to_string()));

        for arg in args {
            if let Some(value) = arg.strip_prefix("--addr=") {
                addr = value.to_string();
            } else if let Some(value) = arg.strip_prefix("--data-dir=") {
                data_dir = PathBuf::from(value);
            } else if let Some(value) = arg.strip_prefix("--static-dir=") {
                static_dir = PathBuf::from(value);
            }
        }

        Config {
            addr,
            data_dir,
            static_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides() {
        let args = [
            "fileserve",
            "--addr=127.0.0.1:9000",
            "--data-dir=/srv/files",
            "--static-dir=/srv/www",
        ]
        .iter()
        .map(|s| s.to_string());

        let config = Config::from_args(args);
        assert_eq!(config.addr, "127.0.0.1:9000");
        assert_eq!(config.data_dir, PathBuf::from("/srv/files"));
        assert_eq!(config.static_dir, PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_unrelated_args_ignored() {
        let args = ["fileserve", "--verbose", "serve"]
            .iter()
            .map(|s| s.to_string());
        let config = Config::from_args(args);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
