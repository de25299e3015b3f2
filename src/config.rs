use std::path::PathBuf;

use clap::Parser;

use crate::{
    dal::SqlOptions,
    services::data_fetcher::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, DataMallConfig, FetchOptions},
};

/// Downloads every DataMall bus stop and writes them out as SQL inserts.
///
/// Every option can also be set through its environment variable or a `.env` file.
#[derive(Parser, Debug)]
#[command(name = "datamall_bus_stops", version, about)]
pub struct Config {
    /// DataMall account key, sent as the `AccountKey` header
    #[arg(long, env = "DATAMALL_ACCOUNT_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "DATAMALL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// File the insert statements are written to. It's truncated first.
    #[arg(short, long, env = "BUS_STOPS_OUTPUT", default_value = "bus_stops.sql")]
    pub output: PathBuf,

    /// How far `$skip` advances after every non-empty page
    #[arg(
        long,
        env = "DATAMALL_PAGE_SIZE",
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub page_size: u64,

    /// Fail the fetch after this many pages. Unbounded when unset.
    #[arg(long, env = "DATAMALL_MAX_PAGES", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_pages: Option<u64>,

    /// Write stop codes as quoted SQL strings
    #[arg(long)]
    pub quote_stop_code: bool,

    /// Convert coordinates to radians before computing the sin/cos columns
    #[arg(long)]
    pub convert_to_radians: bool,

    /// Directory for the daily rolling log files
    #[arg(long, env = "LOG_DIR", default_value = "./logs")]
    pub log_dir: PathBuf,

    /// Export spans over OTLP/gRPC to this endpoint, e.g. http://localhost:4317
    #[arg(long, env = "OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    pub fn datamall(&self) -> DataMallConfig {
        DataMallConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            page_size: self.page_size,
            max_pages: self.max_pages,
        }
    }

    pub fn sql_options(&self) -> SqlOptions {
        SqlOptions {
            quote_stop_code: self.quote_stop_code,
            convert_to_radians: self.convert_to_radians,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Config::command().debug_assert();
    }

    #[test]
    fn defaults_match_datamall() {
        let config = Config::try_parse_from(["datamall_bus_stops", "--api-key", "abc"]).unwrap();

        assert_eq!(config.api_key, "abc");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.output, PathBuf::from("bus_stops.sql"));
        assert_eq!(config.fetch_options().page_size, 500);
        assert_eq!(config.fetch_options().max_pages, None);
        assert!(!config.sql_options().quote_stop_code);
        assert!(!config.sql_options().convert_to_radians);
    }

    #[test]
    fn reads_every_flag() {
        let config = Config::try_parse_from([
            "datamall_bus_stops",
            "--api-key",
            "abc",
            "--base-url",
            "http://localhost:8080/BusStops",
            "-o",
            "/tmp/stops.sql",
            "--page-size",
            "50",
            "--max-pages",
            "20",
            "--quote-stop-code",
            "--convert-to-radians",
        ])
        .unwrap();

        assert_eq!(config.datamall().base_url, "http://localhost:8080/BusStops");
        assert_eq!(config.output, PathBuf::from("/tmp/stops.sql"));
        assert_eq!(config.fetch_options().page_size, 50);
        assert_eq!(config.fetch_options().max_pages, Some(20));
        assert!(config.sql_options().quote_stop_code);
        assert!(config.sql_options().convert_to_radians);
    }

    #[test]
    fn rejects_a_zero_page_size() {
        let result =
            Config::try_parse_from(["datamall_bus_stops", "--api-key", "abc", "--page-size", "0"]);

        assert!(result.is_err());
    }
}
