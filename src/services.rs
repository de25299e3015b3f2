pub mod data_fetcher;
