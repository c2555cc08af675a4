pub mod filter_mode;
