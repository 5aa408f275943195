pub mod providers;
pub mod tick_reader;
