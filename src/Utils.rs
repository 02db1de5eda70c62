/// reading data files from disk into a registry
pub mod load_from_file;
/// terminal and file logging for the binary
pub mod logger;
