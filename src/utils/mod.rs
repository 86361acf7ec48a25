pub mod db_utils;
pub mod network_cache;
