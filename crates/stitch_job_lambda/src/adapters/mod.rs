pub mod iam;
pub mod object_store;
pub mod storage_config;
