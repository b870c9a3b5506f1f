pub mod counter;
pub mod files;
pub mod md5;
pub mod threadpool;
