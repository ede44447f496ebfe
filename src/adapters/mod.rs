pub mod http;
pub mod ics;
pub mod lunar;
pub mod script;
pub mod storage;
