pub mod bus;
pub mod sensors;
pub mod serial;
