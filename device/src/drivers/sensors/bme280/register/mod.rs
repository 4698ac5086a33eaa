pub mod calibration;
pub mod config;
pub mod ctrl_hum;
pub mod ctrl_meas;
pub mod data;
pub mod id;
pub mod reset;
pub mod status;
