pub mod homework;
pub mod status;
