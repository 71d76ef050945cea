//! Backend of the application.

pub mod creeper;
