// Utility functions
pub mod error;
pub mod imaging;
pub mod time;
pub mod upload;
pub mod validation;
