pub mod deploy;
pub mod status;
