#[cfg(feature = "roslibrust")]
pub mod roslibrust;
