pub mod dispatcher;
pub mod errors;
pub mod patch;
pub mod request;
pub mod response;
