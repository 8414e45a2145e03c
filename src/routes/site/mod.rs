pub mod home;
pub mod login;
pub mod logout;
pub mod members;
