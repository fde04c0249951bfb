pub mod guard;
pub mod sanitize;
pub mod validator;
