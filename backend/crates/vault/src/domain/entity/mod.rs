pub mod assignment;
pub mod question_set;
pub mod recipient;
pub mod secret;
pub mod settings;
