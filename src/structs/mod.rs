pub mod alias;
pub mod answer;
pub mod evaluation;
pub mod generate;
pub mod question;
pub mod record;
pub mod submit;
