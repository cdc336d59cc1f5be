pub mod evaluate;
pub mod generate;
pub mod identity;
pub mod quizzes;
