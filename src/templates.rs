//! 内置模板题库

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::categorizer::Category;
use crate::structs::question::{Question, QuestionType};

lazy_static! {
    static ref TEMPLATES: HashMap<(QuestionType, Category), Vec<Question>> = build_templates();
}

/// 某题型某分类下的全部模板，没有则为空
pub fn templates_for(kind: QuestionType, category: Category) -> &'static [Question] {
    TEMPLATES
        .get(&(kind, category))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn choice(question: &str, options: [&str; 4], correct_answer: usize, explanation: &str) -> Question {
    Question::Choice {
        question: question.to_string(),
        options: options.map(str::to_string),
        correct_answer,
        explanation: explanation.to_string(),
    }
}

fn short(question: &str, correct_answer: &str, explanation: &str) -> Question {
    Question::Short {
        question: question.to_string(),
        correct_answer: correct_answer.to_string(),
        explanation: explanation.to_string(),
    }
}

fn long(question: &str, key_points: [&str; 4], sample_answer: &str) -> Question {
    Question::Long {
        question: question.to_string(),
        key_points: key_points.iter().map(|p| p.to_string()).collect(),
        sample_answer: sample_answer.to_string(),
    }
}

fn build_templates() -> HashMap<(QuestionType, Category), Vec<Question>> {
    let mut templates = HashMap::new();

    templates.insert(
        (QuestionType::Mcq, Category::Programming),
        vec![
            choice(
                "What does the 'const' keyword do in JavaScript?",
                [
                    "Declares a constant variable",
                    "Creates a function",
                    "Defines a class",
                    "Imports a module",
                ],
                0,
                "The 'const' keyword declares a block-scoped constant variable that cannot be reassigned.",
            ),
            choice(
                "Which method is used to add an element to the end of an array in JavaScript?",
                ["append()", "push()", "add()", "insert()"],
                1,
                "The push() method adds one or more elements to the end of an array and returns the new length.",
            ),
            choice(
                "What is the difference between '==' and '===' in JavaScript?",
                [
                    "No difference",
                    "=== checks type and value, == only checks value",
                    "== is faster than ===",
                    "=== is deprecated",
                ],
                1,
                "=== performs strict equality comparison (type and value), while == performs loose equality with type coercion.",
            ),
            choice(
                "Which of the following is NOT a primitive data type in JavaScript?",
                ["string", "boolean", "object", "number"],
                2,
                "Object is not a primitive data type. The primitive types are: string, number, boolean, undefined, null, symbol, and bigint.",
            ),
            choice(
                "What does the 'this' keyword refer to in JavaScript?",
                [
                    "The current function",
                    "The global object",
                    "The object that calls the method",
                    "The parent element",
                ],
                2,
                "'this' refers to the object that is executing the current function or method.",
            ),
            choice(
                "Which HTTP method is used to retrieve data?",
                ["POST", "PUT", "GET", "DELETE"],
                2,
                "GET is the HTTP method used to retrieve data from a server.",
            ),
            choice(
                "What does CSS stand for?",
                [
                    "Computer Style Sheets",
                    "Cascading Style Sheets",
                    "Creative Style Sheets",
                    "Colorful Style Sheets",
                ],
                1,
                "CSS stands for Cascading Style Sheets, used for styling web pages.",
            ),
            choice(
                "Which data structure follows LIFO (Last In, First Out)?",
                ["Queue", "Stack", "Array", "Linked List"],
                1,
                "A Stack follows LIFO principle where the last element added is the first one to be removed.",
            ),
            choice(
                "What is Big O notation used for?",
                [
                    "Measuring code quality",
                    "Algorithm complexity analysis",
                    "Variable naming",
                    "Database optimization",
                ],
                1,
                "Big O notation is used to analyze the time and space complexity of algorithms.",
            ),
        ],
    );
    templates.insert(
        (QuestionType::Mcq, Category::Science),
        vec![
            choice(
                "What is the chemical symbol for gold?",
                ["Go", "Gd", "Au", "Ag"],
                2,
                "Au comes from the Latin word 'aurum' meaning gold.",
            ),
            choice(
                "Which planet is known as the Red Planet?",
                ["Venus", "Mars", "Jupiter", "Saturn"],
                1,
                "Mars is called the Red Planet due to iron oxide (rust) on its surface.",
            ),
            choice(
                "What is the smallest unit of matter?",
                ["Molecule", "Atom", "Proton", "Electron"],
                1,
                "An atom is the smallest unit of matter that retains the properties of an element.",
            ),
            choice(
                "Which gas makes up approximately 78% of Earth's atmosphere?",
                ["Oxygen", "Carbon Dioxide", "Nitrogen", "Argon"],
                2,
                "Nitrogen makes up about 78% of Earth's atmosphere, while oxygen is about 21%.",
            ),
            choice(
                "What is the powerhouse of the cell?",
                ["Nucleus", "Ribosome", "Mitochondria", "Golgi apparatus"],
                2,
                "Mitochondria are called the powerhouse of the cell because they produce ATP (energy) through cellular respiration.",
            ),
        ],
    );
    templates.insert(
        (QuestionType::Mcq, Category::History),
        vec![
            choice(
                "In which year did World War II end?",
                ["1944", "1945", "1946", "1947"],
                1,
                "World War II ended in 1945 with the surrender of Japan in September.",
            ),
            choice(
                "Who was the first President of the United States?",
                ["Thomas Jefferson", "John Adams", "George Washington", "Benjamin Franklin"],
                2,
                "George Washington served as the first President of the United States from 1789 to 1797.",
            ),
            choice(
                "The Berlin Wall fell in which year?",
                ["1987", "1988", "1989", "1990"],
                2,
                "The Berlin Wall fell on November 9, 1989, marking the beginning of German reunification.",
            ),
            choice(
                "Which empire was ruled by Julius Caesar?",
                ["Greek Empire", "Roman Empire", "Byzantine Empire", "Persian Empire"],
                1,
                "Julius Caesar was a Roman general and statesman who played a critical role in the Roman Republic.",
            ),
        ],
    );
    templates.insert(
        (QuestionType::Mcq, Category::Mathematics),
        vec![
            choice(
                "What is the value of π (pi) rounded to two decimal places?",
                ["3.14", "3.41", "2.14", "3.15"],
                0,
                "Pi (π) is approximately 3.14159, which rounds to 3.14 when rounded to two decimal places.",
            ),
            choice(
                "What is the square root of 64?",
                ["6", "7", "8", "9"],
                2,
                "The square root of 64 is 8, because 8 × 8 = 64.",
            ),
            choice(
                "In a right triangle, what is the relationship between the sides?",
                ["a + b = c", "a² + b² = c²", "a × b = c", "a² + b = c²"],
                1,
                "The Pythagorean theorem states that in a right triangle, a² + b² = c², where c is the hypotenuse.",
            ),
            choice(
                "What is 15% of 200?",
                ["30", "25", "35", "20"],
                0,
                "15% of 200 = 0.15 × 200 = 30.",
            ),
            choice(
                "What is the derivative of x²?",
                ["x", "2x", "x²", "2x²"],
                1,
                "Using the power rule, the derivative of x² is 2x.",
            ),
            choice(
                "What is the area of a circle with radius 3?",
                ["6π", "9π", "3π", "12π"],
                1,
                "Area of a circle = πr², so with radius 3: π × 3² = 9π.",
            ),
            choice(
                "What is log₁₀(100)?",
                ["1", "2", "10", "100"],
                1,
                "log₁₀(100) = 2 because 10² = 100.",
            ),
        ],
    );

    templates.insert(
        (QuestionType::Objective, Category::Programming),
        vec![
            short(
                "What does HTML stand for?",
                "HyperText Markup Language",
                "HTML is the standard markup language used to create web pages.",
            ),
            short(
                "Name the programming language created by Guido van Rossum.",
                "Python",
                "Python was created by Guido van Rossum and first released in 1991.",
            ),
            short(
                "What does CSS stand for?",
                "Cascading Style Sheets",
                "CSS is used to style and layout web pages.",
            ),
            short(
                "What does API stand for?",
                "Application Programming Interface",
                "An API is a set of protocols and tools for building software applications.",
            ),
            short(
                "What does JSON stand for?",
                "JavaScript Object Notation",
                "JSON is a lightweight data-interchange format that is easy for humans to read and write.",
            ),
        ],
    );
    templates.insert(
        (QuestionType::Objective, Category::Science),
        vec![
            short(
                "What gas do plants absorb from the atmosphere during photosynthesis?",
                "Carbon dioxide",
                "Plants absorb CO2 and convert it to glucose using sunlight and water.",
            ),
            short(
                "What is the hardest natural substance on Earth?",
                "Diamond",
                "Diamond is the hardest known natural material, rating 10 on the Mohs scale.",
            ),
            short(
                "What is the chemical formula for water?",
                "H2O",
                "Water consists of two hydrogen atoms bonded to one oxygen atom.",
            ),
            short(
                "What force keeps planets in orbit around the sun?",
                "Gravity",
                "Gravitational force from the sun keeps planets in their orbital paths.",
            ),
            short(
                "What is the speed of light in vacuum?",
                "299,792,458 meters per second",
                "The speed of light in vacuum is exactly 299,792,458 meters per second.",
            ),
        ],
    );
    templates.insert(
        (QuestionType::Objective, Category::History),
        vec![
            short(
                "Who was the first person to walk on the moon?",
                "Neil Armstrong",
                "Neil Armstrong was the first human to step onto the Moon on July 20, 1969.",
            ),
            short(
                "In which city was President John F. Kennedy assassinated?",
                "Dallas",
                "President Kennedy was assassinated in Dallas, Texas, on November 22, 1963.",
            ),
            short(
                "What year did the Titanic sink?",
                "1912",
                "The RMS Titanic sank on April 15, 1912, after hitting an iceberg.",
            ),
            short(
                "Who painted the Mona Lisa?",
                "Leonardo da Vinci",
                "Leonardo da Vinci painted the Mona Lisa between 1503 and 1519.",
            ),
        ],
    );
    templates.insert(
        (QuestionType::Objective, Category::Mathematics),
        vec![
            short(
                "What is 2 + 2 × 3?",
                "8",
                "Following order of operations (PEMDAS), multiplication comes before addition: 2 + (2 × 3) = 2 + 6 = 8.",
            ),
            short(
                "What is the next prime number after 7?",
                "11",
                "After 7, the next prime number is 11 (only divisible by 1 and itself).",
            ),
            short(
                "What is the area of a circle with radius 5?",
                "25π or approximately 78.54",
                "Area of a circle = πr², so with radius 5: π × 5² = 25π ≈ 78.54 square units.",
            ),
        ],
    );

    // 论述题没有数学分类
    templates.insert(
        (QuestionType::Long, Category::Programming),
        vec![
            long(
                "Explain the concept of Object-Oriented Programming and its main principles.",
                ["Encapsulation", "Inheritance", "Polymorphism", "Abstraction"],
                "Object-Oriented Programming (OOP) is a programming paradigm based on objects and classes. The four main principles are: 1) Encapsulation - bundling data and methods together and hiding internal details, 2) Inheritance - creating new classes based on existing ones to reuse code, 3) Polymorphism - objects taking multiple forms and responding to the same interface differently, and 4) Abstraction - hiding complex implementation details and showing only essential features.",
            ),
            long(
                "Describe the differences between SQL and NoSQL databases, and when you would use each.",
                ["Structure", "Scalability", "ACID properties", "Use cases"],
                "SQL databases are relational, structured with predefined schemas, and use SQL for queries. They ensure ACID properties and are ideal for complex transactions. NoSQL databases are non-relational, more flexible with dynamic schemas, and horizontally scalable. Use SQL for financial systems, analytics, and complex relationships. Use NoSQL for big data, real-time applications, and rapid development with changing requirements.",
            ),
        ],
    );
    templates.insert(
        (QuestionType::Long, Category::Science),
        vec![
            long(
                "Describe the process of photosynthesis and its importance to life on Earth.",
                [
                    "Light absorption",
                    "Carbon dioxide intake",
                    "Glucose production",
                    "Oxygen release",
                ],
                "Photosynthesis is the process by which plants convert light energy into chemical energy. Plants absorb sunlight through chlorophyll in their leaves, take in CO2 through stomata, and combine these with water to produce glucose and oxygen. The chemical equation is: 6CO2 + 6H2O + light energy → C6H12O6 + 6O2. This process is crucial as it provides food for plants (primary producers) and oxygen for most life forms on Earth, forming the foundation of most food chains.",
            ),
            long(
                "Explain the theory of evolution by natural selection and provide examples.",
                ["Variation", "Inheritance", "Selection pressure", "Adaptation"],
                "Evolution by natural selection, proposed by Charles Darwin, explains how species change over time. It requires: 1) Variation within populations, 2) Heritable traits, 3) More offspring than can survive, and 4) Differential survival based on traits. Beneficial traits increase survival and reproduction chances. Examples include peppered moths during industrial revolution (dark moths survived better in polluted areas), antibiotic resistance in bacteria, and Darwin's finches with different beak shapes for different food sources.",
            ),
        ],
    );
    templates.insert(
        (QuestionType::Long, Category::History),
        vec![
            long(
                "Analyze the causes and consequences of the Industrial Revolution.",
                [
                    "Technological innovations",
                    "Urbanization",
                    "Social changes",
                    "Economic transformation",
                ],
                "The Industrial Revolution (1760-1840) was caused by technological innovations (steam engine, textile machinery), available capital from trade, abundant natural resources, and labor supply. It led to mass production, factory systems, and urbanization as people moved from farms to cities. Consequences included improved transportation (railways, canals), new social classes (industrial capitalists and workers), better living standards for some but also pollution, poor working conditions, and labor exploitation. It fundamentally transformed society from agricultural to industrial.",
            ),
            long(
                "Discuss the factors that led to World War I and its global impact.",
                ["Imperialism", "Alliance system", "Nationalism", "Immediate trigger"],
                "World War I (1914-1918) resulted from multiple factors: imperialism created competition for colonies, the alliance system (Triple Alliance vs. Triple Entente) escalated conflicts, rising nationalism threatened empires, and the assassination of Archduke Franz Ferdinand was the immediate trigger. The war's impact was devastating: 16 million deaths, economic collapse, Russian Revolution, Ottoman Empire's fall, new nations created, and conditions set for World War II. It marked the end of European dominance and the beginning of American and Soviet power.",
            ),
        ],
    );

    templates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_sizes_match_the_table() {
        assert_eq!(templates_for(QuestionType::Mcq, Category::Programming).len(), 9);
        assert_eq!(templates_for(QuestionType::Objective, Category::Mathematics).len(), 3);
        assert_eq!(templates_for(QuestionType::Long, Category::Science).len(), 2);
        assert!(templates_for(QuestionType::Long, Category::Mathematics).is_empty());
    }

    #[test]
    fn every_template_passes_validation_and_has_its_own_kind() {
        for category in Category::FALLBACK_ORDER {
            for kind in [QuestionType::Mcq, QuestionType::Objective, QuestionType::Long] {
                for question in templates_for(kind, category) {
                    assert!(question.is_valid(), "{}", question.prompt());
                    assert_eq!(question.kind(), kind);
                }
            }
        }
    }
}
