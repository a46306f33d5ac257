//! Static content tables for the games: quiz questions, emoji patterns,
//! movie riddles, and charades themes, with random-selection helpers.

use rand::seq::SliceRandom;
use rand::Rng;

pub struct QuizQuestion {
    pub id: u32,
    pub question: &'static str,
    pub options: [&'static str; 4],
    pub correct_index: usize,
    pub category: &'static str,
}

pub const QUIZ_QUESTIONS: &[QuizQuestion] = &[
    QuizQuestion {
        id: 1,
        question: "What is the capital of Australia?",
        options: ["Sydney", "Melbourne", "Canberra", "Perth"],
        correct_index: 2,
        category: "Geography",
    },
    QuizQuestion {
        id: 2,
        question: "How many planets are in the Solar System?",
        options: ["7", "8", "9", "10"],
        correct_index: 1,
        category: "Astronomy",
    },
    QuizQuestion {
        id: 3,
        question: "What is the largest ocean on Earth?",
        options: ["Atlantic", "Indian", "Pacific", "Arctic"],
        correct_index: 2,
        category: "Geography",
    },
    QuizQuestion {
        id: 4,
        question: "Who painted the Mona Lisa?",
        options: ["Vincent van Gogh", "Pablo Picasso", "Leonardo da Vinci", "Michelangelo"],
        correct_index: 2,
        category: "Art",
    },
    QuizQuestion {
        id: 5,
        question: "What is the chemical symbol for gold?",
        options: ["Au", "Ag", "Fe", "Cu"],
        correct_index: 0,
        category: "Chemistry",
    },
    QuizQuestion {
        id: 6,
        question: "Who wrote 'Don Quixote'?",
        options: ["Miguel de Cervantes", "William Shakespeare", "Victor Hugo", "Jorge Luis Borges"],
        correct_index: 0,
        category: "Literature",
    },
    QuizQuestion {
        id: 7,
        question: "What is the largest desert in the world?",
        options: ["Sahara", "Atacama", "Antarctica", "Kalahari"],
        correct_index: 2,
        category: "Geography",
    },
    QuizQuestion {
        id: 8,
        question: "In which year did World War I begin?",
        options: ["1914", "1918", "1939", "1945"],
        correct_index: 0,
        category: "History",
    },
    QuizQuestion {
        id: 9,
        question: "What is the smallest prime number?",
        options: ["0", "1", "2", "3"],
        correct_index: 2,
        category: "Mathematics",
    },
    QuizQuestion {
        id: 10,
        question: "Which gas do plants absorb during photosynthesis?",
        options: ["Oxygen", "Nitrogen", "Carbon dioxide", "Hydrogen"],
        correct_index: 2,
        category: "Biology",
    },
    QuizQuestion {
        id: 11,
        question: "What is the longest river in the world?",
        options: ["Amazon", "Nile", "Yangtze", "Mississippi"],
        correct_index: 1,
        category: "Geography",
    },
    QuizQuestion {
        id: 12,
        question: "Which instrument has 88 keys?",
        options: ["Organ", "Accordion", "Piano", "Harpsichord"],
        correct_index: 2,
        category: "Music",
    },
];

/// Pick a random question whose id is not in `exclude`. Returns `None`
/// only when every question has already been used in the session.
pub fn random_question(exclude: &[String]) -> Option<&'static QuizQuestion> {
    let available: Vec<&QuizQuestion> = QUIZ_QUESTIONS
        .iter()
        .filter(|q| !exclude.iter().any(|id| id == &q.id.to_string()))
        .collect();
    available.choose(&mut rand::thread_rng()).copied()
}

pub struct EmojiPattern {
    pub id: u32,
    pub pattern: &'static str,
    pub next: &'static str,
    pub explanation: &'static str,
    pub difficulty: u8,
}

pub const EMOJI_PATTERNS: &[EmojiPattern] = &[
    EmojiPattern {
        id: 1,
        pattern: "🌑 🌒 🌓 🌔 🌕",
        next: "🌖",
        explanation: "Phases of the moon, from new moon to waning gibbous.",
        difficulty: 1,
    },
    EmojiPattern {
        id: 2,
        pattern: "1️⃣ 2️⃣ 3️⃣ 5️⃣ 8️⃣",
        next: "1️⃣3️⃣",
        explanation: "Fibonacci sequence: each number is the sum of the previous two.",
        difficulty: 3,
    },
    EmojiPattern {
        id: 3,
        pattern: "🔴 🟠 🟡 🟢 🔵",
        next: "🟣",
        explanation: "Rainbow colors in order: red, orange, yellow, green, blue, purple.",
        difficulty: 1,
    },
    EmojiPattern {
        id: 4,
        pattern: "🐢 🐇 🐢 🐇 🐢",
        next: "🐇",
        explanation: "Alternating pattern: tortoise, hare, tortoise, hare...",
        difficulty: 1,
    },
    EmojiPattern {
        id: 5,
        pattern: "👶 👦 👨 👴",
        next: "⚰️",
        explanation: "The human life cycle: baby, boy, man, old man, death.",
        difficulty: 2,
    },
    EmojiPattern {
        id: 6,
        pattern: "⬛ ⬜ ⬛ ⬜ ⬛ ⬜",
        next: "⬛",
        explanation: "Alternating black and white squares.",
        difficulty: 1,
    },
    EmojiPattern {
        id: 7,
        pattern: "🕐 🕑 🕒 🕓 🕔",
        next: "🕕",
        explanation: "Clock faces advancing one hour at a time.",
        difficulty: 1,
    },
    EmojiPattern {
        id: 8,
        pattern: "2️⃣ 4️⃣ 8️⃣ 1️⃣6️⃣",
        next: "3️⃣2️⃣",
        explanation: "Powers of two: each number doubles the previous one.",
        difficulty: 3,
    },
];

pub fn random_pattern(exclude: &[String]) -> Option<&'static EmojiPattern> {
    let available: Vec<&EmojiPattern> = EMOJI_PATTERNS
        .iter()
        .filter(|p| !exclude.iter().any(|id| id == &p.id.to_string()))
        .collect();
    available.choose(&mut rand::thread_rng()).copied()
}

pub struct MovieEmoji {
    pub id: u32,
    pub title: &'static str,
    pub emoji: &'static str,
}

pub const MOVIES: &[MovieEmoji] = &[
    MovieEmoji { id: 1, title: "Titanic", emoji: "🚢 ❄️ 💑 💔 🌊" },
    MovieEmoji { id: 2, title: "Star Wars", emoji: "⭐ 🪐 ⚔️ 🤖 👾" },
    MovieEmoji { id: 3, title: "The Matrix", emoji: "💊 👨‍💻 🕶️ 📞 🤖" },
    MovieEmoji { id: 4, title: "Harry Potter", emoji: "⚡ 🧙‍♂️ 🧹 🦉 🏰" },
    MovieEmoji { id: 5, title: "Jurassic Park", emoji: "🦖 🦕 🔬 🌴 🚙" },
    MovieEmoji { id: 6, title: "The Lord of the Rings", emoji: "💍 🧙‍♂️ 🧝‍♂️ 🌋 👑" },
    MovieEmoji { id: 7, title: "Toy Story", emoji: "🤠 👨‍🚀 🧸 🐶 🚀" },
    MovieEmoji { id: 8, title: "Frozen", emoji: "❄️ 👸 ☃️ 🦌 👱‍♀️" },
    MovieEmoji { id: 9, title: "Spider-Man", emoji: "🕸️ 🕷️ 🦸‍♂️ 🏙️ 📸" },
    MovieEmoji { id: 10, title: "The Lion King", emoji: "🦁 👑 🐗 🐒 🌅" },
    MovieEmoji { id: 11, title: "Finding Nemo", emoji: "🐠 🌊 🦈 🐢 🐙" },
    MovieEmoji { id: 12, title: "Pirates of the Caribbean", emoji: "🏴‍☠️ 🦜 ⚓ 🚢 💰" },
    MovieEmoji { id: 13, title: "E.T.", emoji: "👽 🚲 🌙 👦 🌟" },
    MovieEmoji { id: 14, title: "Jaws", emoji: "🦈 🏊‍♂️ 🚤 🏖️ 🎣" },
    MovieEmoji { id: 15, title: "Forrest Gump", emoji: "🏃‍♂️ 🍫 🪖 🏓 🦐" },
    MovieEmoji { id: 16, title: "The Godfather", emoji: "🤵 🔫 🐎 🍝 🇮🇹" },
    MovieEmoji { id: 17, title: "Back to the Future", emoji: "⏰ 🚗 ⚡ 👨‍🔬 📼" },
    MovieEmoji { id: 18, title: "Inception", emoji: "💤 🌀 🏙️ 🧠 ⏱️" },
    MovieEmoji { id: 19, title: "WALL-E", emoji: "🤖 🚀 🌱 🗑️ 🌍" },
    MovieEmoji { id: 20, title: "Interstellar", emoji: "🚀 🕳️ 🌍 ⏰ 🌽" },
];

pub fn random_movie(exclude: &[String]) -> Option<&'static MovieEmoji> {
    let available: Vec<&MovieEmoji> = MOVIES
        .iter()
        .filter(|m| !exclude.iter().any(|id| id == &m.id.to_string()))
        .collect();
    available.choose(&mut rand::thread_rng()).copied()
}

/// Multiple-choice options for a movie riddle: the correct title plus
/// `count - 1` decoys, shuffled.
pub fn movie_options(correct_title: &str, count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let mut decoys: Vec<&str> = MOVIES
        .iter()
        .map(|m| m.title)
        .filter(|t| *t != correct_title)
        .collect();
    decoys.shuffle(&mut rng);

    let mut options: Vec<String> = decoys
        .into_iter()
        .take(count.saturating_sub(1))
        .map(str::to_string)
        .collect();
    options.push(correct_title.to_string());
    options.shuffle(&mut rng);
    options
}

pub struct CharadesCategory {
    pub name: &'static str,
    pub themes: &'static [&'static str],
}

pub const CHARADES_CATEGORIES: &[CharadesCategory] = &[
    CharadesCategory {
        name: "Movies",
        themes: &[
            "Star Wars", "Harry Potter", "The Matrix", "Titanic", "Rocky",
            "Jurassic Park", "Batman", "Frozen", "Shrek", "Gladiator",
        ],
    },
    CharadesCategory {
        name: "Professions",
        themes: &[
            "Doctor", "Teacher", "Firefighter", "Pilot", "Chef",
            "Astronaut", "Dentist", "Painter", "Journalist", "Judge",
        ],
    },
    CharadesCategory {
        name: "Sports",
        themes: &[
            "Football", "Basketball", "Swimming", "Tennis", "Boxing",
            "Golf", "Surfing", "Skiing", "Cycling", "Chess",
        ],
    },
    CharadesCategory {
        name: "Animals",
        themes: &[
            "Lion", "Penguin", "Kangaroo", "Octopus", "Eagle",
            "Snake", "Butterfly", "Dolphin", "Bear", "Peacock",
        ],
    },
    CharadesCategory {
        name: "Objects",
        themes: &[
            "Telephone", "Umbrella", "Scissors", "Bicycle", "Camera",
            "Toothbrush", "Backpack", "Glasses", "Clock", "Headphones",
        ],
    },
];

pub struct Charade {
    pub theme: &'static str,
    pub category: &'static str,
}

pub fn random_charade() -> Charade {
    let mut rng = rand::thread_rng();
    let category = &CHARADES_CATEGORIES[rng.gen_range(0..CHARADES_CATEGORIES.len())];
    let theme = category.themes[rng.gen_range(0..category.themes.len())];
    Charade {
        theme,
        category: category.name,
    }
}

/// Options for guessing a charade: the theme plus decoys from the same
/// category, shuffled.
pub fn charade_options(theme: &str, category: &str, count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let mut decoys: Vec<&str> = CHARADES_CATEGORIES
        .iter()
        .filter(|c| c.name == category)
        .flat_map(|c| c.themes.iter().copied())
        .filter(|t| *t != theme)
        .collect();
    decoys.shuffle(&mut rng);

    let mut options: Vec<String> = decoys
        .into_iter()
        .take(count.saturating_sub(1))
        .map(str::to_string)
        .collect();
    options.push(theme.to_string());
    options.shuffle(&mut rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn quiz_ids_are_unique_and_answers_in_range() {
        let mut seen = HashSet::new();
        for q in QUIZ_QUESTIONS {
            assert!(seen.insert(q.id), "duplicate quiz id {}", q.id);
            assert!(q.correct_index < q.options.len());
        }
    }

    #[test]
    fn random_question_respects_exclusions() {
        let all_but_one: Vec<String> = QUIZ_QUESTIONS
            .iter()
            .skip(1)
            .map(|q| q.id.to_string())
            .collect();
        let picked = random_question(&all_but_one).map(|q| q.id);
        assert_eq!(picked, Some(QUIZ_QUESTIONS[0].id));

        let all: Vec<String> = QUIZ_QUESTIONS.iter().map(|q| q.id.to_string()).collect();
        assert!(random_question(&all).is_none());
    }

    #[test]
    fn movie_options_contain_correct_title_once() {
        let options = movie_options("Titanic", 4);
        assert_eq!(options.len(), 4);
        assert_eq!(options.iter().filter(|o| *o == "Titanic").count(), 1);
        let unique: HashSet<&String> = options.iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn charade_options_stay_within_category() {
        let options = charade_options("Lion", "Animals", 4);
        assert_eq!(options.len(), 4);
        assert!(options.iter().any(|o| o == "Lion"));
        let animals: HashSet<&str> = CHARADES_CATEGORIES
            .iter()
            .find(|c| c.name == "Animals")
            .map(|c| c.themes.iter().copied().collect())
            .unwrap_or_default();
        for option in &options {
            assert!(animals.contains(option.as_str()));
        }
    }
}
