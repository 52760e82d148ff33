//! The animal catalog.

/// One animal the learner can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animal {
    /// Unique key.
    pub id: &'static str,
    /// English display name.
    pub name: &'static str,
    /// Name in the learner's native language (Vietnamese).
    pub native_name: &'static str,
    /// Icon glyph.
    pub emoji: &'static str,
    /// Card colour.
    pub style: &'static str,
}

/// All animals, in menu order.
pub static ANIMALS: &[Animal] = &[
    Animal { id: "lion", name: "Lion", native_name: "Sư tử", emoji: "🦁", style: "yellow" },
    Animal { id: "elephant", name: "Elephant", native_name: "Voi", emoji: "🐘", style: "gray" },
    Animal { id: "dog", name: "Dog", native_name: "Chó", emoji: "🐶", style: "orange" },
    Animal { id: "cat", name: "Cat", native_name: "Mèo", emoji: "🐱", style: "blue" },
    Animal { id: "cow", name: "Cow", native_name: "Bò", emoji: "🐮", style: "slate" },
    Animal { id: "sheep", name: "Sheep", native_name: "Cừu", emoji: "🐑", style: "pink" },
    Animal { id: "duck", name: "Duck", native_name: "Vịt", emoji: "🦆", style: "teal" },
    Animal { id: "monkey", name: "Monkey", native_name: "Khỉ", emoji: "🐵", style: "amber" },
    Animal { id: "snake", name: "Snake", native_name: "Rắn", emoji: "🐍", style: "green" },
    Animal { id: "bird", name: "Bird", native_name: "Chim", emoji: "🐦", style: "sky" },
];
