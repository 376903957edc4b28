/// Trial categories (one per card suit) and their display properties.
/// Properties are queried via methods, not stored as fields,
/// so category copy is centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Category {
    Spades,   // Reflex under stress
    Diamonds, // Logic vs. ethics
    Hearts,   // Trust and betrayal
    Clubs,    // Blind cooperation
}

impl Category {
    /// Hub order, left to right.
    pub const ALL: [Category; 4] = [
        Category::Spades,
        Category::Diamonds,
        Category::Hearts,
        Category::Clubs,
    ];

    /// Position in `ALL`. Used for digit shortcuts and cursor movement.
    pub fn index(self) -> usize {
        match self {
            Category::Spades => 0,
            Category::Diamonds => 1,
            Category::Hearts => 2,
            Category::Clubs => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Category> {
        Self::ALL.get(i).copied()
    }

    pub fn symbol(self) -> char {
        match self {
            Category::Spades => '♠',
            Category::Diamonds => '♦',
            Category::Hearts => '♥',
            Category::Clubs => '♣',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Spades => "SPADES",
            Category::Diamonds => "DIAMONDS",
            Category::Hearts => "HEARTS",
            Category::Clubs => "CLUBS",
        }
    }

    /// Trial title shown on the hub card and in the game header.
    pub fn title(self) -> &'static str {
        match self {
            Category::Spades => "Adrenaline Lockdown",
            Category::Diamonds => "The Last Choice",
            Category::Hearts => "Trustfall",
            Category::Clubs => "Sync or Sink",
        }
    }

    /// Two-line teaser shown when the card is highlighted.
    pub fn teaser(self) -> [&'static str; 2] {
        match self {
            Category::Spades => ["Test your reflex under chaos.", "Only cold focus survives."],
            Category::Diamonds => ["Logic vs. ethics in silence.", "The system is watching."],
            Category::Hearts => ["Who can you trust?", "Or are you the threat?"],
            Category::Clubs => ["Solve what you can't see.", "Win without blame."],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Category::Spades => "spades",
            Category::Diamonds => "diamonds",
            Category::Hearts => "hearts",
            Category::Clubs => "clubs",
        })
    }
}
