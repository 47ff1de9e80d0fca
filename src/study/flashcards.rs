use crate::types::Flashcard;

/// Cursor over a flashcard deck. Navigation wraps around and resets the flip.
#[derive(Clone, Debug)]
pub struct FlashcardDeck {
    cards: Vec<Flashcard>,
    index: usize,
    flipped: bool,
}

impl FlashcardDeck {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self { cards, index: 0, flipped: false }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.get(self.index)
    }

    /// Text on the visible face of the current card.
    pub fn face(&self) -> Option<&str> {
        self.current().map(|c| {
            if self.flipped {
                c.answer.as_str()
            } else {
                c.question.as_str()
            }
        })
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn next(&mut self) {
        if !self.cards.is_empty() {
            self.index = (self.index + 1) % self.cards.len();
        }
        self.flipped = false;
    }

    pub fn prev(&mut self) {
        if !self.cards.is_empty() {
            self.index = (self.index + self.cards.len() - 1) % self.cards.len();
        }
        self.flipped = false;
    }
}
