use derive_more::Display;

/// Number of cells on the board
pub const CELL_COUNT: usize = 9;

/// A line of three cell indices
pub type Line = [usize; 3];

/// Every winning line, in the order they are checked
pub const WIN_LINES: [Line; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// One of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// The other player
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Lowercase CSS class used for this player's marks
    pub fn css_class(self) -> &'static str {
        match self {
            Player::X => "x",
            Player::O => "o",
        }
    }
}

/// Contents of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Taken(Player),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Taken(p) => Some(p),
        }
    }
}

/// 3x3 board in row-major order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell at `index`, or `None` when out of range
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Write a mark into an empty cell.
    ///
    /// # Panics
    /// If the cell is already taken. Cells are locked while a drop is in
    /// flight, so a second write means the locking contract was bypassed.
    pub fn place(&mut self, index: usize, player: Player) {
        let cell = &mut self.cells[index];
        assert!(
            cell.is_empty(),
            "cell {} already holds {:?}; a move was committed twice",
            index,
            cell
        );
        *cell = Cell::Taken(player);
    }

    pub fn clear(&mut self) {
        self.cells = [Cell::Empty; CELL_COUNT];
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// First completed line in [`WIN_LINES`] order, with its owner
    pub fn winning_line(&self) -> Option<(Player, Line)> {
        WIN_LINES.iter().find_map(|&line| {
            let [a, b, c] = line;
            let owner = self.cells[a].player()?;
            (self.cells[b] == self.cells[a] && self.cells[c] == self.cells[a])
                .then_some((owner, line))
        })
    }

    /// Build a board from a compact string like `"XO_ _X_ O__"` (whitespace ignored)
    #[cfg(test)]
    pub(crate) fn from_pattern(pattern: &str) -> Self {
        let mut board = Board::new();
        let marks = pattern.chars().filter(|c| !c.is_whitespace());
        for (i, ch) in marks.enumerate() {
            match ch {
                'X' => board.place(i, Player::X),
                'O' => board.place(i, Player::O),
                _ => {}
            }
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let board = Board::new();
        assert_eq!(board.occupied(), 0);
        assert!(!board.is_full());
        assert_eq!(board.winning_line(), None);
        assert_eq!(board.get(9), None);
    }

    #[test]
    fn test_top_row_wins() {
        let board = Board::from_pattern("XXX ___ ___");
        assert_eq!(board.winning_line(), Some((Player::X, [0, 1, 2])));
    }

    #[test]
    fn test_column_and_diagonal() {
        let column = Board::from_pattern("_O_ _O_ _O_");
        assert_eq!(column.winning_line(), Some((Player::O, [1, 4, 7])));

        let anti = Board::from_pattern("__X _X_ X__");
        assert_eq!(anti.winning_line(), Some((Player::X, [2, 4, 6])));
    }

    #[test]
    fn test_first_line_in_order_wins() {
        // Row 0 and column 0 both complete; the row is enumerated first.
        let board = Board::from_pattern("XXX X__ X__");
        assert_eq!(board.winning_line(), Some((Player::X, [0, 1, 2])));
    }

    #[test]
    fn test_full_board_without_line() {
        let board = Board::from_pattern("XOX XOO OXX");
        assert!(board.is_full());
        assert_eq!(board.winning_line(), None);
    }

    #[test]
    fn test_mixed_marks_do_not_win() {
        let board = Board::from_pattern("XXO ___ ___");
        assert_eq!(board.winning_line(), None);
    }

    #[test]
    #[should_panic(expected = "committed twice")]
    fn test_double_write_panics() {
        let mut board = Board::new();
        board.place(4, Player::X);
        board.place(4, Player::O);
    }

    #[test]
    fn test_clear() {
        let mut board = Board::from_pattern("XO_ ___ ___");
        board.clear();
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_player_helpers() {
        assert_eq!(Player::X.opponent(), Player::O);
        assert_eq!(Player::O.opponent(), Player::X);
        assert_eq!(Player::O.css_class(), "o");
        assert_eq!(Player::X.to_string(), "X");
    }
}
