use anyhow::Result;
use crossplay_solver::{
    solve, Board, Dictionary, Direction, Move, MoveGenerator, Position, Rack, RackTile, CENTER,
    SIZE,
};

const WORDS: &[&str] = &[
    "care", "cares", "cared", "scare", "scared", "race", "races", "raced", "acre", "acres",
    "ace", "aces", "arc", "arcs", "car", "cars", "scar", "ear", "ears", "era", "eras", "sea",
    "sear", "seat", "eat", "eats", "ate", "tea", "teas", "tear", "tears", "rate", "rates", "star",
    "stare", "tsar", "art", "arts", "rat", "rats", "tar", "tars", "at", "as", "ta", "re", "er",
    "es", "ae", "ar", "ad", "da", "de", "ed", "red", "dare", "dear", "read", "trade", "tread",
    "dates", "date", "sated", "stead",
];

fn care_board() -> Result<Board> {
    let mut rows = vec!["..............."; SIZE];
    rows[7] = "......CARE.....";
    Ok(Board::from_strings(&rows)?)
}

fn played_board() -> Result<Board> {
    Ok(Board::from_strings(&[
        "...............",
        "...............",
        "...............",
        "...............",
        "...............",
        "........S......",
        "........T......",
        "......CARE.....",
        "........E......",
        "........A......",
        "........d......",
        "...............",
        "...............",
        "...............",
        "...............",
    ])?)
}

/// Check that `m` is a legal move of `rack` on `board`.
fn assert_legal(board: &Board, rack: &Rack, dictionary: &Dictionary, m: &Move) {
    assert!(!m.placements.is_empty(), "{}", m);
    for &(pos, _) in &m.placements {
        assert!(!board.is_occupied(pos), "{} covers {}", m, pos);
    }
    // the tiles come from the rack
    let used = m.placements.iter().map(|&(_, tile)| {
        if tile.blank {
            RackTile::Blank
        } else {
            RackTile::Letter(tile.letter)
        }
    });
    let mut left = rack.tiles();
    for tile in used {
        let i = left
            .iter()
            .position(|&t| t == tile)
            .unwrap_or_else(|| panic!("{} uses a tile that is not on the rack", m));
        left.remove(i);
    }
    // all new tiles on one line, without gaps
    let after = board.with_placements(&m.placements);
    let (start, tiles) = after.word_at(m.placements[0].0, m.direction);
    assert_eq!(start, m.start);
    for &(pos, _) in &m.placements {
        let offset = pos.offset(m.direction) as isize - start.offset(m.direction) as isize;
        assert!(offset >= 0 && (offset as usize) < tiles.len(), "{}", m);
        assert_eq!(Some(pos), start.step(m.direction, offset), "{}", m);
    }
    assert!(tiles.len() >= 2);
    assert!(dictionary.contains(&m.word), "{} is not a word", m.word);
    for word in &m.cross_words {
        assert!(dictionary.contains(word), "{} is not a word", word);
    }
    assert!(after.validate_geometry().is_ok(), "{}", m);
}

#[test]
fn test_quiz_through_center() -> Result<()> {
    let dictionary = Dictionary::from_words(&["qi", "quiz", "quit", "za", "zo", "zit", "tiz"]);
    let rack: Rack = "QUIZ???".parse()?;
    let moves = solve(&Board::new(), &rack, &dictionary, None);
    let best = &moves[0];
    // Q 10 + U 1 + I 1 + Z 10, doubled by the center square
    assert_eq!(best.word, "QUIZ");
    assert_eq!(best.score, 44);
    assert_eq!(best.direction, Direction::Across);
    assert_eq!(best.start, Position::new(7, 4));
    assert!(best.placements.iter().any(|&(pos, _)| pos == CENTER));
    assert!(best.placements.iter().all(|&(_, tile)| !tile.blank));
    for m in &moves {
        assert_legal(&Board::new(), &rack, &dictionary, m);
    }
    Ok(())
}

#[test]
fn test_hook_needs_dictionary_word() -> Result<()> {
    let board = care_board()?;
    let rack: Rack = "S".parse()?;
    let hook = Position::new(7, 10);
    let uses_hook = |moves: &[Move]| {
        moves
            .iter()
            .any(|m| m.placements.iter().any(|&(pos, _)| pos == hook))
    };

    let without = Dictionary::from_words(&["care", "scare", "as"]);
    let moves = solve(&board, &rack, &without, None);
    assert!(!moves.is_empty());
    assert!(!uses_hook(&moves));

    let with = Dictionary::from_words(&["care", "cares", "scare", "as"]);
    let moves = solve(&board, &rack, &with, None);
    assert!(uses_hook(&moves));
    assert!(moves.iter().any(|m| m.word == "CARES"));
    Ok(())
}

#[test]
fn test_bingo_bonus() -> Result<()> {
    let dictionary = Dictionary::from_words(&["retains", "retain", "stain", "rain"]);
    let rack: Rack = "RETAINS".parse()?;
    let moves = solve(&Board::new(), &rack, &dictionary, None);
    let find = |word: &str, start: Position| {
        moves
            .iter()
            .find(|m| m.word == word && m.start == start && m.direction == Direction::Across)
    };
    let seven = find("RETAINS", Position::new(7, 4)).expect("RETAINS is a legal move");
    assert!(seven.is_bingo());
    assert_eq!(seven.score, 7 * 2 + 50);
    let six = find("RETAIN", Position::new(7, 4)).expect("RETAIN is a legal move");
    assert!(!six.is_bingo());
    assert_eq!(six.score, 6 * 2);
    // a double letter on col 3 or 11 adds one point
    assert_eq!(moves[0].word, "RETAINS");
    assert_eq!(moves[0].score, 66);
    Ok(())
}

#[test]
fn test_moves_are_legal() -> Result<()> {
    let dictionary = Dictionary::from_words(WORDS);
    let board = played_board()?;
    for rack in &["SEAT?", "DARES", "TRACED", "E?"] {
        let rack: Rack = rack.parse()?;
        let moves = solve(&board, &rack, &dictionary, None);
        assert!(!moves.is_empty(), "no moves for {}", rack);
        for m in &moves {
            assert_legal(&board, &rack, &dictionary, m);
        }
        // no placement set appears twice
        let mut placements: Vec<_> = moves.iter().map(|m| m.placements.clone()).collect();
        placements.sort();
        placements.dedup();
        assert_eq!(placements.len(), moves.len());
        // ranked by score, then shorter words first
        for pair in moves.windows(2) {
            assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].word.len() <= pair[1].word.len())
            );
        }
    }
    Ok(())
}

#[test]
fn test_deterministic() -> Result<()> {
    let dictionary = Dictionary::from_words(WORDS);
    let board = played_board()?;
    let rack: Rack = "SEAT?R".parse()?;
    let first = solve(&board, &rack, &dictionary, None);
    for _ in 0..3 {
        assert_eq!(solve(&board, &rack, &dictionary, None), first);
    }
    let mut sequential = MoveGenerator::new(&dictionary)
        .with_parallel(false)
        .generate(&board, &rack);
    crossplay_solver::rank(&mut sequential, None);
    assert_eq!(sequential, first);
    Ok(())
}

#[test]
fn test_no_legal_moves() -> Result<()> {
    let dictionary = Dictionary::from_words(WORDS);
    let rack: Rack = "QXZ".parse()?;
    let moves = solve(&played_board()?, &rack, &dictionary, None);
    assert!(moves.is_empty());
    Ok(())
}
